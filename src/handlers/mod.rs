//! Demonstration handlers module
//!
//! Registers every demo route against the router and provides the hyper
//! service entry point. Each handler is a pure function of its validated
//! input; all extraction and validation happens in the routing layer.

pub mod basics;
pub mod events;
pub mod items;
pub mod models;
pub mod products;
pub mod service;

// Re-export main entry point
pub use service::handle_request;

use hyper::Method;
use regex::Regex;

use crate::error::ApiError;
use crate::params::{Constraints, FieldType, ParamValue, ParameterSpec, ScalarType};
use crate::routing::Router;

/// Paging parameters shared by the product listing routes
fn paging_params() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::path("product_id", ScalarType::Str),
        ParameterSpec::query("start", ScalarType::Int).default_value(ParamValue::Int(0)),
        ParameterSpec::query("end", ScalarType::Int).default_value(ParamValue::Int(10)),
    ]
}

/// Build the complete route table
///
/// Any inconsistency in a template, parameter specification, or schema is
/// reported here and aborts startup.
pub fn build_router() -> Result<Router, ApiError> {
    let product = models::product();
    let event = models::event();
    let user = models::user();
    let student = models::student();
    let image = models::image();
    let employee = models::employee(&image);

    let fixedquery = Regex::new("^fixedquery$")
        .map_err(|e| ApiError::Configuration(format!("invalid query pattern: {e}")))?;

    let mut router = Router::new();

    router.register(Method::GET, "/", vec![], basics::root)?;

    router.register(Method::GET, "/profile/me", vec![], basics::profile_me)?;
    router.register(
        Method::GET,
        "/profile/{user_id}",
        vec![ParameterSpec::path("user_id", ScalarType::Int)],
        basics::profile_by_id,
    )?;

    // Unknown plans answer with a fallback body, so the segment stays a
    // plain string and the handler does the enum lookup itself
    router.register(
        Method::GET,
        "/plan/{plan_id}",
        vec![ParameterSpec::path("plan_id", ScalarType::Str)],
        basics::get_plan,
    )?;

    router.register(
        Method::GET,
        "/files/{file_path:path}",
        vec![ParameterSpec::path("file_path", ScalarType::RestOfPath)],
        basics::read_file,
    )?;

    router.register(
        Method::GET,
        "/products/{product_id}",
        paging_params(),
        products::list_products,
    )?;

    let mut v2_listing = paging_params();
    v2_listing.push(ParameterSpec::query("q", ScalarType::Str));
    router.register(
        Method::GET,
        "/v2/products/{product_id}",
        v2_listing,
        products::list_products,
    )?;

    let mut v3_listing = paging_params();
    v3_listing.push(ParameterSpec::query("token", ScalarType::Str).required());
    v3_listing.push(ParameterSpec::query("q", ScalarType::Str));
    router.register(
        Method::GET,
        "/v3/products/{product_id}",
        v3_listing,
        products::list_products,
    )?;

    router.register(
        Method::POST,
        "/create_products",
        vec![ParameterSpec::body(
            "item",
            FieldType::Model(product.clone()),
        )],
        products::create_product,
    )?;

    router.register(
        Method::POST,
        "/v2/create_products/{product_id}",
        vec![
            ParameterSpec::path("product_id", ScalarType::Str),
            ParameterSpec::query("token", ScalarType::Str).required(),
            ParameterSpec::query("q", ScalarType::Str),
            ParameterSpec::body("item", FieldType::Model(product.clone())),
        ],
        products::create_product_detailed,
    )?;

    router.register(
        Method::POST,
        "/v3/create_products/{product_id}",
        vec![
            ParameterSpec::path("product_id", ScalarType::Int)
                .constraints(Constraints::new().ge(0.0).le(1000.0)),
            ParameterSpec::query("q", ScalarType::Str)
                .constraints(Constraints::new().length(5, 10).pattern(fixedquery)),
            ParameterSpec::body("item", FieldType::Model(product)),
        ],
        products::create_product_detailed,
    )?;

    router.register(
        Method::POST,
        "/events/{event_id}",
        vec![
            ParameterSpec::path("event_id", ScalarType::Int)
                .constraints(Constraints::new().ge(1.0).le(999_999.0)),
            ParameterSpec::query("q", ScalarType::Str)
                .constraints(Constraints::new().length(5, 10)),
            ParameterSpec::body("event", FieldType::Model(event.clone())).optional(),
        ],
        events::create_event,
    )?;

    router.register(
        Method::POST,
        "/v2/events/{event_id}",
        vec![
            ParameterSpec::path("event_id", ScalarType::Int)
                .constraints(Constraints::new().ge(1.0).le(999_999.0)),
            ParameterSpec::query("q", ScalarType::Str)
                .constraints(Constraints::new().length(5, 10)),
            ParameterSpec::body("is_premium", FieldType::Int),
            ParameterSpec::body("user", FieldType::Model(user)),
            ParameterSpec::body("event", FieldType::Model(event.clone())).optional(),
        ],
        events::create_event_v2,
    )?;

    // The payload must arrive wrapped as {"event": {...}}
    router.register(
        Method::PUT,
        "/events/{event_id}",
        vec![
            ParameterSpec::path("event_id", ScalarType::Int),
            ParameterSpec::body("event", FieldType::Model(event)).embed(),
        ],
        events::update_event,
    )?;

    router.register(
        Method::POST,
        "/students/{student_id}",
        vec![
            ParameterSpec::path("student_id", ScalarType::Int),
            ParameterSpec::body("student", FieldType::Model(student)).embed(),
        ],
        events::create_student,
    )?;

    router.register(
        Method::POST,
        "/employee/{emp_id}",
        vec![
            ParameterSpec::path("emp_id", ScalarType::Int),
            ParameterSpec::body("employee", FieldType::Model(employee)),
        ],
        events::create_employee,
    )?;

    // start/end/process_after combine arithmetically in the handler, so
    // supplying only part of the trio is rejected before it runs
    router.register_with_groups(
        Method::POST,
        "/items/{item_id}",
        vec![
            ParameterSpec::path("item_id", ScalarType::Uuid),
            ParameterSpec::body("start_datetime", FieldType::DateTime).optional(),
            ParameterSpec::body("end_datetime", FieldType::DateTime).optional(),
            ParameterSpec::body("interval", FieldType::Time).optional(),
            ParameterSpec::body("process_after", FieldType::Duration).optional(),
        ],
        vec![vec!["start_datetime", "end_datetime", "process_after"]],
        items::read_item,
    )?;

    router.register(
        Method::GET,
        "/v2/items/",
        vec![ParameterSpec::cookie("ads_id")],
        items::read_items,
    )?;

    Ok(router)
}
