//! Product listing and creation routes
//!
//! The listing routes page over a read-only demo table; the creation
//! routes echo the validated product body back.

use serde_json::{json, Value};
use std::sync::OnceLock;

use crate::params::ValidatedRequest;

/// Read-only demo product table, shared by the listing routes
static PRODUCTS: OnceLock<Vec<i64>> = OnceLock::new();

pub fn products() -> &'static [i64] {
    PRODUCTS.get_or_init(|| (0..100).collect())
}

/// Page of `count` elements starting at `start`, clamped to the table
fn page(start: i64, count: i64) -> &'static [i64] {
    let table = products();
    let lo = usize::try_from(start.max(0))
        .unwrap_or(usize::MAX)
        .min(table.len());
    let count = usize::try_from(count.max(0)).unwrap_or(usize::MAX);
    let hi = lo.saturating_add(count).min(table.len());
    &table[lo..hi]
}

/// Shared by the v1/v2/v3 listing routes; `q` and `token` only differ in
/// their parameter specifications
pub fn list_products(req: &ValidatedRequest) -> Value {
    let start = req.int("start").unwrap_or(0);
    let end = req.int("end").unwrap_or(10);
    let mut response = json!({
        "products": page(start, end),
        "start": req.value("start"),
        "end": req.value("end"),
    });
    if req.is_present("q") {
        response["q"] = req.value("q");
    }
    response
}

pub fn create_product(req: &ValidatedRequest) -> Value {
    req.value("item")
}

/// Shared by the v2/v3 creation routes
pub fn create_product_detailed(req: &ValidatedRequest) -> Value {
    let mut response = json!({
        "product_id": req.value("product_id"),
        "product_details": req.value("item"),
    });
    if req.is_present("q") {
        response["q"] = req.value("q");
    }
    response
}
