//! Request routing module
//!
//! Maps method + path to a registered handler, validates and coerces every
//! declared parameter, and invokes the handler with the validated argument
//! set. Registration-time checks reject ambiguous templates and
//! self-contradictory specifications before the listener binds.

pub mod template;

use hyper::Method;
use serde_json::Value;

use crate::error::{ApiError, Location, ParamIssue};
use crate::http::query;
use crate::params::{
    coerce, schema, ParamKind, ParamValue, ParameterSpec, Source, ValidatedRequest,
};

pub use template::PathTemplate;

/// Demo handlers are pure functions of their validated input
pub type HandlerFn = fn(&ValidatedRequest) -> Value;

/// One registered route
pub struct Route {
    method: Method,
    template: PathTemplate,
    params: Vec<ParameterSpec>,
    /// Groups of individually-optional body fields an operation combines;
    /// supplying some but not all members fails validation
    correlated: Vec<Vec<&'static str>>,
    handler: HandlerFn,
}

/// Route table with startup validation and per-request dispatch
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Register a route without correlated field groups
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        params: Vec<ParameterSpec>,
        handler: HandlerFn,
    ) -> Result<(), ApiError> {
        self.register_with_groups(method, pattern, params, Vec::new(), handler)
    }

    /// Register a route, rejecting any configuration inconsistency
    pub fn register_with_groups(
        &mut self,
        method: Method,
        pattern: &str,
        params: Vec<ParameterSpec>,
        correlated: Vec<Vec<&'static str>>,
        handler: HandlerFn,
    ) -> Result<(), ApiError> {
        let template = PathTemplate::parse(pattern).map_err(ApiError::Configuration)?;

        let shape = template.shape_key();
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.method == method && r.template.shape_key() == shape)
        {
            return Err(ApiError::Configuration(format!(
                "route {method} {pattern} is ambiguous with already registered {}",
                existing.template.as_str()
            )));
        }

        check_params(pattern, &template, &params)?;
        check_groups(pattern, &params, &correlated)?;

        self.routes.push(Route {
            method,
            template,
            params,
            correlated,
            handler,
        });
        Ok(())
    }

    /// Locate the route, validate every parameter, run the handler
    ///
    /// All parameter issues across all sources are collected before
    /// failing so one response reports every invalid field.
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        query_string: Option<&str>,
        cookies: &[(String, String)],
        body: Option<&[u8]>,
    ) -> Result<Value, ApiError> {
        let segments: Vec<String> = template::split_path(path)
            .iter()
            .map(|s| query::percent_decode(s))
            .collect();

        let mut best: Option<(&Route, Vec<(String, String)>)> = None;
        for route in &self.routes {
            if route.method != *method {
                continue;
            }
            if let Some(bindings) = route.template.matches(&segments) {
                let better = best.as_ref().map_or(true, |(current, _)| {
                    route.template.specificity() > current.template.specificity()
                });
                if better {
                    best = Some((route, bindings));
                }
            }
        }
        let Some((route, bindings)) = best else {
            return Err(ApiError::NotFound);
        };

        let mut issues = Vec::new();
        let mut validated = ValidatedRequest::new();

        extract_path_params(route, &bindings, &mut validated, &mut issues);
        extract_query_params(route, query_string, &mut validated, &mut issues);
        extract_cookie_params(route, cookies, &mut validated);
        extract_body_params(route, body, &mut validated, &mut issues);
        check_correlated(route, &validated, &mut issues);

        if issues.is_empty() {
            Ok((route.handler)(&validated))
        } else {
            Err(ApiError::Validation(issues))
        }
    }
}

/// Registration check: declared path params and template variables must
/// agree, path params carry no default, constraints must be satisfiable
fn check_params(
    pattern: &str,
    template: &PathTemplate,
    params: &[ParameterSpec],
) -> Result<(), ApiError> {
    let vars = template.var_names();

    for spec in params {
        spec.constraints.check_consistency().map_err(|e| {
            ApiError::Configuration(format!("{pattern} param \"{}\": {e}", spec.name))
        })?;

        match &spec.kind {
            ParamKind::Scalar(_) => {}
            ParamKind::Field(ty) => {
                check_field_type(ty).map_err(|e| {
                    ApiError::Configuration(format!("{pattern} param \"{}\": {e}", spec.name))
                })?;
            }
        }

        if spec.source == Source::Path {
            if !vars.contains(&spec.name.as_str()) {
                return Err(ApiError::Configuration(format!(
                    "{pattern}: path param \"{}\" does not appear in the template",
                    spec.name
                )));
            }
            if spec.default.is_some() || !spec.required {
                return Err(ApiError::Configuration(format!(
                    "{pattern}: path param \"{}\" cannot be optional or defaulted",
                    spec.name
                )));
            }
        }
    }

    for var in vars {
        let declared = params
            .iter()
            .any(|s| s.source == Source::Path && s.name == var);
        if !declared {
            return Err(ApiError::Configuration(format!(
                "{pattern}: template variable \"{var}\" has no parameter specification"
            )));
        }
    }
    Ok(())
}

fn check_field_type(ty: &schema::FieldType) -> Result<(), String> {
    match ty {
        schema::FieldType::Model(s) => s.check_consistency(),
        schema::FieldType::List(inner) => check_field_type(inner),
        _ => Ok(()),
    }
}

/// Registration check: correlated groups name optional body parameters
fn check_groups(
    pattern: &str,
    params: &[ParameterSpec],
    correlated: &[Vec<&'static str>],
) -> Result<(), ApiError> {
    for group in correlated {
        if group.len() < 2 {
            return Err(ApiError::Configuration(format!(
                "{pattern}: a correlated group needs at least two fields"
            )));
        }
        for member in group {
            let spec = params
                .iter()
                .find(|s| matches!(s.source, Source::Body { .. }) && s.name == *member);
            match spec {
                None => {
                    return Err(ApiError::Configuration(format!(
                        "{pattern}: correlated field \"{member}\" is not a body parameter"
                    )));
                }
                Some(spec) if spec.required => {
                    return Err(ApiError::Configuration(format!(
                        "{pattern}: correlated field \"{member}\" must be optional"
                    )));
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

fn extract_path_params(
    route: &Route,
    bindings: &[(String, String)],
    validated: &mut ValidatedRequest,
    issues: &mut Vec<ParamIssue>,
) {
    for spec in route.params.iter().filter(|s| s.source == Source::Path) {
        let ParamKind::Scalar(ty) = &spec.kind else {
            continue;
        };
        let Some((_, raw)) = bindings.iter().find(|(name, _)| *name == spec.name) else {
            continue;
        };
        match coerce::coerce_checked(ty, &spec.constraints, raw) {
            Ok(value) => validated.insert(spec.name.clone(), value),
            Err(reason) => issues.push(ParamIssue::new(Location::Path, &spec.name, reason)),
        }
    }
}

fn extract_query_params(
    route: &Route,
    query_string: Option<&str>,
    validated: &mut ValidatedRequest,
    issues: &mut Vec<ParamIssue>,
) {
    let pairs = query::parse_query(query_string.unwrap_or(""));
    for spec in route.params.iter().filter(|s| s.source == Source::Query) {
        let ParamKind::Scalar(ty) = &spec.kind else {
            continue;
        };
        match query::first(&pairs, &spec.name) {
            Some(raw) => match coerce::coerce_checked(ty, &spec.constraints, raw) {
                Ok(value) => validated.insert(spec.name.clone(), value),
                Err(reason) => {
                    issues.push(ParamIssue::new(Location::Query, &spec.name, reason));
                }
            },
            None => {
                if spec.required {
                    issues.push(ParamIssue::new(
                        Location::Query,
                        &spec.name,
                        "field required",
                    ));
                } else {
                    let value = spec.default.clone().unwrap_or(ParamValue::Null);
                    validated.insert(spec.name.clone(), value);
                }
            }
        }
    }
}

/// Cookies are optional strings, null when absent, no further validation
fn extract_cookie_params(
    route: &Route,
    cookies: &[(String, String)],
    validated: &mut ValidatedRequest,
) {
    for spec in route.params.iter().filter(|s| s.source == Source::Cookie) {
        let value = query::first(cookies, &spec.name)
            .map_or(ParamValue::Null, |v| ParamValue::Str(v.to_string()));
        validated.insert(spec.name.clone(), value);
    }
}

fn extract_body_params(
    route: &Route,
    body: Option<&[u8]>,
    validated: &mut ValidatedRequest,
    issues: &mut Vec<ParamIssue>,
) {
    let body_specs: Vec<&ParameterSpec> = route
        .params
        .iter()
        .filter(|s| matches!(s.source, Source::Body { .. }))
        .collect();
    if body_specs.is_empty() {
        return;
    }

    let payload: Option<Value> = match body {
        None => None,
        Some(bytes) if bytes.is_empty() => None,
        Some(bytes) => match serde_json::from_slice(bytes) {
            Ok(v) => Some(v),
            Err(e) => {
                issues.push(ParamIssue::new(
                    Location::Body,
                    "body",
                    format!("invalid JSON payload: {e}"),
                ));
                return;
            }
        },
    };

    // A single non-embedded parameter binds the whole payload; otherwise
    // every parameter is keyed by name one level down.
    let single_top_level =
        body_specs.len() == 1 && matches!(body_specs[0].source, Source::Body { embed: false });

    if single_top_level {
        let spec = body_specs[0];
        let ParamKind::Field(ty) = &spec.kind else {
            return;
        };
        if let Some(value) = schema::validate_param(
            ty,
            &spec.constraints,
            spec.required,
            payload.as_ref(),
            &spec.name,
            "",
            issues,
        ) {
            validated.insert(spec.name.clone(), value);
        }
        return;
    }

    if let Some(v) = &payload {
        if !v.is_object() {
            issues.push(ParamIssue::new(
                Location::Body,
                "body",
                "is not a JSON object",
            ));
            return;
        }
    }

    for spec in body_specs {
        let ParamKind::Field(ty) = &spec.kind else {
            continue;
        };
        let value = payload.as_ref().and_then(|v| v.get(&spec.name));
        if let Some(validated_value) = schema::validate_param(
            ty,
            &spec.constraints,
            spec.required,
            value,
            &spec.name,
            &spec.name,
            issues,
        ) {
            validated.insert(spec.name.clone(), validated_value);
        }
    }
}

/// Jointly-required check: supplying part of a correlated group fails
/// validation naming each missing member; supplying none is fine and the
/// handler skips the combining operation
fn check_correlated(route: &Route, validated: &ValidatedRequest, issues: &mut Vec<ParamIssue>) {
    for group in &route.correlated {
        let supplied: Vec<&str> = group
            .iter()
            .copied()
            .filter(|m| validated.is_present(m) || issues.iter().any(|i| i.field == *m))
            .collect();
        if supplied.is_empty() || supplied.len() == group.len() {
            continue;
        }
        let supplied_names = supplied.join(", ");
        for member in group {
            if !supplied.contains(member) {
                issues.push(ParamIssue::new(
                    Location::Body,
                    *member,
                    format!("required together with {supplied_names}"),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Constraints, FieldSpec, FieldType, ScalarType, Schema};
    use serde_json::json;
    use std::sync::Arc;

    fn echo(req: &ValidatedRequest) -> Value {
        json!({"user_id": req.value("user_id")})
    }

    fn noop(_req: &ValidatedRequest) -> Value {
        json!({})
    }

    #[test]
    fn test_shape_duplicate_registration_fails() {
        let mut router = Router::new();
        router
            .register(
                Method::GET,
                "/plan/{plan_id}",
                vec![ParameterSpec::path("plan_id", ScalarType::Str)],
                noop,
            )
            .unwrap();
        let err = router.register(
            Method::GET,
            "/plan/{other}",
            vec![ParameterSpec::path("other", ScalarType::Str)],
            noop,
        );
        assert!(matches!(err, Err(ApiError::Configuration(_))));

        // Same shape, different method is fine
        assert!(router
            .register(
                Method::POST,
                "/plan/{plan_id}",
                vec![ParameterSpec::path("plan_id", ScalarType::Str)],
                noop,
            )
            .is_ok());
    }

    #[test]
    fn test_undeclared_template_variable_fails() {
        let mut router = Router::new();
        let err = router.register(Method::GET, "/profile/{user_id}", vec![], noop);
        assert!(matches!(err, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_optional_path_param_fails() {
        let mut router = Router::new();
        let spec = ParameterSpec::path("user_id", ScalarType::Int).optional();
        let err = router.register(Method::GET, "/profile/{user_id}", vec![spec], noop);
        assert!(matches!(err, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_empty_constraint_range_fails() {
        let mut router = Router::new();
        let spec = ParameterSpec::query("q", ScalarType::Str)
            .constraints(Constraints::new().length(10, 5));
        let err = router.register(Method::GET, "/search", vec![spec], noop);
        assert!(matches!(err, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_contradictory_schema_fails_at_registration() {
        let bad = Arc::new(Schema::new("Bad").field(
            "name",
            FieldSpec::new(FieldType::Str).constraints(Constraints::new().length(9, 3)),
        ));
        let mut router = Router::new();
        let err = router.register(
            Method::POST,
            "/things",
            vec![ParameterSpec::body("thing", FieldType::Model(bad))],
            noop,
        );
        assert!(matches!(err, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_correlated_group_must_reference_optional_body_fields() {
        let mut router = Router::new();
        let err = router.register_with_groups(
            Method::POST,
            "/things",
            vec![ParameterSpec::body("when", FieldType::DateTime)],
            vec![vec!["when", "how_long"]],
            noop,
        );
        assert!(matches!(err, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_dispatch_not_found() {
        let router = Router::new();
        let err = router.dispatch(&Method::GET, "/nowhere", None, &[], None);
        assert!(matches!(err, Err(ApiError::NotFound)));
    }

    #[test]
    fn test_literal_template_outranks_variable() {
        fn me(_req: &ValidatedRequest) -> Value {
            json!({"data": "me"})
        }
        let mut router = Router::new();
        router
            .register(
                Method::GET,
                "/profile/{user_id}",
                vec![ParameterSpec::path("user_id", ScalarType::Int)],
                echo,
            )
            .unwrap();
        router.register(Method::GET, "/profile/me", vec![], me).unwrap();

        let hit = router.dispatch(&Method::GET, "/profile/me", None, &[], None).unwrap();
        assert_eq!(hit["data"], "me");

        let hit = router.dispatch(&Method::GET, "/profile/7", None, &[], None).unwrap();
        assert_eq!(hit["user_id"], 7);
    }

    #[test]
    fn test_path_coercion_failure_is_a_validation_error() {
        let mut router = Router::new();
        router
            .register(
                Method::GET,
                "/profile/{user_id}",
                vec![ParameterSpec::path("user_id", ScalarType::Int)],
                echo,
            )
            .unwrap();
        match router.dispatch(&Method::GET, "/profile/abc", None, &[], None) {
            Err(ApiError::Validation(issues)) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].location, Location::Path);
                assert_eq!(issues[0].field, "user_id");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_issues_aggregate_across_sources() {
        let mut router = Router::new();
        router
            .register(
                Method::POST,
                "/v3/create_products/{product_id}",
                vec![
                    ParameterSpec::path("product_id", ScalarType::Int)
                        .constraints(Constraints::new().ge(0.0).le(1000.0)),
                    ParameterSpec::query("q", ScalarType::Str)
                        .constraints(Constraints::new().length(5, 10)),
                    ParameterSpec::body(
                        "item",
                        FieldType::Model(Arc::new(
                            Schema::new("Product")
                                .field("name", FieldSpec::new(FieldType::Str))
                                .field("price", FieldSpec::new(FieldType::Float)),
                        )),
                    ),
                ],
                noop,
            )
            .unwrap();

        let body = json!({"name": "pen"}).to_string();
        match router.dispatch(
            &Method::POST,
            "/v3/create_products/2000",
            Some("q=ab"),
            &[],
            Some(body.as_bytes()),
        ) {
            Err(ApiError::Validation(issues)) => {
                let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
                assert_eq!(fields, vec!["product_id", "q", "price"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_correlated_group_rejected() {
        let mut router = Router::new();
        router
            .register_with_groups(
                Method::POST,
                "/items/{item_id}",
                vec![
                    ParameterSpec::path("item_id", ScalarType::Uuid),
                    ParameterSpec::body("start_datetime", FieldType::DateTime).optional(),
                    ParameterSpec::body("end_datetime", FieldType::DateTime).optional(),
                    ParameterSpec::body("process_after", FieldType::Duration).optional(),
                ],
                vec![vec!["start_datetime", "end_datetime", "process_after"]],
                noop,
            )
            .unwrap();

        let body = json!({"start_datetime": "2024-05-01T10:00:00Z"}).to_string();
        match router.dispatch(
            &Method::POST,
            "/items/c892496f-3466-4c11-a146-fd9e2a9e6fae",
            None,
            &[],
            Some(body.as_bytes()),
        ) {
            Err(ApiError::Validation(issues)) => {
                let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
                assert_eq!(fields, vec!["end_datetime", "process_after"]);
                assert!(issues[0].reason.contains("start_datetime"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        // Supplying no member of the group is fine
        assert!(router
            .dispatch(
                &Method::POST,
                "/items/c892496f-3466-4c11-a146-fd9e2a9e6fae",
                None,
                &[],
                None,
            )
            .is_ok());
    }

    #[test]
    fn test_cookie_param_defaults_to_null() {
        fn ads(req: &ValidatedRequest) -> Value {
            json!({"ads_id": req.value("ads_id")})
        }
        let mut router = Router::new();
        router
            .register(
                Method::GET,
                "/v2/items/",
                vec![ParameterSpec::cookie("ads_id")],
                ads,
            )
            .unwrap();

        let out = router.dispatch(&Method::GET, "/v2/items/", None, &[], None).unwrap();
        assert_eq!(out["ads_id"], Value::Null);

        let cookies = vec![("ads_id".to_string(), "track-7".to_string())];
        let out = router
            .dispatch(&Method::GET, "/v2/items/", None, &cookies, None)
            .unwrap();
        assert_eq!(out["ads_id"], "track-7");
    }
}
