//! Response building module
//!
//! JSON response builders for handler results and for the error taxonomy.
//! Validation failures serialize every collected issue so a client sees
//! all invalid fields in one response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::logger;

/// Build a JSON response, empty body for HEAD
pub fn json_response(
    status: StatusCode,
    body: &Value,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let serialized = match serde_json::to_string_pretty(body) {
        Ok(s) => s,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return fallback(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    let content_length = serialized.len();
    let payload = if is_head {
        Bytes::new()
    } else {
        Bytes::from(serialized)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .header("Server", server_name)
        .body(Full::new(payload))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Map a request-time error to its response
///
/// Configuration errors never occur per request; the arm exists to keep
/// the mapping total.
pub fn error_response(err: &ApiError, server_name: &str, is_head: bool) -> Response<Full<Bytes>> {
    let (status, body) = match err {
        ApiError::NotFound => (StatusCode::NOT_FOUND, json!({"error": "Not Found"})),
        ApiError::Validation(issues) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"error": "Validation Failed", "detail": issues}),
        ),
        ApiError::Configuration(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Internal Server Error"}),
        ),
    };
    json_response(status, &body, server_name, is_head)
}

/// 405 Method Not Allowed response
pub fn method_not_allowed(server_name: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .header("Allow", "GET, HEAD, POST, PUT")
        .header("Server", server_name)
        .body(Full::new(Bytes::from(
            r#"{"error":"Method Not Allowed"}"#,
        )))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build 405 response: {e}"));
            fallback(StatusCode::METHOD_NOT_ALLOWED)
        })
}

/// 413 Payload Too Large response
pub fn payload_too_large(server_name: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header("Content-Type", "application/json")
        .header("Server", server_name)
        .body(Full::new(Bytes::from(
            r#"{"error":"Payload Too Large"}"#,
        )))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build 413 response: {e}"));
            fallback(StatusCode::PAYLOAD_TOO_LARGE)
        })
}

fn fallback(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from("Error")));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Location, ParamIssue};

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ApiError::Validation(vec![
            ParamIssue::new(Location::Query, "token", "field required"),
            ParamIssue::new(Location::Query, "q", "too short"),
        ]);
        let response = error_response(&err, "test", false);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = error_response(&ApiError::NotFound, "test", false);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_head_strips_body() {
        let response = json_response(StatusCode::OK, &json!({"a": 1}), "test", true);
        assert_eq!(response.status(), StatusCode::OK);
        // Content-Length still advertises the full body
        assert!(response.headers().get("Content-Length").is_some());
    }
}
