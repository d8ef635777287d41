//! HTTP service glue module
//!
//! Entry point for request processing: pulls the raw method, path, query
//! string, cookies, and body out of the hyper request, dispatches through
//! the router, and converts the result or error into a JSON response.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::AppState;
use crate::error::ApiError;
use crate::http::{self, query};
use crate::logger;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let server_name = state.config.http.server_name.clone();
    let method = req.method().clone();
    let is_head = method == Method::HEAD;
    // HEAD matches GET routes and gets an empty body
    let lookup_method = if is_head { Method::GET } else { method.clone() };

    if !matches!(lookup_method, Method::GET | Method::POST | Method::PUT) {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return Ok(http::method_not_allowed(&server_name));
    }

    if let Some(response) = check_body_size(&req, state.config.http.max_body_size, &server_name) {
        return Ok(response);
    }

    let path = req.uri().path().to_string();
    let query_string = req.uri().query().map(ToString::to_string);
    let cookies =
        query::parse_cookies(req.headers().get("cookie").and_then(|v| v.to_str().ok()));

    let body = if matches!(lookup_method, Method::POST | Method::PUT) {
        match req.collect().await {
            Ok(collected) => Some(collected.to_bytes()),
            Err(e) => {
                logger::log_error(&format!("Failed to read request body: {e}"));
                None
            }
        }
    } else {
        None
    };

    let result = state.router.dispatch(
        &lookup_method,
        &path,
        query_string.as_deref(),
        &cookies,
        body.as_deref(),
    );

    let access_log = state.config.logging.access_log;
    let response = match result {
        Ok(value) => {
            if access_log {
                logger::log_request(method.as_str(), &path, 200);
            }
            http::json_response(StatusCode::OK, &value, &server_name, is_head)
        }
        Err(err) => {
            match &err {
                ApiError::Validation(issues) => {
                    if access_log {
                        logger::log_validation_failure(method.as_str(), &path, issues.len());
                    }
                }
                ApiError::NotFound => {
                    if access_log {
                        logger::log_request(method.as_str(), &path, 404);
                    }
                }
                ApiError::Configuration(msg) => logger::log_error(msg),
            }
            http::error_response(&err, &server_name, is_head)
        }
    };
    Ok(response)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
    server_name: &str,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::payload_too_large(server_name))
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}
