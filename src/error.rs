//! Error taxonomy module
//!
//! Three failure classes: validation failures (client-correctable, reported
//! as an aggregate), route-not-found, and startup configuration errors that
//! abort the process before the listener binds.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Request source a parameter was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Path,
    Query,
    Cookie,
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Cookie => "cookie",
            Self::Body => "body",
        };
        f.write_str(name)
    }
}

/// One rejected parameter: where it came from, which field, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamIssue {
    pub location: Location,
    pub field: String,
    pub reason: String,
}

impl ParamIssue {
    pub fn new(
        location: Location,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            location,
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Request processing errors
///
/// `Validation` and `NotFound` are recovered at the router boundary and
/// turned into structured responses. `Configuration` is only produced while
/// registering routes and is fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no route matches the requested method and path")]
    NotFound,
    #[error("request validation failed with {n} issue(s)", n = .0.len())]
    Validation(Vec<ParamIssue>),
    #[error("invalid route configuration: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::Path.to_string(), "path");
        assert_eq!(Location::Body.to_string(), "body");
    }

    #[test]
    fn test_issue_serializes_location_lowercase() {
        let issue = ParamIssue::new(Location::Query, "q", "too short");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["location"], "query");
        assert_eq!(json["field"], "q");
    }

    #[test]
    fn test_validation_error_counts_issues() {
        let err = ApiError::Validation(vec![
            ParamIssue::new(Location::Path, "id", "not an integer"),
            ParamIssue::new(Location::Query, "token", "field required"),
        ]);
        assert_eq!(
            err.to_string(),
            "request validation failed with 2 issue(s)"
        );
    }
}
