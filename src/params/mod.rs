//! Parameter model module
//!
//! Declarative parameter specifications and the typed values produced by
//! validating a request against them. Constraint definitions live here as
//! data, checked by the reusable routines in `coerce` and `schema`.

pub mod coerce;
pub mod schema;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

pub use schema::{FieldSpec, FieldType, Schema};

/// Where a parameter is extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Path,
    Query,
    Cookie,
    /// `embed` wraps a single body parameter one level deeper under its name
    Body { embed: bool },
}

/// Types a path/query/cookie parameter can coerce to
#[derive(Debug, Clone)]
pub enum ScalarType {
    Str,
    Int,
    Float,
    Bool,
    Uuid,
    /// Closed set of accepted string values
    Enum(&'static [&'static str]),
    /// Captures the remainder of the path, slashes included (path source only)
    RestOfPath,
}

/// Declared type of one parameter
#[derive(Debug, Clone)]
pub enum ParamKind {
    Scalar(ScalarType),
    /// Body parameters validate like schema fields (models, lists, scalars)
    Field(FieldType),
}

/// Value constraints applied after coercion
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub ge: Option<f64>,
    pub le: Option<f64>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    #[must_use]
    pub fn pattern(mut self, re: Regex) -> Self {
        self.pattern = Some(re);
        self
    }

    #[must_use]
    pub fn ge(mut self, bound: f64) -> Self {
        self.ge = Some(bound);
        self
    }

    #[must_use]
    pub fn le(mut self, bound: f64) -> Self {
        self.le = Some(bound);
        self
    }

    /// Reject self-contradictory ranges at registration time
    pub fn check_consistency(&self) -> Result<(), String> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(format!("length range is empty: {min} > {max}"));
            }
        }
        if let (Some(ge), Some(le)) = (self.ge, self.le) {
            if ge > le {
                return Err(format!("numeric range is empty: {ge} > {le}"));
            }
        }
        Ok(())
    }

    /// Check a coerced string value
    pub fn check_str(&self, value: &str) -> Result<(), String> {
        let chars = value.chars().count();
        if let Some(min) = self.min_length {
            if chars < min {
                return Err(format!("must be at least {min} characters long"));
            }
        }
        if let Some(max) = self.max_length {
            if chars > max {
                return Err(format!("must be at most {max} characters long"));
            }
        }
        if let Some(re) = &self.pattern {
            if !re.is_match(value) {
                return Err(format!("does not match pattern \"{re}\""));
            }
        }
        Ok(())
    }

    /// Check a coerced numeric value
    pub fn check_number(&self, value: f64) -> Result<(), String> {
        if let Some(ge) = self.ge {
            if value < ge {
                return Err(format!("must be greater than or equal to {ge}"));
            }
        }
        if let Some(le) = self.le {
            if value > le {
                return Err(format!("must be less than or equal to {le}"));
            }
        }
        Ok(())
    }
}

/// One declared parameter of a route
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub source: Source,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
    pub constraints: Constraints,
}

impl ParameterSpec {
    /// Path parameters are always required and never defaulted
    pub fn path(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            source: Source::Path,
            kind: ParamKind::Scalar(ty),
            required: true,
            default: None,
            constraints: Constraints::default(),
        }
    }

    /// Query parameters default to optional without a value
    pub fn query(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            source: Source::Query,
            kind: ParamKind::Scalar(ty),
            required: false,
            default: None,
            constraints: Constraints::default(),
        }
    }

    /// Cookie parameters are optional strings, null when absent
    pub fn cookie(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Source::Cookie,
            kind: ParamKind::Scalar(ScalarType::Str),
            required: false,
            default: None,
            constraints: Constraints::default(),
        }
    }

    /// Body parameters default to required, not embedded
    pub fn body(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            source: Source::Body { embed: false },
            kind: ParamKind::Field(ty),
            required: true,
            default: None,
            constraints: Constraints::default(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    #[must_use]
    pub fn embed(mut self) -> Self {
        self.source = Source::Body { embed: true };
        self
    }
}

/// A coerced, constraint-checked parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Time(NaiveTime),
    Duration(TimeDelta),
    /// Validated model instances and lists keep their JSON shape
    Json(Value),
}

impl ParamValue {
    /// Serialize for the echo response: UUIDs canonical hyphenated,
    /// datetimes RFC 3339, times `HH:MM:SS`, durations fractional seconds.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Str(s) => Value::String(s.clone()),
            Self::Int(n) => Value::from(*n),
            Self::Float(f) => Value::from(*f),
            Self::Bool(b) => Value::Bool(*b),
            Self::Uuid(u) => Value::String(u.to_string()),
            Self::DateTime(dt) => json_datetime(*dt),
            Self::Time(t) => json_time(*t),
            Self::Duration(d) => json_duration(*d),
            Self::Json(v) => v.clone(),
        }
    }
}

pub fn json_datetime(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339())
}

pub fn json_time(t: NaiveTime) -> Value {
    Value::String(t.format("%H:%M:%S").to_string())
}

pub fn json_duration(d: TimeDelta) -> Value {
    Value::from(d.num_milliseconds() as f64 / 1000.0)
}

/// Fully validated argument set for one handler invocation
///
/// Constructed per call once every parameter passed, dropped when the
/// handler returns.
#[derive(Debug, Default)]
pub struct ValidatedRequest {
    values: HashMap<String, ParamValue>,
}

impl ValidatedRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// JSON echo of a parameter, null when absent
    pub fn value(&self, name: &str) -> Value {
        self.get(name).map_or(Value::Null, ParamValue::to_json)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ParamValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(ParamValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.get(name) {
            Some(ParamValue::DateTime(dt)) => Some(*dt),
            _ => None,
        }
    }

    pub fn duration(&self, name: &str) -> Option<TimeDelta> {
        match self.get(name) {
            Some(ParamValue::Duration(d)) => Some(*d),
            _ => None,
        }
    }

    /// True when the parameter was supplied with a non-null value
    pub fn is_present(&self, name: &str) -> bool {
        !matches!(self.get(name), None | Some(ParamValue::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_ranges_rejected_when_empty() {
        assert!(Constraints::new().length(5, 10).check_consistency().is_ok());
        assert!(Constraints::new().length(10, 5).check_consistency().is_err());
        assert!(Constraints::new().ge(0.0).le(100.0).check_consistency().is_ok());
        assert!(Constraints::new().ge(100.0).le(0.0).check_consistency().is_err());
    }

    #[test]
    fn test_string_constraints() {
        let c = Constraints::new().length(3, 5);
        assert!(c.check_str("abc").is_ok());
        assert!(c.check_str("ab").is_err());
        assert!(c.check_str("abcdef").is_err());
    }

    #[test]
    fn test_pattern_constraint() {
        let c = Constraints::new().pattern(Regex::new("^fixedquery$").unwrap());
        assert!(c.check_str("fixedquery").is_ok());
        assert!(c.check_str("fixedquery2").is_err());
    }

    #[test]
    fn test_numeric_constraints() {
        let c = Constraints::new().ge(0.0).le(1000.0);
        assert!(c.check_number(0.0).is_ok());
        assert!(c.check_number(1000.0).is_ok());
        assert!(c.check_number(-1.0).is_err());
        assert!(c.check_number(1001.0).is_err());
    }

    #[test]
    fn test_param_value_serialization() {
        let uuid = Uuid::parse_str("c892496f-3466-4c11-a146-fd9e2a9e6fae").unwrap();
        assert_eq!(
            ParamValue::Uuid(uuid).to_json(),
            Value::String("c892496f-3466-4c11-a146-fd9e2a9e6fae".to_string())
        );
        let d = TimeDelta::try_milliseconds(1500).unwrap();
        assert_eq!(ParamValue::Duration(d).to_json(), Value::from(1.5));
        assert_eq!(ParamValue::Null.to_json(), Value::Null);
    }

    #[test]
    fn test_validated_request_accessors() {
        let mut req = ValidatedRequest::new();
        req.insert("user_id", ParamValue::Int(7));
        req.insert("q", ParamValue::Null);
        assert_eq!(req.int("user_id"), Some(7));
        assert_eq!(req.value("user_id"), Value::from(7));
        assert_eq!(req.value("missing"), Value::Null);
        assert!(req.is_present("user_id"));
        assert!(!req.is_present("q"));
        assert!(!req.is_present("missing"));
    }

    #[test]
    fn test_path_spec_is_required_without_default() {
        let spec = ParameterSpec::path("user_id", ScalarType::Int);
        assert!(spec.required);
        assert!(spec.default.is_none());
    }
}
