//! Model schema module
//!
//! Explicit schema objects for structured request bodies. A schema is an
//! ordered field map; validating a composite model is the conjunction of
//! validating each field, recursively through nested models and lists.
//! Issues are appended, never short-circuited, so one response can report
//! every invalid field.

use hyper::Uri;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::{Location, ParamIssue};

use super::coerce;
use super::{Constraints, ParamValue};

/// Types a body field can take
#[derive(Debug, Clone)]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    Uuid,
    DateTime,
    Time,
    Duration,
    /// Absolute http/https URL
    Url,
    List(Box<FieldType>),
    Model(Arc<Schema>),
}

/// One field of a model schema
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub ty: FieldType,
    pub required: bool,
    pub default: Value,
    pub constraints: Constraints,
}

impl FieldSpec {
    pub fn new(ty: FieldType) -> Self {
        Self {
            ty,
            required: true,
            default: Value::Null,
            constraints: Constraints::default(),
        }
    }

    /// Optional fields echo back their default (null unless set) when absent
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// Named, ordered collection of field specifications
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), spec));
        self
    }

    /// Walk every constraint, nested schemas included
    pub fn check_consistency(&self) -> Result<(), String> {
        for (name, spec) in &self.fields {
            spec.constraints
                .check_consistency()
                .map_err(|e| format!("{}.{name}: {e}", self.name))?;
            check_type_consistency(&spec.ty)?;
        }
        Ok(())
    }
}

fn check_type_consistency(ty: &FieldType) -> Result<(), String> {
    match ty {
        FieldType::Model(schema) => schema.check_consistency(),
        FieldType::List(inner) => check_type_consistency(inner),
        _ => Ok(()),
    }
}

/// Validate one body parameter and produce its typed value
///
/// `name` labels the parameter in required-field issues; `base` is the
/// prefix for nested field paths (empty when the parameter binds the
/// top-level payload).
pub fn validate_param(
    ty: &FieldType,
    constraints: &Constraints,
    required: bool,
    value: Option<&Value>,
    name: &str,
    base: &str,
    issues: &mut Vec<ParamIssue>,
) -> Option<ParamValue> {
    match value {
        None | Some(Value::Null) => {
            if required {
                issues.push(ParamIssue::new(Location::Body, name, "field required"));
                None
            } else {
                Some(ParamValue::Null)
            }
        }
        Some(v) => match ty {
            FieldType::Model(schema) => {
                validate_model(schema, v, base, issues).map(ParamValue::Json)
            }
            FieldType::List(inner) => {
                validate_list(inner, constraints, v, base, issues).map(ParamValue::Json)
            }
            _ => match validate_scalar(ty, constraints, v) {
                Ok(pv) => Some(pv),
                Err(reason) => {
                    issues.push(ParamIssue::new(Location::Body, name, reason));
                    None
                }
            },
        },
    }
}

/// Validate a JSON value against a model schema, returning the normalized
/// field mapping with absent optional fields filled with their defaults
pub fn validate_model(
    schema: &Schema,
    value: &Value,
    path: &str,
    issues: &mut Vec<ParamIssue>,
) -> Option<Value> {
    let Some(obj) = value.as_object() else {
        issues.push(ParamIssue::new(
            Location::Body,
            label(path),
            format!("is not a valid {} object", schema.name),
        ));
        return None;
    };

    let mut out = Map::new();
    let mut ok = true;
    for (name, spec) in &schema.fields {
        let child = join(path, name);
        match obj.get(name) {
            None | Some(Value::Null) => {
                if spec.required {
                    issues.push(ParamIssue::new(Location::Body, child, "field required"));
                    ok = false;
                } else {
                    out.insert(name.clone(), spec.default.clone());
                }
            }
            Some(v) => match validate_value(&spec.ty, &spec.constraints, v, &child, issues) {
                Some(validated) => {
                    out.insert(name.clone(), validated);
                }
                None => ok = false,
            },
        }
    }
    ok.then_some(Value::Object(out))
}

/// Validate a nested value, producing its normalized JSON form
fn validate_value(
    ty: &FieldType,
    constraints: &Constraints,
    value: &Value,
    path: &str,
    issues: &mut Vec<ParamIssue>,
) -> Option<Value> {
    match ty {
        FieldType::Model(schema) => validate_model(schema, value, path, issues),
        FieldType::List(inner) => validate_list(inner, constraints, value, path, issues),
        _ => match validate_scalar(ty, constraints, value) {
            Ok(pv) => Some(pv.to_json()),
            Err(reason) => {
                issues.push(ParamIssue::new(Location::Body, label(path), reason));
                None
            }
        },
    }
}

fn validate_list(
    inner: &FieldType,
    constraints: &Constraints,
    value: &Value,
    path: &str,
    issues: &mut Vec<ParamIssue>,
) -> Option<Value> {
    let Some(items) = value.as_array() else {
        issues.push(ParamIssue::new(
            Location::Body,
            label(path),
            "is not an array",
        ));
        return None;
    };

    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (index, item) in items.iter().enumerate() {
        let child = format!("{}[{index}]", label(path));
        match validate_value(inner, constraints, item, &child, issues) {
            Some(validated) => out.push(validated),
            None => ok = false,
        }
    }
    ok.then_some(Value::Array(out))
}

/// Coerce and constraint-check a scalar field value
fn validate_scalar(
    ty: &FieldType,
    constraints: &Constraints,
    value: &Value,
) -> Result<ParamValue, String> {
    match ty {
        FieldType::Str => {
            let s = value.as_str().ok_or_else(|| "is not a string".to_string())?;
            constraints.check_str(s)?;
            Ok(ParamValue::Str(s.to_string()))
        }
        FieldType::Int => {
            let n = value
                .as_i64()
                .ok_or_else(|| "is not an integer".to_string())?;
            constraints.check_number(n as f64)?;
            Ok(ParamValue::Int(n))
        }
        FieldType::Float => {
            let f = value.as_f64().ok_or_else(|| "is not a number".to_string())?;
            constraints.check_number(f)?;
            Ok(ParamValue::Float(f))
        }
        FieldType::Bool => value
            .as_bool()
            .map(ParamValue::Bool)
            .ok_or_else(|| "is not a boolean".to_string()),
        FieldType::Uuid => {
            let s = value.as_str().ok_or_else(|| "is not a string".to_string())?;
            uuid::Uuid::parse_str(s)
                .map(ParamValue::Uuid)
                .map_err(|_| "is not a valid UUID".to_string())
        }
        FieldType::DateTime => {
            let s = value.as_str().ok_or_else(|| "is not a string".to_string())?;
            coerce::parse_datetime(s).map(ParamValue::DateTime)
        }
        FieldType::Time => {
            let s = value.as_str().ok_or_else(|| "is not a string".to_string())?;
            coerce::parse_time(s).map(ParamValue::Time)
        }
        FieldType::Duration => match value {
            Value::Number(n) => {
                let seconds = n
                    .as_f64()
                    .ok_or_else(|| "is not a valid duration".to_string())?;
                coerce::duration_from_seconds(seconds).map(ParamValue::Duration)
            }
            Value::String(s) => coerce::parse_duration(s).map(ParamValue::Duration),
            _ => Err("is not a valid duration".to_string()),
        },
        FieldType::Url => {
            let s = value.as_str().ok_or_else(|| "is not a string".to_string())?;
            let uri = s
                .parse::<Uri>()
                .map_err(|_| "is not a valid URL".to_string())?;
            let scheme_ok = matches!(uri.scheme_str(), Some("http" | "https"));
            if scheme_ok && uri.host().is_some() {
                Ok(ParamValue::Str(s.to_string()))
            } else {
                Err("is not a valid http or https URL".to_string())
            }
        }
        FieldType::List(_) | FieldType::Model(_) => {
            Err("is not a scalar value".to_string())
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn label(path: &str) -> &str {
    if path.is_empty() {
        "body"
    } else {
        path
    }
}
