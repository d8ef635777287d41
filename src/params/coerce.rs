//! Typed coercion module
//!
//! Converts raw strings from path segments, query pairs, and cookies into
//! typed values, and parses the temporal representations accepted in JSON
//! bodies. Every function returns the typed value or a reason string the
//! caller attaches to the offending field.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use super::{Constraints, ParamValue, ScalarType};

/// Coerce a raw string, then apply the declared constraints
pub fn coerce_checked(
    ty: &ScalarType,
    constraints: &Constraints,
    raw: &str,
) -> Result<ParamValue, String> {
    let value = coerce_scalar(ty, raw)?;
    match &value {
        ParamValue::Str(s) => constraints.check_str(s)?,
        ParamValue::Int(n) => constraints.check_number(*n as f64)?,
        ParamValue::Float(f) => constraints.check_number(*f)?,
        _ => {}
    }
    Ok(value)
}

/// Coerce a raw string to the declared scalar type
pub fn coerce_scalar(ty: &ScalarType, raw: &str) -> Result<ParamValue, String> {
    match ty {
        ScalarType::Str | ScalarType::RestOfPath => Ok(ParamValue::Str(raw.to_string())),
        ScalarType::Int => raw
            .parse::<i64>()
            .map(ParamValue::Int)
            .map_err(|_| "is not a valid integer".to_string()),
        ScalarType::Float => raw
            .parse::<f64>()
            .map(ParamValue::Float)
            .map_err(|_| "is not a valid number".to_string()),
        ScalarType::Bool => match raw {
            "true" | "1" => Ok(ParamValue::Bool(true)),
            "false" | "0" => Ok(ParamValue::Bool(false)),
            _ => Err("is not a valid boolean".to_string()),
        },
        ScalarType::Uuid => Uuid::parse_str(raw)
            .map(ParamValue::Uuid)
            .map_err(|_| "is not a valid UUID".to_string()),
        ScalarType::Enum(values) => {
            if values.contains(&raw) {
                Ok(ParamValue::Str(raw.to_string()))
            } else {
                Err(format!("is not one of {}", values.join(", ")))
            }
        }
    }
}

/// Parse a timestamp, RFC 3339 first, then a naive form assumed UTC
pub fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| "is not a valid datetime".to_string())
}

/// Parse a time of day, seconds optional
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| "is not a valid time".to_string())
}

/// Convert fractional seconds to a duration
pub fn duration_from_seconds(seconds: f64) -> Result<TimeDelta, String> {
    if !seconds.is_finite() {
        return Err("is not a finite number of seconds".to_string());
    }
    let millis = (seconds * 1000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err("is out of range".to_string());
    }
    TimeDelta::try_milliseconds(millis as i64).ok_or_else(|| "is out of range".to_string())
}

/// Parse an ISO 8601 duration, e.g. `P3D`, `PT5H30M`, `-PT0.5S`
///
/// Supported units: weeks and days before `T`, hours, minutes, and
/// fractional seconds after it. At least one component must be present.
pub fn parse_duration(raw: &str) -> Result<TimeDelta, String> {
    const INVALID: &str = "is not a valid ISO 8601 duration";

    let (negative, rest) = match raw.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, raw),
    };
    let Some(rest) = rest.strip_prefix('P') else {
        return Err(INVALID.to_string());
    };

    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };
    if date_part.is_empty() && time_part.map_or(true, str::is_empty) {
        return Err(INVALID.to_string());
    }

    let mut seconds = 0.0_f64;
    for (amount, unit) in components(date_part)? {
        seconds += match unit {
            'W' => amount * 604_800.0,
            'D' => amount * 86_400.0,
            _ => return Err(INVALID.to_string()),
        };
    }
    if let Some(time_part) = time_part {
        for (amount, unit) in components(time_part)? {
            seconds += match unit {
                'H' => amount * 3600.0,
                'M' => amount * 60.0,
                'S' => amount,
                _ => return Err(INVALID.to_string()),
            };
        }
    }

    duration_from_seconds(if negative { -seconds } else { seconds })
}

/// Split a duration section into (amount, unit letter) pairs
fn components(section: &str) -> Result<Vec<(f64, char)>, String> {
    let mut parts = Vec::new();
    let mut number = String::new();
    for ch in section.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            number.push(ch);
        } else if ch.is_ascii_alphabetic() {
            let amount = number
                .parse::<f64>()
                .map_err(|_| "is not a valid ISO 8601 duration".to_string())?;
            parts.push((amount, ch));
            number.clear();
        } else {
            return Err("is not a valid ISO 8601 duration".to_string());
        }
    }
    if !number.is_empty() {
        return Err("is not a valid ISO 8601 duration".to_string());
    }
    Ok(parts)
}
