//! Typed extraction from the `args` object of a request envelope.
//!
//! Requiredness and coercion live here, in the handlers, not in the
//! dispatcher: metadata schemas are advisory, these checks are the
//! enforcement. Every failure is `InvalidArguments` naming the offending key.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::GateError;

fn invalid(details: impl Into<String>) -> GateError {
    GateError::InvalidArguments {
        details: details.into(),
    }
}

/// View the arguments as a JSON object. Absent args count as missing.
pub fn object(args: &Option<Value>) -> Result<&Map<String, Value>, GateError> {
    args.as_ref()
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("expected an args object"))
}

/// A required string field.
pub fn require_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str, GateError> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(invalid(format!("'{key}' must be a string"))),
        None => Err(invalid(format!("missing required argument: '{key}'"))),
    }
}

/// A required GUID field, given as its canonical string form.
pub fn require_uuid(map: &Map<String, Value>, key: &str) -> Result<Uuid, GateError> {
    let raw = require_str(map, key)?;
    Uuid::parse_str(raw).map_err(|_| invalid(format!("'{key}' must be a GUID")))
}

/// An optional string field.
pub fn optional_str<'a>(
    map: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>, GateError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(invalid(format!("'{key}' must be a string"))),
    }
}

/// An optional GUID field.
pub fn optional_uuid(map: &Map<String, Value>, key: &str) -> Result<Option<Uuid>, GateError> {
    match optional_str(map, key)? {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(raw)
            .map(Some)
            .map_err(|_| invalid(format!("'{key}' must be a GUID"))),
    }
}

/// An optional non-negative integer, with a default.
pub fn optional_usize(
    map: &Map<String, Value>,
    key: &str,
    default: usize,
) -> Result<usize, GateError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| invalid(format!("'{key}' must be a non-negative integer"))),
        Some(_) => Err(invalid(format!("'{key}' must be a non-negative integer"))),
    }
}

/// An optional array of strings, defaulting to empty.
pub fn optional_string_array(
    map: &Map<String, Value>,
    key: &str,
) -> Result<Vec<String>, GateError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(format!("'{key}' must be an array of strings")))
            })
            .collect(),
        Some(_) => Err(invalid(format!("'{key}' must be an array of strings"))),
    }
}

/// An optional free-form JSON payload, defaulting to `null`.
pub fn optional_value(map: &Map<String, Value>, key: &str) -> Value {
    map.get(key).cloned().unwrap_or(Value::Null)
}

/// A required array of numbers, as `f32` (embeddings and query vectors).
pub fn require_f32_array(map: &Map<String, Value>, key: &str) -> Result<Vec<f32>, GateError> {
    match map.get(key) {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| invalid(format!("'{key}' must be an array of numbers")))
            })
            .collect(),
        Some(Value::Array(_)) => Err(invalid(format!("'{key}' must not be empty"))),
        Some(_) => Err(invalid(format!("'{key}' must be an array of numbers"))),
        None => Err(invalid(format!("missing required argument: '{key}'"))),
    }
}

/// Serialize a handler result into its wire value.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, GateError> {
    serde_json::to_value(value).map_err(|e| GateError::Internal {
        details: format!("result serialization failed: {e}"),
    })
}
