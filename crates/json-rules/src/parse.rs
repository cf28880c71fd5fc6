//! Field readers shared by the rule and condition parsers.

use crate::error::{Result, RuleError};
use serde_json::{Map, Value};

pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| RuleError::structural(format!("{what} must be an object, got {value}")))
}

/// Reads an optional string field. Present but not a string is an error.
pub(crate) fn optional_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(RuleError::structural(format!(
            "Field \"{key}\" must be a string, got {other}"
        ))),
    }
}

pub(crate) fn required_str<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<&'a str> {
    optional_str(obj, key)?
        .ok_or_else(|| RuleError::structural(format!("{context} requires a \"{key}\"")))
}

pub(crate) fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    context: &str,
) -> Result<&'a Vec<Value>> {
    match obj.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(RuleError::structural(format!(
            "{context}: \"{key}\" must be an array, got {other}"
        ))),
        None => Err(RuleError::structural(format!("{context} requires \"{key}\""))),
    }
}
