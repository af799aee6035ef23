use serde_json::Value;

use crate::error::{AppError, Result};

/// Pulls a required string field out of a flat JSON body. A missing field
/// and a mis-typed field report the same way; the first failure stops
/// validation.
pub fn require_string(body: &Value, field: &str) -> Result<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::bad_request(format!("\"{}\" must be a string", field)))
}

pub fn require_boolean(body: &Value, field: &str) -> Result<bool> {
    body.get(field)
        .and_then(Value::as_bool)
        .ok_or_else(|| AppError::bad_request(format!("\"{}\" must be a boolean", field)))
}
