use serde_json::Value;
use sess_types::SessionData;

use crate::error::InvalidPayload;

/// Parse a request body into session data.
///
/// `None` (or a body of only whitespace) is a missing payload; `"{}"` is a
/// valid, empty payload. Anything that is not a JSON object is rejected.
pub fn parse_payload(body: Option<&str>) -> Result<SessionData, InvalidPayload> {
    let text = match body {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(InvalidPayload::Missing),
    };
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(data)) => Ok(data),
        Ok(other) => Err(InvalidPayload::NotAnObject(kind_name(&other))),
        Err(e) => Err(InvalidPayload::Malformed(e.to_string())),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
