use serde_json::Value;

use crate::error::{QueryError, QueryResult};
use crate::path::{screen_key, validate_path, FieldPath};

/// One equality condition of a screened filter: the value at `path` must
/// equal `value` (or, for arrays, contain it).
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: FieldPath,
    pub value: Value,
}

impl Condition {
    pub fn new(path: FieldPath, value: Value) -> Self {
        Self { path, value }
    }
}

/// Parse and screen a raw filter document.
///
/// Text that is not valid JSON is reported as [`QueryError::Malformed`].
pub fn parse_filter(raw: &str) -> QueryResult<Vec<Condition>> {
    let doc: Value =
        serde_json::from_str(raw).map_err(|e| QueryError::Malformed(e.to_string()))?;
    screen_filter(&doc)
}

/// Screen a filter document and split it into conditions.
///
/// Top-level keys must be valid field paths; they become the condition
/// paths and their values are matched literally. Every key nested below
/// them, including keys of objects inside arrays, is screened with
/// [`screen_key`].
pub fn screen_filter(doc: &Value) -> QueryResult<Vec<Condition>> {
    let Value::Object(top) = doc else {
        return Err(QueryError::NotAnObject(kind_name(doc)));
    };

    let mut conditions = Vec::with_capacity(top.len());
    let mut stack: Vec<(String, &Value)> = Vec::new();

    for (key, value) in top {
        let path = validate_path(key).into_result(key, key)?;
        conditions.push(Condition::new(path, value.clone()));
        stack.push((key.clone(), value));
    }

    while let Some((location, value)) = stack.pop() {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    let child_location = format!("{location}.{key}");
                    screen_key(key).map_err(|reason| QueryError::InvalidPath {
                        path: key.clone(),
                        location: child_location.clone(),
                        reason,
                    })?;
                    stack.push((child_location, child));
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    stack.push((format!("{location}[{i}]"), child));
                }
            }
            _ => {}
        }
    }

    Ok(conditions)
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
