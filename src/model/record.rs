use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;

/// A JSON object whose keys keep their insertion order.
///
/// Equality is structural and ignores key order, so two records holding the
/// same fields in a different order compare equal.
pub type Record = serde_json::Map<String, Value>;

/// Serialize a struct into a [`Record`], keeping field declaration order
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => bail!("Expected a JSON object, got {}", other),
    }
}

/// Render a value for a changelog line.
///
/// Strings are written verbatim, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
