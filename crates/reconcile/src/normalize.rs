//! Canonical text form of JSON documents
//!
//! Two documents that differ only in key order or whitespace normalize to the
//! same string, so stored and freshly computed values can be compared as text.

use crate::error::Result;
use serde_json::{Map, Value};

/// Normalize JSON text, reporting decode failures as a diagnostic string.
///
/// - Empty input maps to empty output.
/// - Valid input is re-encoded compactly with object keys sorted at every
///   level.
/// - Invalid input yields a non-empty diagnostic, so callers can tell
///   "unparsable" from "empty" without a separate error channel.
pub fn normalize(input: &str) -> String {
    match normalize_strict(input) {
        Ok(normalized) => normalized,
        Err(e) => e.to_string(),
    }
}

/// Normalize JSON text, returning decode failures as errors.
pub fn normalize_strict(input: &str) -> Result<String> {
    if input.is_empty() {
        return Ok(String::new());
    }
    let value: Value = serde_json::from_str(input)?;
    Ok(serde_json::to_string(&sort_keys(value))?)
}

/// Rebuild a value with object keys in lexicographic order.
///
/// `serde_json::Map` is already ordered unless the `preserve_order` feature
/// is enabled somewhere in the dependency graph; sorting here keeps the
/// output canonical either way.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
