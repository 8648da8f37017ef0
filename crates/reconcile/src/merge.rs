//! Deep merge of a new value over an old one
//!
//! Used to build the locally stored representation of a resource after a
//! successful write: fields the caller never mentioned but the server
//! returned survive, fields the caller set win.

use serde_json::{Map, Value};

/// Deep-merge `new` over `old`.
///
/// - Object + Object: union of keys; common keys merge recursively, keys on
///   one side only are taken as-is.
/// - Array + Array: positional merge, length is the longer of the two.
/// - Anything else: `new` replaces `old` at that position.
pub fn merge(old: &Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let mut out = Map::new();
            for (key, old_value) in old_map {
                let merged = match new_map.get(key) {
                    Some(new_value) => merge(old_value, new_value),
                    None => old_value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            for (key, new_value) in new_map {
                if !old_map.contains_key(key) {
                    out.insert(key.clone(), new_value.clone());
                }
            }
            Value::Object(out)
        }
        (Value::Array(old_items), Value::Array(new_items)) => {
            Value::Array(merge_positional(old_items, new_items, merge))
        }
        _ => new.clone(),
    }
}

/// Combine two arrays index by index.
///
/// Where both sides have an element, `combine` decides; past the end of the
/// shorter array the longer side's elements are copied.
pub(crate) fn merge_positional(
    old: &[Value],
    new: &[Value],
    mut combine: impl FnMut(&Value, &Value) -> Value,
) -> Vec<Value> {
    let len = old.len().max(new.len());
    (0..len)
        .map(|i| match (old.get(i), new.get(i)) {
            (Some(o), Some(n)) => combine(o, n),
            (Some(o), None) => o.clone(),
            (None, Some(n)) => n.clone(),
            (None, None) => Value::Null,
        })
        .collect()
}
