//! Helpers over [`serde_json::Value`]

use serde_json::{Number, Value};

/// Check whether a value is "empty" for the purpose of skipping a request.
///
/// Absent, `null`, `{}` and `[]` are empty. Scalars never are, including
/// `""`, `0` and `false`.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Compare two scalars.
///
/// Strings may be compared case-insensitively. Numbers compare by value, so
/// `1` and `1.0` are equal. Values of different kinds are never equal, and
/// containers are not scalars: for them this falls back to `==`.
pub fn scalars_equal(old: &Value, new: &Value, ignore_casing: bool) -> bool {
    match (old, new) {
        (Value::String(a), Value::String(b)) => {
            a == b || (ignore_casing && a.to_lowercase() == b.to_lowercase())
        }
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        _ => old == new,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a == b {
        return true;
    }
    // Exact integers are settled above.
    if a.is_f64() || b.is_f64() {
        return match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    false
}
