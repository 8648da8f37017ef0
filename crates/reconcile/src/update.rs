//! Merge driven by reconciliation options
//!
//! [`update`] computes what the desired final state should look like before
//! it is diffed against the last-known remote state.

use crate::merge::merge_positional;
use crate::value::scalars_equal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options controlling [`update`] and [`crate::diff`].
///
/// # Example
///
/// ```
/// use reconcile::UpdateOptions;
///
/// let opts = UpdateOptions::new().ignore_casing(true);
/// assert!(opts.ignore_casing);
/// assert!(!opts.ignore_missing_property);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOptions {
    /// Keep keys that exist in the old object but not in the new one.
    pub ignore_missing_property: bool,
    /// Treat strings that differ only by letter case as unchanged and keep
    /// the old casing.
    pub ignore_casing: bool,
}

impl UpdateOptions {
    /// Create options with both flags off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether old-only keys survive the update.
    pub fn ignore_missing_property(mut self, ignore: bool) -> Self {
        self.ignore_missing_property = ignore;
        self
    }

    /// Set whether string comparison ignores letter case.
    pub fn ignore_casing(mut self, ignore: bool) -> Self {
        self.ignore_casing = ignore;
        self
    }
}

/// Update `old` with `new` under `options`.
///
/// Same recursion as [`crate::merge`], except:
/// - keys only in `old` are kept when `ignore_missing_property` is set and
///   dropped otherwise;
/// - with `ignore_casing`, a string equal to the old one up to case yields
///   the old string, so server-side canonical casing causes no churn.
pub fn update(old: &Value, new: &Value, options: &UpdateOptions) -> Value {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let mut out = Map::new();
            for (key, new_value) in new_map {
                let updated = match old_map.get(key) {
                    Some(old_value) => update(old_value, new_value, options),
                    None => new_value.clone(),
                };
                out.insert(key.clone(), updated);
            }
            if options.ignore_missing_property {
                for (key, old_value) in old_map {
                    if !new_map.contains_key(key) {
                        out.insert(key.clone(), old_value.clone());
                    }
                }
            }
            Value::Object(out)
        }
        (Value::Array(old_items), Value::Array(new_items)) => Value::Array(merge_positional(
            old_items,
            new_items,
            |o, n| update(o, n, options),
        )),
        (Value::String(_), Value::String(_))
            if options.ignore_casing && scalars_equal(old, new, true) =>
        {
            old.clone()
        }
        _ => new.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_ignore_missing_keeps_old_keys() {
        let opts = UpdateOptions::new().ignore_missing_property(true);
        let got = update(&json!({"a": 1, "b": 2}), &json!({"a": 10}), &opts);
        assert_eq!(got, json!({"a": 10, "b": 2}));
    }

    #[test]
    fn test_update_drops_old_only_keys() {
        let opts = UpdateOptions::new();
        let got = update(&json!({"a": 1, "b": 2}), &json!({"a": 10}), &opts);
        assert_eq!(got, json!({"a": 10}));
    }

    #[test]
    fn test_update_drops_nested_old_only_keys() {
        let opts = UpdateOptions::new();
        let old = json!({"settings": {"keep": 1, "stale": 2}});
        let new = json!({"settings": {"keep": 3}});
        assert_eq!(update(&old, &new, &opts), json!({"settings": {"keep": 3}}));

        let opts = opts.ignore_missing_property(true);
        assert_eq!(
            update(&old, &new, &opts),
            json!({"settings": {"keep": 3, "stale": 2}})
        );
    }

    #[test]
    fn test_update_string_casing_ignored() {
        let opts = UpdateOptions::new().ignore_casing(true);
        assert_eq!(update(&json!("Hello"), &json!("hello"), &opts), json!("Hello"));
        assert_eq!(update(&json!("Hello"), &json!("world"), &opts), json!("world"));
    }

    #[test]
    fn test_update_string_casing_respected_by_default() {
        let opts = UpdateOptions::new();
        assert_eq!(update(&json!("Hello"), &json!("hello"), &opts), json!("hello"));
    }

    #[test]
    fn test_update_casing_preserved_in_nested_arrays() {
        let opts = UpdateOptions::new().ignore_casing(true);
        let old = json!({"domains": ["Contoso.com", "Fabrikam.com"]});
        let new = json!({"domains": ["contoso.com", "example.com"]});
        assert_eq!(
            update(&old, &new, &opts),
            json!({"domains": ["Contoso.com", "example.com"]})
        );
    }

    #[test]
    fn test_update_type_mismatch_new_wins() {
        let opts = UpdateOptions::new().ignore_casing(true);
        assert_eq!(update(&json!({"a": 1}), &json!("A"), &opts), json!("A"));
        assert_eq!(update(&json!("1"), &json!(1), &opts), json!(1));
    }

    #[test]
    fn test_update_options_serde_defaults() {
        let opts: UpdateOptions = serde_json::from_value(json!({"ignore_casing": true})).unwrap();
        assert!(opts.ignore_casing);
        assert!(!opts.ignore_missing_property);
    }
}
