//! Minimal additive patch between two values
//!
//! A diff answers "what must be sent so the remote matches `new`". It never
//! encodes deletions: keys present in `old` but missing from `new` are not
//! reported.

use crate::fields::is_type_discriminator_field;
use crate::update::UpdateOptions;
use crate::value::scalars_equal;
use serde_json::{Map, Value};

/// Compute the fields of `new` that differ from `old`.
///
/// Returns `None` when nothing changed, never an empty object.
///
/// - Object + Object: every key of `new` is diffed against `old[key]`
///   (missing counts as `null`); unchanged keys are omitted. When at least
///   one key changed, type discriminators of `new` (`@namespace.type`) are
///   added even if they did not change.
/// - Array + Array: any difference, including length, returns the whole new
///   array.
/// - Scalars: equal under [`scalars_equal`] (honouring `ignore_casing`)
///   yields `None`, otherwise `new`.
/// - Different kinds: `new`.
///
/// # Example
///
/// ```
/// use reconcile::{diff, UpdateOptions};
/// use serde_json::json;
///
/// let old = json!({"@odata.type": "X", "displayName": "Old"});
/// let new = json!({"@odata.type": "X", "displayName": "New"});
///
/// assert_eq!(
///     diff(&old, &new, &UpdateOptions::default()),
///     Some(json!({"@odata.type": "X", "displayName": "New"}))
/// );
/// assert_eq!(diff(&new, &new, &UpdateOptions::default()), None);
/// ```
pub fn diff(old: &Value, new: &Value, options: &UpdateOptions) -> Option<Value> {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => diff_objects(old_map, new_map, options),
        (Value::Array(old_items), Value::Array(new_items)) => {
            let changed = old_items.len() != new_items.len()
                || old_items
                    .iter()
                    .zip(new_items)
                    .any(|(o, n)| diff(o, n, options).is_some());
            changed.then(|| new.clone())
        }
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => {
            Some(new.clone())
        }
        _ => (!scalars_equal(old, new, options.ignore_casing)).then(|| new.clone()),
    }
}

fn diff_objects(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    options: &UpdateOptions,
) -> Option<Value> {
    let mut out = Map::new();
    for (key, new_value) in new {
        let old_value = old.get(key).unwrap_or(&Value::Null);
        if let Some(changed) = diff(old_value, new_value, options) {
            out.insert(key.clone(), changed);
        }
    }

    if out.is_empty() {
        return None;
    }

    for (key, new_value) in new {
        if is_type_discriminator_field(key) && !out.contains_key(key) {
            out.insert(key.clone(), new_value.clone());
        }
    }

    Some(Value::Object(out))
}

/// List the leaf paths of a diff result in dotted notation.
///
/// Arrays are leaves since they are always replaced whole. Forced
/// discriminators are included; they are part of the patch. A non-object
/// diff is reported as the root path `""`.
///
/// ```
/// use reconcile::changed_paths;
/// use serde_json::json;
///
/// let patch = json!({"b": 3, "c": {"e": 5}, "tags": ["x"]});
/// assert_eq!(changed_paths(&patch), vec!["b", "c.e", "tags"]);
/// ```
pub fn changed_paths(patch: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_paths(patch, String::new(), &mut paths);
    paths.sort();
    paths
}

fn collect_paths(value: &Value, prefix: String, paths: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_paths(child, path, paths);
            }
        }
        _ => paths.push(prefix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts() -> UpdateOptions {
        UpdateOptions::default()
    }

    #[test]
    fn test_diff_nested_change_and_new_key() {
        let old = json!({"a": 1, "b": 2, "c": {"d": 4}});
        let new = json!({"a": 1, "b": 3, "c": {"d": 4, "e": 5}, "f": 6});
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"b": 3, "c": {"e": 5}, "f": 6}))
        );
    }

    #[test]
    fn test_diff_removed_keys_not_reported() {
        let old = json!({"a": 1, "b": 2, "c": {"d": 4}});
        let new = json!({"b": 3, "c": {"e": 5}, "f": 6});
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"b": 3, "c": {"e": 5}, "f": 6}))
        );
        assert_eq!(diff(&json!({"a": 1, "b": 2}), &json!({"a": 1}), &opts()), None);
    }

    #[test]
    fn test_diff_array_changed_returns_full_array() {
        let old = json!([1, 2, 3]);
        let new = json!([1, 2, 3, 4]);
        assert_eq!(diff(&old, &new, &opts()), Some(json!([1, 2, 3, 4])));

        let old = json!({"items": [{"k": 1}, {"k": 2}]});
        let new = json!({"items": [{"k": 1}, {"k": 3}]});
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"items": [{"k": 1}, {"k": 3}]}))
        );
    }

    #[test]
    fn test_diff_no_change_is_none() {
        assert_eq!(diff(&json!({"a": 1}), &json!({"a": 1}), &opts()), None);
        assert_eq!(diff(&json!([]), &json!([]), &opts()), None);
        assert_eq!(diff(&json!({}), &json!({}), &opts()), None);
        assert_eq!(diff(&Value::Null, &Value::Null, &opts()), None);
    }

    #[test]
    fn test_diff_reflexive() {
        let samples = [
            json!({"@odata.type": "#t", "a": [1, {"b": null}], "c": {"d": "x"}}),
            json!([{"@odata.type": "#t", "x": 1}]),
            json!("s"),
            json!(1.5),
            json!(true),
            Value::Null,
        ];
        for sample in &samples {
            assert_eq!(diff(sample, sample, &opts()), None, "sample: {sample}");
            let casing = opts().ignore_casing(true);
            assert_eq!(diff(sample, sample, &casing), None, "sample: {sample}");
        }
    }

    #[test]
    fn test_diff_unchanged_nested_object_omitted() {
        let old = json!({"name": "a", "settings": {"x": 1}});
        let new = json!({"name": "b", "settings": {"x": 1}});
        assert_eq!(diff(&old, &new, &opts()), Some(json!({"name": "b"})));
    }

    #[test]
    fn test_diff_type_mismatch_returns_new() {
        assert_eq!(diff(&json!({"a": 1}), &json!([1]), &opts()), Some(json!([1])));
        assert_eq!(diff(&json!("1"), &json!(1), &opts()), Some(json!(1)));
        assert_eq!(diff(&json!({"a": 1}), &json!({"a": null}), &opts()), Some(json!({"a": null})));
        assert_eq!(diff(&json!({"a": {"b": 1}}), &json!({"a": "x"}), &opts()), Some(json!({"a": "x"})));
    }

    #[test]
    fn test_diff_added_empty_containers_reported() {
        assert_eq!(diff(&json!({}), &json!({"a": {}}), &opts()), Some(json!({"a": {}})));
        assert_eq!(diff(&json!({}), &json!({"a": []}), &opts()), Some(json!({"a": []})));
    }

    #[test]
    fn test_diff_missing_old_key_with_null_value_is_unchanged() {
        assert_eq!(diff(&json!({}), &json!({"a": null}), &opts()), None);
    }

    #[test]
    fn test_diff_ignore_casing() {
        let old = json!({"displayName": "Contoso", "mail": "Admin@Contoso.com"});
        let new = json!({"displayName": "contoso", "mail": "admin@contoso.com"});
        assert_eq!(diff(&old, &new, &opts().ignore_casing(true)), None);
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"displayName": "contoso", "mail": "admin@contoso.com"}))
        );
    }

    #[test]
    fn test_diff_numbers_by_value() {
        assert_eq!(diff(&json!({"n": 1}), &json!({"n": 1.0}), &opts()), None);
        assert_eq!(diff(&json!({"n": 1}), &json!({"n": 2}), &opts()), Some(json!({"n": 2})));
    }

    #[test]
    fn test_diff_discriminator_included_when_array_sibling_changes() {
        let old = json!({
            "@odata.type": "#microsoft.graph.ipNamedLocation",
            "displayName": "Example Named Location",
            "ipRanges": [
                {"@odata.type": "#microsoft.graph.iPv4CidrRange", "cidrAddress": "1.2.3.4/32"},
                {"@odata.type": "#microsoft.graph.iPv4CidrRange", "cidrAddress": "1.2.3.5/32"}
            ],
            "isTrusted": false
        });
        let new = json!({
            "@odata.type": "#microsoft.graph.ipNamedLocation",
            "displayName": "Example Named Location",
            "ipRanges": [
                {"@odata.type": "#microsoft.graph.iPv4CidrRange", "cidrAddress": "1.2.3.4/32"}
            ],
            "isTrusted": false
        });
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({
                "@odata.type": "#microsoft.graph.ipNamedLocation",
                "ipRanges": [
                    {"@odata.type": "#microsoft.graph.iPv4CidrRange", "cidrAddress": "1.2.3.4/32"}
                ]
            }))
        );
    }

    #[test]
    fn test_diff_discriminator_included_when_scalar_sibling_changes() {
        let old = json!({"@odata.type": "X", "displayName": "Old"});
        let new = json!({"@odata.type": "X", "displayName": "New"});
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"@odata.type": "X", "displayName": "New"}))
        );
    }

    #[test]
    fn test_diff_discriminator_in_nested_object() {
        let old = json!({
            "name": "test",
            "settings": {"@odata.type": "#microsoft.graph.someType", "value": "old"}
        });
        let new = json!({
            "name": "test",
            "settings": {"@odata.type": "#microsoft.graph.someType", "value": "new"}
        });
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({
                "settings": {"@odata.type": "#microsoft.graph.someType", "value": "new"}
            }))
        );
    }

    #[test]
    fn test_diff_only_discriminator_changed() {
        let old = json!({"@odata.type": "#microsoft.graph.ipNamedLocation", "name": "test"});
        let new = json!({"@odata.type": "#microsoft.graph.countryNamedLocation", "name": "test"});
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"@odata.type": "#microsoft.graph.countryNamedLocation"}))
        );
    }

    #[test]
    fn test_diff_discriminator_added() {
        let old = json!({"name": "test"});
        let new = json!({"@odata.type": "#microsoft.graph.someType", "name": "test"});
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"@odata.type": "#microsoft.graph.someType"}))
        );
    }

    #[test]
    fn test_diff_unchanged_discriminator_alone_is_none() {
        let value = json!({"@odata.type": "#microsoft.graph.someType", "name": "test"});
        assert_eq!(diff(&value, &value.clone(), &opts()), None);
    }

    #[test]
    fn test_diff_other_metadata_only_when_changed() {
        let old = json!({
            "@odata.type": "#microsoft.graph.someType",
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#test",
            "name": "old"
        });
        let new = json!({
            "@odata.type": "#microsoft.graph.someType",
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#test",
            "name": "new"
        });
        assert_eq!(
            diff(&old, &new, &opts()),
            Some(json!({"@odata.type": "#microsoft.graph.someType", "name": "new"}))
        );

        let mut moved = new.clone();
        moved["@odata.context"] = json!("https://graph.microsoft.com/beta/$metadata#test");
        assert_eq!(
            diff(&new, &moved, &opts()),
            Some(json!({
                "@odata.type": "#microsoft.graph.someType",
                "@odata.context": "https://graph.microsoft.com/beta/$metadata#test"
            }))
        );
    }

    #[test]
    fn test_diff_non_type_at_fields_not_special() {
        let old = json!({"@custom.field": "value1", "name": "test"});
        let new = json!({"@custom.field": "value1", "name": "changed"});
        assert_eq!(diff(&old, &new, &opts()), Some(json!({"name": "changed"})));
    }

    #[test]
    fn test_diff_does_not_mutate_inputs() {
        let old = json!({"@odata.type": "X", "a": [1]});
        let new = json!({"@odata.type": "X", "a": [2]});
        let (old_copy, new_copy) = (old.clone(), new.clone());
        let _ = diff(&old, &new, &opts());
        assert_eq!(old, old_copy);
        assert_eq!(new, new_copy);
    }

    #[test]
    fn test_changed_paths() {
        let patch = json!({
            "@odata.type": "X",
            "settings": {"value": "new", "inner": {"deep": 1}},
            "ipRanges": [{"cidrAddress": "1.2.3.4/32"}]
        });
        assert_eq!(
            changed_paths(&patch),
            vec!["@odata.type", "ipRanges", "settings.inner.deep", "settings.value"]
        );
    }

    #[test]
    fn test_changed_paths_scalar_and_empty_object() {
        assert_eq!(changed_paths(&json!(5)), vec![String::new()]);
        assert_eq!(changed_paths(&json!({"a": {}})), vec!["a"]);
    }
}
