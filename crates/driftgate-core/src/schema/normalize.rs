//! Canonical shape construction and candidate merging.
//!
//! [`normalize`] turns a concrete response body into a shape: strings and
//! numbers become their type tags, booleans and null stay as themselves,
//! arrays are normalized element-wise (every element, unlike the diff
//! engine's first-element rule; the two behaviors are intentionally
//! distinct), objects recurse per key.
//!
//! [`merge_shapes`] folds a freshly observed shape into a previously staged
//! one so that repeated drift observations accumulate instead of
//! ping-ponging.

use serde_json::{Map, Value};
use sha2::{Digest as _, Sha256};

/// Canonical type tag for a JSON value
///
/// `null` is its own tag, distinct from `"object"`.
pub fn type_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convert a concrete JSON value into its canonical shape
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::String(_) => Value::String("string".to_string()),
        Value::Number(_) => Value::String("number".to_string()),
        Value::Bool(b) => Value::Bool(*b),
        Value::Null => Value::Null,
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Object(map) => {
            let normalized: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect();
            Value::Object(normalized)
        }
    }
}

/// Merge a previously staged shape with a newly observed one
///
/// - Primitive conflicts resolve to `new`.
/// - Two arrays of primitives only: deduplicated set union, old elements
///   first, observation order preserved.
/// - Two arrays containing objects or nested arrays: positional merge up to
///   the longer length; an element present on only one side is carried
///   through unchanged.
/// - Exactly one side an array: the type changed, `new` wins.
/// - Two non-null objects: union of keys, recursing on shared keys; a key
///   present on only one side is carried through unchanged.
pub fn merge_shapes(old: &Value, new: &Value) -> Value {
    match (old, new) {
        (Value::Array(old_items), Value::Array(new_items)) => {
            if is_primitive_array(old_items) && is_primitive_array(new_items) {
                let mut union: Vec<Value> = Vec::new();
                for item in old_items.iter().chain(new_items.iter()) {
                    if !union.contains(item) {
                        union.push(item.clone());
                    }
                }
                Value::Array(union)
            } else {
                let len = old_items.len().max(new_items.len());
                let merged: Vec<Value> = (0..len)
                    .map(|i| match (old_items.get(i), new_items.get(i)) {
                        (Some(o), Some(n)) => merge_shapes(o, n),
                        (Some(o), None) => o.clone(),
                        (None, Some(n)) => n.clone(),
                        (None, None) => unreachable!("index below max length"),
                    })
                    .collect();
                Value::Array(merged)
            }
        }
        (Value::Object(old_map), Value::Object(new_map)) => {
            let mut merged = old_map.clone();
            for (key, new_child) in new_map {
                let entry = match old_map.get(key) {
                    Some(old_child) => merge_shapes(old_child, new_child),
                    None => new_child.clone(),
                };
                merged.insert(key.clone(), entry);
            }
            Value::Object(merged)
        }
        // Primitive conflict (and any type change) resolves to new.
        (_, new) => new.clone(),
    }
}

fn is_primitive_array(items: &[Value]) -> bool {
    items
        .iter()
        .all(|v| !matches!(v, Value::Array(_) | Value::Object(_)))
}

/// Stable fingerprint of a shape: sha256 over its key-sorted JSON encoding
///
/// Key order is sorted before hashing so that two shapes that differ only in
/// insertion order fingerprint identically.
pub fn shape_digest(shape: &Value) -> String {
    let canonical = serde_json::to_string(&sort_keys(shape)).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let sorted: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), sort_keys(&map[k])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_primitives() {
        assert_eq!(normalize(&json!("hello")), json!("string"));
        assert_eq!(normalize(&json!(42.5)), json!("number"));
        assert_eq!(normalize(&json!(true)), json!(true));
        assert_eq!(normalize(&json!(null)), json!(null));
    }

    #[test]
    fn test_normalize_object() {
        let body = json!({"id": 7, "name": "x", "active": false, "tags": null});
        assert_eq!(
            normalize(&body),
            json!({"id": "number", "name": "string", "active": false, "tags": null})
        );
    }

    #[test]
    fn test_normalize_array_is_element_wise() {
        // Every element is normalized, not just the first.
        let body = json!([1, "two", {"x": 3}]);
        assert_eq!(
            normalize(&body),
            json!(["number", "string", {"x": "number"}])
        );
    }

    #[test]
    fn test_merge_primitive_conflict_takes_new() {
        assert_eq!(merge_shapes(&json!("string"), &json!("number")), json!("number"));
    }

    #[test]
    fn test_merge_primitive_arrays_is_set_union() {
        let old = json!(["string", "number"]);
        let new = json!(["number", "boolean"]);
        assert_eq!(
            merge_shapes(&old, &new),
            json!(["string", "number", "boolean"])
        );
    }

    #[test]
    fn test_merge_primitive_arrays_commutes_as_a_set() {
        let a = json!(["string", "number"]);
        let b = json!(["boolean"]);
        let ab = merge_shapes(&a, &b);
        let ba = merge_shapes(&b, &a);
        let to_set = |v: &Value| {
            let mut items: Vec<String> = v
                .as_array()
                .unwrap()
                .iter()
                .map(|x| x.to_string())
                .collect();
            items.sort();
            items
        };
        assert_eq!(to_set(&ab), to_set(&ba));
    }

    #[test]
    fn test_merge_primitive_arrays_is_associative() {
        let a = json!(["string"]);
        let b = json!(["number"]);
        let c = json!(["boolean", "string"]);
        let left = merge_shapes(&merge_shapes(&a, &b), &c);
        let right = merge_shapes(&a, &merge_shapes(&b, &c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_merge_object_arrays_positionally() {
        let old = json!([{"a": "string"}, {"b": "number"}]);
        let new = json!([{"a": "number", "c": "string"}]);
        let merged = merge_shapes(&old, &new);
        assert_eq!(
            merged,
            json!([{"a": "number", "c": "string"}, {"b": "number"}])
        );
    }

    #[test]
    fn test_merge_objects_unions_keys() {
        let old = json!({"kept": "string", "both": "string"});
        let new = json!({"both": "number", "added": "boolean"});
        assert_eq!(
            merge_shapes(&old, &new),
            json!({"kept": "string", "both": "number", "added": "boolean"})
        );
    }

    #[test]
    fn test_merge_nested_objects_recurse() {
        let old = json!({"outer": {"a": "string"}});
        let new = json!({"outer": {"b": "number"}});
        assert_eq!(
            merge_shapes(&old, &new),
            json!({"outer": {"a": "string", "b": "number"}})
        );
    }

    #[test]
    fn test_shape_digest_ignores_key_order() {
        let a = serde_json::from_str::<Value>(r#"{"a": "string", "b": "number"}"#).unwrap();
        let b = serde_json::from_str::<Value>(r#"{"b": "number", "a": "string"}"#).unwrap();
        assert_eq!(shape_digest(&a), shape_digest(&b));
    }

    #[test]
    fn test_shape_digest_differs_on_content() {
        assert_ne!(
            shape_digest(&json!({"a": "string"})),
            shape_digest(&json!({"a": "number"}))
        );
    }
}
