//! Recursive shape comparison.
//!
//! The core entry point is [`diff_shapes`], which compares an expected
//! canonical shape against an actual JSON response body and produces a
//! [`DiffReport`].
//!
//! Comparison rules:
//! 1. Both sides arrays: only the first elements are compared, at the same
//!    path; if either side is empty, the array is accepted as-is.
//! 2. Exactly one side an array: one type mismatch (`"array"` vs. the other
//!    side's tag).
//! 3. Both sides primitives: canonical tags are compared, never values.
//!    `null` is its own tag, distinct from `"object"`.
//! 4. Both sides non-null objects: expected keys missing from the actual body
//!    are reported as missing, actual keys unknown to the expected shape as
//!    extra, shared keys recurse.
//!
//! The expected side is a shape: a stored string leaf is read as the tag it
//! names (`"number"` means "a number goes here"), while a raw sample string
//! that is not a tag name still reads as `"string"`. The actual side is a
//! concrete body and always reduces through [`type_tag`].

use crate::diff::model::{join_path, render_path, DiffReport, TypeMismatch};
use crate::schema::type_tag;
use serde_json::Value;

/// Compare an expected canonical shape against an actual JSON body.
///
/// Deterministic: findings follow the expected object's key iteration order,
/// then the actual object's extra keys in insertion order.
pub fn diff_shapes(expected: &Value, actual: &Value) -> DiffReport {
    let mut report = DiffReport::new();
    walk(expected, actual, "", &mut report);
    report
}

/// Canonical tag of an expected-shape leaf.
///
/// String leaves naming a primitive tag are the tag itself; everything else
/// falls back to the concrete type tag (tolerates legacy stored schemas that
/// still carry raw sample values).
fn shape_tag(shape: &Value) -> &str {
    match shape {
        Value::String(s) if matches!(s.as_str(), "string" | "number" | "boolean" | "null") => s,
        other => type_tag(other),
    }
}

fn walk(expected: &Value, actual: &Value, path: &str, report: &mut DiffReport) {
    match (expected, actual) {
        // Rule 1: both arrays: representative-element comparison.
        (Value::Array(exp_items), Value::Array(act_items)) => {
            if let (Some(exp_first), Some(act_first)) = (exp_items.first(), act_items.first()) {
                walk(exp_first, act_first, path, report);
            }
            // Either side empty: nothing to compare, no finding.
        }
        // Rule 2: array-ness differs.
        (Value::Array(_), act) => {
            report.type_mismatches.push(TypeMismatch {
                path: render_path(path),
                expected: "array".to_string(),
                actual: type_tag(act).to_string(),
            });
        }
        (exp, Value::Array(_)) => {
            report.type_mismatches.push(TypeMismatch {
                path: render_path(path),
                expected: shape_tag(exp).to_string(),
                actual: "array".to_string(),
            });
        }
        // Rule 4: both non-null objects: keywise comparison.
        (Value::Object(exp_map), Value::Object(act_map)) => {
            for (key, exp_child) in exp_map {
                match act_map.get(key) {
                    None => report.missing_fields.push(join_path(path, key)),
                    Some(act_child) => {
                        let child_path = join_path(path, key);
                        walk(exp_child, act_child, &child_path, report);
                    }
                }
            }
            for key in act_map.keys() {
                if !exp_map.contains_key(key) {
                    report.extra_fields.push(join_path(path, key));
                }
            }
        }
        // Rule 3: primitives (and object-vs-primitive): tag comparison only.
        (exp, act) => {
            let expected_tag = shape_tag(exp);
            let actual_tag = type_tag(act);
            if expected_tag != actual_tag {
                report.type_mismatches.push(TypeMismatch {
                    path: render_path(path),
                    expected: expected_tag.to_string(),
                    actual: actual_tag.to_string(),
                });
            }
        }
    }
}
