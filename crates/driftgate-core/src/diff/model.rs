//! Typed output model for the shape diff engine.

use serde::{Deserialize, Serialize};

/// Rendering of the empty path (mismatch at the document root)
pub const ROOT_PATH: &str = "(root)";

/// A single type disagreement between expected shape and actual body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMismatch {
    /// Dot-joined key path; `(root)` when the mismatch is at the top level
    pub path: String,
    /// Canonical tag of the expected shape at this path
    pub expected: String,
    /// Canonical tag of the actual value at this path
    pub actual: String,
}

/// Structured result of diffing an expected shape against an actual body
///
/// Empty on all three lists means the body still matches the stored shape.
/// Ordering is deterministic: expected-side findings follow the expected
/// object's key iteration order, extra fields follow the actual object's
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Paths present in the expected shape but absent from the actual body
    pub missing_fields: Vec<String>,
    /// Paths present in the actual body but absent from the expected shape
    pub extra_fields: Vec<String>,
    /// Paths where both sides exist but their canonical type tags differ
    pub type_mismatches: Vec<TypeMismatch>,
}

impl DiffReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no drift was detected
    pub fn is_empty(&self) -> bool {
        self.missing_fields.is_empty()
            && self.extra_fields.is_empty()
            && self.type_mismatches.is_empty()
    }

    /// Total number of findings across all three lists
    pub fn finding_count(&self) -> usize {
        self.missing_fields.len() + self.extra_fields.len() + self.type_mismatches.len()
    }
}

/// Join a parent path and a key, rendering the root marker for empty parents
pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Render a path for output, substituting the root marker when empty
pub(crate) fn render_path(path: &str) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path.to_string()
    }
}
