//! Run correlation identifier
//!
//! A `RunId` ties together every log event and outcome produced by one
//! monitoring run, across the async boundary of the detached post-approval
//! rerun.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single monitoring run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new random RunId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_ids_are_unique() {
        let a = RunId::new();
        let b = RunId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_round_trip_through_string() {
        let id = RunId::new();
        let back = RunId::from_string(id.as_str().to_string());
        assert_eq!(id, back);
    }
}
