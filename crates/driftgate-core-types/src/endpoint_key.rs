//! Endpoint join key derivation
//!
//! Every persisted map (approvals, pending candidates, cached notifications,
//! schema files) is keyed by the same whitespace-collapsed form of the
//! endpoint name. Deriving it in one place keeps the maps joinable.

use serde::{Deserialize, Serialize};

/// Join key for all per-endpoint state maps
///
/// Derived from an endpoint's human-readable name by collapsing every run
/// of whitespace to a single underscore. The derivation is the identity
/// for names that already contain no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointKey(String);

impl EndpointKey {
    /// Derive the key from an endpoint name
    pub fn from_name(name: &str) -> Self {
        Self(name.split_whitespace().collect::<Vec<_>>().join("_"))
    }

    /// Wrap an already-derived key string (for deserialization from storage)
    pub fn from_raw(raw: String) -> Self {
        Self(raw)
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
