//! Endpoint configuration loading.
//!
//! Endpoints are declared in a single JSON file: an ordered array of
//! descriptors. Order matters, it is the run's execution order. No
//! validation happens beyond parsing; referenced schema files are checked
//! lazily, at execution time.

use std::path::Path;

use driftgate_core::errors::{DgError, DgErrorKind, Result};
use driftgate_core::model::EndpointDescriptor;

/// Load the ordered endpoint list from a JSON file
///
/// # Errors
///
/// Returns `DgErrorKind::Io` when the file cannot be read and
/// `DgErrorKind::Serialization` when it does not parse as a descriptor
/// array.
pub fn load_endpoints<P: AsRef<Path>>(path: P) -> Result<Vec<EndpointDescriptor>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        DgError::new(DgErrorKind::Io)
            .with_op("load_endpoints")
            .with_message(format!("cannot read {}: {}", path.display(), e))
    })?;
    let endpoints: Vec<EndpointDescriptor> = serde_json::from_str(&raw).map_err(|e| {
        DgError::new(DgErrorKind::Serialization)
            .with_op("load_endpoints")
            .with_message(format!("cannot parse {}: {}", path.display(), e))
    })?;
    tracing::debug!(
        path = %path.display(),
        endpoint_count = endpoints.len(),
        "loaded endpoint configuration"
    );
    Ok(endpoints)
}
