//! Error handling for driftgate-store
//!
//! Wraps driftgate-core DgError with store-specific helpers

use driftgate_core::errors::{DgError, DgErrorKind};

/// Result type alias using DgError
pub type Result<T> = std::result::Result<T, DgError>;

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> DgError {
    DgError::new(DgErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> DgError {
    DgError::new(DgErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a serialization error
pub fn serde_error(operation: &str, err: serde_json::Error) -> DgError {
    DgError::new(DgErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a missing expected-schema error
pub fn schema_missing(schema_ref: &str) -> DgError {
    DgError::new(DgErrorKind::SchemaMissing)
        .with_op("read_expected_schema")
        .with_message(format!("Expected schema not readable: {}", schema_ref))
}
