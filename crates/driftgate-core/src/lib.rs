//! driftgate Core - Contract-drift detection domain logic
//!
//! This crate provides the pure (no I/O) half of the drift pipeline:
//! - Endpoint and outcome models shared by executor, store, and notifier
//! - The recursive shape diff engine (expected shape vs. actual body)
//! - JSON shape normalization and candidate merging
//! - The canonical structured error facility
//! - Notifier / rerun seam traits for the approval side effects
//! - The structured logging facility

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod notify;
pub mod schema;

// Re-export commonly used types
pub use diff::{diff_shapes, DiffReport, TypeMismatch};
pub use errors::{DgError, DgErrorKind, Result};
pub use model::{EndpointDescriptor, HttpMethod, RunReport, TestOutcome, VersionSignal};
pub use notify::{NoopNotifier, NoopRerunTrigger, Notifier, RerunTrigger, SentMessage};
pub use schema::{merge_shapes, normalize, shape_digest, type_tag};
