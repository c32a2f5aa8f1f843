//! driftgate Store - Persistence layer for the approval pipeline
//!
//! Provides:
//! - SQLite-backed key-value storage with the canonical state layout
//!   (`approvals`, `schema-update-pending`, `rawBlocks`, `lastRunTimestamp`)
//! - File-based canonical schema storage with numbered draft snapshots
//! - The durable per-endpoint approval state machine

pub mod approvals;
pub mod db;
pub mod errors;
pub mod kv;
pub mod schema_files;

// Re-export key types
pub use approvals::{ApprovalStore, ApprovalStatus, ApproveEffects, CachedNotification};
pub use errors::Result;
pub use schema_files::SchemaDir;
