//! Core types shared across driftgate facilities
//!
//! This crate provides foundational types used by every layer:
//!
//! - **EndpointKey**: the whitespace-collapsed join key for all state maps
//! - **RunId**: correlation identifier for a single monitoring run
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod endpoint_key;
pub mod run;
pub mod schema;
pub mod sensitive;

pub use endpoint_key::EndpointKey;
pub use run::RunId;
pub use sensitive::Sensitive;
