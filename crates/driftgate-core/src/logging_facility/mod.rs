//! Structured logging facility for driftgate
//!
//! This module provides a canonical logging facility with:
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Correlation propagation via the run id field
//!
//! # Usage
//!
//! ```rust
//! use driftgate_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;

pub use init::{init, Profile};
