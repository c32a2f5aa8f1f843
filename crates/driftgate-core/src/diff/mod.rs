//! Shape diff engine
//!
//! Compares an expected canonical shape against an actual JSON response body
//! and reports missing fields, extra fields, and type mismatches.

pub mod engine;
pub mod model;

pub use engine::diff_shapes;
pub use model::{DiffReport, TypeMismatch};
