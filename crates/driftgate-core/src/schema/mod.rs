//! Shape normalization and merging
//!
//! A "shape" is a JSON tree with primitive values replaced by canonical type
//! tags, used to compare and merge response structures independent of the
//! concrete data.

pub mod normalize;

pub use normalize::{merge_shapes, normalize, shape_digest, type_tag};
