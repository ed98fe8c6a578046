//! # Runtime Types
//!
//! The [`Value`] enum is the runtime representation of every column value
//! the file format can store, together with the type-precedence total
//! order used to search index trees.

pub mod value;

pub use value::{compare_values, Value};
