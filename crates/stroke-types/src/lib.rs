//! Stroke Types
//!
//! This crate defines the scalar value model shared by the dataset store
//! (`stroke-store`) and the lookup API (`stroke-api`). Keeping it separate lets
//! the HTTP layer serialize record values without depending on the loader.

#![deny(missing_docs)]

mod types;
pub use types::{ColumnType, FieldValue};
