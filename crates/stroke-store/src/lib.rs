//! Immutable dataset store for the stroke lookup service.
//!
//! A delimited file is read once at startup, column types are inferred from
//! its values, and every row is indexed by its integer id. After loading the
//! store is read-only; lookups are plain hash-map reads.

/// Errors raised while loading a dataset
pub mod error;
/// Column layout, missing-value markers and type inference
pub mod schema;
/// The indexed record store
pub mod store;

pub use error::{LoadError, LoadResult};
pub use schema::{Column, Schema};
pub use store::{DatasetStore, LoadOptions, Record, RecordView};
pub use stroke_types::{ColumnType, FieldValue};
