//! Errors raised while loading a dataset into the store.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to build a [`DatasetStore`](crate::DatasetStore).
///
/// Every variant is fatal at startup: the service must not accept requests
/// without a usable store.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The dataset path does not exist
    #[error("Dataset file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The dataset path could not be opened or read, or is not a regular file
    #[error("Failed to read dataset file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited data (bad quoting, ragged rows, invalid UTF-8)
    #[error("Malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    /// The file has no header row or the header has no columns
    #[error("Dataset has no header row")]
    EmptyHeader,

    /// The configured id column does not appear in the header
    #[error("Id column '{column}' not found in dataset header")]
    MissingIdColumn { column: String },

    /// A row whose id cell is missing or not an integer
    #[error("Invalid id '{value}' on line {line}: ids must be integers")]
    InvalidId { line: u64, value: String },
}

/// Result type alias for store loading
pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Short machine-readable code, logged with fatal startup errors
    pub fn error_code(&self) -> &'static str {
        match self {
            LoadError::FileNotFound { .. } => "FILE_NOT_FOUND",
            LoadError::Io { .. } => "IO_ERROR",
            LoadError::Csv(_) => "MALFORMED_DATA",
            LoadError::EmptyHeader => "EMPTY_HEADER",
            LoadError::MissingIdColumn { .. } => "MISSING_ID_COLUMN",
            LoadError::InvalidId { .. } => "INVALID_ID",
        }
    }
}
