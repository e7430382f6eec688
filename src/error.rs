//! Error types shared by the storage and service layers.

use std::path::PathBuf;
use thiserror::Error;

/// Faults raised by the flat-file row stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed table {path} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Row index out of range: {index} (table has {len} rows)")]
    OutOfRange { index: i64, len: usize },
    #[error("Invalid value {value:?} in column {column}")]
    InvalidValue { column: String, value: String },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Faults raised by the administrative table surface.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Row payload must be a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
