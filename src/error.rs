//! Error handling for WindCube processing operations.
//!
//! Only fatal conditions are represented here. Rows with unparseable
//! timestamps and requests for columns that are absent from a file are
//! tolerated by the reader and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WindCubeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Malformed WindCube file: {path} - {reason}")]
    MalformedFile { path: PathBuf, reason: String },

    #[error("Column label '{label}' does not produce a valid resource id (got '{candidate}')")]
    InvalidResourceName { label: String, candidate: String },

    #[error("Invalid numeric value '{value}' in file {path}, line {line}, column {column}")]
    NumericFormat {
        path: PathBuf,
        line: usize,
        column: usize,
        value: String,
    },

    #[error("Row is missing column {column} in file {path}, line {line}")]
    TruncatedRow {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("Catalog not found: {catalog_id}")]
    CatalogNotFound { catalog_id: String },

    #[error("Resource not found: {path}")]
    ResourceNotFound { path: String },

    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Background task failed: {message}")]
    Join { message: String },
}

impl WindCubeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed file error
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<tokio::task::JoinError> for WindCubeError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Join {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WindCubeError>;
