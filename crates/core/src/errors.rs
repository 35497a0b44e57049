//! Core error types for pricetrail.
//!
//! Upstream failures never show up here: the fetchers absorb them and report
//! "no data". What remains are local problems, mostly persisted state that
//! cannot be read or written, and malformed alert input.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Report output failed: {0}")]
    Report(String),
}

/// Errors raised by the series persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// A persisted series could not be decoded.
    #[error("Malformed series file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Some series could not be written during a bulk save.
    #[error("Failed to save {failed} of {total} series")]
    SaveFailed { failed: usize, total: usize },
}

impl StorageError {
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn malformed(path: &Path, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
