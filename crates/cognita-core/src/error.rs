//! Error types for Cognita operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Cognita crates. Uses `thiserror` for derive macros.
//!
//! Only truly missing identifiers are errors. Inconsistent storage rows,
//! prerequisite cycles, and empty inputs are reported through result values
//! instead (see the graph crate).

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in Cognita operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error without path context.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// The file being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity is absent (e.g. a concept id not in the loaded graph).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization or parse error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An operation failed for a reason not covered above.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a parse/serialization error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a generic operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Wrap a bare I/O error.
    pub fn io(err: std::io::Error) -> Self {
        Self::Io(err)
    }

    /// Wrap an I/O error with the path that caused it.
    pub fn io_with_path(err: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source: err,
        }
    }

    /// Create a not found error for a missing file.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::NotFound(format!("file {}", path.as_ref().display()))
    }

    /// Whether this error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias using Cognita's Error type.
pub type Result<T> = std::result::Result<T, Error>;
