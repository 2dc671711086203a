//! Error types for Sharelens core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while the binary uses `anyhow` for convenient error
//! handling.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Sharelens operations.
///
/// Walk-level failures never surface as these errors: the walker and the
/// search orchestrator recover them locally. What remains are failures of
/// single-shot operations that the caller has to report.
#[derive(Error, Debug)]
pub enum CoreError {
    // === Filesystem Errors ===
    /// A directory or file could not be opened (missing, permission denied,
    /// wrong kind, or the share is offline)
    #[error("cannot read {path}: {reason}")]
    NotReadable { path: PathBuf, reason: String },

    /// The requested file does not exist
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    // === External Facility Errors ===
    /// The OS-native indexing facility failed
    #[error("indexed search unavailable: {reason}")]
    IndexUnavailable { reason: String },

    /// The external media converter failed
    #[error("conversion failed: {reason}")]
    ConversionFailed { reason: String },

    /// Conversion was requested for something that is not an AVI file
    #[error("not an AVI file: {path}")]
    NotAvi { path: PathBuf },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a not-readable error from an I/O failure on `path`.
    pub fn not_readable(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        CoreError::NotReadable {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Create an index-unavailable error
    pub fn index_unavailable(reason: impl Into<String>) -> Self {
        CoreError::IndexUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(reason: impl Into<String>) -> Self {
        CoreError::ConversionFailed {
            reason: reason.into(),
        }
    }

    /// Returns true if the error means the target simply is not there
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::NotFound { .. } => true,
            CoreError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
