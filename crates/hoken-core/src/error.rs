//! Error types for the hoken-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the hoken library.
///
/// Unresolved fields are not errors; they surface as absent entries in the
/// field map. Errors are reserved for configuration problems and I/O.
#[derive(Error, Debug)]
pub enum HokenError {
    /// Failed to read a pattern table file.
    #[error("failed to load pattern table from {path}: {reason}")]
    TableLoad { path: PathBuf, reason: String },

    /// A pattern table failed eager validation.
    #[error("invalid pattern table: {0}")]
    TableInvalid(String),

    /// A pattern variant could not be compiled.
    #[error("invalid pattern for role {role}: {reason}")]
    Pattern { role: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the hoken library.
pub type Result<T> = std::result::Result<T, HokenError>;
