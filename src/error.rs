//! Error types for costwatch
//!
//! Library code uses `crate::error::Result<T>` which returns `CostwatchError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling; the
//! conversion happens at the CLI boundary so error chains are preserved.
//!
//! Fatal vs. recoverable:
//! - `Provider`, `Storage`, `Io`, `Json`, `IncompletePass` abort the
//!   enclosing pass or report run.
//! - `UnknownInstanceType` is recoverable at the point of occurrence: the
//!   affected instance (or instance type, during reduction) is skipped with a
//!   diagnostic and the operation continues.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for costwatch
#[derive(Error, Debug)]
pub enum CostwatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error in {region}: {message}")]
    Provider { region: String, message: String },

    #[error("Unknown instance type: {0}")]
    UnknownInstanceType(String),

    #[error("Snapshot storage error at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Sampling pass incomplete: expected {expected} region aggregates, received {received}")]
    IncompletePass { expected: usize, received: usize },

    #[error("Notification error: {0}")]
    Notify(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostwatchError>;
