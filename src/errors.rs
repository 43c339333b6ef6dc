//! Unified error types and result handling.
//!
//! Load paths never surface errors (corrupt blobs degrade to defaults), so the
//! variants here cover configuration, storage I/O, and rejected user input.

use thiserror::Error;

/// Errors produced by the task model, its stores, and the CLI layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// A key-value store backend failed to read or write
    #[error("Storage error for key '{key}': {message}")]
    Storage {
        /// Storage key involved in the failure
        key: String,
        /// Human-readable description of the problem
        message: String,
    },

    /// Task and template titles must contain non-whitespace text
    #[error("Title cannot be empty")]
    EmptyTitle,

    /// User-supplied input that could not be interpreted
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable description of the problem
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
