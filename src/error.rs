// src/error.rs

//! Error types for the tracker library

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a tracker operation
///
/// The degrade-on-failure paths (history archive lookups, notification
/// delivery) have their own error types and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// Startup failure: bad configuration, missing secret, HTTP client setup
    #[error("Initialization error: {0}")]
    InitError(String),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    IoError(String),

    /// A snapshot or per-device record could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A required file or directory does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An external command (fetch hook, git) failed
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// An external command did not finish in time
    #[error("Command timed out after {secs}s: {command}")]
    Timeout { command: String, secs: u64 },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raw I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
