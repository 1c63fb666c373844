//! Error types for tagdog
//!
//! Per-file failures are one of three kinds: the tag store could not be read, the
//! term lookup failed, or the tag store could not be written. The pipeline catches
//! all three at the per-file boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Per-file tagging error
#[derive(Debug, Error)]
pub enum TagError {
    /// Tag store missing, unreadable or unparseable
    #[error("Failed to read tags from {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// External term service failed for this artist
    #[error("Term lookup failed for artist '{artist}': {source}")]
    Lookup {
        artist: String,
        #[source]
        source: TermSourceError,
    },

    /// Tag store could not be persisted; the file keeps its prior tags
    #[error("Failed to write tags to {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Term service errors
#[derive(Debug, Error)]
pub enum TermSourceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("API error {code}: {message}")]
    ApiError { code: i64, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for per-file pipeline stages
pub type TagResult<T> = Result<T, TagError>;
