//! Bias planning error types.

use thiserror::Error;

/// Result type for bias planning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Bias planning error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Catalog duration text that is not `DDD:HH:MM:SS`.
    #[error("invalid catalog duration: {0:?}")]
    InvalidDuration(String),

    /// Invalid policy or configuration values.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] ssrtrack_core::Error),
}
