//! Error types for ssrtrack-core.

use thiserror::Error;

/// Result type alias for ssrtrack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for recorder pointer arithmetic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid address space or rate configuration.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A time-at-address conversion was requested without saying whether the
    /// target address precedes or follows the reference.
    #[error("direction hint required (forward or backward), got {0}")]
    AmbiguousDirection(String),

    /// Address outside the recorder address space.
    #[error("address {address} outside address space [0, {modulus})")]
    AddressOutOfRange { address: i64, modulus: u64 },

    /// Unparseable mission time text.
    #[error("invalid mission time: {0:?}")]
    InvalidTime(String),
}
