//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid slot identifier: {0}")]
    InvalidIdentifier(String),

    #[error("file size {size} exceeds the maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("slot is not available (unknown, expired, or already used)")]
    SlotUnavailable,

    #[error("declared transfer length {declared} does not match slot size {expected}")]
    SizeMismatch { declared: u64, expected: u64 },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
