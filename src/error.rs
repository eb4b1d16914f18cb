//! Error types for the dripfeed limiter.

use thiserror::Error;

/// Main error type for dripfeed operations.
#[derive(Error, Debug)]
pub enum DripfeedError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The wait required to enforce the rate would exceed the limiter's
    /// maximum tolerable wait. The request was denied without being
    /// accounted against the bucket.
    #[error("Backoff")]
    Backoff,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for dripfeed operations.
pub type Result<T> = std::result::Result<T, DripfeedError>;
