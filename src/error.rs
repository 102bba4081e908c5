//! Error types for the streamblocks core.
//!
//! Block-level failures never cross the event stream as a Rust `Err` — they
//! are surfaced as `Event::BlockError` carrying an [`crate::event::ErrorCode`]
//! instead. The `Error` type here is reserved for programmer errors: a
//! processor driven twice, a builder left with a missing required field, or
//! invalid constructor input.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Programmer-error type for the streamblocks core.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration (builder validation failure).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid input passed to a constructor.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `Processor::process_stream` was invoked more than once on the same
    /// instance.
    #[error("process_stream may only be invoked once per processor instance")]
    AlreadyConsumed,
}

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new invalid-input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_config() {
        let err = Error::config("missing max_block_size");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: missing max_block_size"
        );
    }

    #[test]
    fn test_error_invalid_input() {
        let err = Error::invalid_input("empty delimiter");
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(err.to_string(), "invalid input: empty delimiter");
    }

    #[test]
    fn test_error_already_consumed() {
        let err = Error::AlreadyConsumed;
        assert_eq!(
            err.to_string(),
            "process_stream may only be invoked once per processor instance"
        );
    }
}
