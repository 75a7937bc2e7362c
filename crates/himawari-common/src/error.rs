//! Error types for configuration and snapshot time handling.

use thiserror::Error;

/// Result type alias using HimawariError.
pub type HimawariResult<T> = Result<T, HimawariError>;

/// Primary error type for the shared imagery types.
#[derive(Debug, Error)]
pub enum HimawariError {
    #[error("Unsupported granularity {0}: expected one of 1, 2, 4, 8, 16")]
    InvalidGranularity(u32),

    #[error("Invalid snapshot timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig { field: String, message: String },
}

impl HimawariError {
    pub fn invalid_timestamp(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }
}
