//! Error types for NTP queries.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using NtpError.
pub type NtpResult<T> = Result<T, NtpError>;

/// Errors that can occur while querying an NTP server.
#[derive(Debug, Error)]
pub enum NtpError {
    /// Socket bind, resolve, send or receive failed.
    #[error("NTP I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No reply within the configured timeout.
    #[error("NTP server {server} did not respond within {timeout:?}")]
    Timeout { server: String, timeout: Duration },

    /// Reply shorter than a full NTP header.
    #[error("NTP packet too short: expected {expected} bytes, got {actual}")]
    ShortPacket { expected: usize, actual: usize },

    /// Transmit timestamp cannot be expressed as UNIX time.
    #[error("NTP transmit timestamp {0} precedes the UNIX epoch")]
    PreUnixEpoch(u32),
}
