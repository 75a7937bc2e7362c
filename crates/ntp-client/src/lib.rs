//! Minimal SNTP client.
//!
//! Sends a single mode-3 (client) request and decodes the server's
//! 48-byte reply as a fixed layout of big-endian fields (RFC 4330).
//! No clock discipline, no retries: the caller only needs the server's
//! transmit time.

pub mod client;
pub mod error;
pub mod packet;

pub use client::{NtpClient, DEFAULT_NTP_SERVER, DEFAULT_TIMEOUT};
pub use error::{NtpError, NtpResult};
pub use packet::{NtpPacket, NtpTimestamp, NTP_PACKET_SIZE, NTP_UNIX_EPOCH_DIFF};
