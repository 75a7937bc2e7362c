//! Common test fixtures for snapshot time and NTP tests.

/// Seconds between 1900-01-01 and 1970-01-01.
pub const NTP_UNIX_EPOCH_DIFF: u64 = 2_208_988_800;

/// Known instants and the snapshot each one resolves to.
pub mod snapshots {
    /// 2024-12-30T05:47:33Z
    pub const SAMPLE_UNIX_SECONDS: u64 = 1_735_537_653;

    /// Snapshot for `SAMPLE_UNIX_SECONDS` after the 20-minute delay and rounding.
    pub const SAMPLE_SNAPSHOT: &str = "2024/12/30/052000";

    /// Built-in static snapshot.
    pub const STATIC_SNAPSHOT: &str = "2024/12/29/044000";
}

/// A 48-byte server reply (LI 0, VN 4, mode 4, stratum 2) whose transmit
/// timestamp is `unix_seconds`.
pub fn ntp_reply(unix_seconds: u64) -> [u8; 48] {
    let mut packet = [0u8; 48];
    packet[0] = 0x24;
    packet[1] = 2;
    let ntp_seconds = (unix_seconds + NTP_UNIX_EPOCH_DIFF) as u32;
    // receive timestamp (word 8) and transmit timestamp (word 10)
    packet[32..36].copy_from_slice(&ntp_seconds.to_be_bytes());
    packet[40..44].copy_from_slice(&ntp_seconds.to_be_bytes());
    packet
}
