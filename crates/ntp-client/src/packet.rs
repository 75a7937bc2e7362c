//! NTP packet layout.
//!
//! The 48-byte header is thirteen big-endian 32-bit words:
//!
//! | Word  | Bytes | Field                              |
//! |-------|-------|------------------------------------|
//! | 0     | 0-3   | LI/VN/Mode, stratum, poll, precision |
//! | 1     | 4-7   | Root delay                         |
//! | 2     | 8-11  | Root dispersion                    |
//! | 3     | 12-15 | Reference ID                       |
//! | 4-5   | 16-23 | Reference timestamp                |
//! | 6-7   | 24-31 | Originate timestamp                |
//! | 8-9   | 32-39 | Receive timestamp                  |
//! | 10-11 | 40-47 | Transmit timestamp                 |

use bytes::{Buf, BufMut, BytesMut};
use chrono::{DateTime, Utc};

use crate::error::{NtpError, NtpResult};

/// Size of an NTP header without extension fields.
pub const NTP_PACKET_SIZE: usize = 48;

/// Seconds between the NTP epoch (1900-01-01) and the UNIX epoch (1970-01-01).
pub const NTP_UNIX_EPOCH_DIFF: u64 = 2_208_988_800;

/// LI = 0 (no warning), VN = 3, Mode = 3 (client).
pub const CLIENT_REQUEST_FLAGS: u8 = 0x1B;

/// Mode value carried by server replies.
pub const MODE_SERVER: u8 = 4;

/// 64-bit NTP timestamp: seconds since 1900 plus a binary fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NtpTimestamp {
    pub seconds: u32,
    pub fraction: u32,
}

impl NtpTimestamp {
    fn read(buf: &mut impl Buf) -> Self {
        Self {
            seconds: buf.get_u32(),
            fraction: buf.get_u32(),
        }
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.seconds);
        buf.put_u32(self.fraction);
    }

    /// Whole seconds since the UNIX epoch.
    pub fn unix_seconds(&self) -> NtpResult<u64> {
        (self.seconds as u64)
            .checked_sub(NTP_UNIX_EPOCH_DIFF)
            .ok_or(NtpError::PreUnixEpoch(self.seconds))
    }

    /// UTC instant, truncated to whole seconds.
    pub fn to_datetime(&self) -> NtpResult<DateTime<Utc>> {
        let secs = self.unix_seconds()?;
        DateTime::from_timestamp(secs as i64, 0).ok_or(NtpError::PreUnixEpoch(self.seconds))
    }
}

/// Decoded NTP header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NtpPacket {
    /// Leap indicator (2 bits), version (3 bits), mode (3 bits)
    pub flags: u8,
    pub stratum: u8,
    pub poll: i8,
    pub precision: i8,
    pub root_delay: u32,
    pub root_dispersion: u32,
    pub reference_id: u32,
    pub reference_timestamp: NtpTimestamp,
    pub originate_timestamp: NtpTimestamp,
    pub receive_timestamp: NtpTimestamp,
    pub transmit_timestamp: NtpTimestamp,
}

impl NtpPacket {
    /// A client request: flags byte set, everything else zero.
    pub fn client_request() -> Self {
        Self {
            flags: CLIENT_REQUEST_FLAGS,
            ..Self::default()
        }
    }

    pub fn leap_indicator(&self) -> u8 {
        self.flags >> 6
    }

    pub fn version(&self) -> u8 {
        (self.flags >> 3) & 0x07
    }

    pub fn mode(&self) -> u8 {
        self.flags & 0x07
    }

    /// Decode the first 48 bytes of `data`; trailing extension fields are ignored.
    pub fn decode(data: &[u8]) -> NtpResult<Self> {
        if data.len() < NTP_PACKET_SIZE {
            return Err(NtpError::ShortPacket {
                expected: NTP_PACKET_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = &data[..NTP_PACKET_SIZE];
        Ok(Self {
            flags: buf.get_u8(),
            stratum: buf.get_u8(),
            poll: buf.get_i8(),
            precision: buf.get_i8(),
            root_delay: buf.get_u32(),
            root_dispersion: buf.get_u32(),
            reference_id: buf.get_u32(),
            reference_timestamp: NtpTimestamp::read(&mut buf),
            originate_timestamp: NtpTimestamp::read(&mut buf),
            receive_timestamp: NtpTimestamp::read(&mut buf),
            transmit_timestamp: NtpTimestamp::read(&mut buf),
        })
    }

    pub fn encode(&self) -> [u8; NTP_PACKET_SIZE] {
        let mut buf = BytesMut::with_capacity(NTP_PACKET_SIZE);
        buf.put_u8(self.flags);
        buf.put_u8(self.stratum);
        buf.put_i8(self.poll);
        buf.put_i8(self.precision);
        buf.put_u32(self.root_delay);
        buf.put_u32(self.root_dispersion);
        buf.put_u32(self.reference_id);
        self.reference_timestamp.write(&mut buf);
        self.originate_timestamp.write(&mut buf);
        self.receive_timestamp.write(&mut buf);
        self.transmit_timestamp.write(&mut buf);

        let mut out = [0u8; NTP_PACKET_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Server transmit time as UNIX seconds.
    pub fn transmit_unix_seconds(&self) -> NtpResult<u64> {
        self.transmit_timestamp.unix_seconds()
    }
}
