//! Single-shot UDP query against an NTP server.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, instrument, warn};

use crate::error::{NtpError, NtpResult};
use crate::packet::{NtpPacket, MODE_SERVER, NTP_PACKET_SIZE};

/// Public pool queried when no server is configured.
pub const DEFAULT_NTP_SERVER: &str = "pool.ntp.org:123";

/// Receive timeout for one query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive buffer size; large enough to detect extension fields.
const RECV_BUFFER_SIZE: usize = 512;

/// Queries one NTP server, once.
#[derive(Debug, Clone)]
pub struct NtpClient {
    server: String,
    timeout: Duration,
}

impl Default for NtpClient {
    fn default() -> Self {
        Self::new(DEFAULT_NTP_SERVER, DEFAULT_TIMEOUT)
    }
}

impl NtpClient {
    /// `server` is a `host:port` pair; it is resolved on every query.
    pub fn new(server: impl Into<String>, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            timeout,
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one client request and return the decoded reply.
    ///
    /// The whole exchange (resolve, send, receive) is bounded by the
    /// configured timeout.
    #[instrument(skip(self), fields(server = %self.server))]
    pub async fn query(&self) -> NtpResult<NtpPacket> {
        match tokio::time::timeout(self.timeout, self.exchange()).await {
            Ok(result) => result,
            Err(_) => Err(NtpError::Timeout {
                server: self.server.clone(),
                timeout: self.timeout,
            }),
        }
    }

    /// Server transmit time, truncated to whole seconds.
    pub async fn fetch_time(&self) -> NtpResult<DateTime<Utc>> {
        let packet = self.query().await?;
        let time = packet.transmit_timestamp.to_datetime()?;
        debug!(time = %time, stratum = packet.stratum, "Received NTP time");
        Ok(time)
    }

    async fn exchange(&self) -> NtpResult<NtpPacket> {
        let addr = lookup_host(self.server.as_str()).await?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no address found for {}", self.server),
            )
        })?;

        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(addr).await?;

        let request = NtpPacket::client_request().encode();
        socket.send(&request).await?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let len = socket.recv(&mut buf).await?;
        debug!(bytes = len, "Received NTP reply");

        let packet = NtpPacket::decode(&buf[..len])?;
        if packet.mode() != MODE_SERVER {
            warn!(mode = packet.mode(), "NTP reply is not in server mode");
        }
        if len > NTP_PACKET_SIZE {
            debug!(extra = len - NTP_PACKET_SIZE, "Ignoring NTP extension fields");
        }
        Ok(packet)
    }
}
