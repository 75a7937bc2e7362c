//! Chooses which snapshot to fetch.

use himawari_common::SnapshotTime;
use ntp_client::{NtpClient, NtpError};
use thiserror::Error;
use tracing::info;

/// Resolution failed; no tile may be fetched for this run.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("NTP query to {server} failed: {source}")]
    Ntp {
        server: String,
        #[source]
        source: NtpError,
    },
}

/// Where the snapshot timestamp comes from. One strategy per run.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    /// A fixed, operator-chosen snapshot
    Static(SnapshotTime),
    /// Network time minus the publication delay, rounded down
    Ntp(NtpClient),
}

impl Default for SnapshotSource {
    fn default() -> Self {
        Self::Static(SnapshotTime::default_static())
    }
}

impl SnapshotSource {
    pub async fn resolve_snapshot_time(&self) -> Result<SnapshotTime, ResolveError> {
        match self {
            Self::Static(time) => {
                info!(snapshot = %time, "Using static snapshot");
                Ok(*time)
            }
            Self::Ntp(client) => {
                let now = client.fetch_time().await.map_err(|source| ResolveError::Ntp {
                    server: client.server().to_string(),
                    source,
                })?;
                let snapshot = SnapshotTime::latest_available(now);
                info!(ntp_time = %now, snapshot = %snapshot, "Resolved snapshot from NTP");
                Ok(snapshot)
            }
        }
    }
}
