//! Sequential tile downloader.
//!
//! Each tile of the grid is requested once, in row-major order; the next
//! request starts only after the previous one finished or timed out.
//! A tile that does not come back with `200 OK` is logged and skipped:
//! no retries, no placeholder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use compositor::StoredTile;
use himawari_common::{ImageryConfig, SnapshotTime, TileFailure};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Configuration for the tile downloader.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Upper bound for one tile request, body included
    pub request_timeout: Duration,
    /// Upper bound for establishing a connection
    pub connect_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Why a single tile was not stored.
#[derive(Debug, Error)]
pub enum TileFetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(StatusCode),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of one pass over the grid.
#[derive(Debug, Default)]
pub struct FetchPass {
    pub stored: Vec<StoredTile>,
    pub failures: Vec<TileFailure>,
}

/// Downloads tiles over one shared HTTP client.
pub struct TileDownloader {
    client: Client,
}

impl TileDownloader {
    /// Create a new downloader with the given configuration.
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// GET one tile; anything but `200 OK` is an error.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, TileFetchError> {
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.bytes().await?),
            status => Err(TileFetchError::Status(status)),
        }
    }

    /// GET one tile and write the raw body to `dest`.
    pub async fn download_tile(&self, url: &str, dest: &Path) -> Result<u64, TileFetchError> {
        let body = self.fetch(url).await?;

        fs::write(dest, &body)
            .await
            .map_err(|source| TileFetchError::Write {
                path: dest.to_path_buf(),
                source,
            })?;

        Ok(body.len() as u64)
    }

    /// Request every tile of the grid in row-major order and store the
    /// successful ones under `dir` as `segment_{x}_{y}.png`.
    #[instrument(skip_all, fields(snapshot = %time, granularity = %imagery.granularity))]
    pub async fn fetch_grid(
        &self,
        imagery: &ImageryConfig,
        time: &SnapshotTime,
        dir: &Path,
    ) -> FetchPass {
        let grid = imagery.grid();
        let total = grid.tile_count();
        let mut pass = FetchPass::default();

        info!(tiles = total, dir = %dir.display(), "Downloading tiles");

        for (index, coord) in grid.coords().enumerate() {
            let url = imagery.tile_url(time, coord);
            let dest = dir.join(coord.file_name());

            match self.download_tile(&url, &dest).await {
                Ok(bytes) => {
                    info!(
                        x = coord.x,
                        y = coord.y,
                        bytes = bytes,
                        progress = format!("{}/{}", index + 1, total),
                        "Tile downloaded"
                    );
                    pass.stored.push(StoredTile::new(coord, dest));
                }
                Err(e) => {
                    warn!(x = coord.x, y = coord.y, url = %url, error = %e, "Tile download failed");
                    pass.failures.push(TileFailure::fetch(coord, e));
                }
            }
        }

        debug!(
            stored = pass.stored.len(),
            failed = pass.failures.len(),
            "Download pass finished"
        );
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts_are_bounded() {
        let config = DownloadConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.connect_timeout <= config.request_timeout);
    }

    #[test]
    fn test_status_error_message() {
        let err = TileFetchError::Status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "HTTP status 404 Not Found");
    }

    #[test]
    fn test_downloader_builds() {
        assert!(TileDownloader::new(&DownloadConfig::default()).is_ok());
    }
}
