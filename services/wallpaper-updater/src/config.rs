//! Run configuration for the wallpaper updater.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use himawari_common::{ImageryConfig, SnapshotTime};
use ntp_client::{NtpClient, DEFAULT_NTP_SERVER, DEFAULT_TIMEOUT};

use crate::download::DownloadConfig;
use crate::resolver::SnapshotSource;

/// Default composite file name, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "himawari_full_image.png";

/// How the snapshot time is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSourceConfig {
    Static(SnapshotTime),
    Ntp { server: String, timeout: Duration },
}

impl Default for TimeSourceConfig {
    fn default() -> Self {
        Self::Static(SnapshotTime::default_static())
    }
}

impl TimeSourceConfig {
    pub fn ntp_default() -> Self {
        Self::Ntp {
            server: DEFAULT_NTP_SERVER.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn build(&self) -> SnapshotSource {
        match self {
            Self::Static(time) => SnapshotSource::Static(*time),
            Self::Ntp { server, timeout } => {
                SnapshotSource::Ntp(NtpClient::new(server.clone(), *timeout))
            }
        }
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub imagery: ImageryConfig,
    pub time_source: TimeSourceConfig,
    pub download: DownloadConfig,
    /// Where the composite is written
    pub output_path: PathBuf,
    /// Parent of the per-run tile directory (system temp dir when unset)
    pub work_dir: Option<PathBuf>,
    /// Optional JSON run report
    pub report_path: Option<PathBuf>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            imagery: ImageryConfig::default(),
            time_source: TimeSourceConfig::default(),
            download: DownloadConfig::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            work_dir: None,
            report_path: None,
        }
    }
}

impl UpdaterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.imagery.validate()?;

        if self.output_path.file_name().is_none() {
            bail!(
                "Output path '{}' does not name a file",
                self.output_path.display()
            );
        }
        if self.download.request_timeout.is_zero() {
            bail!("Request timeout must be greater than zero");
        }
        if let TimeSourceConfig::Ntp { timeout, .. } = &self.time_source {
            if timeout.is_zero() {
                bail!("NTP timeout must be greater than zero");
            }
        }
        Ok(())
    }

    /// Output path made absolute against the current directory; the
    /// wallpaper setters require an absolute path.
    pub fn absolute_output_path(&self) -> Result<PathBuf> {
        absolute(&self.output_path)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = UpdaterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.time_source,
            TimeSourceConfig::Static(SnapshotTime::default_static())
        );
    }

    #[test]
    fn test_absolute_output_path() {
        let config = UpdaterConfig::default();
        let path = config.absolute_output_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with(DEFAULT_OUTPUT));
    }

    #[test]
    fn test_validate_rejects_directory_output() {
        let config = UpdaterConfig {
            output_path: PathBuf::from("/"),
            ..UpdaterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ntp_timeout() {
        let config = UpdaterConfig {
            time_source: TimeSourceConfig::Ntp {
                server: "localhost:123".to_string(),
                timeout: Duration::ZERO,
            },
            ..UpdaterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_resolution() {
        let config = UpdaterConfig {
            imagery: ImageryConfig::new(
                himawari_common::DEFAULT_BASE_URL,
                himawari_common::Granularity::new(16).unwrap(),
                300_000_000,
            ),
            ..UpdaterConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("resolution"));
        assert!(crate::Pipeline::new(config, None).is_err());
    }

    #[test]
    fn test_build_time_source() {
        assert!(matches!(
            TimeSourceConfig::default().build(),
            SnapshotSource::Static(_)
        ));
        match TimeSourceConfig::ntp_default().build() {
            SnapshotSource::Ntp(client) => assert_eq!(client.server(), DEFAULT_NTP_SERVER),
            other => panic!("expected NTP source, got {:?}", other),
        }
    }
}
