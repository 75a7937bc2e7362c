//! himawari-wallpaper
//!
//! Downloads the latest Himawari full-disk snapshot, stitches the tiles
//! into one PNG and sets it as the desktop wallpaper. Runs once and exits;
//! schedule it with cron or a systemd timer for periodic updates.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use himawari_common::{Granularity, ImageryConfig, SnapshotTime, DEFAULT_BASE_URL, TILE_RESOLUTION};
use ntp_client::DEFAULT_NTP_SERVER;
use wallpaper_updater::config::DEFAULT_OUTPUT;
use wallpaper_updater::wallpaper::platform_default;
use wallpaper_updater::{
    CommandWallpaper, DownloadConfig, Pipeline, TimeSourceConfig, UpdaterConfig, WallpaperSetter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "himawari-wallpaper")]
#[command(about = "Set the latest Himawari full-disk image as the desktop wallpaper")]
struct Args {
    /// Tiles per side: 1, 2, 4, 8 or 16 (a trailing 'd' is accepted)
    #[arg(short, long, env = "HIMAWARI_GRANULARITY", default_value = "4")]
    granularity: Granularity,

    /// Tile edge length in pixels
    #[arg(long, env = "HIMAWARI_RESOLUTION", default_value_t = TILE_RESOLUTION)]
    resolution: u32,

    /// Tile server base URL
    #[arg(long, env = "HIMAWARI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Snapshot to fetch, as YYYY/MM/DD/HHMMSS (ignored with --ntp)
    #[arg(long, env = "HIMAWARI_TIMESTAMP")]
    timestamp: Option<SnapshotTime>,

    /// Pick the latest published snapshot using time from an NTP server
    #[arg(long, env = "HIMAWARI_NTP")]
    ntp: bool,

    /// NTP server (host:port)
    #[arg(long, env = "HIMAWARI_NTP_SERVER", default_value = DEFAULT_NTP_SERVER)]
    ntp_server: String,

    /// NTP reply timeout in seconds
    #[arg(long, env = "HIMAWARI_NTP_TIMEOUT_SECS", default_value = "5")]
    ntp_timeout_secs: u64,

    /// Per-tile HTTP timeout in seconds
    #[arg(long, env = "HIMAWARI_REQUEST_TIMEOUT_SECS", default_value = "30")]
    request_timeout_secs: u64,

    /// Composite image path
    #[arg(short, long, env = "HIMAWARI_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Parent directory for the temporary tile directory
    #[arg(long, env = "HIMAWARI_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Write the composite but leave the desktop alone
    #[arg(long, env = "HIMAWARI_NO_WALLPAPER")]
    no_wallpaper: bool,

    /// Custom wallpaper command; `{path}` is replaced by the image path
    #[arg(long, env = "HIMAWARI_WALLPAPER_COMMAND")]
    wallpaper_command: Option<String>,

    /// Write a JSON run report to this path
    #[arg(long, env = "HIMAWARI_REPORT")]
    report: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "json", env = "HIMAWARI_LOG_FORMAT")]
    log_format: LogFormat,
}

impl Args {
    fn updater_config(&self) -> UpdaterConfig {
        let time_source = if self.ntp {
            TimeSourceConfig::Ntp {
                server: self.ntp_server.clone(),
                timeout: Duration::from_secs(self.ntp_timeout_secs),
            }
        } else {
            self.timestamp
                .map(TimeSourceConfig::Static)
                .unwrap_or_default()
        };

        UpdaterConfig {
            imagery: ImageryConfig {
                base_url: self.base_url.clone(),
                granularity: self.granularity,
                resolution: self.resolution,
            },
            time_source,
            download: DownloadConfig {
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                ..DownloadConfig::default()
            },
            output_path: self.output.clone(),
            work_dir: self.work_dir.clone(),
            report_path: self.report.clone(),
        }
    }

    fn wallpaper_setter(&self) -> Result<Option<Box<dyn WallpaperSetter>>> {
        if self.no_wallpaper {
            return Ok(None);
        }
        match &self.wallpaper_command {
            Some(template) => {
                let setter = CommandWallpaper::parse(template)
                    .context("Invalid --wallpaper-command")?;
                Ok(Some(Box::new(setter)))
            }
            None => Ok(Some(platform_default())),
        }
    }
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt().with_env_filter(filter).with_target(true).with_level(true);
    match args.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    info!(
        granularity = %args.granularity,
        resolution = args.resolution,
        ntp = args.ntp,
        "Starting himawari wallpaper update"
    );

    let config = args.updater_config();
    let wallpaper = args.wallpaper_setter()?;

    let pipeline = Pipeline::new(config, wallpaper)?;
    let report = pipeline.run().await?;

    info!(
        snapshot = %report.snapshot,
        path = %report.output_path.display(),
        placed = report.placed.len(),
        total = report.tiles_total,
        "Done"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["himawari-wallpaper"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Json);
        let config = args.updater_config();
        assert_eq!(config.imagery, ImageryConfig::default());
        assert_eq!(config.time_source, TimeSourceConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_args_pretty_log_format() {
        let args =
            Args::try_parse_from(["himawari-wallpaper", "--log-format", "pretty"]).unwrap();
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_args_ntp_and_granularity() {
        let args = Args::try_parse_from([
            "himawari-wallpaper",
            "--granularity",
            "8d",
            "--ntp",
            "--ntp-server",
            "time.example.org:123",
        ])
        .unwrap();
        let config = args.updater_config();
        assert_eq!(config.imagery.granularity.get(), 8);
        assert_eq!(
            config.time_source,
            TimeSourceConfig::Ntp {
                server: "time.example.org:123".to_string(),
                timeout: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn test_args_reject_bad_granularity() {
        assert!(Args::try_parse_from(["himawari-wallpaper", "--granularity", "3"]).is_err());
    }

    #[test]
    fn test_args_static_timestamp() {
        let args =
            Args::try_parse_from(["himawari-wallpaper", "--timestamp", "2024/12/30/052000"])
                .unwrap();
        match args.updater_config().time_source {
            TimeSourceConfig::Static(time) => assert_eq!(time.to_string(), "2024/12/30/052000"),
            other => panic!("expected static time source, got {:?}", other),
        }
    }

    #[test]
    fn test_no_wallpaper_disables_setter() {
        let args = Args::try_parse_from(["himawari-wallpaper", "--no-wallpaper"]).unwrap();
        assert!(args.wallpaper_setter().unwrap().is_none());

        let args =
            Args::try_parse_from(["himawari-wallpaper", "--wallpaper-command", "feh --bg-fill"])
                .unwrap();
        assert_eq!(args.wallpaper_setter().unwrap().unwrap().name(), "command");
    }
}
