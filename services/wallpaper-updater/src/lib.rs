//! Himawari wallpaper updater.
//!
//! Fetches the tiles of one full-disk snapshot, stitches them into a
//! single image and hands that image to the desktop:
//! - snapshot time from a static value or from an NTP server
//! - sequential tile downloads into a scoped temporary directory
//! - per-tile failures skipped, leaving that region black
//! - wallpaper setting behind a per-platform trait

pub mod config;
pub mod download;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod wallpaper;
pub mod workspace;

pub use config::{TimeSourceConfig, UpdaterConfig};
pub use download::{DownloadConfig, FetchPass, TileDownloader, TileFetchError};
pub use pipeline::{fetch_and_composite, Pipeline};
pub use report::{RunReport, WallpaperOutcome};
pub use resolver::{ResolveError, SnapshotSource};
pub use wallpaper::{CommandWallpaper, WallpaperSetter};
pub use workspace::TileWorkspace;
