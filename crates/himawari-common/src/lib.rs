//! Common types shared by the Himawari wallpaper crates.

pub mod config;
pub mod error;
pub mod tile;
pub mod time;

pub use config::{ImageryConfig, DEFAULT_BASE_URL, MAX_CANVAS_SIZE, TILE_RESOLUTION};
pub use error::{HimawariError, HimawariResult};
pub use tile::{FailureStage, Granularity, TileCoord, TileFailure, TileGrid};
pub use time::SnapshotTime;
