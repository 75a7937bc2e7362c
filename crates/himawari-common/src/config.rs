//! Imagery source configuration.

use serde::{Deserialize, Serialize};

use crate::error::{HimawariError, HimawariResult};
use crate::tile::{Granularity, TileCoord, TileGrid};
use crate::time::SnapshotTime;

/// Full-disk true-color product on the NICT mirror.
pub const DEFAULT_BASE_URL: &str = "https://himawari8-dl.nict.go.jp/himawari8/img/D531106";

/// Edge length of every published tile, in pixels.
pub const TILE_RESOLUTION: u32 = 550;

/// Largest accepted canvas edge (G·R) in pixels; about 800 MB of RGB.
pub const MAX_CANVAS_SIZE: u32 = 16_384;

/// Where and at which detail level tiles are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageryConfig {
    pub base_url: String,
    pub granularity: Granularity,
    pub resolution: u32,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            granularity: Granularity::default(),
            resolution: TILE_RESOLUTION,
        }
    }
}

impl ImageryConfig {
    pub fn new(base_url: impl Into<String>, granularity: Granularity, resolution: u32) -> Self {
        Self {
            base_url: base_url.into(),
            granularity,
            resolution,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> HimawariResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(HimawariError::invalid_config(
                "base_url",
                format!("expected an http(s) URL, got '{}'", self.base_url),
            ));
        }
        if self.resolution == 0 {
            return Err(HimawariError::invalid_config(
                "resolution",
                "must be greater than zero",
            ));
        }
        match self.granularity.get().checked_mul(self.resolution) {
            Some(size) if size <= MAX_CANVAS_SIZE => Ok(()),
            _ => Err(HimawariError::invalid_config(
                "resolution",
                format!(
                    "{} tiles of {} px exceed the {} px canvas limit",
                    self.granularity, self.resolution, MAX_CANVAS_SIZE
                ),
            )),
        }
    }

    pub fn grid(&self) -> TileGrid {
        TileGrid::new(self.granularity, self.resolution)
    }

    /// `{base}/{G}d/{R}/{timestamp}_{x}_{y}.png`
    pub fn tile_url(&self, time: &SnapshotTime, coord: TileCoord) -> String {
        format!(
            "{}/{}/{}/{}_{}_{}.png",
            self.base_url.trim_end_matches('/'),
            self.granularity,
            self.resolution,
            time,
            coord.x,
            coord.y
        )
    }
}
