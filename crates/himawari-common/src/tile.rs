//! Tile grid geometry for the full-disk imagery.
//!
//! The remote service splits one snapshot into a square grid of
//! `granularity × granularity` tiles, each `resolution` pixels on a side.
//! Tile `(x, y)` covers the canvas region starting at `(x * R, y * R)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HimawariError, HimawariResult};

/// A tile position within the grid (column x, row y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// File name used when the tile is stored on disk.
    pub fn file_name(&self) -> String {
        format!("segment_{}_{}.png", self.x, self.y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Pipeline stage at which a tile was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    /// Download or storage of the raw bytes
    Fetch,
    /// Read, decode, validation or paste of a stored tile
    Composite,
}

/// A tile left out of the composite, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileFailure {
    pub coord: TileCoord,
    pub stage: FailureStage,
    pub reason: String,
}

impl TileFailure {
    pub fn fetch(coord: TileCoord, reason: impl ToString) -> Self {
        Self {
            coord,
            stage: FailureStage::Fetch,
            reason: reason.to_string(),
        }
    }

    pub fn composite(coord: TileCoord, reason: impl ToString) -> Self {
        Self {
            coord,
            stage: FailureStage::Composite,
            reason: reason.to_string(),
        }
    }
}

/// Detail level of a snapshot: the number of tiles along each edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Granularity(u32);

impl Granularity {
    /// Detail levels published by the imagery service.
    pub const SUPPORTED: [u32; 5] = [1, 2, 4, 8, 16];

    pub fn new(value: u32) -> HimawariResult<Self> {
        if Self::SUPPORTED.contains(&value) {
            Ok(Self(value))
        } else {
            Err(HimawariError::InvalidGranularity(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of tiles in a full pass (G²).
    pub fn tile_count(self) -> usize {
        (self.0 * self.0) as usize
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self(4)
    }
}

impl TryFrom<u32> for Granularity {
    type Error = HimawariError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Granularity> for u32 {
    fn from(value: Granularity) -> Self {
        value.0
    }
}

impl FromStr for Granularity {
    type Err = HimawariError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('d');
        let value = trimmed.parse::<u32>().map_err(|_| {
            HimawariError::invalid_config("granularity", format!("not a number: '{}'", s))
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.0)
    }
}

/// Geometry of one fetch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    pub granularity: Granularity,
    /// Tile edge length in pixels
    pub resolution: u32,
}

impl TileGrid {
    pub fn new(granularity: Granularity, resolution: u32) -> Self {
        Self {
            granularity,
            resolution,
        }
    }

    /// Canvas edge length in pixels (G·R).
    ///
    /// `ImageryConfig::validate` bounds G·R by `MAX_CANVAS_SIZE`, so a grid
    /// built from a validated config cannot overflow here or in
    /// [`pixel_offset`](Self::pixel_offset).
    pub fn canvas_size(&self) -> u32 {
        self.granularity.get() * self.resolution
    }

    pub fn tile_count(&self) -> usize {
        self.granularity.tile_count()
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        let g = self.granularity.get();
        coord.x < g && coord.y < g
    }

    /// Top-left canvas pixel of a tile.
    pub fn pixel_offset(&self, coord: TileCoord) -> (u32, u32) {
        (coord.x * self.resolution, coord.y * self.resolution)
    }

    /// Every tile coordinate in row-major order: all x for y = 0, then y = 1, ...
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let g = self.granularity.get();
        (0..g).flat_map(move |y| (0..g).map(move |x| TileCoord::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_supported_values() {
        for value in Granularity::SUPPORTED {
            assert_eq!(Granularity::new(value).unwrap().get(), value);
        }
    }

    #[test]
    fn test_granularity_rejects_unsupported() {
        for value in [0, 3, 5, 20, 32] {
            assert!(matches!(
                Granularity::new(value),
                Err(HimawariError::InvalidGranularity(v)) if v == value
            ));
        }
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("8".parse::<Granularity>().unwrap().get(), 8);
        assert_eq!("16d".parse::<Granularity>().unwrap().get(), 16);
        assert!("four".parse::<Granularity>().is_err());
        assert!("3".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_granularity_display() {
        assert_eq!(Granularity::new(4).unwrap().to_string(), "4d");
    }

    #[test]
    fn test_tile_coord_file_name() {
        assert_eq!(TileCoord::new(2, 3).file_name(), "segment_2_3.png");
    }

    #[test]
    fn test_pixel_offset() {
        let grid = TileGrid::new(Granularity::new(4).unwrap(), 550);
        assert_eq!(grid.pixel_offset(TileCoord::new(0, 0)), (0, 0));
        assert_eq!(grid.pixel_offset(TileCoord::new(2, 3)), (1100, 1650));
    }

    #[test]
    fn test_coords_row_major() {
        let grid = TileGrid::new(Granularity::new(2).unwrap(), 550);
        let coords: Vec<_> = grid.coords().collect();
        assert_eq!(
            coords,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_contains() {
        let grid = TileGrid::new(Granularity::new(2).unwrap(), 550);
        assert!(grid.contains(TileCoord::new(1, 1)));
        assert!(!grid.contains(TileCoord::new(2, 0)));
        assert!(!grid.contains(TileCoord::new(0, 2)));
    }
}
