//! Second half of a fetch pass: stored tiles in, composite out.

use std::path::PathBuf;

use himawari_common::{TileCoord, TileFailure, TileGrid};
use tracing::{debug, info, warn};

use crate::canvas::Canvas;
use crate::error::{CompositeError, CompositeResult};

/// A tile whose raw bytes were written to disk by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTile {
    pub coord: TileCoord,
    pub path: PathBuf,
}

impl StoredTile {
    pub fn new(coord: TileCoord, path: impl Into<PathBuf>) -> Self {
        Self {
            coord,
            path: path.into(),
        }
    }

    fn read(&self) -> CompositeResult<Vec<u8>> {
        std::fs::read(&self.path).map_err(|source| CompositeError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// A finished canvas plus what went into it.
#[derive(Debug)]
pub struct Composite {
    pub canvas: Canvas,
    /// Tiles pasted, in paste order
    pub placed: Vec<TileCoord>,
    /// Tiles that were stored but could not be placed
    pub failures: Vec<TileFailure>,
}

impl Composite {
    /// True when no tile made it onto the canvas.
    pub fn is_blank(&self) -> bool {
        self.placed.is_empty()
    }
}

/// Paste every stored tile into a fresh canvas.
///
/// A tile that cannot be read, decoded, validated or pasted is recorded in
/// `failures` and its region stays black; it never aborts the rest.
pub fn compose(grid: TileGrid, tiles: &[StoredTile]) -> Composite {
    let mut canvas = Canvas::blank(grid);
    let mut placed = Vec::with_capacity(tiles.len());
    let mut failures = Vec::new();

    for tile in tiles {
        let result = tile
            .read()
            .and_then(|bytes| canvas.paste_png(tile.coord, &bytes));

        match result {
            Ok(()) => {
                debug!(x = tile.coord.x, y = tile.coord.y, "Pasted tile");
                placed.push(tile.coord);
            }
            Err(e) => {
                warn!(
                    x = tile.coord.x,
                    y = tile.coord.y,
                    path = %tile.path.display(),
                    error = %e,
                    "Skipping tile"
                );
                failures.push(TileFailure::composite(tile.coord, e));
            }
        }
    }

    let (width, height) = canvas.dimensions();
    info!(
        placed = placed.len(),
        failed = failures.len(),
        width = width,
        height = height,
        "Composite assembled"
    );

    Composite {
        canvas,
        placed,
        failures,
    }
}
