//! Tests for compose() over tiles stored on disk.
//!
//! Covers canvas geometry, exact placement, blank regions for missing or
//! bad tiles, and byte-identical output for identical input.

use std::path::Path;

use compositor::{compose, Canvas, StoredTile};
use himawari_common::{FailureStage, Granularity, TileCoord, TileGrid, TILE_RESOLUTION};
use image::RgbaImage;
use tempfile::TempDir;
use test_utils::{
    assert_region_blank, assert_region_eq, corrupt_png, encode_png, encode_rgba_png,
    pattern_tile, seed_for, solid_tile, tile_png,
};

// ============================================================================
// Helper functions
// ============================================================================

fn grid(g: u32) -> TileGrid {
    TileGrid::new(Granularity::new(g).unwrap(), TILE_RESOLUTION)
}

fn store(dir: &Path, coord: TileCoord, bytes: &[u8]) -> StoredTile {
    let path = dir.join(coord.file_name());
    std::fs::write(&path, bytes).unwrap();
    StoredTile::new(coord, path)
}

fn store_full_grid(dir: &Path, grid: TileGrid) -> Vec<StoredTile> {
    grid.coords()
        .map(|c| store(dir, c, &tile_png(c.x, c.y, TILE_RESOLUTION)))
        .collect()
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_canvas_dimensions_for_every_granularity() {
    for g in Granularity::SUPPORTED {
        let canvas = Canvas::blank(grid(g));
        assert_eq!(canvas.dimensions(), (g * 550, g * 550));
    }
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_full_grid_places_every_tile_exactly() {
    let dir = TempDir::new().unwrap();
    let grid = grid(2);
    let tiles = store_full_grid(dir.path(), grid);

    let composite = compose(grid, &tiles);

    assert_eq!(composite.placed.len(), 4);
    assert!(composite.failures.is_empty());
    assert!(!composite.is_blank());

    let image = composite.canvas.image();
    for coord in grid.coords() {
        let (left, top) = grid.pixel_offset(coord);
        let expected = pattern_tile(TILE_RESOLUTION, seed_for(coord.x, coord.y));
        assert_region_eq!(image, expected, left, top);
    }
}

#[test]
fn test_missing_tile_leaves_region_blank() {
    let dir = TempDir::new().unwrap();
    let grid = grid(2);
    let tiles: Vec<StoredTile> = store_full_grid(dir.path(), grid)
        .into_iter()
        .filter(|t| t.coord != TileCoord::new(1, 1))
        .collect();

    let composite = compose(grid, &tiles);

    assert_eq!(composite.placed.len(), 3);
    assert_region_blank!(composite.canvas.image(), 550, 550, 550);
    assert_region_eq!(
        composite.canvas.image(),
        pattern_tile(550, seed_for(0, 1)),
        0,
        550
    );
}

#[test]
fn test_rgba_tile_is_flattened_to_rgb() {
    let dir = TempDir::new().unwrap();
    let grid = grid(1);
    let rgba = RgbaImage::from_pixel(550, 550, image::Rgba([10, 20, 30, 255]));
    let tiles = vec![store(dir.path(), TileCoord::new(0, 0), &encode_rgba_png(&rgba))];

    let composite = compose(grid, &tiles);

    assert_eq!(composite.placed, vec![TileCoord::new(0, 0)]);
    assert_region_eq!(
        composite.canvas.image(),
        solid_tile(550, [10, 20, 30]),
        0,
        0
    );
}

// ============================================================================
// Per-tile failures
// ============================================================================

#[test]
fn test_corrupt_tile_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let grid = grid(2);
    let mut tiles = store_full_grid(dir.path(), grid);
    tiles[1] = store(dir.path(), TileCoord::new(1, 0), &corrupt_png());

    let composite = compose(grid, &tiles);

    assert_eq!(composite.placed.len(), 3);
    assert_eq!(composite.failures.len(), 1);
    assert_eq!(composite.failures[0].coord, TileCoord::new(1, 0));
    assert_eq!(composite.failures[0].stage, FailureStage::Composite);
    assert_region_blank!(composite.canvas.image(), 550, 0, 550);
}

#[test]
fn test_wrong_size_tile_is_rejected() {
    let dir = TempDir::new().unwrap();
    let grid = grid(2);
    let mut tiles = store_full_grid(dir.path(), grid);
    tiles[0] = store(
        dir.path(),
        TileCoord::new(0, 0),
        &encode_png(&solid_tile(500, [255, 255, 255])),
    );

    let composite = compose(grid, &tiles);

    assert_eq!(composite.failures.len(), 1);
    assert!(composite.failures[0].reason.contains("500x500"));
    assert_region_blank!(composite.canvas.image(), 0, 0, 550);
    // neighbours unaffected
    assert_region_eq!(
        composite.canvas.image(),
        pattern_tile(550, seed_for(1, 0)),
        550,
        0
    );
}

#[test]
fn test_unreadable_tile_is_reported() {
    let dir = TempDir::new().unwrap();
    let grid = grid(1);
    let tiles = vec![StoredTile::new(
        TileCoord::new(0, 0),
        dir.path().join("does_not_exist.png"),
    )];

    let composite = compose(grid, &tiles);

    assert!(composite.is_blank());
    assert_eq!(composite.failures.len(), 1);
    assert!(composite.failures[0].reason.contains("does_not_exist.png"));
}

#[test]
fn test_no_tiles_gives_blank_canvas() {
    let composite = compose(grid(1), &[]);
    assert!(composite.is_blank());
    assert_eq!(composite.canvas.dimensions(), (550, 550));
    assert_region_blank!(composite.canvas.image(), 0, 0, 550);
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_identical_inputs_give_identical_png() {
    let dir = TempDir::new().unwrap();
    let grid = grid(2);
    let tiles = store_full_grid(dir.path(), grid);

    let first = compose(grid, &tiles).canvas.encode_png().unwrap();
    let second = compose(grid, &tiles).canvas.encode_png().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_save_png_round_trips_pixels() {
    let dir = TempDir::new().unwrap();
    let grid = grid(1);
    let tiles = store_full_grid(dir.path(), grid);
    let composite = compose(grid, &tiles);

    let out = dir.path().join("full.png");
    composite.canvas.save_png(&out).unwrap();

    let reloaded = image::open(&out).unwrap().to_rgb8();
    assert_eq!(&reloaded, composite.canvas.image());
}
