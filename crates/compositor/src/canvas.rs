//! The composite canvas.

use std::io::Cursor;
use std::path::Path;

use himawari_common::{TileCoord, TileGrid};
use image::{imageops, DynamicImage, GenericImage, GenericImageView, ImageFormat, RgbImage};

use crate::error::{CompositeError, CompositeResult};

/// A `(G·R) × (G·R)` RGB bitmap, black until tiles are pasted.
#[derive(Debug, Clone)]
pub struct Canvas {
    grid: TileGrid,
    image: RgbImage,
}

impl Canvas {
    pub fn blank(grid: TileGrid) -> Self {
        let size = grid.canvas_size();
        Self {
            grid,
            image: RgbImage::new(size, size),
        }
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Decode PNG bytes into an RGB tile of exactly `R × R` pixels.
    pub fn decode_tile(&self, bytes: &[u8]) -> CompositeResult<RgbImage> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| CompositeError::decode(e.to_string()))?;

        let expected = self.grid.resolution;
        if decoded.width() != expected || decoded.height() != expected {
            return Err(CompositeError::SizeMismatch {
                expected,
                width: decoded.width(),
                height: decoded.height(),
            });
        }

        Ok(decoded.to_rgb8())
    }

    /// Copy `tile` into the region of `coord`, pixel for pixel.
    pub fn paste(&mut self, coord: TileCoord, tile: &RgbImage) -> CompositeResult<()> {
        if !self.grid.contains(coord) {
            return Err(CompositeError::OutOfBounds(coord));
        }

        let expected = self.grid.resolution;
        if tile.dimensions() != (expected, expected) {
            return Err(CompositeError::SizeMismatch {
                expected,
                width: tile.width(),
                height: tile.height(),
            });
        }

        let (left, top) = self.grid.pixel_offset(coord);
        self.image
            .copy_from(tile, left, top)
            .map_err(|_| CompositeError::OutOfBounds(coord))
    }

    /// Decode and paste in one step.
    pub fn paste_png(&mut self, coord: TileCoord, bytes: &[u8]) -> CompositeResult<()> {
        let tile = self.decode_tile(bytes)?;
        self.paste(coord, &tile)
    }

    /// A copy of the `R × R` region belonging to `coord`.
    pub fn tile_region(&self, coord: TileCoord) -> CompositeResult<RgbImage> {
        if !self.grid.contains(coord) {
            return Err(CompositeError::OutOfBounds(coord));
        }
        let (left, top) = self.grid.pixel_offset(coord);
        let size = self.grid.resolution;
        Ok(imageops::crop_imm(&self.image, left, top, size, size).to_image())
    }

    pub fn encode_png(&self) -> CompositeResult<Vec<u8>> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(self.image.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| CompositeError::encode(e.to_string()))?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: &Path) -> CompositeResult<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| CompositeError::encode(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use himawari_common::Granularity;
    use test_utils::{encode_png, pattern_tile, solid_tile};

    fn grid(g: u32, resolution: u32) -> TileGrid {
        TileGrid::new(Granularity::new(g).unwrap(), resolution)
    }

    #[test]
    fn test_blank_canvas_is_black() {
        let canvas = Canvas::blank(grid(2, 8));
        assert_eq!(canvas.dimensions(), (16, 16));
        assert!(canvas.image().pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_paste_places_tile_at_offset() {
        let mut canvas = Canvas::blank(grid(2, 8));
        let tile = pattern_tile(8, 3);
        canvas.paste(TileCoord::new(1, 0), &tile).unwrap();

        assert_eq!(canvas.tile_region(TileCoord::new(1, 0)).unwrap(), tile);
        assert_eq!(canvas.image().get_pixel(8, 0), tile.get_pixel(0, 0));
        assert_eq!(canvas.image().get_pixel(7, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_paste_rejects_out_of_grid() {
        let mut canvas = Canvas::blank(grid(2, 8));
        let err = canvas
            .paste(TileCoord::new(2, 0), &solid_tile(8, [1, 2, 3]))
            .unwrap_err();
        assert!(matches!(err, CompositeError::OutOfBounds(c) if c == TileCoord::new(2, 0)));
    }

    #[test]
    fn test_decode_rejects_wrong_size() {
        let canvas = Canvas::blank(grid(1, 8));
        let bytes = encode_png(&solid_tile(7, [9, 9, 9]));
        match canvas.decode_tile(&bytes) {
            Err(CompositeError::SizeMismatch {
                expected,
                width,
                height,
            }) => {
                assert_eq!((expected, width, height), (8, 7, 7));
            }
            other => panic!("expected SizeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let canvas = Canvas::blank(grid(1, 8));
        assert!(matches!(
            canvas.decode_tile(b"not a png"),
            Err(CompositeError::Decode(_))
        ));
    }

    #[test]
    fn test_encode_png_is_deterministic() {
        let mut canvas = Canvas::blank(grid(2, 8));
        canvas
            .paste_png(TileCoord::new(0, 1), &encode_png(&pattern_tile(8, 5)))
            .unwrap();
        assert_eq!(canvas.encode_png().unwrap(), canvas.encode_png().unwrap());
    }
}
