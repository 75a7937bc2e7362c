//! Test data generators for synthetic satellite tiles.
//!
//! These generators create predictable, verifiable pixel patterns so a
//! composite can be checked region by region.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};

/// Creates a tile filled with a single color.
pub fn solid_tile(size: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(size, size, Rgb(color))
}

/// Creates a tile whose pixels depend on both position and `seed`.
///
/// Each pixel is `[x + seed, y + 2 * seed, x ^ y]` (wrapping), so two tiles
/// with different seeds differ almost everywhere and a shifted paste is
/// caught immediately.
///
/// # Example
///
/// ```
/// use test_utils::pattern_tile;
///
/// let tile = pattern_tile(4, 1);
/// assert_eq!(tile.get_pixel(0, 0).0, [1, 2, 0]);
/// assert_eq!(tile.get_pixel(3, 2).0, [4, 4, 1]);
/// ```
pub fn pattern_tile(size: u32, seed: u8) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        Rgb([
            (x as u8).wrapping_add(seed),
            (y as u8).wrapping_add(seed.wrapping_mul(2)),
            (x as u8) ^ (y as u8),
        ])
    })
}

/// Seed used for the tile at `(x, y)` so every cell gets its own pattern.
pub fn seed_for(x: u32, y: u32) -> u8 {
    (y * 16 + x + 1) as u8
}

/// Encodes an RGB image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding of an in-memory image cannot fail");
    bytes
}

/// Encodes an RGBA image as PNG bytes (tiles served with an alpha channel).
pub fn encode_rgba_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding of an in-memory image cannot fail");
    bytes
}

/// PNG bytes of the pattern tile for cell `(x, y)`.
pub fn tile_png(x: u32, y: u32, size: u32) -> Vec<u8> {
    encode_png(&pattern_tile(size, seed_for(x, y)))
}

/// Bytes that carry a PNG signature but no decodable image.
pub fn corrupt_png() -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
    bytes
}
