//! Shared test utilities for the himawari-wallpaper workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic tile image generators
//! - NTP reply fixtures
//! - Local UDP responders standing in for an NTP server
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{pattern_tile, spawn_ntp_responder};
//! ```

pub mod fixtures;
pub mod generators;
pub mod net;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use net::*;

/// Asserts that a `width × height` region of `image` starting at
/// `(left, top)` equals `expected` pixel for pixel.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_region_eq;
///
/// assert_region_eq!(canvas, tile, 550, 1100);
/// ```
#[macro_export]
macro_rules! assert_region_eq {
    ($image:expr, $expected:expr, $left:expr, $top:expr) => {{
        let image = &$image;
        let expected = &$expected;
        let (left, top): (u32, u32) = ($left, $top);
        for (x, y, pixel) in expected.enumerate_pixels() {
            let actual = image.get_pixel(left + x, top + y);
            if actual != pixel {
                panic!(
                    "region mismatch at ({}, {}): expected {:?}, got {:?}",
                    left + x,
                    top + y,
                    pixel,
                    actual
                );
            }
        }
    }};
}

/// Asserts that every pixel of a `size × size` region is `[0, 0, 0]`.
#[macro_export]
macro_rules! assert_region_blank {
    ($image:expr, $left:expr, $top:expr, $size:expr) => {{
        let image = &$image;
        let (left, top, size): (u32, u32, u32) = ($left, $top, $size);
        for y in top..top + size {
            for x in left..left + size {
                let pixel = image.get_pixel(x, y);
                if pixel.0 != [0, 0, 0] {
                    panic!("expected blank pixel at ({}, {}), got {:?}", x, y, pixel);
                }
            }
        }
    }};
}
