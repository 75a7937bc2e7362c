//! Error types for tile compositing.

use std::path::PathBuf;

use himawari_common::TileCoord;
use thiserror::Error;

/// Errors that can occur while placing a tile or writing the canvas.
#[derive(Error, Debug)]
pub enum CompositeError {
    /// The stored tile could not be read back.
    #[error("failed to read tile from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tile bytes are not a decodable PNG.
    #[error("failed to decode tile: {0}")]
    Decode(String),

    /// The tile decoded to the wrong size.
    #[error("tile is {width}x{height}, expected {expected}x{expected}")]
    SizeMismatch { expected: u32, width: u32, height: u32 },

    /// The coordinate lies outside the canvas grid.
    #[error("tile {0} is outside the grid")]
    OutOfBounds(TileCoord),

    /// The canvas could not be encoded or written.
    #[error("failed to encode canvas: {0}")]
    Encode(String),
}

impl CompositeError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

/// Result type for compositing operations.
pub type CompositeResult<T> = std::result::Result<T, CompositeError>;
