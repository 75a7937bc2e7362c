//! Tile compositing for full-disk imagery.
//!
//! Takes the tiles stored by a fetch pass and pastes each one into a
//! blank canvas at its grid offset:
//! - tiles are decoded as PNG and converted to 8-bit RGB
//! - tiles that are not exactly `resolution × resolution` are rejected
//! - a tile that cannot be read or decoded is reported and skipped,
//!   leaving its region black

pub mod canvas;
pub mod compose;
pub mod error;

pub use canvas::Canvas;
pub use compose::{compose, Composite, StoredTile};
pub use error::{CompositeError, CompositeResult};
