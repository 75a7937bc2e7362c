//! Scoped working directory for downloaded tiles.

use std::io;
use std::path::Path;

use tempfile::{Builder, TempDir};
use tracing::{debug, warn};

const DIR_PREFIX: &str = "himawari-tiles-";

/// A per-run directory holding `segment_{x}_{y}.png` files.
///
/// The directory name carries a random suffix, so two runs never share it.
/// It is removed by [`TileWorkspace::cleanup`] or, failing that, on drop.
#[derive(Debug)]
pub struct TileWorkspace {
    dir: TempDir,
}

impl TileWorkspace {
    /// Create the directory under `parent`, or under the system temp dir.
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(DIR_PREFIX);

        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };

        debug!(path = %dir.path().display(), "Created tile workspace");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the directory and its tiles. Best effort: a failure is logged
    /// and reported as `false`.
    pub fn cleanup(self) -> bool {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => {
                debug!(path = %path.display(), "Removed tile workspace");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to remove tile workspace");
                false
            }
        }
    }
}
