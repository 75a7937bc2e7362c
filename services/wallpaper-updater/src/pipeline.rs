//! One run: resolve snapshot, fetch tiles, composite, persist, apply.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use compositor::{compose, Composite};
use himawari_common::{ImageryConfig, SnapshotTime};
use tracing::{error, info, instrument};

use crate::config::UpdaterConfig;
use crate::download::TileDownloader;
use crate::report::{RunReport, WallpaperOutcome};
use crate::resolver::SnapshotSource;
use crate::wallpaper::WallpaperSetter;
use crate::workspace::TileWorkspace;

/// Download every tile of the grid into `dir`, then paste the stored ones
/// into a fresh canvas.
///
/// Per-tile problems never fail this call: fetch failures and composite
/// failures both end up in `Composite::failures` (fetch failures first).
/// A composite with no placed tiles is returned as is.
#[instrument(skip_all, fields(snapshot = %time))]
pub async fn fetch_and_composite(
    downloader: &TileDownloader,
    imagery: &ImageryConfig,
    time: SnapshotTime,
    dir: &Path,
) -> Result<Composite> {
    let pass = downloader.fetch_grid(imagery, &time, dir).await;

    info!(stored = pass.stored.len(), "Compositing tiles");
    let grid = imagery.grid();
    let stored = pass.stored;
    let mut composite = tokio::task::spawn_blocking(move || compose(grid, &stored))
        .await
        .context("Compositing task failed")?;

    let mut failures = pass.failures;
    failures.append(&mut composite.failures);
    composite.failures = failures;

    Ok(composite)
}

/// Wires the stages of one run together.
pub struct Pipeline {
    config: UpdaterConfig,
    source: SnapshotSource,
    downloader: TileDownloader,
    wallpaper: Option<Box<dyn WallpaperSetter>>,
}

impl Pipeline {
    /// `wallpaper = None` leaves the desktop untouched.
    pub fn new(config: UpdaterConfig, wallpaper: Option<Box<dyn WallpaperSetter>>) -> Result<Self> {
        config.validate()?;
        let source = config.time_source.build();
        let downloader = TileDownloader::new(&config.download)?;

        Ok(Self {
            config,
            source,
            downloader,
            wallpaper,
        })
    }

    /// Run every stage once.
    ///
    /// Fails when the snapshot cannot be resolved, when no tile could be
    /// placed, or when the composite cannot be written. A wallpaper failure
    /// is logged and reported but does not fail the run.
    pub async fn run(&self) -> Result<RunReport> {
        let started_at = Utc::now();

        info!("Resolving snapshot time");
        let time = self
            .source
            .resolve_snapshot_time()
            .await
            .context("Failed to resolve snapshot time")?;

        let workspace = TileWorkspace::create(self.config.work_dir.as_deref())
            .context("Failed to create tile workspace")?;

        let result =
            fetch_and_composite(&self.downloader, &self.config.imagery, time, workspace.path())
                .await;
        let cleanup_ok = workspace.cleanup();
        let composite = result?;

        let tiles_total = self.config.imagery.grid().tile_count();
        if composite.is_blank() {
            bail!(
                "No tiles could be fetched for snapshot {} ({} attempted)",
                time,
                tiles_total
            );
        }

        let output_path = self.config.absolute_output_path()?;
        let Composite {
            canvas,
            placed,
            failures,
        } = composite;
        save_canvas(canvas, output_path.clone()).await?;
        info!(
            path = %output_path.display(),
            placed = placed.len(),
            missing = failures.len(),
            "Composite image saved"
        );

        let wallpaper = self.apply_wallpaper(&output_path).await;

        let report = RunReport {
            snapshot: time.to_string(),
            imagery: self.config.imagery.clone(),
            output_path,
            tiles_total,
            placed,
            failures,
            cleanup_ok,
            wallpaper,
            started_at,
            finished_at: Utc::now(),
        };

        if let Some(path) = &self.config.report_path {
            report.write_json(path)?;
            info!(path = %path.display(), "Run report written");
        }

        Ok(report)
    }

    async fn apply_wallpaper(&self, path: &Path) -> WallpaperOutcome {
        let Some(setter) = &self.wallpaper else {
            info!("Wallpaper update disabled");
            return WallpaperOutcome::Skipped;
        };

        match setter.set_wallpaper(path).await {
            Ok(()) => {
                info!(setter = setter.name(), path = %path.display(), "Wallpaper applied");
                WallpaperOutcome::Applied {
                    setter: setter.name().to_string(),
                }
            }
            Err(e) => {
                error!(setter = setter.name(), error = %e, "Failed to apply wallpaper");
                WallpaperOutcome::Failed {
                    setter: setter.name().to_string(),
                    error: format!("{:#}", e),
                }
            }
        }
    }
}

async fn save_canvas(canvas: compositor::Canvas, path: PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    tokio::task::spawn_blocking(move || canvas.save_png(&path))
        .await
        .context("Image writer task failed")?
        .context("Failed to save composite image")
}
