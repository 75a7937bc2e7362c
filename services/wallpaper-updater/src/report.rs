//! Machine-readable summary of one run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use himawari_common::{ImageryConfig, TileCoord, TileFailure};
use serde::Serialize;

/// What happened when the wallpaper was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WallpaperOutcome {
    Applied { setter: String },
    Failed { setter: String, error: String },
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// `YYYY/MM/DD/HHMMSS`
    pub snapshot: String,
    pub imagery: ImageryConfig,
    pub output_path: PathBuf,
    pub tiles_total: usize,
    pub placed: Vec<TileCoord>,
    pub failures: Vec<TileFailure>,
    pub cleanup_ok: bool,
    pub wallpaper: WallpaperOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write run report: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallpaper_outcome_serialization() {
        let applied = serde_json::to_value(WallpaperOutcome::Applied {
            setter: "gnome".to_string(),
        })
        .unwrap();
        assert_eq!(applied["status"], "applied");
        assert_eq!(applied["setter"], "gnome");

        let skipped = serde_json::to_value(WallpaperOutcome::Skipped).unwrap();
        assert_eq!(skipped, serde_json::json!({"status": "skipped"}));
    }

    #[test]
    fn test_report_serialization() {
        let report = RunReport {
            snapshot: "2024/12/29/044000".to_string(),
            imagery: ImageryConfig::default(),
            output_path: PathBuf::from("/tmp/himawari_full_image.png"),
            tiles_total: 16,
            placed: vec![TileCoord::new(0, 0)],
            failures: vec![TileFailure::fetch(TileCoord::new(1, 0), "HTTP status 404 Not Found")],
            cleanup_ok: true,
            wallpaper: WallpaperOutcome::Skipped,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["imagery"]["granularity"], 4);
        assert_eq!(json["placed"][0]["x"], 0);
        assert_eq!(json["failures"][0]["stage"], "fetch");
        assert_eq!(json["failures"][0]["coord"]["x"], 1);
    }
}
