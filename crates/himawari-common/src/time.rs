//! Snapshot timestamps for the imagery service.
//!
//! Snapshots are published on 10-minute boundaries and only become
//! downloadable some time after they are taken.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HimawariError, HimawariResult};

/// Path format expected by the tile endpoint: `YYYY/MM/DD/HHMMSS`.
pub const SNAPSHOT_FORMAT: &str = "%Y/%m/%d/%H%M%S";

/// Snapshot used when no time source is queried.
pub const DEFAULT_SNAPSHOT: &str = "2024/12/29/044000";

/// Delay between capture and publication.
pub const PUBLICATION_DELAY_MINUTES: i64 = 20;

/// Spacing of published snapshots.
pub const SNAPSHOT_INTERVAL_SECS: i64 = 600;

/// A published snapshot instant: on a 10-minute boundary, zero seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotTime(DateTime<Utc>);

impl SnapshotTime {
    /// Latest snapshot expected to be downloadable at `now`.
    pub fn latest_available(now: DateTime<Utc>) -> Self {
        Self::floor(now - Duration::minutes(PUBLICATION_DELAY_MINUTES))
    }

    /// Round down to the enclosing snapshot boundary.
    pub fn floor(instant: DateTime<Utc>) -> Self {
        let past_boundary = instant.timestamp().rem_euclid(SNAPSHOT_INTERVAL_SECS);
        let nanos = instant.timestamp_subsec_nanos() as i64;
        Self(instant - Duration::seconds(past_boundary) - Duration::nanoseconds(nanos))
    }

    /// Parse an operator-supplied `YYYY/MM/DD/HHMMSS` value.
    ///
    /// The value must already sit on a snapshot boundary.
    pub fn parse(value: &str) -> HimawariResult<Self> {
        let naive = NaiveDateTime::parse_from_str(value.trim(), SNAPSHOT_FORMAT).map_err(|e| {
            HimawariError::invalid_timestamp(value, format!("expected YYYY/MM/DD/HHMMSS ({})", e))
        })?;
        let instant = Utc.from_utc_datetime(&naive);

        if instant.timestamp().rem_euclid(SNAPSHOT_INTERVAL_SECS) != 0 {
            return Err(HimawariError::invalid_timestamp(
                value,
                "not on a 10-minute snapshot boundary",
            ));
        }

        Ok(Self(instant))
    }

    /// The built-in static snapshot.
    ///
    /// Built from a literal instant; `DEFAULT_SNAPSHOT` is its formatted form.
    pub fn default_static() -> Self {
        // Utc has no gaps or folds, so the mapping is always single.
        Self(Utc.with_ymd_and_hms(2024, 12, 29, 4, 40, 0).unwrap())
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for SnapshotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SNAPSHOT_FORMAT))
    }
}

impl FromStr for SnapshotTime {
    type Err = HimawariError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
