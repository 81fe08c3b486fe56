//! Evenly spaced time grids centred on an anchor instant

use crate::error::SolveError;
use chrono::{DateTime, Duration, Utc};

/// Ordered, evenly spaced instants spanning `[anchor - half_width, anchor + half_width]`.
///
/// Instants are stored as offsets in seconds from the anchor. The anchor is
/// always a grid node: an even point count is bumped by one.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    anchor: DateTime<Utc>,
    offsets_s: Vec<f64>,
}

impl TimeGrid {
    pub fn centered(
        anchor: DateTime<Utc>,
        half_width: Duration,
        n_points: usize,
    ) -> Result<Self, SolveError> {
        if n_points < 2 {
            return Err(SolveError::InvalidConfig(format!(
                "need at least 2 grid points, got {n_points}"
            )));
        }
        let half_width_s = duration_seconds(half_width);
        if half_width_s <= 0.0 {
            return Err(SolveError::InvalidConfig(format!(
                "grid half-width must be positive, got {half_width}"
            )));
        }

        let n = if n_points % 2 == 0 { n_points + 1 } else { n_points };
        let half = ((n - 1) / 2) as i64;
        let step = half_width_s / half as f64;
        let offsets_s = (-half..=half).map(|i| i as f64 * step).collect();

        Ok(Self { anchor, offsets_s })
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    pub fn len(&self) -> usize {
        self.offsets_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets_s.is_empty()
    }

    /// Offsets from the anchor in seconds, strictly increasing
    pub fn offsets(&self) -> &[f64] {
        &self.offsets_s
    }

    /// Spacing between consecutive nodes in seconds
    pub fn step_seconds(&self) -> f64 {
        self.offsets_s[1] - self.offsets_s[0]
    }

    /// Instant at `offset_s` seconds from the anchor
    pub fn time_at(&self, offset_s: f64) -> DateTime<Utc> {
        offset_time(self.anchor, offset_s)
    }

    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.offsets_s.iter().map(|&s| self.time_at(s)).collect()
    }
}

/// Duration as fractional seconds
pub fn duration_seconds(d: Duration) -> f64 {
    d.num_seconds() as f64 + d.subsec_nanos() as f64 * 1e-9
}

/// `base` shifted by a fractional number of seconds, rounded to the nanosecond
pub fn offset_time(base: DateTime<Utc>, offset_s: f64) -> DateTime<Utc> {
    base + Duration::nanoseconds((offset_s * 1e9).round() as i64)
}
