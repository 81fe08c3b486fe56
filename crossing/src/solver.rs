//! Altitude crossing-time search.
//!
//! The search looks for the instant at which a target passes through a given
//! altitude, as close as possible to a reference timestamp. Three windows are
//! searched independently, centred on three anchors:
//!
//! ```text
//! reference - delta_time
//! reference
//! reference + delta_time
//! ```
//!
//! Each window spans `anchor ± delta_time` and is sampled with
//! `n_grid_points` altitude evaluations. The crossing nearest to the anchor is
//! located by linear interpolation between the bracketing samples and becomes
//! that window's candidate. The final answer is picked among the candidates
//! according to the configured [`SelectionRule`]. Altitude errors within
//! [`ALTITUDE_TIE_TOLERANCE_DEG`] of each other count as a tie.
//!
//! Candidates lying inside `reference ± delta_time` always outrank those
//! outside it; the outer windows only decide when the reference window has
//! nothing to offer.

use crate::algo::{level_crossings, Direction};
use crate::config::{SelectionRule, SolverConfig};
use crate::error::SolveError;
use crate::grid::{duration_seconds, TimeGrid};
use chrono::{DateTime, Duration, Utc};
use ephemeris::{AltitudeProvider, EquatorialCoord};
use log::debug;
use std::cmp::Ordering;

/// Altitude errors closer than this are treated as equal when ranking candidates
pub const ALTITUDE_TIE_TOLERANCE_DEG: f64 = 1e-6;

/// Whether the target is climbing or sinking through the altitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingDirection {
    Rising,
    Setting,
}

impl From<Direction> for CrossingDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Rising => CrossingDirection::Rising,
            Direction::Falling => CrossingDirection::Setting,
        }
    }
}

impl std::fmt::Display for CrossingDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrossingDirection::Rising => write!(f, "rising"),
            CrossingDirection::Setting => write!(f, "setting"),
        }
    }
}

/// Best crossing found in the window around one anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingCandidate {
    pub anchor: DateTime<Utc>,
    pub time: DateTime<Utc>,
    pub direction: CrossingDirection,
    /// |altitude(time) - target altitude| in degrees
    pub altitude_error_deg: f64,
}

impl CrossingCandidate {
    /// Signed seconds from `reference` to this candidate
    pub fn seconds_from(&self, reference: DateTime<Utc>) -> f64 {
        duration_seconds(self.time - reference)
    }
}

/// Outcome of a successful search
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    pub reference: DateTime<Utc>,
    pub target_altitude_deg: f64,
    pub chosen: CrossingCandidate,
    /// Surviving candidates, in anchor order
    pub candidates: Vec<CrossingCandidate>,
}

impl Crossing {
    pub fn chosen_time(&self) -> DateTime<Utc> {
        self.chosen.time
    }

    /// chosen time minus reference time
    pub fn diff_time(&self) -> Duration {
        self.chosen.time - self.reference
    }

    pub fn diff_seconds(&self) -> f64 {
        duration_seconds(self.diff_time())
    }
}

/// Crossing-time search over any [`AltitudeProvider`]
#[derive(Debug, Clone)]
pub struct CrossingSolver<P> {
    provider: P,
    config: SolverConfig,
}

impl<P: AltitudeProvider> CrossingSolver<P> {
    pub fn new(provider: P, config: SolverConfig) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The three window centres around `reference`
    pub fn anchors(&self, reference: DateTime<Utc>) -> Result<[DateTime<Utc>; 3], SolveError> {
        let dt = self.config.delta_time;
        let out_of_range = || {
            SolveError::InvalidConfig(format!(
                "window of {dt} around {reference} leaves the representable time range"
            ))
        };
        // The outer windows reach a further delta_time past their anchors
        let reach = dt.checked_add(&dt).ok_or_else(out_of_range)?;
        reference.checked_sub_signed(reach).ok_or_else(out_of_range)?;
        reference.checked_add_signed(reach).ok_or_else(out_of_range)?;

        Ok([
            reference.checked_sub_signed(dt).ok_or_else(out_of_range)?,
            reference,
            reference.checked_add_signed(dt).ok_or_else(out_of_range)?,
        ])
    }

    /// Crossing nearest to `anchor` within `anchor ± delta_time`, if any
    pub fn search_window(
        &self,
        anchor: DateTime<Utc>,
        target: &EquatorialCoord,
        target_altitude_deg: f64,
    ) -> Result<Option<CrossingCandidate>, SolveError> {
        let grid = TimeGrid::centered(anchor, self.config.delta_time, self.config.n_grid_points)?;
        let altitudes: Vec<f64> = self
            .provider
            .sample(&grid.times(), target)
            .iter()
            .map(|s| s.altitude_deg)
            .collect();

        let crossings = level_crossings(grid.offsets(), &altitudes, target_altitude_deg)?;
        let Some(nearest) = crossings
            .iter()
            .min_by(|a, b| a.x.abs().total_cmp(&b.x.abs()))
        else {
            debug!("no crossing of {target_altitude_deg:.4} deg within window at {anchor}");
            return Ok(None);
        };

        let time = grid.time_at(nearest.x);
        let altitude = self.provider.altitude_azimuth_at(&time, target).altitude_deg;
        let candidate = CrossingCandidate {
            anchor,
            time,
            direction: nearest.direction.into(),
            altitude_error_deg: (altitude - target_altitude_deg).abs(),
        };

        debug!(
            "anchor {anchor}: {} crossing(s), nearest {} at {} (error {:.2e} deg, step {:.3} s)",
            crossings.len(),
            candidate.direction,
            candidate.time,
            candidate.altitude_error_deg,
            grid.step_seconds()
        );

        Ok(Some(candidate))
    }

    /// Find the crossing of `target_altitude_deg` closest to `reference`
    pub fn solve(
        &self,
        target: &EquatorialCoord,
        reference: DateTime<Utc>,
        target_altitude_deg: f64,
    ) -> Result<Crossing, SolveError> {
        if !target_altitude_deg.is_finite() {
            return Err(SolveError::InvalidAltitude(target_altitude_deg));
        }

        let mut candidates = Vec::with_capacity(3);
        for anchor in self.anchors(reference)? {
            if let Some(candidate) = self.search_window(anchor, target, target_altitude_deg)? {
                candidates.push(candidate);
            }
        }

        let chosen = select_candidate(
            self.config.selection,
            reference,
            self.config.delta_time,
            &candidates,
        )
        .ok_or(SolveError::NoCrossingFound {
            target_altitude_deg,
            reference,
        })?;

        Ok(Crossing {
            reference,
            target_altitude_deg,
            chosen,
            candidates,
        })
    }
}

/// Pick the winning candidate under `rule`.
///
/// Candidates within `reference ± delta_time` are ranked ahead of the rest
/// whatever the rule.
pub fn select_candidate(
    rule: SelectionRule,
    reference: DateTime<Utc>,
    delta_time: Duration,
    candidates: &[CrossingCandidate],
) -> Option<CrossingCandidate> {
    let window_s = duration_seconds(delta_time);
    candidates
        .iter()
        .copied()
        .min_by(|a, b| compare_candidates(rule, reference, window_s, a, b))
}

fn compare_candidates(
    rule: SelectionRule,
    reference: DateTime<Utc>,
    window_s: f64,
    a: &CrossingCandidate,
    b: &CrossingCandidate,
) -> Ordering {
    let (a_s, b_s) = (
        a.seconds_from(reference).abs(),
        b.seconds_from(reference).abs(),
    );
    // false sorts first
    let by_window = (a_s > window_s).cmp(&(b_s > window_s));
    let by_time = a_s.total_cmp(&b_s);
    let by_altitude =
        if (a.altitude_error_deg - b.altitude_error_deg).abs() <= ALTITUDE_TIE_TOLERANCE_DEG {
            Ordering::Equal
        } else {
            a.altitude_error_deg.total_cmp(&b.altitude_error_deg)
        };

    by_window.then(match rule {
        SelectionRule::NearestTime => by_time.then(by_altitude),
        SelectionRule::AltitudeMatch => by_altitude.then(by_time),
    })
}
