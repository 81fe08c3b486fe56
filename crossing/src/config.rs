//! Configuration for the crossing search and for reading observation headers.

use crate::error::SolveError;
use chrono::Duration;
use clap::ValueEnum;
use ephemeris::ObserverSite;
use std::path::PathBuf;

/// Default half-width of the searched window, minutes
pub const DEFAULT_DELTA_TIME_MINUTES: i64 = 10;

/// Largest accepted half-width of the searched window, hours
pub const MAX_DELTA_TIME_HOURS: i64 = 12;

/// Default number of samples per searched window
pub const DEFAULT_GRID_POINTS: usize = 1800;

/// How the final crossing is chosen among the per-anchor candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SelectionRule {
    /// Candidate closest in time to the header timestamp (ties: best altitude match)
    NearestTime,
    /// Candidate whose altitude best matches the target (ties: closest in time)
    #[default]
    AltitudeMatch,
}

impl std::fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionRule::NearestTime => write!(f, "nearest-time"),
            SelectionRule::AltitudeMatch => write!(f, "altitude-match"),
        }
    }
}

/// Parameters of the crossing search
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Half-width of each searched window and spacing of the three anchors
    pub delta_time: Duration,
    /// Samples per window; an even count is bumped by one
    pub n_grid_points: usize,
    pub selection: SelectionRule,
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.delta_time <= Duration::zero() {
            return Err(SolveError::InvalidConfig(format!(
                "delta time must be positive, got {}",
                self.delta_time
            )));
        }
        if self.delta_time > Duration::hours(MAX_DELTA_TIME_HOURS) {
            return Err(SolveError::InvalidConfig(format!(
                "delta time must not exceed {MAX_DELTA_TIME_HOURS} h, got {}",
                self.delta_time
            )));
        }
        if self.n_grid_points < 2 {
            return Err(SolveError::InvalidConfig(format!(
                "need at least 2 grid points, got {}",
                self.n_grid_points
            )));
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            delta_time: Duration::minutes(DEFAULT_DELTA_TIME_MINUTES),
            n_grid_points: DEFAULT_GRID_POINTS,
            selection: SelectionRule::default(),
        }
    }
}

/// Names of the header cards an observation is built from
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderKeys {
    /// HDU holding the header; compressed `.fits.fz` products keep it in extension 1
    pub hdu: usize,
    pub date_card: String,
    pub object_card: String,
    pub filter_card: String,
    pub ra_card: String,
    pub dec_card: String,
    /// Tried in order; the first one present wins
    pub altitude_cards: Vec<String>,
    pub site_latitude_card: String,
    pub site_longitude_card: String,
    pub site_elevation_card: String,
}

impl Default for HeaderKeys {
    fn default() -> Self {
        Self {
            hdu: 1,
            date_card: "DATE-OBS".to_string(),
            object_card: "OBJECT".to_string(),
            filter_card: "FILTER".to_string(),
            ra_card: "CRVAL1".to_string(),
            dec_card: "CRVAL2".to_string(),
            altitude_cards: vec![
                "ALT".to_string(),
                "HIERARCH T80S TEL EL START".to_string(),
            ],
            site_latitude_card: "HIERARCH T80S TEL GEOLAT".to_string(),
            site_longitude_card: "HIERARCH T80S TEL GEOLON".to_string(),
            site_elevation_card: "HIERARCH T80S TEL GEOELEV".to_string(),
        }
    }
}

/// Everything a single-file or directory run needs
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub solver: SolverConfig,
    pub keys: HeaderKeys,
    /// Used when the header does not carry the site cards
    pub site: ObserverSite,
    pub precession: bool,
    /// Write diagnostic plots here when set
    pub plot_dir: Option<PathBuf>,
    /// Write a `None` row for files that could not be solved
    pub emit_failures: bool,
    /// File name suffixes picked up when scanning a directory
    pub suffixes: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            keys: HeaderKeys::default(),
            site: ObserverSite::default(),
            precession: true,
            plot_dir: None,
            emit_failures: false,
            suffixes: vec![".fits.fz".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert_eq!(config.delta_time, Duration::minutes(10));
        assert_eq!(config.n_grid_points, 1800);
        assert_eq!(config.selection, SelectionRule::AltitudeMatch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_delta() {
        let config = SolverConfig {
            delta_time: Duration::zero(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SolveError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_oversized_delta() {
        let config = SolverConfig {
            delta_time: Duration::milliseconds(60_000_000_000_000_000),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SolveError::InvalidConfig(_))));

        let config = SolverConfig {
            delta_time: Duration::hours(MAX_DELTA_TIME_HOURS),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let config = SolverConfig {
            n_grid_points: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SolveError::InvalidConfig(_))));
    }

    #[test]
    fn test_header_keys_default_altitude_order() {
        let keys = HeaderKeys::default();
        assert_eq!(keys.altitude_cards[0], "ALT");
        assert_eq!(keys.date_card, "DATE-OBS");
        assert_eq!(keys.hdu, 1);
    }

    #[test]
    fn test_selection_rule_display_matches_cli_names() {
        assert_eq!(SelectionRule::NearestTime.to_string(), "nearest-time");
        assert_eq!(SelectionRule::AltitudeMatch.to_string(), "altitude-match");
    }
}
