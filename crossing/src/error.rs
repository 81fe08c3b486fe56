//! Error types for header reading, crossing searches and report output

use crate::algo::LevelCrossingError;
use chrono::{DateTime, Utc};
use ephemeris::EphemerisError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning a FITS header into an [`Observation`](crate::header::Observation)
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("cannot read header HDU {hdu}: {source}")]
    Open {
        hdu: usize,
        #[source]
        source: fitsio::errors::Error,
    },

    #[error("missing header card {0}")]
    MissingCard(String),

    #[error("header card {card}: cannot parse timestamp '{value}'")]
    InvalidTimestamp { card: String, value: String },

    #[error("header card {card}: invalid value '{value}'")]
    InvalidValue { card: String, value: String },

    #[error("no altitude card found (tried {0})")]
    MissingAltitude(String),

    #[error("invalid coordinates: {0}")]
    Coordinates(#[from] EphemerisError),
}

/// Failures of the crossing search itself
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(String),

    #[error("target altitude {0} is not a finite angle")]
    InvalidAltitude(f64),

    #[error("no crossing of altitude {target_altitude_deg:.4} deg found around {reference}")]
    NoCrossingFound {
        target_altitude_deg: f64,
        reference: DateTime<Utc>,
    },

    #[error("time grid error: {0}")]
    Grid(#[from] LevelCrossingError),
}

/// Top-level error for processing observation files
#[derive(Error, Debug)]
pub enum CrossingError {
    #[error("{}: {source}", .path.display())]
    Header {
        path: PathBuf,
        #[source]
        source: HeaderError,
    },

    #[error("{}: {source}", .path.display())]
    Solve {
        path: PathBuf,
        #[source]
        source: SolveError,
    },

    #[error("{0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),
}

impl CrossingError {
    /// Whether the error must stop a directory run rather than skip one file
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CrossingError::Input(_) | CrossingError::Io(_) | CrossingError::Csv(_)
        )
    }

    /// Process exit status: 2 for bad input, 1 for everything else
    pub fn exit_code(&self) -> u8 {
        match self {
            CrossingError::Input(_) => 2,
            _ => 1,
        }
    }
}
