//! Level-crossing search on sampled 1D curves.
//!
//! Given samples `(xs, ys)` of a curve and a level, finds every abscissa at
//! which the piecewise-linear interpolant of the samples equals the level.
//! The crossing search over an altitude curve is built on this.

use thiserror::Error;

/// Errors that can occur during a level-crossing search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelCrossingError {
    #[error("Input vectors must have at least 2 points")]
    InsufficientData,
    #[error("Input vectors must have the same length")]
    MismatchedLengths,
    #[error("X values must be sorted in ascending order")]
    UnsortedData,
}

/// Sense in which the curve passes through the level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
}

/// One point where the sampled curve meets the level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelCrossing {
    pub x: f64,
    pub direction: Direction,
}

/// Finds all points where the linear interpolant of `(xs, ys)` crosses `level`.
///
/// A crossing inside an interval `[x₁, x₂]` whose endpoints straddle the level
/// is placed by linear interpolation:
///
/// x = x₁ + t(x₂ - x₁), with t = (y₁ - level)/(y₁ - y₂)
///
/// A sample lying exactly on the level is reported once, at that sample,
/// provided the curve actually passes through (a touch from one side is
/// not a crossing). Crossings are returned in ascending order of `x`.
///
/// # Errors
///
/// * `LevelCrossingError::InsufficientData` - Less than 2 data points provided
/// * `LevelCrossingError::MismatchedLengths` - xs and ys have different lengths
/// * `LevelCrossingError::UnsortedData` - xs is not strictly ascending
pub fn level_crossings(
    xs: &[f64],
    ys: &[f64],
    level: f64,
) -> Result<Vec<LevelCrossing>, LevelCrossingError> {
    if xs.len() != ys.len() {
        return Err(LevelCrossingError::MismatchedLengths);
    }

    if xs.len() < 2 {
        return Err(LevelCrossingError::InsufficientData);
    }

    for i in 1..xs.len() {
        if xs[i] <= xs[i - 1] {
            return Err(LevelCrossingError::UnsortedData);
        }
    }

    let n = xs.len();
    let mut crossings = Vec::new();

    for i in 0..n {
        let d = ys[i] - level;

        if d == 0.0 {
            let before = if i > 0 { ys[i - 1] - level } else { 0.0 };
            let after = if i + 1 < n { ys[i + 1] - level } else { 0.0 };

            // Touches the level from one side only
            if before * after > 0.0 {
                continue;
            }

            let direction = if after > before {
                Direction::Rising
            } else if after < before {
                Direction::Falling
            } else {
                continue;
            };
            crossings.push(LevelCrossing { x: xs[i], direction });
        } else if i + 1 < n {
            let d_next = ys[i + 1] - level;
            if d * d_next < 0.0 {
                let t = d / (d - d_next);
                let x = xs[i] + t * (xs[i + 1] - xs[i]);
                let direction = if d_next > d {
                    Direction::Rising
                } else {
                    Direction::Falling
                };
                crossings.push(LevelCrossing { x, direction });
            }
        }
    }

    Ok(crossings)
}
