//! Numerical helpers for the crossing search

pub mod misc;

pub use misc::{level_crossings, Direction, LevelCrossing, LevelCrossingError};
