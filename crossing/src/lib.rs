//! Altitude crossing times for telescope observations
//!
//! Reads the pointing, timestamp and altitude recorded in a FITS header,
//! evaluates the target's altitude curve around the observation time and
//! finds the instant at which the target actually passed through the
//! recorded altitude. Results are written as CSV rows
//! `FILENAME,OBJNAME,FILTER,DATETIME,DIFFTIME`.

pub mod algo;
pub mod batch;
pub mod config;
pub mod error;
pub mod grid;
pub mod header;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod scan;
pub mod shared_args;
pub mod solver;

pub use config::{HeaderKeys, RunConfig, SelectionRule, SolverConfig};
pub use error::{CrossingError, HeaderError, SolveError};
pub use header::{CardSource, FitsHeader, Observation};
pub use pipeline::{
    analyze_file, process_directory, process_file, resolve_input, BatchSummary, FileOutcome,
    RunInput,
};
pub use report::{OutputSink, ReportRow, ReportWriter};
pub use solver::{Crossing, CrossingCandidate, CrossingDirection, CrossingSolver};
