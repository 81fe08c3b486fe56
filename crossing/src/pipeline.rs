//! Per-file and per-directory processing: header, search, plot, report row

use crate::config::RunConfig;
use crate::error::{CrossingError, HeaderError, SolveError};
use crate::header::{identify, FitsHeader, Observation};
use crate::plot::{plot_path, render_crossing_plot};
use crate::report::{ReportRow, ReportWriter};
use crate::scan::{is_calibration_frame, scan_directory};
use crate::solver::{Crossing, CrossingSolver};
use ephemeris::Ephemeris;
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

/// What happened to one file that did not abort the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Solved,
    /// Could not be solved; a `None` row was written in its place
    FailureRecorded,
}

/// Counts from a directory run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// What a single-run invocation works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunInput {
    File(PathBuf),
    Directory(PathBuf),
}

/// Decide between file and directory mode.
///
/// An explicit file wins over an explicit directory. A bare path is a
/// directory when one exists there and a file otherwise.
pub fn resolve_input(
    filename: Option<&Path>,
    input_dir: Option<&Path>,
    path: Option<&Path>,
) -> Result<RunInput, CrossingError> {
    if let Some(file) = filename {
        return Ok(RunInput::File(file.to_path_buf()));
    }
    if let Some(dir) = input_dir {
        return Ok(RunInput::Directory(dir.to_path_buf()));
    }
    match path {
        Some(p) if p.is_dir() => Ok(RunInput::Directory(p.to_path_buf())),
        Some(p) => Ok(RunInput::File(p.to_path_buf())),
        None => Err(CrossingError::Input(
            "no input given, use --filename or --input_dir".to_string(),
        )),
    }
}

/// Reject paths that are missing or are calibration frames
pub fn ensure_supported(path: &Path) -> Result<(), CrossingError> {
    if !path.is_file() {
        return Err(CrossingError::Input(format!(
            "{}: no such file",
            path.display()
        )));
    }
    if is_calibration_frame(path) {
        return Err(CrossingError::Input(format!(
            "{}: bias and skyflat frames are not supported",
            path.display()
        )));
    }
    Ok(())
}

/// Read the header of `path` and solve for its crossing time
pub fn analyze_file(
    path: &Path,
    config: &RunConfig,
) -> Result<(Observation, Crossing), CrossingError> {
    let header_err = |source: HeaderError| CrossingError::Header {
        path: path.to_path_buf(),
        source,
    };
    let solve_err = |source: SolveError| CrossingError::Solve {
        path: path.to_path_buf(),
        source,
    };

    let mut header = FitsHeader::open(path, config.keys.hdu).map_err(header_err)?;
    let observation = Observation::from_cards(path.display().to_string(), &mut header, &config.keys)
        .map_err(header_err)?;

    let site = observation
        .site
        .clone()
        .unwrap_or_else(|| config.site.clone());
    debug!("{}: observer {site}", path.display());

    let mut ephemeris = Ephemeris::new(site);
    if !config.precession {
        ephemeris = ephemeris.without_precession();
    }

    let solver = CrossingSolver::new(&ephemeris, config.solver.clone()).map_err(solve_err)?;
    let crossing = solver
        .solve(
            &observation.target,
            observation.header_time,
            observation.target_altitude_deg,
        )
        .map_err(solve_err)?;

    info!(
        "{}: {} crossing of {:.4} deg at {} ({:+.3} s from header, {} candidate(s))",
        path.display(),
        crossing.chosen.direction,
        crossing.target_altitude_deg,
        crossing.chosen_time(),
        crossing.diff_seconds(),
        crossing.candidates.len()
    );

    if let Some(plot_dir) = &config.plot_dir {
        write_plot(&ephemeris, &observation, &crossing, config, plot_dir, path);
    }

    Ok((observation, crossing))
}

fn write_plot(
    ephemeris: &Ephemeris,
    observation: &Observation,
    crossing: &Crossing,
    config: &RunConfig,
    plot_dir: &Path,
    path: &Path,
) {
    if let Err(e) = std::fs::create_dir_all(plot_dir) {
        warn!("cannot create plot directory {}: {e}", plot_dir.display());
        return;
    }
    let save_path = plot_path(plot_dir, path);
    match render_crossing_plot(
        ephemeris,
        observation,
        crossing,
        config.solver.delta_time,
        &save_path,
    ) {
        Ok(()) => info!("plot saved to {}", save_path.display()),
        Err(e) => warn!("plot for {} failed: {e}", path.display()),
    }
}

/// Solve one file and write its row.
///
/// Per-file failures are returned unless `emit_failures` is set, in which case
/// they are logged and a row with `None` for DATETIME and DIFFTIME is written.
pub fn process_file<W: Write>(
    path: &Path,
    config: &RunConfig,
    writer: &mut ReportWriter<W>,
) -> Result<FileOutcome, CrossingError> {
    match analyze_file(path, config) {
        Ok((observation, crossing)) => {
            writer.write_row(&ReportRow::solved(&observation, &crossing))?;
            Ok(FileOutcome::Solved)
        }
        Err(e) if !e.is_fatal() && config.emit_failures => {
            warn!("{e}");
            let (object_name, filter_name) = FitsHeader::open(path, config.keys.hdu)
                .map(|mut header| identify(&mut header, &config.keys))
                .unwrap_or((None, None));
            writer.write_row(&ReportRow::failed(
                path.display().to_string(),
                object_name,
                filter_name,
            ))?;
            Ok(FileOutcome::FailureRecorded)
        }
        Err(e) => Err(e),
    }
}

/// Process every observation file in `dir`, in name order.
///
/// Per-file errors are logged and counted as skipped; output errors stop the run.
pub fn process_directory<W: Write>(
    dir: &Path,
    config: &RunConfig,
    writer: &mut ReportWriter<W>,
) -> Result<BatchSummary, CrossingError> {
    if !dir.is_dir() {
        return Err(CrossingError::Input(format!(
            "{}: no such directory",
            dir.display()
        )));
    }

    let files = scan_directory(dir, &config.suffixes)?;
    if files.is_empty() {
        return Err(CrossingError::Input(format!(
            "{}: no files ending in {}",
            dir.display(),
            config.suffixes.join(" or ")
        )));
    }
    info!("processing {} file(s) in {}", files.len(), dir.display());

    let mut summary = BatchSummary::default();
    for path in &files {
        match process_file(path, config, writer) {
            Ok(FileOutcome::Solved) => summary.processed += 1,
            Ok(FileOutcome::FailureRecorded) => summary.skipped += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("skipping {e}");
                summary.skipped += 1;
            }
        }
    }

    info!(
        "{}: {} solved, {} skipped",
        dir.display(),
        summary.processed,
        summary.skipped
    );
    Ok(summary)
}
