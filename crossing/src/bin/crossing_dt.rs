//! Crossing time of the header altitude for one FITS file or a night directory
//!
//! # Usage
//!
//! ```bash
//! # Single file, row on stdout
//! cargo run --release --bin crossing_dt -- -f /data/20240101/NGC1365_R_001.fits.fz
//!
//! # Whole night, appended to a CSV file, with plots
//! cargo run --release --bin crossing_dt -- -d /data/20240101 -o crossings.csv -p
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG=info` to see per-file results.

use clap::Parser;
use crossing::pipeline::{
    ensure_supported, process_directory, process_file, resolve_input, RunInput,
};
use crossing::shared_args::SharedCrossingArgs;
use crossing::{CrossingError, FileOutcome, OutputSink, ReportWriter};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find when a target crossed the altitude recorded in its FITS header",
    long_about = None
)]
struct Args {
    /// FITS file to process (takes precedence over --input_dir)
    #[arg(short = 'f', long)]
    filename: Option<PathBuf>,

    /// Directory whose observation files are processed in name order
    #[arg(short = 'd', long = "input_dir")]
    input_dir: Option<PathBuf>,

    /// File or directory, when neither --filename nor --input_dir is given
    path: Option<PathBuf>,

    /// Append rows to this CSV file instead of printing them
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    shared: SharedCrossingArgs,
}

fn run(args: &Args) -> Result<(), CrossingError> {
    let config = args.shared.to_run_config().map_err(CrossingError::Input)?;

    let input = resolve_input(
        args.filename.as_deref(),
        args.input_dir.as_deref(),
        args.path.as_deref(),
    )?;
    match input {
        RunInput::File(path) => {
            ensure_supported(&path)?;
            let mut writer = ReportWriter::new(OutputSink::open(args.output.as_deref())?);
            if process_file(&path, &config, &mut writer)? == FileOutcome::FailureRecorded {
                info!("{}: written without a crossing time", path.display());
            }
            writer.flush()?;
        }
        RunInput::Directory(dir) => {
            if !dir.is_dir() {
                return Err(CrossingError::Input(format!(
                    "{}: no such directory",
                    dir.display()
                )));
            }
            let sink = OutputSink::open(args.output.as_deref())?;
            let wants_header = sink.wants_header()?;
            let mut writer = ReportWriter::new(sink);
            if wants_header {
                writer.write_header()?;
            }
            let summary = process_directory(&dir, &config, &mut writer)?;
            writer.flush()?;
            info!(
                "done: {} solved, {} skipped",
                summary.processed, summary.skipped
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
