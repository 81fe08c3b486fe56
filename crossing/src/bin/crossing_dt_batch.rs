//! Crossing times for every night in a date range
//!
//! Each night's directory is found by substituting the date into a template,
//! and its rows are appended to `<output-dir>/<date>.csv`.
//!
//! ```bash
//! cargo run --release --bin crossing_dt_batch -- \
//!     --start 2024-01-01 --end 2024-01-31 \
//!     --dir-template /data/{date} --output-dir crossings
//! ```

use chrono::NaiveDate;
use clap::Parser;
use crossing::batch::{expand_nights, run_nights};
use crossing::shared_args::SharedCrossingArgs;
use crossing::CrossingError;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run crossing_dt over one directory per night for a range of dates",
    long_about = None
)]
struct Args {
    /// First night (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Last night, included (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Night directory with a {date} placeholder, e.g. /data/{date}
    #[arg(long)]
    dir_template: String,

    /// strftime format used to render {date}
    #[arg(long, default_value = "%Y%m%d")]
    date_format: String,

    /// Directory receiving one CSV file per night
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    shared: SharedCrossingArgs,
}

fn run(args: &Args) -> Result<(), CrossingError> {
    let config = args.shared.to_run_config().map_err(CrossingError::Input)?;
    let nights = expand_nights(args.start, args.end, &args.dir_template, &args.date_format)
        .map_err(CrossingError::Input)?;

    let summary = run_nights(&nights, &config, &args.output_dir)?;
    info!(
        "{} night(s) processed, {} without data; {} file(s) solved, {} skipped",
        summary.nights, summary.missing_nights, summary.files.processed, summary.files.skipped
    );
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
