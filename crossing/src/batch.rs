//! Date-range runs over one directory per observing night

use crate::config::RunConfig;
use crate::error::CrossingError;
use crate::pipeline::{process_directory, BatchSummary};
use crate::report::{OutputSink, ReportWriter};
use crate::scan::scan_directory;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Placeholder substituted in directory templates
pub const DATE_PLACEHOLDER: &str = "{date}";

/// One night of the range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightDirectory {
    pub date: NaiveDate,
    /// The date rendered with the configured format
    pub label: String,
    pub dir: PathBuf,
}

impl NightDirectory {
    /// Report file for this night inside `output_dir`
    pub fn report_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.csv", self.label.replace(['/', '\\'], "-")))
    }
}

/// Totals over all nights of a date-range run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSummary {
    pub nights: usize,
    pub missing_nights: usize,
    pub files: BatchSummary,
}

pub fn validate_date_format(date_format: &str) -> Result<(), String> {
    if date_format.is_empty() {
        return Err("date format is empty".to_string());
    }
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid date format '{date_format}'"));
    }
    Ok(())
}

/// Every day from `start` to `end`, both included
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, String> {
    if end < start {
        return Err(format!("end date {end} is before start date {start}"));
    }
    Ok(start.iter_days().take_while(|d| *d <= end).collect())
}

/// Expand `template` (containing `{date}`) for every day in the range
pub fn expand_nights(
    start: NaiveDate,
    end: NaiveDate,
    template: &str,
    date_format: &str,
) -> Result<Vec<NightDirectory>, String> {
    if !template.contains(DATE_PLACEHOLDER) {
        return Err(format!(
            "directory template '{template}' has no {DATE_PLACEHOLDER} placeholder"
        ));
    }
    validate_date_format(date_format)?;

    Ok(days_inclusive(start, end)?
        .into_iter()
        .map(|date| {
            let label = date.format(date_format).to_string();
            let dir = PathBuf::from(template.replace(DATE_PLACEHOLDER, &label));
            NightDirectory { date, label, dir }
        })
        .collect())
}

/// Process each night's directory, appending its rows to `<output_dir>/<label>.csv`.
///
/// Missing directories and nights without observation files are skipped with
/// a warning and produce no report file; output failures stop the run.
pub fn run_nights(
    nights: &[NightDirectory],
    config: &RunConfig,
    output_dir: &Path,
) -> Result<RangeSummary, CrossingError> {
    std::fs::create_dir_all(output_dir)?;

    let mut summary = RangeSummary::default();
    for night in nights {
        if !night.dir.is_dir() {
            warn!("{}: directory {} not found, skipping", night.date, night.dir.display());
            summary.missing_nights += 1;
            continue;
        }

        if scan_directory(&night.dir, &config.suffixes)?.is_empty() {
            warn!("{}: no observation files in {}, skipping", night.date, night.dir.display());
            summary.missing_nights += 1;
            continue;
        }

        let report_path = night.report_path(output_dir);
        let sink = OutputSink::open(Some(report_path.as_path()))?;
        let wants_header = sink.wants_header()?;
        let mut writer = ReportWriter::new(sink);
        if wants_header {
            writer.write_header()?;
        }

        let files = process_directory(&night.dir, config, &mut writer)?;
        info!(
            "{}: {} row(s) appended to {}",
            night.date,
            files.processed,
            report_path.display()
        );
        summary.nights += 1;
        summary.files.processed += files.processed;
        summary.files.skipped += files.skipped;
        writer.flush()?;
    }

    Ok(summary)
}
