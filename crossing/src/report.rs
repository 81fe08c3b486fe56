//! CSV report rows: `FILENAME,OBJNAME,FILTER,DATETIME,DIFFTIME`

use crate::header::Observation;
use crate::solver::Crossing;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 5] = ["FILENAME", "OBJNAME", "FILTER", "DATETIME", "DIFFTIME"];

/// Placeholder written for values that could not be determined
pub const MISSING: &str = "None";

/// One output line
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub filename: String,
    pub object_name: Option<String>,
    pub filter_name: Option<String>,
    pub datetime: Option<DateTime<Utc>>,
    /// DATETIME minus header timestamp, seconds
    pub diff_seconds: Option<f64>,
}

impl ReportRow {
    pub fn solved(observation: &Observation, crossing: &Crossing) -> Self {
        Self {
            filename: observation.filename.clone(),
            object_name: observation.object_name.clone(),
            filter_name: observation.filter_name.clone(),
            datetime: Some(crossing.chosen_time()),
            diff_seconds: Some(crossing.diff_seconds()),
        }
    }

    pub fn failed(
        filename: impl Into<String>,
        object_name: Option<String>,
        filter_name: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            object_name,
            filter_name,
            datetime: None,
            diff_seconds: None,
        }
    }

    pub fn fields(&self) -> [String; 5] {
        let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.to_string());
        [
            self.filename.clone(),
            or_missing(&self.object_name),
            or_missing(&self.filter_name),
            self.datetime
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true))
                .unwrap_or_else(|| MISSING.to_string()),
            self.diff_seconds
                .map(|s| format!("{s:.3}"))
                .unwrap_or_else(|| MISSING.to_string()),
        ]
    }
}

/// Writes report rows to any sink
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_header(&mut self) -> Result<(), csv::Error> {
        self.writer.write_record(CSV_HEADER)
    }

    /// Write one row and flush it, so partial runs leave complete lines behind
    pub fn write_row(&mut self, row: &ReportRow) -> Result<(), csv::Error> {
        self.writer.write_record(row.fields())?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

/// Where report rows go
pub enum OutputSink {
    Stdout(std::io::Stdout),
    File(std::fs::File),
}

impl OutputSink {
    /// Open `path` for appending (created if missing), or stdout when `None`
    pub fn open(path: Option<&Path>) -> std::io::Result<Self> {
        match path {
            Some(p) => Ok(OutputSink::File(
                OpenOptions::new().create(true).append(true).open(p)?,
            )),
            None => Ok(OutputSink::Stdout(std::io::stdout())),
        }
    }

    /// Whether a header row belongs at the current position
    pub fn wants_header(&self) -> std::io::Result<bool> {
        match self {
            OutputSink::Stdout(_) => Ok(true),
            OutputSink::File(f) => Ok(f.metadata()?.len() == 0),
        }
    }
}

impl Write for OutputSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            OutputSink::Stdout(s) => s.write(buf),
            OutputSink::File(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            OutputSink::Stdout(s) => s.flush(),
            OutputSink::File(f) => f.flush(),
        }
    }
}
