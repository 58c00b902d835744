//! Report tables and their CSV, tab-separated and xlsx output.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::breaks::InferredBreak;
use crate::domain::Dataset;
use crate::index::ReferenceIndex;

use super::policy::BreakPolicy;
use super::summary::{DutySummary, duty_breaks, summarize_duties};

/// Error from producing or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("{0} output is not text")]
    NotText(OutputFormat),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown {what}: {value:?}")]
    Unknown { what: &'static str, value: String },
}

/// The available reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Start and end time of every duty.
    DutyTimes,
    /// Start and end time, and first and last service stop.
    DutyTimesAndStops,
    /// One row per break of each duty with known service stops.
    DutyBreaks,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::DutyTimes,
        ReportKind::DutyTimesAndStops,
        ReportKind::DutyBreaks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::DutyTimes => "duty_start_end_times",
            ReportKind::DutyTimesAndStops => "duty_start_end_times_and_stops",
            ReportKind::DutyBreaks => "duty_breaks",
        }
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReportError::Unknown {
                what: "report",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format of a report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Tab-separated values
    Txt,
    /// Excel workbook with a single sheet
    Xlsx,
}

impl OutputFormat {
    /// File extension, also the format's name.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Txt => "txt",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    /// Field delimiter of the text formats; `None` for xlsx.
    fn delimiter(&self) -> Option<u8> {
        match self {
            OutputFormat::Csv => Some(b','),
            OutputFormat::Txt => Some(b'\t'),
            OutputFormat::Xlsx => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "txt" => Ok(OutputFormat::Txt),
            "xlsx" => Ok(OutputFormat::Xlsx),
            _ => Err(ReportError::Unknown {
                what: "output format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Row of the duty times report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesRow {
    #[serde(rename = "Duty Id")]
    pub duty_id: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
}

/// Row of the duty times and stops report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopsRow {
    #[serde(rename = "Duty Id")]
    pub duty_id: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Start stop description")]
    pub start_stop: String,
    #[serde(rename = "End stop description")]
    pub end_stop: String,
}

/// Row of the duty breaks report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakRow {
    #[serde(rename = "Duty Id")]
    pub duty_id: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Start stop description")]
    pub start_stop: String,
    #[serde(rename = "End stop description")]
    pub end_stop: String,
    #[serde(rename = "Break start time")]
    pub break_start: String,
    #[serde(rename = "Break duration")]
    pub break_minutes: i64,
    #[serde(rename = "Break stop name")]
    pub break_stop: String,
}

/// A worksheet cell.
enum Cell<'a> {
    Text(&'a str),
    Number(i64),
}

/// Column headers, written even when a table has no rows, and the cells of
/// one row in header order.
trait Row: Serialize {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell<'_>>;
}

impl Row for TimesRow {
    const HEADERS: &'static [&'static str] = &["Duty Id", "Start Time", "End Time"];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Text(&self.duty_id),
            Cell::Text(&self.start_time),
            Cell::Text(&self.end_time),
        ]
    }
}

impl Row for StopsRow {
    const HEADERS: &'static [&'static str] = &[
        "Duty Id",
        "Start Time",
        "End Time",
        "Start stop description",
        "End stop description",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Text(&self.duty_id),
            Cell::Text(&self.start_time),
            Cell::Text(&self.end_time),
            Cell::Text(&self.start_stop),
            Cell::Text(&self.end_stop),
        ]
    }
}

impl Row for BreakRow {
    const HEADERS: &'static [&'static str] = &[
        "Duty Id",
        "Start Time",
        "End Time",
        "Start stop description",
        "End stop description",
        "Break start time",
        "Break duration",
        "Break stop name",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Text(&self.duty_id),
            Cell::Text(&self.start_time),
            Cell::Text(&self.end_time),
            Cell::Text(&self.start_stop),
            Cell::Text(&self.end_stop),
            Cell::Text(&self.break_start),
            Cell::Number(self.break_minutes),
            Cell::Text(&self.break_stop),
        ]
    }
}

/// A built report table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    DutyTimes(Vec<TimesRow>),
    DutyTimesAndStops(Vec<StopsRow>),
    DutyBreaks(Vec<BreakRow>),
}

impl Report {
    /// Build a report from an indexed dataset and its inferred breaks.
    pub fn build(
        kind: ReportKind,
        dataset: &Dataset,
        index: &ReferenceIndex<'_>,
        inferred: &[InferredBreak],
        policy: &BreakPolicy,
    ) -> Self {
        let summaries = summarize_duties(dataset, index);
        match kind {
            ReportKind::DutyTimes => {
                Report::DutyTimes(summaries.iter().map(times_row).collect())
            }
            ReportKind::DutyTimesAndStops => {
                Report::DutyTimesAndStops(summaries.iter().filter_map(stops_row).collect())
            }
            ReportKind::DutyBreaks => {
                let mut rows = Vec::new();
                for summary in &summaries {
                    let Some(stops) = stops_row(summary) else {
                        continue;
                    };
                    let Some(duty) = dataset.duty(&summary.duty_id) else {
                        continue;
                    };
                    let Some(breaks) = duty_breaks(duty, index, inferred, policy) else {
                        warn!(duty_id = %summary.duty_id, "Skipping breaks of duty");
                        continue;
                    };
                    rows.extend(breaks.into_iter().map(|b| BreakRow {
                        duty_id: stops.duty_id.clone(),
                        start_time: stops.start_time.clone(),
                        end_time: stops.end_time.clone(),
                        start_stop: stops.start_stop.clone(),
                        end_stop: stops.end_stop.clone(),
                        break_start: b.start.clock(),
                        break_minutes: b.minutes,
                        break_stop: b.stop_name,
                    }));
                }
                Report::DutyBreaks(rows)
            }
        }
    }

    /// Number of rows, excluding the header.
    pub fn len(&self) -> usize {
        match self {
            Report::DutyTimes(rows) => rows.len(),
            Report::DutyTimesAndStops(rows) => rows.len(),
            Report::DutyBreaks(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode the table, header first.
    pub fn to_bytes(&self, format: OutputFormat) -> Result<Vec<u8>, ReportError> {
        match self {
            Report::DutyTimes(rows) => encode(format, rows),
            Report::DutyTimesAndStops(rows) => encode(format, rows),
            Report::DutyBreaks(rows) => encode(format, rows),
        }
    }

    /// Render the table in one of the text formats.
    pub fn render(&self, format: OutputFormat) -> Result<String, ReportError> {
        if format.delimiter().is_none() {
            return Err(ReportError::NotText(format));
        }
        let buffer = self.to_bytes(format)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Save the table to `path`, adding the format's extension if missing.
    ///
    /// Returns the path actually written.
    pub async fn save(
        &self,
        path: impl AsRef<Path>,
        format: OutputFormat,
    ) -> Result<PathBuf, ReportError> {
        let path = with_extension(path.as_ref(), format);
        let buffer = self.to_bytes(format)?;
        tokio::fs::write(&path, buffer)
            .await
            .map_err(|source| ReportError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), rows = self.len(), %format, "Saved report");
        Ok(path)
    }
}

fn encode<R: Row>(format: OutputFormat, rows: &[R]) -> Result<Vec<u8>, ReportError> {
    match format.delimiter() {
        Some(delimiter) => write_delimited(delimiter, rows),
        None => write_workbook(rows),
    }
}

fn writer(delimiter: u8) -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.delimiter(delimiter).has_headers(false);

    builder
}

fn write_delimited<R: Row>(delimiter: u8, rows: &[R]) -> Result<Vec<u8>, ReportError> {
    let mut out = writer(delimiter).from_writer(Vec::new());
    out.write_record(R::HEADERS)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.into_inner()
        .map_err(|e| ReportError::Csv(csv::Error::from(e.into_error())))
}

fn write_workbook<R: Row>(rows: &[R]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in (0u16..).zip(R::HEADERS) {
        sheet.write_string(0, col, *header)?;
    }
    for (row_no, row) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(row.cells()) {
            match cell {
                Cell::Text(text) => sheet.write_string(row_no, col, text)?,
                Cell::Number(n) => sheet.write_number(row_no, col, n as f64)?,
            };
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn with_extension(path: &Path, format: OutputFormat) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == format.extension()) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(format.extension());
        PathBuf::from(name)
    }
}

fn times_row(summary: &DutySummary) -> TimesRow {
    TimesRow {
        duty_id: summary.duty_id.to_string(),
        start_time: summary.start.clock(),
        end_time: summary.end.clock(),
    }
}

fn stops_row(summary: &DutySummary) -> Option<StopsRow> {
    let (start_stop, end_stop) = summary.service_stops.clone()?;
    Some(StopsRow {
        duty_id: summary.duty_id.to_string(),
        start_time: summary.start.clock(),
        end_time: summary.end.clock(),
        start_stop,
        end_stop,
    })
}
