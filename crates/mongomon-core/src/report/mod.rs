//! Log-to-report pipeline.
//!
//! One log file produces two artifacts:
//! - `<name>.xlsx` — the full log as a sheet plus mean/max/min statistics
//! - `<name>.png` — a 2×2 chart of a decimated inserts/queries/updates/deletes series
//!
//! Any failure aborts the whole report; no partial report is kept.

mod chart;
pub mod parser;
pub mod stats;
pub mod table;
mod xlsx;

pub use chart::{CHART_SIZE, render_chart};
pub use parser::{
    DecimatedSeries, ParseError, SeriesPoint, decimate, parse, parse_str, read_log, stride,
};
pub use stats::{ColumnStats, STAT_COLUMNS, summarize};
pub use table::LogTable;
pub use xlsx::{RAW_SHEET, STATS_SHEET, write_workbook};

use std::path::PathBuf;

use tracing::info;

use crate::config::ReportConfig;
use crate::storage::{LogError, ensure_reports_dir};

/// Error type for report generation.
#[derive(Debug)]
pub enum ReportError {
    /// Reading or parsing the log failed.
    Parse(ParseError),
    /// The reports directory could not be created.
    Log(LogError),
    /// The log has a header but no data lines.
    NoData,
    /// Spreadsheet export failed.
    Xlsx(rust_xlsxwriter::XlsxError),
    /// Chart rendering failed.
    Chart(String),
    /// Log exceeds spreadsheet limits.
    TooLarge(String),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Parse(e) => write!(f, "{}", e),
            ReportError::Log(e) => write!(f, "{}", e),
            ReportError::NoData => write!(f, "log contains no data lines"),
            ReportError::Xlsx(e) => write!(f, "spreadsheet export failed: {}", e),
            ReportError::Chart(msg) => write!(f, "chart rendering failed: {}", msg),
            ReportError::TooLarge(what) => write!(f, "log too large for spreadsheet: {}", what),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Parse(e) => Some(e),
            ReportError::Log(e) => Some(e),
            ReportError::Xlsx(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for ReportError {
    fn from(e: ParseError) -> Self {
        ReportError::Parse(e)
    }
}

impl From<LogError> for ReportError {
    fn from(e: LogError) -> Self {
        ReportError::Log(e)
    }
}

impl From<rust_xlsxwriter::XlsxError> for ReportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ReportError::Xlsx(e)
    }
}

/// Paths of the files a report run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub spreadsheet: PathBuf,
    pub chart: PathBuf,
}

/// Builds the spreadsheet and chart for `config.log_path()`.
///
/// The log is read once and both the table and the chart series are built
/// from that text before anything is written, so a malformed log leaves no
/// output files behind.
pub fn build_report(config: &ReportConfig) -> Result<ReportArtifacts, ReportError> {
    ensure_reports_dir(&config.reports_dir)?;
    let log_path = config.log_path();
    let content = read_log(&log_path)?;

    let table = LogTable::from_text(&content)?;
    let stats = summarize(&table)?;
    let series = parse_str(&content, config.samples)?;
    info!(
        "Parsed {}: {} rows, {} chart points",
        log_path.display(),
        table.rows.len(),
        series.len()
    );

    let artifacts = ReportArtifacts {
        spreadsheet: config.xlsx_path(),
        chart: config.png_path(),
    };

    write_workbook(&table, &stats, &artifacts.spreadsheet)?;
    info!("Wrote {}", artifacts.spreadsheet.display());

    if let Err(e) = render_chart(&series, &artifacts.chart) {
        let _ = std::fs::remove_file(&artifacts.spreadsheet);
        return Err(e);
    }
    info!("Wrote {}", artifacts.chart.display());

    Ok(artifacts)
}
