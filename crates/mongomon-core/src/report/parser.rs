//! Monitoring log parser and decimation.
//!
//! Reads a finished log, drops the header, keeps every `stride`-th data
//! line and turns each kept line into a chart point. The stride is
//! `max(lines / max_samples, 1)`, so points are evenly spaced by line
//! index, which equals even time spacing for a constant polling interval.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::Metric;
use crate::util::{TimeParseError, parse_log_timestamp, short_time_label};

/// Error type for log parsing.
#[derive(Debug)]
pub enum ParseError {
    /// The log could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The log has no header line.
    Empty,
    /// The header or a data line does not have the expected columns.
    SchemaMismatch(String),
    /// A value on a data line could not be parsed.
    Malformed { line: usize, reason: String },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            ParseError::Empty => write!(f, "log file is empty"),
            ParseError::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            ParseError::Malformed { line, reason } => write!(f, "line {}: {}", line, reason),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One chart point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    /// `HH:MM` of the sample.
    pub label: String,
    pub inserts: u64,
    pub queries: u64,
    pub updates: u64,
    pub deletes: u64,
}

/// At most `max_samples` evenly strided points from one log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecimatedSeries {
    points: Vec<SeriesPoint>,
}

impl DecimatedSeries {
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// X-axis labels in order.
    pub fn labels(&self) -> Vec<String> {
        self.points.iter().map(|p| p.label.clone()).collect()
    }
}

/// Column positions resolved from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    width: usize,
    inserts: usize,
    queries: usize,
    updates: usize,
    deletes: usize,
    timestamp: usize,
}

impl Columns {
    fn resolve(header: &str) -> Result<Self, ParseError> {
        let names: Vec<&str> = header.split_whitespace().collect();
        let find = |metric: Metric| {
            names
                .iter()
                .position(|n| *n == metric.name())
                .ok_or_else(|| {
                    ParseError::SchemaMismatch(format!(
                        "header has no '{}' column (header: '{}')",
                        metric.name(),
                        header.trim()
                    ))
                })
        };
        Ok(Self {
            width: names.len(),
            inserts: find(Metric::Inserts)?,
            queries: find(Metric::Query)?,
            updates: find(Metric::Updates)?,
            deletes: find(Metric::Deletes)?,
            timestamp: find(Metric::Timestamp)?,
        })
    }
}

/// Line stride for `len` data lines and at most `max_samples` points.
pub fn stride(len: usize, max_samples: usize) -> usize {
    if max_samples == 0 {
        return len.max(1);
    }
    (len / max_samples).max(1)
}

/// Indices kept by decimation: `0, stride, 2*stride, ...`, at most
/// `max_samples` of them.
pub fn decimate(len: usize, max_samples: usize) -> impl Iterator<Item = usize> {
    (0..len).step_by(stride(len, max_samples)).take(max_samples)
}

/// Reads the whole log at `path` into memory.
pub fn read_log(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and decimates the log at `path`.
pub fn parse(path: &Path, max_samples: usize) -> Result<DecimatedSeries, ParseError> {
    parse_str(&read_log(path)?, max_samples)
}

/// Decimates log text already in memory.
pub fn parse_str(content: &str, max_samples: usize) -> Result<DecimatedSeries, ParseError> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .filter(|h| !h.trim().is_empty())
        .ok_or(ParseError::Empty)?;
    let columns = Columns::resolve(header)?;

    let data: Vec<&str> = lines.collect();
    let step = stride(data.len(), max_samples);
    debug!(lines = data.len(), stride = step, "decimating log");

    let mut points = Vec::new();
    for index in decimate(data.len(), max_samples) {
        let line = data[index].trim();
        // Line numbers are 1-based and count the header.
        let line_no = index + 2;
        if !line.contains(char::is_whitespace) {
            continue;
        }
        points.push(parse_point(line, line_no, &columns)?);
    }

    Ok(DecimatedSeries { points })
}

fn parse_point(line: &str, line_no: usize, columns: &Columns) -> Result<SeriesPoint, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != columns.width {
        return Err(ParseError::SchemaMismatch(format!(
            "line {} has {} columns, header has {}",
            line_no,
            tokens.len(),
            columns.width
        )));
    }

    let counter = |idx: usize, name: &str| -> Result<u64, ParseError> {
        tokens[idx]
            .parse::<u64>()
            .map_err(|e| ParseError::Malformed {
                line: line_no,
                reason: format!("{} '{}': {}", name, tokens[idx], e),
            })
    };

    let timestamp = match parse_log_timestamp(tokens[columns.timestamp]) {
        Ok(timestamp) => timestamp,
        Err(TimeParseError { message, .. }) => {
            return Err(ParseError::Malformed {
                line: line_no,
                reason: message,
            });
        }
    };

    Ok(SeriesPoint {
        label: short_time_label(&timestamp),
        inserts: counter(columns.inserts, "Inserts")?,
        queries: counter(columns.queries, "Query")?,
        updates: counter(columns.updates, "Updates")?,
        deletes: counter(columns.deletes, "Deletes")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FieldSelection, LineKind, format_line};
    use crate::model::{MetricSample, ReplicaRole};
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use tempfile::tempdir;

    const HEADER: &str = "Host Status Connections Inserts Query Updates Deletes GetMore Command CursorsTotal CursorsNoTimeout Timestamp";

    fn log_with(lines: usize) -> String {
        let mut out = HEADER.to_string();
        for i in 0..lines {
            out.push_str(&format!(
                "\nhost1 Primary 5 {} {} 50 10 3 7 12 2 2024-01-01-{:02}:{:02}:00.000000",
                100 + i,
                200 + i,
                i / 60,
                i % 60
            ));
        }
        out
    }

    #[test]
    fn single_line_scenario() {
        let log = format!(
            "{}\nhost1 Primary 5 100 200 50 10 3 7 12 2 2024-01-01-00:00:00.000000",
            HEADER
        );
        let series = parse_str(&log, 8).unwrap();
        assert_eq!(
            series.points(),
            &[SeriesPoint {
                label: "00:00".to_string(),
                inserts: 100,
                queries: 200,
                updates: 50,
                deletes: 10,
            }]
        );
    }

    fn sample_at(start: DateTime<Utc>, i: u64) -> MetricSample {
        MetricSample {
            host: "db-1".to_string(),
            role: ReplicaRole::Secondary,
            connections: 40,
            inserts: 9_000_000_000 + i,
            queries: u64::MAX - i,
            updates: 4_294_967_296 * (i + 1),
            deletes: i,
            getmore: 0,
            commands: 0,
            cursors_total: 0,
            cursors_no_timeout: 0,
            timestamp: start + TimeDelta::seconds(61 * i as i64),
        }
    }

    #[test]
    fn formatted_samples_parse_back_exactly() {
        let fields = FieldSelection::parse("Inserts,Query,Updates,Deletes,Timestamp").unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 9, 23, 58, 0).unwrap();
        let start = start + TimeDelta::microseconds(987_654);
        let samples: Vec<MetricSample> = (0..3).map(|i| sample_at(start, i)).collect();

        let mut lines = vec![format_line(&samples[0], &fields, LineKind::Header)];
        for sample in &samples {
            lines.push(format_line(sample, &fields, LineKind::Data));
        }
        assert!(lines[1].ends_with("2024-03-09-23:58:00.987654"));

        let series = parse_str(&lines.join("\n"), 8).unwrap();
        assert_eq!(series.labels(), vec!["23:58", "23:59", "00:00"]);
        for (point, sample) in series.points().iter().zip(&samples) {
            assert_eq!(point.inserts, sample.inserts);
            assert_eq!(point.queries, sample.queries);
            assert_eq!(point.updates, sample.updates);
            assert_eq!(point.deletes, sample.deletes);
        }
        assert_eq!(series.points()[2].inserts, 9_000_000_002);
        assert_eq!(series.points()[0].queries, u64::MAX);
    }

    #[test]
    fn fewer_lines_than_samples_returns_all() {
        for n in 0..=8 {
            assert_eq!(parse_str(&log_with(n), 8).unwrap().len(), n);
        }
    }

    #[test]
    fn decimation_is_bounded() {
        for lines in [9, 10, 15, 16, 17, 100, 1_000] {
            let series = parse_str(&log_with(lines), 8).unwrap();
            let points = series.len();
            assert!(points <= 8, "{} lines gave {} points", lines, points);
        }
    }

    #[test]
    fn stride_picks_evenly_spaced_lines() {
        assert_eq!(stride(80, 8), 10);
        let kept = |len| decimate(len, 8).collect::<Vec<_>>();
        assert_eq!(kept(80), vec![0, 10, 20, 30, 40, 50, 60, 70]);
        assert_eq!(kept(3), vec![0, 1, 2]);
        assert_eq!(kept(10), vec![0, 1, 2, 3, 4, 5, 6, 7]);

        let series = parse_str(&log_with(80), 8).unwrap();
        let inserts: Vec<u64> = series.points().iter().map(|p| p.inserts).collect();
        assert_eq!(inserts, vec![100, 110, 120, 130, 140, 150, 160, 170]);
        assert_eq!(series.points()[7].label, "01:10");
    }

    #[test]
    fn decimation_is_deterministic() {
        let log = log_with(123);
        assert_eq!(parse_str(&log, 7).unwrap(), parse_str(&log, 7).unwrap());
    }

    #[test]
    fn single_token_lines_are_skipped() {
        let row = log_with(1).lines().nth(1).unwrap().to_string();
        let log = format!("{}\ngarbage\n{}", HEADER, row);
        let series = parse_str(&log, 8).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn custom_subset_resolves_columns_by_name() {
        let log = "Inserts Query Updates Deletes Timestamp\n1 2 3 4 2024-01-01-10:20:30.000000";
        let series = parse_str(log, 8).unwrap();
        assert_eq!(series.points()[0].label, "10:20");
        assert_eq!(series.points()[0].deletes, 4);
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let log = "Host Inserts Timestamp\nh 1 2024-01-01-00:00:00.000000";
        match parse_str(log, 8) {
            Err(ParseError::SchemaMismatch(msg)) => assert!(msg.contains("Query")),
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn short_row_is_schema_mismatch() {
        let log = format!("{}\nhost1 Primary 5 100", HEADER);
        assert!(matches!(
            parse_str(&log, 8),
            Err(ParseError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn bad_counter_aborts_parse() {
        let log = format!(
            "{}\nhost1 Primary 5 abc 200 50 10 3 7 12 2 2024-01-01-00:00:00.000000",
            HEADER
        );
        assert!(matches!(
            parse_str(&log, 8),
            Err(ParseError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn bad_timestamp_aborts_parse() {
        let log = format!("{}\nhost1 Primary 5 1 2 3 4 3 7 12 2 yesterday", HEADER);
        assert!(matches!(
            parse_str(&log, 8),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_log_is_error() {
        assert!(matches!(parse_str("", 8), Err(ParseError::Empty)));
    }

    #[test]
    fn parse_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.log");
        std::fs::write(&path, log_with(20)).unwrap();

        let series = parse(&path, 4).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.labels(), vec!["00:00", "00:05", "00:10", "00:15"]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            parse(&dir.path().join("nope.log"), 8),
            Err(ParseError::Io { .. })
        ));
    }
}
