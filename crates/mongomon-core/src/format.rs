//! Rendering of metric samples as whitespace-delimited log lines.
//!
//! The log is positional text, not CSV. Every value renders as exactly one
//! token, so a header and the data lines written under the same
//! [`FieldSelection`] always split into the same number of columns.

use chrono::{DateTime, Utc};

use crate::config::ConfigError;
use crate::model::{Metric, MetricSample};

/// Timestamp layout for data lines: date and time joined by `-`,
/// microsecond fraction, no internal whitespace.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S%.6f";

/// Header lines are limited to this many tokens.
pub const MAX_HEADER_TOKENS: usize = 12;

/// Which physical line to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Column names.
    Header,
    /// Sample values.
    Data,
}

/// Metrics selected for one log file, always held in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    metrics: Vec<Metric>,
}

impl FieldSelection {
    /// Every canonical metric.
    pub fn all() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
        }
    }

    /// Parses a comma-separated, case-insensitive list of metric names.
    ///
    /// The listed order is ignored; output keeps canonical column order.
    /// Duplicates collapse.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let mut metrics = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            metrics.push(name.parse::<Metric>()?);
        }
        Self::from_metrics(metrics)
    }

    pub fn from_metrics(metrics: impl IntoIterator<Item = Metric>) -> Result<Self, ConfigError> {
        let mut metrics: Vec<Metric> = metrics.into_iter().collect();
        metrics.sort();
        metrics.dedup();
        if metrics.is_empty() {
            return Err(ConfigError::EmptyFieldList);
        }
        Ok(Self { metrics })
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Metric> + '_ {
        self.metrics.iter().copied()
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl std::fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(Metric::name).collect();
        f.write_str(&names.join(","))
    }
}

/// Renders one log line for `sample` restricted to `fields`.
///
/// `LineKind::Header` ignores the sample values and emits column names.
pub fn format_line(sample: &MetricSample, fields: &FieldSelection, kind: LineKind) -> String {
    match kind {
        LineKind::Header => format_header(fields),
        LineKind::Data => fields
            .iter()
            .map(|m| value_token(sample, m))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Renders the header line for `fields`.
pub fn format_header(fields: &FieldSelection) -> String {
    fields
        .iter()
        .map(Metric::name)
        .take(MAX_HEADER_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders a timestamp as a single log token.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn value_token(sample: &MetricSample, metric: Metric) -> String {
    match metric {
        Metric::Host => single_token(&sample.host),
        Metric::Status => sample.role.to_string(),
        Metric::Connections => sample.connections.to_string(),
        Metric::Inserts => sample.inserts.to_string(),
        Metric::Query => sample.queries.to_string(),
        Metric::Updates => sample.updates.to_string(),
        Metric::Deletes => sample.deletes.to_string(),
        Metric::GetMore => sample.getmore.to_string(),
        Metric::Command => sample.commands.to_string(),
        Metric::CursorsTotal => sample.cursors_total.to_string(),
        Metric::CursorsNoTimeout => sample.cursors_no_timeout.to_string(),
        Metric::Timestamp => format_timestamp(&sample.timestamp),
    }
}

/// Replaces embedded whitespace so a free-form value stays one column.
fn single_token(value: &str) -> String {
    if value.is_empty() {
        return "-".to_string();
    }
    value
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReplicaRole;
    use chrono::TimeZone;

    fn sample() -> MetricSample {
        MetricSample {
            host: "host1".to_string(),
            role: ReplicaRole::Primary,
            connections: 5,
            inserts: 100,
            queries: 200,
            updates: 50,
            deletes: 10,
            getmore: 3,
            commands: 7,
            cursors_total: 12,
            cursors_no_timeout: 2,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn full_header_and_line() {
        let fields = FieldSelection::all();
        assert_eq!(
            format_line(&sample(), &fields, LineKind::Header),
            "Host Status Connections Inserts Query Updates Deletes GetMore Command CursorsTotal CursorsNoTimeout Timestamp"
        );
        assert_eq!(
            format_line(&sample(), &fields, LineKind::Data),
            "host1 Primary 5 100 200 50 10 3 7 12 2 2024-01-01-00:00:00.000000"
        );
    }

    #[test]
    fn selection_filters_but_never_reorders() {
        let fields = FieldSelection::parse("timestamp, INSERTS,host").unwrap();
        assert_eq!(format_header(&fields), "Host Inserts Timestamp");
        assert_eq!(
            format_line(&sample(), &fields, LineKind::Data),
            "host1 100 2024-01-01-00:00:00.000000"
        );
    }

    #[test]
    fn header_and_data_token_counts_match_for_every_subset() {
        let s = sample();
        // Every non-empty subset of the 12 metrics.
        for mask in 1u32..(1 << Metric::ALL.len()) {
            let chosen = Metric::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, m)| *m);
            let fields = FieldSelection::from_metrics(chosen).unwrap();
            let header = format_line(&s, &fields, LineKind::Header);
            let data = format_line(&s, &fields, LineKind::Data);
            assert_eq!(
                header.split_whitespace().count(),
                data.split_whitespace().count(),
                "mismatch for {}",
                fields
            );
        }
    }

    #[test]
    fn timestamp_is_one_token_with_microseconds() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let token = format_timestamp(&ts);
        assert_eq!(token, "2023-11-14-22:13:20.123000");
        assert!(!token.contains(' '));
    }

    #[test]
    fn whitespace_in_host_is_replaced() {
        let mut s = sample();
        s.host = "bad host".to_string();
        let fields = FieldSelection::parse("Host,Status").unwrap();
        assert_eq!(format_line(&s, &fields, LineKind::Data), "bad_host Primary");
    }

    #[test]
    fn parse_rejects_unknown_and_empty() {
        assert_eq!(
            FieldSelection::parse("Host,Latency"),
            Err(ConfigError::UnknownField("Latency".to_string()))
        );
        assert_eq!(
            FieldSelection::parse(" , "),
            Err(ConfigError::EmptyFieldList)
        );
    }

    #[test]
    fn duplicates_collapse() {
        let fields = FieldSelection::parse("query,Query,QUERY").unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains(Metric::Query));
    }
}
