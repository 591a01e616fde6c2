//! Parsing of log timestamps.
//!
//! Data lines carry the timestamp as one token, `2024-01-01-13:45:07.123000`:
//! date and time joined by `-`, fractional seconds of any precision.

use chrono::NaiveDateTime;

/// Parse format matching [`crate::format::TIMESTAMP_FORMAT`], accepting any
/// fraction length.
const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S%.f";

/// Error type for timestamp parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParseError {
    pub input: String,
    pub message: String,
}

impl std::fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse time '{}': {}", self.input, self.message)
    }
}

impl std::error::Error for TimeParseError {}

/// Parses a log timestamp token.
///
/// # Examples
///
/// ```
/// use mongomon_core::util::parse_log_timestamp;
///
/// let ts = parse_log_timestamp("2024-01-01-13:45:07.123000").unwrap();
/// assert_eq!(ts.to_string(), "2024-01-01 13:45:07.123");
/// ```
pub fn parse_log_timestamp(input: &str) -> Result<NaiveDateTime, TimeParseError> {
    NaiveDateTime::parse_from_str(input, LOG_TIMESTAMP_FORMAT).map_err(|e| TimeParseError {
        input: input.to_string(),
        message: format!("{} (expected YYYY-MM-DD-HH:MM:SS.ffffff)", e),
    })
}

/// Reduces a timestamp to its `HH:MM` chart label.
pub fn short_time_label(ts: &NaiveDateTime) -> String {
    ts.format("%H:%M").to_string()
}
