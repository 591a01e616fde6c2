//! Utility modules for mongomon.

mod time_parser;

pub use time_parser::{TimeParseError, parse_log_timestamp, short_time_label};
