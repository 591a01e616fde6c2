//! Library-side configuration for the monitor and report tools.
//!
//! The binaries parse their command lines with clap and convert the result
//! into these structs, so nothing below depends on the CLI surface.

use std::path::PathBuf;
use std::time::Duration;

use crate::format::FieldSelection;

/// Default reports directory, relative to the working directory.
pub const DEFAULT_REPORTS_DIR: &str = "./reports";
/// Default monitoring log file name.
pub const DEFAULT_LOG_FILE: &str = "monitoring-mongodb.log";
/// Default report base name (`<name>.xlsx`, `<name>.png`).
pub const DEFAULT_REPORT_NAME: &str = "mongodb_stats";
/// Default number of chart points.
pub const DEFAULT_CHART_SAMPLES: usize = 8;

/// Invalid operator input, detected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Field name not in the canonical metric list.
    UnknownField(String),
    /// Field list selected nothing.
    EmptyFieldList,
    /// Answer to the overwrite/append prompt was not recognised.
    InvalidChoice(String),
    /// Polling interval must be at least one second.
    ZeroInterval,
    /// Chart sample count must be at least one.
    ZeroSamples,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownField(name) => write!(f, "unknown field '{}'", name),
            ConfigError::EmptyFieldList => write!(f, "field list is empty"),
            ConfigError::InvalidChoice(answer) => write!(f, "invalid option '{}'", answer),
            ConfigError::ZeroInterval => write!(f, "polling interval must be at least 1 second"),
            ConfigError::ZeroSamples => write!(f, "number of chart points must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for one monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Connection URI as supplied by the operator (not yet normalised).
    pub uri: String,
    pub interval: Duration,
    pub fields: FieldSelection,
    pub reports_dir: PathBuf,
    pub output_file: String,
}

impl MonitorConfig {
    pub fn new(
        uri: impl Into<String>,
        interval_secs: u64,
        fields: FieldSelection,
        reports_dir: impl Into<PathBuf>,
        output_file: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self {
            uri: uri.into(),
            interval: Duration::from_secs(interval_secs),
            fields,
            reports_dir: reports_dir.into(),
            output_file: output_file.into(),
        })
    }

    /// Full path of the monitoring log.
    pub fn log_path(&self) -> PathBuf {
        self.reports_dir.join(&self.output_file)
    }
}

/// Settings for one report run.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub reports_dir: PathBuf,
    pub log_file: String,
    pub output_name: String,
    pub samples: usize,
}

impl ReportConfig {
    pub fn new(
        reports_dir: impl Into<PathBuf>,
        log_file: impl Into<String>,
        output_name: impl Into<String>,
        samples: usize,
    ) -> Result<Self, ConfigError> {
        if samples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        Ok(Self {
            reports_dir: reports_dir.into(),
            log_file: log_file.into(),
            output_name: output_name.into(),
            samples,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.reports_dir.join(&self.log_file)
    }

    pub fn xlsx_path(&self) -> PathBuf {
        self.output_path("xlsx")
    }

    pub fn png_path(&self) -> PathBuf {
        self.output_path("png")
    }

    fn output_path(&self, ext: &str) -> PathBuf {
        self.reports_dir
            .join(format!("{}.{}", self.output_name, ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_config_rejects_zero_interval() {
        let err = MonitorConfig::new(
            "mongodb://h/",
            0,
            FieldSelection::all(),
            DEFAULT_REPORTS_DIR,
            DEFAULT_LOG_FILE,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::ZeroInterval);
    }

    #[test]
    fn monitor_config_log_path() {
        let fields = FieldSelection::all();
        let config = MonitorConfig::new("mongodb://h/", 5, fields, "/tmp/r", "m.log").unwrap();
        assert_eq!(config.log_path(), PathBuf::from("/tmp/r/m.log"));
        assert_eq!(config.interval, Duration::from_secs(5));
    }

    #[test]
    fn report_config_paths() {
        let config = ReportConfig::new("/tmp/r", DEFAULT_LOG_FILE, "stats", 8).unwrap();
        assert_eq!(
            config.log_path(),
            PathBuf::from("/tmp/r/monitoring-mongodb.log")
        );
        assert_eq!(config.xlsx_path(), PathBuf::from("/tmp/r/stats.xlsx"));
        assert_eq!(config.png_path(), PathBuf::from("/tmp/r/stats.png"));
    }

    #[test]
    fn report_config_rejects_zero_samples() {
        let err = ReportConfig::new("/tmp/r", "a.log", "b", 0).unwrap_err();
        assert_eq!(err, ConfigError::ZeroSamples);
    }
}
