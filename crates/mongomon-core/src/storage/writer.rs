//! Append-only monitoring log writer.
//!
//! The log is opened, appended to and closed on every write, so no handle
//! is held between samples and a tailing reader only ever sees whole lines
//! (up to the last completed write).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ConfigError;

/// Error type for log file operations.
#[derive(Debug)]
pub enum LogError {
    /// I/O error on the log file or reports directory.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Io { source, .. } => Some(source),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LogError + '_ {
    move |source| LogError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Operator's answer to "overwrite or append?" for an existing log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistingFileChoice {
    Overwrite,
    Append,
    /// Anything else; carries the raw answer for the error message.
    Invalid(String),
}

impl ExistingFileChoice {
    /// Interprets a prompt answer: `1` overwrites, `2` appends.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim() {
            "1" => ExistingFileChoice::Overwrite,
            "2" => ExistingFileChoice::Append,
            other => ExistingFileChoice::Invalid(other.to_string()),
        }
    }
}

/// How the writer treats the log path for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStrategy {
    /// No file exists; create it and start with a header.
    Fresh,
    /// Delete the existing file, then behave as `Fresh`.
    Overwrite,
    /// Continue the existing file; never write a header.
    Append,
}

impl FileStrategy {
    /// Whether the first write of the run is a header.
    pub fn writes_header(self) -> bool {
        !matches!(self, FileStrategy::Append)
    }
}

/// Decides the file strategy once per run.
///
/// The choice only matters when a file already exists.
pub fn resolve_file_strategy(
    existing: bool,
    choice: &ExistingFileChoice,
) -> Result<FileStrategy, ConfigError> {
    if !existing {
        return Ok(FileStrategy::Fresh);
    }
    match choice {
        ExistingFileChoice::Overwrite => Ok(FileStrategy::Overwrite),
        ExistingFileChoice::Append => Ok(FileStrategy::Append),
        ExistingFileChoice::Invalid(answer) => Err(ConfigError::InvalidChoice(answer.clone())),
    }
}

/// Creates the reports directory if it does not exist yet.
pub fn ensure_reports_dir(dir: &Path) -> Result<(), LogError> {
    if !dir.is_dir() {
        info!("Creating reports directory {}", dir.display());
    }
    std::fs::create_dir_all(dir).map_err(io_error(dir))
}

/// Writes header and data lines to the monitoring log.
pub struct LogWriter {
    path: PathBuf,
    /// True until the first line of this run has been written to a fresh file.
    at_start: bool,
    echo: bool,
    lines_written: u64,
}

impl LogWriter {
    /// Prepares the log at `path` according to `strategy`.
    ///
    /// `Overwrite` removes the existing file immediately. The parent
    /// directory is created if needed.
    pub fn open(path: impl Into<PathBuf>, strategy: FileStrategy) -> Result<Self, LogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_reports_dir(parent)?;
        }

        if strategy == FileStrategy::Overwrite && path.exists() {
            std::fs::remove_file(&path).map_err(io_error(&path))?;
            info!("Removed existing log {}", path.display());
        }

        Ok(Self {
            path,
            at_start: strategy.writes_header(),
            echo: false,
            lines_written: 0,
        })
    }

    /// Also print every written line to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Whether the next line is the first line of a fresh file, i.e. the header.
    pub fn header_pending(&self) -> bool {
        self.at_start
    }

    /// Number of successful `write_line` calls during this run.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Appends one record: a line, or several joined by `\n`.
    ///
    /// The first line of a fresh file is written without a leading newline;
    /// every other line is preceded by `\n`, so the file never ends with a
    /// newline and an appending run continues cleanly.
    pub fn write_line(&mut self, line: &str) -> Result<(), LogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error(&self.path))?;

        let record = if self.at_start {
            line.to_string()
        } else {
            format!("\n{}", line)
        };
        file.write_all(record.as_bytes())
            .map_err(io_error(&self.path))?;

        self.at_start = false;
        self.lines_written += 1;
        debug!("wrote record {}", self.lines_written);
        if self.echo {
            println!("{}", line);
        }
        Ok(())
    }
}
