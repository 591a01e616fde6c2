//! The sampling loop: fetch, extract, format, write, sleep.
//!
//! ```text
//! Connecting ──▶ Sampling ──▶ Sampling ... ──▶ Interrupted ──▶ Closed
//!                   │                                            ▲
//!                   └────────────── error ───────────────────────┘
//! ```
//!
//! The stop flag is checked at iteration boundaries and between short
//! sleep slices, never in the middle of a write. The status source is
//! closed on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use crate::collector::{CollectError, StatusSource, extract};
use crate::format::{FieldSelection, LineKind, format_line};
use crate::model::MetricSample;
use crate::storage::{LogError, LogWriter};

/// Longest uninterrupted sleep between stop-flag checks.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Error that ends a sampling run.
#[derive(Debug)]
pub enum SampleError {
    Collect(CollectError),
    Log(LogError),
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Collect(e) => write!(f, "{}", e),
            SampleError::Log(e) => write!(f, "log write failed: {}", e),
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Collect(e) => Some(e),
            SampleError::Log(e) => Some(e),
        }
    }
}

impl From<CollectError> for SampleError {
    fn from(e: CollectError) -> Self {
        SampleError::Collect(e)
    }
}

impl From<LogError> for SampleError {
    fn from(e: LogError) -> Self {
        SampleError::Log(e)
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Samples written during this run.
    pub samples: u64,
}

/// Drives a [`StatusSource`] and a [`LogWriter`] on a fixed interval.
pub struct Sampler<S: StatusSource> {
    source: S,
    writer: LogWriter,
    fields: FieldSelection,
    interval: Duration,
    samples: u64,
}

impl<S: StatusSource> Sampler<S> {
    pub fn new(source: S, writer: LogWriter, fields: FieldSelection, interval: Duration) -> Self {
        Self {
            source,
            writer,
            fields,
            interval,
            samples: 0,
        }
    }

    /// Takes one sample and writes it.
    ///
    /// The header is emitted only before the very first line of a fresh
    /// file, which the writer tracks, and goes out in the same write as
    /// that line. Nothing is written if collection or extraction fails.
    pub fn sample_once(&mut self) -> Result<MetricSample, SampleError> {
        let status = self.source.server_status()?;
        let role = self.source.replica_role()?;
        let sample = extract(&status, role)?;

        let mut record = format_line(&sample, &self.fields, LineKind::Data);
        if self.writer.header_pending() {
            let header = format_line(&sample, &self.fields, LineKind::Header);
            record = format!("{}\n{}", header, record);
        }
        self.writer.write_line(&record)?;

        self.samples += 1;
        debug!("sample #{} written", self.samples);
        Ok(sample)
    }

    /// Runs until `running` is cleared or an error occurs.
    ///
    /// The source is closed before returning, whatever the outcome.
    pub fn run(&mut self, running: &AtomicBool) -> Result<RunSummary, SampleError> {
        let result = self.run_loop(running);
        self.source.close();
        info!("Connection closed after {} samples", self.samples);
        result
    }

    fn run_loop(&mut self, running: &AtomicBool) -> Result<RunSummary, SampleError> {
        while running.load(Ordering::SeqCst) {
            self.sample_once()?;
            self.sleep(running);
        }
        Ok(RunSummary {
            samples: self.samples,
        })
    }

    /// Sleeps for one interval in short slices so a stop request is
    /// noticed promptly.
    fn sleep(&self, running: &AtomicBool) {
        let mut remaining = self.interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Consumes the sampler, returning the status source.
    pub fn into_source(self) -> S {
        self.source
    }
}
