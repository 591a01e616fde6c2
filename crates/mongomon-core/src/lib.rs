//! mongomon-core — shared library for the mongomon tools.
//!
//! Provides:
//! - `collector` — MongoDB status collection and metric extraction
//! - `config` — monitor/report settings and configuration errors
//! - `model` — metric sample and canonical column list
//! - `format` — whitespace-aligned log line rendering
//! - `storage` — append-only log file writer
//! - `sampler` — the interval-driven sampling loop
//! - `report` — log parsing, decimation, spreadsheet and chart export
//! - `fmt` — shared formatting helpers
//! - `util` — helper utilities

pub mod collector;
pub mod config;
pub mod fmt;
pub mod format;
pub mod model;
pub mod report;
pub mod sampler;
pub mod storage;
pub mod util;
