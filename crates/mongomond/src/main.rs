//! mongomond - MongoDB server status sampler.
//!
//! Polls `serverStatus` on one node at a fixed interval and appends one
//! whitespace-aligned line per sample to a log under the reports directory.
//! Runs until interrupted (Ctrl-C), then closes the connection and exits 0.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, ValueEnum};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use mongomon_core::collector::MongoStatusSource;
use mongomon_core::config::{DEFAULT_LOG_FILE, DEFAULT_REPORTS_DIR, MonitorConfig};
use mongomon_core::format::FieldSelection;
use mongomon_core::sampler::Sampler;
use mongomon_core::storage::{
    ExistingFileChoice, FileStrategy, LogWriter, ensure_reports_dir, resolve_file_strategy,
};

const DEFAULT_FIELDS: &str = "Host,Status,Connections,Inserts,Query,Updates,Deletes,GetMore,Command,CursorsTotal,CursorsNoTimeout,Timestamp";

/// What to do with an existing log without prompting.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OnExisting {
    Overwrite,
    Append,
}

/// Real-time MongoDB server stats monitoring tool.
#[derive(Parser)]
#[command(name = "mongomond", about = "MongoDB server stats monitoring tool", version)]
struct Args {
    /// MongoDB connection URI.
    #[arg(long)]
    uri: String,

    /// Polling interval in seconds.
    #[arg(short, long, default_value = "1")]
    interval: u64,

    /// Comma-separated fields to record (case-insensitive).
    #[arg(short, long, default_value = DEFAULT_FIELDS)]
    field: String,

    /// Output file name, relative to the reports directory.
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    output: String,

    /// Directory holding logs and reports.
    #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
    reports_dir: String,

    /// Overwrite or append to an existing log without asking.
    #[arg(long, value_enum, value_name = "MODE")]
    on_existing: Option<OnExisting>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Logs go to stderr; stdout carries the echoed log lines.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["mongomond", "mongomon_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Asks the operator whether to overwrite or append to `path`.
fn prompt_existing(path: &Path) -> ExistingFileChoice {
    print!(
        "File {} already exists. Do you want to overwrite [1] or append [2] to it? : ",
        path.display()
    );
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => ExistingFileChoice::from_answer(&answer),
        Err(e) => ExistingFileChoice::Invalid(e.to_string()),
    }
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let fields = FieldSelection::parse(&args.field).unwrap_or_else(|e| fail(e));
    let config = MonitorConfig::new(
        &args.uri,
        args.interval,
        fields,
        &args.reports_dir,
        &args.output,
    )
    .unwrap_or_else(|e| fail(e));

    info!("mongomond {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, fields={}, output={}",
        config.interval.as_secs(),
        config.fields,
        config.log_path().display()
    );

    if let Err(e) = ensure_reports_dir(&config.reports_dir) {
        fail(e);
    }

    // Decide overwrite/append before any connection is attempted.
    let log_path = config.log_path();
    let existing = log_path.exists();
    let choice = match (existing, args.on_existing) {
        (false, _) => ExistingFileChoice::Overwrite,
        (true, Some(OnExisting::Overwrite)) => ExistingFileChoice::Overwrite,
        (true, Some(OnExisting::Append)) => ExistingFileChoice::Append,
        (true, None) => prompt_existing(&log_path),
    };
    let strategy = match resolve_file_strategy(existing, &choice) {
        Ok(strategy) => strategy,
        Err(e) => {
            eprintln!("Invalid option. Exiting.");
            fail(e);
        }
    };
    if strategy == FileStrategy::Append {
        info!("Appending to existing log {}", log_path.display());
    }

    let writer = LogWriter::open(&log_path, strategy)
        .unwrap_or_else(|e| fail(e))
        .with_echo(true);

    info!("Connecting to MongoDB");
    let source = MongoStatusSource::connect(&config.uri).unwrap_or_else(|e| fail(e));

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop");
    let mut sampler = Sampler::new(source, writer, config.fields.clone(), config.interval);
    match sampler.run(&running) {
        Ok(summary) => {
            println!();
            info!(
                "Monitoring stopped by the user ({} samples)",
                summary.samples
            );
            info!("Created report: {}", config.output_file);
        }
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_fields_select_everything() {
        assert_eq!(
            FieldSelection::parse(DEFAULT_FIELDS).unwrap(),
            FieldSelection::all()
        );
    }

    #[test]
    fn args_defaults() {
        let args = Args::try_parse_from(["mongomond", "--uri", "mongodb://h/"]).unwrap();
        assert_eq!(args.interval, 1);
        assert_eq!(args.output, "monitoring-mongodb.log");
        assert_eq!(args.reports_dir, "./reports");
        assert!(args.on_existing.is_none());
    }

    #[test]
    fn uri_is_required() {
        assert!(Args::try_parse_from(["mongomond"]).is_err());
    }

    #[test]
    fn on_existing_flag() {
        let args = Args::try_parse_from([
            "mongomond",
            "--uri",
            "mongodb://h/",
            "--on-existing",
            "append",
            "-f",
            "inserts,timestamp",
        ])
        .unwrap();
        assert!(matches!(args.on_existing, Some(OnExisting::Append)));
        assert_eq!(FieldSelection::parse(&args.field).unwrap().len(), 2);
    }
}
