//! mongomon-report - builds a spreadsheet and chart from a mongomond log.
//!
//! Usage:
//!   mongomon-report                      # reports/monitoring-mongodb.log -> reports/mongodb_stats.{xlsx,png}
//!   mongomon-report -l day1.log -o day1  # custom input and output names
//!   mongomon-report -n 24                # 24 chart points

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use mongomon_core::config::{
    DEFAULT_CHART_SAMPLES, DEFAULT_LOG_FILE, DEFAULT_REPORT_NAME, DEFAULT_REPORTS_DIR,
    ReportConfig,
};
use mongomon_core::report::build_report;

/// MongoDB server stats report maker.
#[derive(Parser)]
#[command(name = "mongomon-report", about = "MongoDB server stats report maker", version)]
struct Args {
    /// Log file name, relative to the reports directory.
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    log: String,

    /// Output base name; writes <OUTPUT>.xlsx and <OUTPUT>.png.
    #[arg(short, long, default_value = DEFAULT_REPORT_NAME)]
    output: String,

    /// Number of time-series points to plot.
    #[arg(short, long = "num-lines", default_value_t = DEFAULT_CHART_SAMPLES)]
    num_lines: usize,

    /// Directory holding logs and reports.
    #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
    reports_dir: String,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
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
    for target in ["mongomon_report", "mongomon_core"] {
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

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = ReportConfig::new(&args.reports_dir, &args.log, &args.output, args.num_lines);
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match build_report(&config) {
        Ok(artifacts) => {
            info!("Created report: {}", artifacts.spreadsheet.display());
            info!("Created chart: {}", artifacts.chart.display());
        }
        Err(e) => {
            eprintln!(
                "Error building report from '{}': {}",
                config.log_path().display(),
                e
            );
            std::process::exit(1);
        }
    }
}
