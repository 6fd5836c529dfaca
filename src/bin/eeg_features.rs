//! EEG feature extraction command line tool
//!
//! # Usage
//!
//! ```bash
//! # 19-channel segments at 256 Hz, CSV in and out
//! eeg-features --input segments.csv --output features.csv
//!
//! # Custom configuration, JSON output, keep going past bad rows
//! eeg-features --input segments.csv --output features.json --format json \
//!     --config analysis.toml --on-error skip-and-report --errors skipped.csv
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use eeg_features::config::{ConfigLoader, RowErrorPolicy};
use eeg_features::io::{self, OutputFormat};
use eeg_features::processing::BatchFeatureProcessor;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OnErrorArg {
    Abort,
    SkipAndReport,
}

impl From<OnErrorArg> for RowErrorPolicy {
    fn from(arg: OnErrorArg) -> Self {
        match arg {
            OnErrorArg::Abort => RowErrorPolicy::Abort,
            OnErrorArg::SkipAndReport => RowErrorPolicy::SkipAndReport,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Level::ERROR,
            LogLevelArg::Warn => Level::WARN,
            LogLevelArg::Info => Level::INFO,
            LogLevelArg::Debug => Level::DEBUG,
            LogLevelArg::Trace => Level::TRACE,
        }
    }
}

/// Per-segment EEG feature extraction
#[derive(Parser, Debug)]
#[command(name = "eeg-features")]
#[command(author, version, about = "Extract per-segment EEG features from a CSV table", long_about = None)]
struct Cli {
    /// Input CSV, one flattened segment per row
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the feature table
    #[arg(short, long)]
    output: PathBuf,

    /// TOML analysis configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: FormatArg,

    /// Write skipped segments to this CSV
    #[arg(long)]
    errors: Option<PathBuf>,

    /// Input has no header row
    #[arg(long)]
    no_headers: bool,

    /// Worker threads (default: all cores)
    #[arg(short, long)]
    workers: Option<usize>,

    /// What to do with a failing segment
    #[arg(long, value_enum)]
    on_error: Option<OnErrorArg>,

    /// Logging verbosity level
    #[arg(short, long, value_enum, ignore_case = true, default_value = "info")]
    log_level: LogLevelArg,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("eeg-features v{}", env!("CARGO_PKG_VERSION"));

    let mut loader = ConfigLoader::new();
    if let Some(ref path) = cli.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;
    if let Some(workers) = cli.workers {
        config.workers = Some(workers);
    }
    if let Some(on_error) = cli.on_error {
        config.on_schema_mismatch = on_error.into();
    }
    config.validate().context("invalid configuration")?;

    let segments = io::read_segments(&cli.input, !cli.no_headers)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let processor = BatchFeatureProcessor::new(config)?;
    let report = processor.process(&segments)?;

    io::write_table(&cli.output, &report.table, cli.format.into())
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    info!(
        rows = report.table.len(),
        columns = report.table.columns().len(),
        output = %cli.output.display(),
        "Feature table written"
    );

    if !report.errors.is_empty() {
        match cli.errors {
            Some(ref path) => {
                io::write_error_report(path, &report.errors)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(skipped = report.errors.len(), path = %path.display(), "Error report written");
            }
            None => warn!(
                skipped = report.errors.len(),
                "Segments were skipped; pass --errors to keep a report"
            ),
        }
    }

    Ok(())
}
