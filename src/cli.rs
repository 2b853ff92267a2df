use crate::checks::CheckKind;
use crate::cleaner::QUARANTINE_DIR;
use crate::config::HealthConfig;
use crate::errors::Result;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dataset-health")]
#[command(about = "Dataset health checker: class balance, duplicates, corrupt files and sample quality", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dataset folder to scan
    pub folder: PathBuf,

    /// Checks to run, e.g. "(duplicate, quality)". Runs every check when
    /// omitted. Available: class_imbalance, duplicate, corrupt_file, quality
    pub checks: Option<String>,

    /// Save the report as dataset_health_report.md in the dataset folder
    #[arg(long)]
    pub md: bool,

    /// Save the report as dataset_health_report.json in the dataset folder
    #[arg(long)]
    pub json: bool,

    /// Move flagged files into <dataset>/_quarantine
    #[arg(long)]
    pub clean: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to .dataset-health.toml, searched upward)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sort directory entries by name for reproducible results
    #[arg(long)]
    pub sorted: bool,

    /// Worker threads for I/O-bound work
    #[arg(long, env = "DATASET_HEALTH_IO_WORKERS")]
    pub io_workers: Option<usize>,

    /// Worker threads for image decoding
    #[arg(long, env = "DATASET_HEALTH_CPU_WORKERS")]
    pub cpu_workers: Option<usize>,

    /// Append the performance log to the configured log file
    #[arg(long)]
    pub perf_log: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Markdown => crate::io::output::OutputFormat::Markdown,
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
        }
    }
}

impl Cli {
    /// Checks named on the command line, or `None` to defer to the config.
    pub fn selected_checks(&self) -> Result<Option<Vec<CheckKind>>> {
        self.checks
            .as_deref()
            .map(CheckKind::parse_selection)
            .transpose()
    }

    /// Apply command-line flags on top of file configuration.
    pub fn apply_overrides(&self, config: &mut HealthConfig) {
        if let Some(n) = self.io_workers {
            config.parallel.io_workers = n;
        }
        if let Some(n) = self.cpu_workers {
            config.parallel.cpu_workers = Some(n);
        }
        if self.sorted {
            config.tree.sort_entries = true;
        }
        if !config
            .tree
            .ignore_patterns
            .iter()
            .any(|p| p == QUARANTINE_DIR)
        {
            config.tree.ignore_patterns.push(QUARANTINE_DIR.to_string());
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
