//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Monitor TempLog and alert on threshold exceedance.
#[derive(Parser, Debug, Clone)]
#[command(name = "templog-monitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to JSON config file.
    #[arg(short, long, env = "TEMPLOG_CONFIG")]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Also write daily rolling log files into this directory.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Send a single test alert through the configured notifier and exit.
    #[arg(long)]
    pub test_notify: bool,
}

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}
