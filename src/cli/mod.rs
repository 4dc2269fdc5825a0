//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trading")]
#[command(author, version, about = "Stochastic RSI spot trading loop")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trade against the exchange with real orders
    Live(LoopArgs),
    /// Trade a simulated account on live market data
    Paper(PaperArgs),
    /// Print the latest Stochastic RSI and entry signal for an asset
    Evaluate(EvaluateArgs),
    /// Validate configuration
    ValidateConfig,
    /// Delete rotated log files beyond the retention limit
    PruneLogs(PruneLogsArgs),
}

#[derive(clap::Args)]
pub struct LoopArgs {
    /// Assets to watch (comma-separated, overrides the configured list)
    #[arg(short, long, value_delimiter = ',')]
    pub assets: Vec<String>,

    /// Seconds between cycles
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(clap::Args)]
pub struct PaperArgs {
    #[command(flatten)]
    pub run: LoopArgs,

    /// Starting cash in the quote currency
    #[arg(long, default_value = "1000000")]
    pub cash: Decimal,
}

#[derive(clap::Args)]
pub struct EvaluateArgs {
    /// Asset to evaluate (defaults to the first configured asset)
    #[arg(short, long)]
    pub asset: Option<String>,
}

#[derive(clap::Args)]
pub struct PruneLogsArgs {
    /// Rotated files to keep (defaults to logging.max_files)
    #[arg(short, long)]
    pub keep: Option<usize>,

    /// Log directory (defaults to logging.directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}
