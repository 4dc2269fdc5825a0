//! Trading system CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use trading_config::load_config;
use trading_monitor::{setup_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.logging.level = level.as_str().to_string();
    }
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }

    // Setup logging; the guard flushes the file writer on exit
    let _guard = setup_logging(&config.logging)?;

    // Execute command
    match cli.command {
        Commands::Live(args) => cli::commands::live::run(args, config).await,
        Commands::Paper(args) => cli::commands::paper::run(args, config).await,
        Commands::Evaluate(args) => cli::commands::evaluate::run(args, config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&config, &cli.config).await,
        Commands::PruneLogs(args) => cli::commands::prune_logs::run(args, &config).await,
    }
}
