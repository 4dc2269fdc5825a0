//! Config validation command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use trading_config::AppConfig;

pub async fn run(config: &AppConfig, config_path: &Path) -> Result<()> {
    config
        .validate()
        .with_context(|| format!("{} is invalid", config_path.display()))?;

    println!("Configuration is valid: {}", config_path.display());
    println!();
    println!("App:      {} ({})", config.app.name, config.app.environment);
    println!("Exchange: {} [{}]", config.exchange.base_url, config.exchange.quote_currency);
    println!("Assets:   {}", config.trading.assets.join(", "));
    println!("Notional: {}", config.trading.notional);
    println!("Interval: {}s", config.trading.interval_secs);
    println!(
        "Entry:    StochRSI({}, {}, {}) on {} below {}",
        config.strategy.rsi_period,
        config.strategy.smooth_k,
        config.strategy.smooth_d,
        config.strategy.timeframe,
        config.strategy.oversold
    );
    println!(
        "Exit:     +{} / {}",
        config.exit.profit_threshold, config.exit.stop_loss_threshold
    );
    match &config.logging.directory {
        Some(dir) => println!(
            "Logs:     {}/{} ({:?}, keep {})",
            dir, config.logging.file_prefix, config.logging.rotation, config.logging.max_files
        ),
        None => println!("Logs:     console only"),
    }

    Ok(())
}
