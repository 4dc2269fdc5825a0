//! Signal evaluation command implementation.

use anyhow::{Context, Result};
use trading_config::AppConfig;
use trading_core::traits::Gateway;
use trading_strategies::StochRsiEntry;

use super::upbit_gateway;
use crate::cli::EvaluateArgs;

pub async fn run(args: EvaluateArgs, config: AppConfig) -> Result<()> {
    let asset = match args.asset {
        Some(asset) => asset,
        None => config
            .trading
            .assets
            .first()
            .cloned()
            .context("no asset given and trading.assets is empty")?,
    }
    .to_uppercase();

    let entry = StochRsiEntry::new(config.strategy.clone()).context("invalid strategy")?;
    let gateway = upbit_gateway(&config.exchange, false)?;

    let series = gateway
        .fetch_series(&asset, config.strategy.timeframe)
        .await
        .with_context(|| format!("fetching {} candles for {}", config.strategy.timeframe, asset))?;
    let decision = entry.evaluate(&series);

    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));

    println!("Asset:     {}", asset);
    println!("Timeframe: {}", config.strategy.timeframe);
    println!("Bars:      {} (warm-up {})", series.len(), entry.warmup_period());
    if let Some(bar) = series.last() {
        println!("Close:     {}", bar.close);
    }
    println!("%K:        {}", fmt(decision.k));
    println!("%D:        {}", fmt(decision.d));
    println!("Signal:    {}", decision.signal);

    Ok(())
}
