//! CLI command implementations.

pub mod evaluate;
pub mod live;
pub mod paper;
pub mod prune_logs;
pub mod validate;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use trading_broker::{UpbitConfig, UpbitGateway};
use trading_config::{AppConfig, ExchangeSettings};
use trading_core::traits::Gateway;
use trading_engine::{
    listen_for_shutdown, shutdown_channel, Orchestrator, OrchestratorConfig, Scheduler,
};

use crate::cli::LoopArgs;

/// Apply per-command overrides on top of the loaded configuration.
pub fn apply_loop_args(config: &mut AppConfig, args: &LoopArgs) {
    let assets: Vec<String> = args
        .assets
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if !assets.is_empty() {
        config.trading.assets = assets;
    }
    if let Some(interval) = args.interval {
        config.trading.interval_secs = interval;
    }
}

pub fn orchestrator_config(config: &AppConfig) -> OrchestratorConfig {
    OrchestratorConfig {
        assets: config.trading.assets.clone(),
        notional: config.trading.notional,
        settlement_currencies: config.trading.settlement_currencies.clone(),
        gateway_timeout: Duration::from_secs(config.trading.gateway_timeout_secs),
        entry: config.strategy.clone(),
        exit: config.exit,
    }
}

/// Build the exchange client. Public market data only when `credentials` is false.
pub fn upbit_gateway(settings: &ExchangeSettings, credentials: bool) -> Result<UpbitGateway> {
    let base = if credentials {
        UpbitConfig::from_env(&settings.access_key_env, &settings.secret_key_env)
            .context("reading exchange credentials")?
    } else {
        UpbitConfig::public()
    };

    let config = UpbitConfig {
        base_url: settings.base_url.clone(),
        quote_currency: settings.quote_currency.clone(),
        candle_count: settings.candle_count,
        request_timeout: Duration::from_secs(settings.request_timeout_secs),
        ..base
    };

    UpbitGateway::new(config).context("creating exchange client")
}

/// Run the trading loop against `gateway` until shutdown, or for one cycle.
pub async fn run_loop(gateway: Arc<dyn Gateway>, config: &AppConfig, once: bool) -> Result<()> {
    config.validate().context("invalid configuration")?;

    let orchestrator = Orchestrator::new(gateway.clone(), orchestrator_config(config))
        .context("creating orchestrator")?;
    let interval = Duration::from_secs(config.trading.interval_secs);

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut scheduler = Scheduler::new(orchestrator, interval, shutdown_rx);

    info!(
        gateway = gateway.name(),
        assets = ?scheduler.orchestrator().config().assets,
        notional = %config.trading.notional,
        interval_secs = config.trading.interval_secs,
        "Starting trading loop"
    );

    if once {
        let report = scheduler.run_once().await;
        println!("{}", report.summary());
        return Ok(());
    }

    let listener = tokio::spawn(listen_for_shutdown(shutdown_tx));
    let cycles = scheduler.run_until_shutdown().await;
    listener.abort();

    info!(cycles, "Trading loop stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_loop_args_override_config() {
        let mut config = AppConfig::default();
        let args = LoopArgs {
            assets: vec!["eth".to_string(), " ".to_string(), "XRP".to_string()],
            interval: Some(60),
            once: false,
        };

        apply_loop_args(&mut config, &args);

        assert_eq!(config.trading.assets, vec!["eth", "XRP"]);
        assert_eq!(config.trading.interval_secs, 60);
    }

    #[test]
    fn test_empty_args_keep_config() {
        let mut config = AppConfig::default();
        let args = LoopArgs {
            assets: Vec::new(),
            interval: None,
            once: true,
        };

        apply_loop_args(&mut config, &args);

        assert_eq!(config.trading.assets, vec!["BTC"]);
        assert_eq!(config.trading.interval_secs, 10);
    }

    #[test]
    fn test_orchestrator_config_from_settings() {
        let mut config = AppConfig::default();
        config.trading.notional = dec!(25000);
        config.trading.gateway_timeout_secs = 5;

        let orchestrator = orchestrator_config(&config);

        assert_eq!(orchestrator.notional, dec!(25000));
        assert_eq!(orchestrator.gateway_timeout, Duration::from_secs(5));
        assert_eq!(orchestrator.exit.profit_threshold, dec!(0.0025));
    }

    #[test]
    fn test_public_gateway_uses_exchange_settings() {
        let settings = ExchangeSettings {
            candle_count: 120,
            ..Default::default()
        };

        let gateway = upbit_gateway(&settings, false).unwrap();

        assert_eq!(gateway.config().candle_count, 120);
        assert!(gateway.config().access_key.is_none());
    }
}
