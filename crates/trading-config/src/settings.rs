//! Configuration structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trading_core::error::TradingError;
use trading_monitor::LoggingConfig;
use trading_risk::ExitPolicy;
use trading_strategies::StochRsiEntryConfig;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeSettings,
    #[serde(default)]
    pub strategy: StochRsiEntryConfig,
    #[serde(default)]
    pub exit: ExitPolicy,
    #[serde(default)]
    pub trading: TradingSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "stoch-rsi-trader".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Exchange connection settings. Keys are read from the named variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    pub access_key_env: String,
    pub secret_key_env: String,
    pub base_url: String,
    pub quote_currency: String,
    pub request_timeout_secs: u64,
    pub candle_count: usize,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            access_key_env: "UPBIT_ACCESS_KEY".to_string(),
            secret_key_env: "UPBIT_SECRET_KEY".to_string(),
            base_url: "https://api.upbit.com".to_string(),
            quote_currency: "KRW".to_string(),
            request_timeout_secs: 10,
            candle_count: 200,
        }
    }
}

/// Trading loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingSettings {
    /// Watch list of assets evaluated for entry
    pub assets: Vec<String>,
    /// Quote-currency amount per market buy
    pub notional: Decimal,
    /// Pause between cycles
    pub interval_secs: u64,
    /// Currencies never traded
    pub settlement_currencies: Vec<String>,
    /// Upper bound on one gateway call
    pub gateway_timeout_secs: u64,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            assets: vec!["BTC".to_string()],
            notional: dec!(10000),
            interval_secs: 10,
            settlement_currencies: vec!["KRW".to_string(), "USDT".to_string()],
            gateway_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), TradingError> {
        let invalid = |msg: String| Err(TradingError::Config(msg));

        if self.trading.assets.iter().all(|a| a.trim().is_empty()) {
            return invalid("trading.assets must name at least one asset".into());
        }
        if self.trading.notional <= Decimal::ZERO {
            return invalid(format!(
                "trading.notional must be positive, got {}",
                self.trading.notional
            ));
        }
        if self.trading.interval_secs == 0 {
            return invalid("trading.interval_secs must be at least 1".into());
        }
        if self.trading.gateway_timeout_secs == 0 {
            return invalid("trading.gateway_timeout_secs must be at least 1".into());
        }
        if self.exit.profit_threshold <= Decimal::ZERO {
            return invalid(format!(
                "exit.profit_threshold must be positive, got {}",
                self.exit.profit_threshold
            ));
        }
        if self.exit.stop_loss_threshold >= Decimal::ZERO {
            return invalid(format!(
                "exit.stop_loss_threshold must be negative, got {}",
                self.exit.stop_loss_threshold
            ));
        }
        if self.exchange.candle_count == 0 || self.exchange.candle_count > 200 {
            return invalid(format!(
                "exchange.candle_count must be between 1 and 200, got {}",
                self.exchange.candle_count
            ));
        }

        self.strategy.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading_core::types::Timeframe;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy.rsi_period, 14);
        assert_eq!(config.trading.notional, dec!(10000));
        assert_eq!(config.exit.profit_threshold, dec!(0.0025));
    }

    #[test]
    fn test_parse_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [logging]
            level = "debug"
            format = "json"
            directory = "logs"
            rotation = "minutely"

            [strategy]
            oversold = 25.0
            timeframe = "5m"

            [exit]
            profit_threshold = "0.004"
            stop_loss_threshold = "-0.003"

            [trading]
            assets = ["ETH"]
            interval_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory.as_deref(), Some("logs"));
        assert_eq!(config.strategy.oversold, 25.0);
        assert_eq!(config.strategy.timeframe, Timeframe::Minute5);
        assert_eq!(config.strategy.smooth_k, 3);
        assert_eq!(config.exit.stop_loss_threshold, dec!(-0.003));
        assert_eq!(config.trading.assets, vec!["ETH"]);
        assert_eq!(config.trading.settlement_currencies, vec!["KRW", "USDT"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_overlapping_exit_band() {
        let mut config = AppConfig::default();
        config.exit.stop_loss_threshold = dec!(0.001);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.exit.profit_threshold = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_trading_settings() {
        let mut config = AppConfig::default();
        config.trading.assets.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.trading.notional = dec!(-1);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.trading.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_strategy() {
        let mut config = AppConfig::default();
        config.strategy.oversold = 0.0;
        assert!(matches!(config.validate(), Err(TradingError::Strategy(_))));
    }
}
