//! Configuration management.
//!
//! Settings are read from a TOML file and then overridden by environment
//! variables prefixed with `TRADING`, using `__` between path segments
//! (e.g. `TRADING__TRADING__NOTIONAL=20000`). List values in the
//! environment are comma separated.

mod settings;

pub use settings::{AppConfig, AppSettings, ExchangeSettings, TradingSettings};
pub use trading_monitor::LoggingConfig;

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("TRADING")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("trading.assets")
                .with_list_parse_key("trading.settlement_currencies"),
        )
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[trading]
assets = ["BTC", "XRP"]
notional = 20000

[exit]
profit_threshold = 0.005
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.trading.assets, vec!["BTC", "XRP"]);
        assert_eq!(config.trading.notional, dec!(20000));
        assert_eq!(config.exit.profit_threshold, dec!(0.005));
        assert_eq!(config.exit.stop_loss_threshold, dec!(-0.0025));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("absent.toml")).is_err());
    }
}
