//! Logging setup.

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trading_core::error::TradingError;

/// Console output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    #[default]
    Hourly,
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Minutely => Rotation::MINUTELY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
    /// Directory for rolling log files; console only when unset
    pub directory: Option<String>,
    /// File name prefix; rotated files are named `{prefix}.{date}`
    pub file_prefix: String,
    pub rotation: LogRotation,
    /// Rotated files kept on disk
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
            file_prefix: "trading.log".to_string(),
            rotation: LogRotation::Hourly,
            max_files: 24,
        }
    }
}

fn file_writer(
    config: &LoggingConfig,
) -> Result<Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)>, TradingError> {
    let Some(directory) = &config.directory else {
        return Ok(None);
    };

    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.into())
        .filename_prefix(&config.file_prefix)
        .max_log_files(config.max_files.max(1))
        .build(directory)
        .map_err(|e| TradingError::Config(format!("log directory {}: {}", directory, e)))?;

    Ok(Some(tracing_appender::non_blocking(appender)))
}

/// Install the global subscriber.
///
/// Logs go to the console in the configured format and, when a directory
/// is set, to a rolling file as plain text. The returned guard flushes the
/// file writer on drop and must live as long as the process logs.
pub fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, TradingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| TradingError::Config(format!("log level {}: {}", config.level, e)))?;

    let (file_layer, guard) = match file_writer(config)? {
        Some((writer, guard)) => (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        ),
        None => (None, None),
    };

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(file_layer)
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(file_layer)
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };
    result.map_err(|e| TradingError::Internal(format!("logging already initialized: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.rotation, LogRotation::Hourly);
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_file_writer_creates_appender() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().display().to_string()),
            ..Default::default()
        };

        assert!(file_writer(&config).unwrap().is_some());
        assert!(file_writer(&LoggingConfig::default()).unwrap().is_none());
    }
}
