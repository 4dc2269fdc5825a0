//! Error types for the trading loop.

use thiserror::Error;

/// Top-level trading system error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Strategy-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised at the exchange gateway boundary.
///
/// Every variant is recoverable from the loop's point of view: the failing
/// asset is skipped for the current cycle and re-evaluated on the next one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("API error: {0}")]
    Api(String),
}

impl GatewayError {
    /// Short classification used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration",
            GatewayError::DataUnavailable(_) => "data_unavailable",
            GatewayError::MalformedResponse(_) => "malformed_response",
            GatewayError::OrderRejected(_) => "order_rejected",
            GatewayError::Authentication(_) => "authentication",
            GatewayError::Connection(_) => "connection",
            GatewayError::RateLimited(_) => "rate_limited",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Api(_) => "api",
        }
    }
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
