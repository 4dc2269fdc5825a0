//! Order intents and execution records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// How a market order is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum OrderSizing {
    /// Spend a fixed amount of the quote currency (market buy)
    Notional(Decimal),
    /// Sell a fixed quantity of the asset (market sell)
    Quantity(Decimal),
}

impl std::fmt::Display for OrderSizing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSizing::Notional(amount) => write!(f, "notional {}", amount),
            OrderSizing::Quantity(qty) => write!(f, "quantity {}", qty),
        }
    }
}

/// A market order the engine decided to place this cycle.
///
/// Intents are never persisted; if submission fails the next cycle
/// re-evaluates from fresh exchange state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Asset identifier (e.g. "BTC")
    pub asset: String,
    /// Buy or sell
    pub side: Side,
    /// Order sizing
    pub sizing: OrderSizing,
}

impl OrderIntent {
    /// Market buy spending `notional` of the quote currency.
    pub fn buy_notional(asset: impl Into<String>, notional: Decimal) -> Self {
        Self {
            asset: asset.into(),
            side: Side::Buy,
            sizing: OrderSizing::Notional(notional),
        }
    }

    /// Market sell of `quantity` units of the asset.
    pub fn sell_quantity(asset: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            asset: asset.into(),
            side: Side::Sell,
            sizing: OrderSizing::Quantity(quantity),
        }
    }
}

impl std::fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.side, self.asset, self.sizing)
    }
}

/// Exchange-side order state as reported on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Waiting in the order book
    Wait,
    /// Waiting for a trigger
    Watch,
    /// Fully executed
    Done,
    /// Canceled (market orders are reported this way once partially filled)
    Cancel,
}

impl std::str::FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wait" => Ok(OrderState::Wait),
            "watch" => Ok(OrderState::Watch),
            "done" => Ok(OrderState::Done),
            "cancel" => Ok(OrderState::Cancel),
            other => Err(format!("Unknown order state: {}", other)),
        }
    }
}

/// Execution record returned by the gateway after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Exchange order ID
    pub order_id: String,
    /// Asset identifier
    pub asset: String,
    /// Buy or sell
    pub side: Side,
    /// Sizing that was submitted
    pub sizing: OrderSizing,
    /// State reported by the exchange
    pub state: OrderState,
    /// Volume executed so far, if reported
    pub executed_volume: Option<Decimal>,
    /// When the exchange accepted the order
    pub created_at: DateTime<Utc>,
}

/// Outcome of an order submission.
pub type OrderResult = Result<Execution, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_intent() {
        let intent = OrderIntent::buy_notional("BTC", dec!(10000));
        assert_eq!(intent.side, Side::Buy);
        assert_eq!(intent.sizing, OrderSizing::Notional(dec!(10000)));
        assert_eq!(intent.to_string(), "BUY BTC (notional 10000)");
    }

    #[test]
    fn test_sell_intent() {
        let intent = OrderIntent::sell_quantity("ETH", dec!(0.5));
        assert_eq!(intent.side, Side::Sell);
        assert_eq!(intent.sizing, OrderSizing::Quantity(dec!(0.5)));
    }

    #[test]
    fn test_order_state_parse() {
        assert_eq!("done".parse::<OrderState>().unwrap(), OrderState::Done);
        assert_eq!("wait".parse::<OrderState>().unwrap(), OrderState::Wait);
        assert!("filled".parse::<OrderState>().is_err());
    }
}
