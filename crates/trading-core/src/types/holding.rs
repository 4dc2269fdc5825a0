//! Account holdings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance of a single currency held on the exchange.
///
/// A quantity of zero means there is no open position; `avg_buy_price`
/// carries no meaning in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Currency code (e.g. "BTC", "KRW")
    pub currency: String,
    /// Freely available quantity
    pub quantity: Decimal,
    /// Average acquisition price in the quote currency
    pub avg_buy_price: Decimal,
}

impl Holding {
    /// Create a holding.
    pub fn new(currency: impl Into<String>, quantity: Decimal, avg_buy_price: Decimal) -> Self {
        Self {
            currency: currency.into(),
            quantity,
            avg_buy_price,
        }
    }

    /// Check whether a position is open.
    pub fn is_open(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    /// Unrealized P&L at `price` as a percentage of the acquisition price.
    pub fn unrealized_pnl_percent(&self, price: Decimal) -> Decimal {
        if self.avg_buy_price == Decimal::ZERO {
            return Decimal::ZERO;
        }
        (price - self.avg_buy_price) / self.avg_buy_price * Decimal::ONE_HUNDRED
    }
}

/// Held quantity of `currency`, zero when the currency is not in the list.
pub fn held_quantity(holdings: &[Holding], currency: &str) -> Decimal {
    holdings
        .iter()
        .find(|h| h.currency == currency)
        .map(|h| h.quantity)
        .unwrap_or(Decimal::ZERO)
}
