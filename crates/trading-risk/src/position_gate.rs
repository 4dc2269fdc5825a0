//! Routing of assets by held quantity.

use std::collections::HashSet;

use rust_decimal::Decimal;

/// Path an asset takes in the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Nothing held: evaluate the entry signal
    Entry,
    /// Position open: evaluate exit conditions for the held quantity
    Exit { quantity: Decimal },
    /// Settlement currency: never traded
    Skip,
}

/// Routes assets to the entry or exit path.
///
/// Exchange balances are the only source of truth; the gate keeps no
/// memory of earlier cycles.
#[derive(Debug, Clone)]
pub struct PositionGate {
    settlement_currencies: HashSet<String>,
}

impl PositionGate {
    /// Create a gate that never trades the given settlement currencies.
    pub fn new<I, S>(settlement_currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            settlement_currencies: settlement_currencies
                .into_iter()
                .map(|c| c.as_ref().to_uppercase())
                .collect(),
        }
    }

    /// Check whether `asset` is a settlement currency.
    pub fn is_settlement(&self, asset: &str) -> bool {
        self.settlement_currencies.contains(&asset.to_uppercase())
    }

    /// Route `asset` given the quantity currently held.
    pub fn route(&self, asset: &str, quantity: Decimal) -> Route {
        if self.is_settlement(asset) {
            Route::Skip
        } else if quantity > Decimal::ZERO {
            Route::Exit { quantity }
        } else {
            Route::Entry
        }
    }
}

impl Default for PositionGate {
    fn default() -> Self {
        Self::new(["KRW", "USDT"])
    }
}
