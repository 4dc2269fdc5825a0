//! Profit-target and stop-loss exits.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trading_core::types::{ExitDecision, ExitReason};

/// Symmetric-band exit rule relative to the average acquisition price.
///
/// Both boundaries are inclusive: a price exactly on the profit target or
/// exactly on the stop level exits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitPolicy {
    /// Fractional gain that closes the position (0.0025 = +0.25%)
    pub profit_threshold: Decimal,
    /// Fractional loss that closes the position, negative (-0.0025 = -0.25%)
    pub stop_loss_threshold: Decimal,
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            profit_threshold: dec!(0.0025),
            stop_loss_threshold: dec!(-0.0025),
        }
    }
}

impl ExitPolicy {
    /// Create a policy with the given thresholds.
    pub fn new(profit_threshold: Decimal, stop_loss_threshold: Decimal) -> Self {
        Self {
            profit_threshold,
            stop_loss_threshold,
        }
    }

    /// Price at or above which the position is taken as profit.
    pub fn profit_target_price(&self, avg_buy_price: Decimal) -> Decimal {
        avg_buy_price * (Decimal::ONE + self.profit_threshold)
    }

    /// Price at or below which the position is stopped out.
    pub fn stop_loss_price(&self, avg_buy_price: Decimal) -> Decimal {
        avg_buy_price * (Decimal::ONE + self.stop_loss_threshold)
    }

    /// Decide whether a held position should be closed at `price`.
    pub fn evaluate(&self, price: Decimal, avg_buy_price: Decimal) -> ExitDecision {
        if price >= self.profit_target_price(avg_buy_price) {
            ExitDecision::Exit(ExitReason::ProfitTarget)
        } else if price <= self.stop_loss_price(avg_buy_price) {
            ExitDecision::Exit(ExitReason::StopLoss)
        } else {
            ExitDecision::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_thresholds() {
        let policy = ExitPolicy::default();
        let avg = dec!(100);

        assert_eq!(
            policy.evaluate(dec!(100.26), avg),
            ExitDecision::Exit(ExitReason::ProfitTarget)
        );
        assert_eq!(
            policy.evaluate(dec!(99.74), avg),
            ExitDecision::Exit(ExitReason::StopLoss)
        );
        assert_eq!(policy.evaluate(dec!(100.00), avg), ExitDecision::Hold);
    }

    #[test]
    fn test_exit_boundaries_are_inclusive() {
        let policy = ExitPolicy::default();
        let avg = dec!(100);

        assert_eq!(
            policy.evaluate(dec!(100.25), avg),
            ExitDecision::Exit(ExitReason::ProfitTarget)
        );
        assert_eq!(
            policy.evaluate(dec!(99.75), avg),
            ExitDecision::Exit(ExitReason::StopLoss)
        );
    }

    #[test]
    fn test_inside_band_holds() {
        let policy = ExitPolicy::default();
        let avg = dec!(50_000_000);

        assert_eq!(policy.evaluate(dec!(50_100_000), avg), ExitDecision::Hold);
        assert_eq!(policy.evaluate(dec!(49_900_000), avg), ExitDecision::Hold);
        assert!(policy.evaluate(dec!(50_125_000), avg).is_exit());
    }

    #[test]
    fn test_boundary_prices() {
        let policy = ExitPolicy::new(dec!(0.01), dec!(-0.02));

        assert_eq!(policy.profit_target_price(dec!(200)), dec!(202));
        assert_eq!(policy.stop_loss_price(dec!(200)), dec!(196));
    }
}
