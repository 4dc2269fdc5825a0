//! Per-cycle outcome report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use trading_core::error::GatewayError;
use trading_core::types::{EntryDecision, Execution, ExitReason, OrderIntent};

/// What happened to one asset during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetOutcome {
    /// Settlement currency, not traded
    Skipped,
    /// Flat asset without an entry signal
    NoEntry(EntryDecision),
    /// Open position kept inside the exit band
    Held {
        price: Decimal,
        avg_buy_price: Decimal,
    },
    /// Entry order accepted
    Bought(Execution),
    /// Exit order accepted
    Sold {
        reason: ExitReason,
        execution: Execution,
    },
    /// The exchange refused the order or the submission failed
    OrderFailed {
        intent: OrderIntent,
        error: GatewayError,
    },
    /// Market data for the asset could not be obtained
    Failed(GatewayError),
}

impl AssetOutcome {
    /// Check whether an order was accepted.
    pub fn is_order(&self) -> bool {
        matches!(self, AssetOutcome::Bought(_) | AssetOutcome::Sold { .. })
    }

    /// Check whether the asset hit an error.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AssetOutcome::OrderFailed { .. } | AssetOutcome::Failed(_)
        )
    }

    fn describe(&self) -> String {
        match self {
            AssetOutcome::Skipped => "skipped".to_string(),
            AssetOutcome::NoEntry(decision) => match (decision.k, decision.d) {
                (Some(k), Some(d)) => format!("{} (K {:.2}, D {:.2})", decision.signal, k, d),
                _ => decision.signal.to_string(),
            },
            AssetOutcome::Held {
                price,
                avg_buy_price,
            } => format!("HOLD at {} (avg {})", price, avg_buy_price),
            AssetOutcome::Bought(execution) => {
                format!("BUY {} [{}]", execution.sizing, execution.order_id)
            }
            AssetOutcome::Sold { reason, execution } => format!(
                "SELL {} on {} [{}]",
                execution.sizing, reason, execution.order_id
            ),
            AssetOutcome::OrderFailed { intent, error } => {
                format!("{} failed: {}", intent.side, error)
            }
            AssetOutcome::Failed(error) => format!("error: {}", error),
        }
    }
}

/// Outcome for a single asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetReport {
    pub asset: String,
    pub outcome: AssetOutcome,
}

/// Result of one orchestrator cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Cycle number, starting at 1
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when holdings could not be fetched and no asset was evaluated
    pub holdings_error: Option<GatewayError>,
    /// Set when shutdown was requested before every asset was evaluated
    pub interrupted: bool,
    pub assets: Vec<AssetReport>,
}

impl CycleReport {
    pub(crate) fn start(cycle: u64) -> Self {
        let now = Utc::now();
        Self {
            cycle,
            started_at: now,
            finished_at: now,
            holdings_error: None,
            interrupted: false,
            assets: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, asset: impl Into<String>, outcome: AssetOutcome) {
        self.assets.push(AssetReport {
            asset: asset.into(),
            outcome,
        });
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Outcome for `asset`, if it was evaluated.
    pub fn outcome(&self, asset: &str) -> Option<&AssetOutcome> {
        self.assets
            .iter()
            .find(|r| r.asset == asset)
            .map(|r| &r.outcome)
    }

    /// Number of accepted orders.
    pub fn orders_placed(&self) -> usize {
        self.assets.iter().filter(|r| r.outcome.is_order()).count()
    }

    /// Number of assets that hit an error.
    pub fn failures(&self) -> usize {
        self.assets.iter().filter(|r| r.outcome.is_failure()).count()
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str(&format!(
            "  CYCLE {}  ({})\n",
            self.cycle,
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        ));
        s.push_str("═══════════════════════════════════════════════════════════\n");

        if let Some(error) = &self.holdings_error {
            s.push_str(&format!("  Holdings unavailable: {}\n", error));
            return s;
        }

        for report in &self.assets {
            s.push_str(&format!("  {:<8} {}\n", report.asset, report.outcome.describe()));
        }

        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Orders: {}   Failures: {}{}\n",
            self.orders_placed(),
            self.failures(),
            if self.interrupted { "   (interrupted)" } else { "" }
        ));
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading_core::types::EntrySignal;

    #[test]
    fn test_counts_and_lookup() {
        let mut report = CycleReport::start(1);
        report.push("KRW", AssetOutcome::Skipped);
        report.push(
            "BTC",
            AssetOutcome::Failed(GatewayError::DataUnavailable("no candles".into())),
        );
        report.push(
            "ETH",
            AssetOutcome::NoEntry(EntryDecision {
                signal: EntrySignal::NoEntry,
                k: Some(55.0),
                d: Some(48.5),
            }),
        );
        let report = report.finish();

        assert_eq!(report.orders_placed(), 0);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.outcome("KRW"), Some(&AssetOutcome::Skipped));
        assert!(report.outcome("XRP").is_none());
    }

    #[test]
    fn test_summary_lists_assets() {
        let mut report = CycleReport::start(3);
        report.push(
            "ETH",
            AssetOutcome::NoEntry(EntryDecision {
                signal: EntrySignal::NoEntry,
                k: Some(55.0),
                d: Some(48.5),
            }),
        );

        let summary = report.finish().summary();
        assert!(summary.contains("CYCLE 3"));
        assert!(summary.contains("NONE (K 55.00, D 48.50)"));
        assert!(summary.contains("Orders: 0"));
    }

    #[test]
    fn test_summary_without_holdings() {
        let mut report = CycleReport::start(1);
        report.holdings_error = Some(GatewayError::Connection("reset".into()));

        assert!(report.summary().contains("Holdings unavailable"));
    }
}
