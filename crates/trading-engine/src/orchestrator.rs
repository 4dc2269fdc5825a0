//! One evaluation cycle over every managed asset.
//!
//! Holdings are fetched once per cycle and are the only record of open
//! positions. Each asset is then routed to the entry or exit path, at most
//! one order is submitted for it, and any failure is contained to that
//! asset.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use trading_core::error::{GatewayError, TradingError};
use trading_core::traits::Gateway;
use trading_core::types::{
    held_quantity, EntrySignal, ExitDecision, Holding, OrderIntent, OrderResult, OrderSizing,
};
use trading_risk::{ExitPolicy, PositionGate, Route};
use trading_strategies::{StochRsiEntry, StochRsiEntryConfig};

use crate::report::{AssetOutcome, CycleReport};

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Watch list evaluated every cycle (held assets are added on top)
    pub assets: Vec<String>,
    /// Quote-currency amount spent per entry
    pub notional: Decimal,
    /// Currencies that are never traded
    pub settlement_currencies: Vec<String>,
    /// Upper bound on a single gateway call
    pub gateway_timeout: Duration,
    /// Entry rule
    pub entry: StochRsiEntryConfig,
    /// Exit rule
    pub exit: ExitPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            assets: vec!["BTC".to_string()],
            notional: dec!(10000),
            settlement_currencies: vec!["KRW".to_string(), "USDT".to_string()],
            gateway_timeout: Duration::from_secs(15),
            entry: StochRsiEntryConfig::default(),
            exit: ExitPolicy::default(),
        }
    }
}

/// Drives one trading cycle at a time against a gateway.
pub struct Orchestrator {
    gateway: Arc<dyn Gateway>,
    config: OrchestratorConfig,
    entry: StochRsiEntry,
    gate: PositionGate,
    first_cycle: bool,
    cycles: u64,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Orchestrator {
    /// Create an orchestrator.
    pub fn new(
        gateway: Arc<dyn Gateway>,
        mut config: OrchestratorConfig,
    ) -> Result<Self, TradingError> {
        if config.notional <= Decimal::ZERO {
            return Err(TradingError::Config(format!(
                "notional must be positive, got {}",
                config.notional
            )));
        }

        let entry = StochRsiEntry::new(config.entry.clone())?;
        let gate = PositionGate::new(&config.settlement_currencies);

        let mut assets: Vec<String> = Vec::with_capacity(config.assets.len());
        for asset in config.assets.iter().map(|a| a.trim().to_uppercase()) {
            if !asset.is_empty() && !assets.contains(&asset) {
                assets.push(asset);
            }
        }
        config.assets = assets;

        Ok(Self {
            gateway,
            config,
            entry,
            gate,
            first_cycle: true,
            cycles: 0,
            shutdown: None,
        })
    }

    /// Stop between assets once `shutdown` turns true.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Number of cycles run so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Watch list first, then held assets outside it.
    pub fn managed_assets(&self, holdings: &[Holding]) -> Vec<String> {
        let mut assets = self.config.assets.clone();
        for holding in holdings {
            if holding.is_open()
                && !self.gate.is_settlement(&holding.currency)
                && !assets.contains(&holding.currency)
            {
                assets.push(holding.currency.clone());
            }
        }
        assets
    }

    async fn call<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        let limit = self.config.gateway_timeout;
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| GatewayError::Timeout {
                operation: operation.to_string(),
                secs: limit.as_secs(),
            })?
    }

    /// Run one cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycles += 1;
        if self.first_cycle {
            info!(
                gateway = self.gateway.name(),
                assets = ?self.config.assets,
                "First execution"
            );
            self.first_cycle = false;
        }

        let mut report = CycleReport::start(self.cycles);

        let holdings = match self.call("fetch_holdings", self.gateway.fetch_holdings()).await {
            Ok(holdings) => holdings,
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Failed to fetch holdings");
                report.holdings_error = Some(e);
                return report.finish();
            }
        };

        for holding in holdings.iter().filter(|h| !self.gate.is_settlement(&h.currency)) {
            info!(
                currency = %holding.currency,
                quantity = %holding.quantity,
                avg_buy_price = %holding.avg_buy_price,
                "Holding"
            );
        }

        for asset in self.managed_assets(&holdings) {
            if self.shutdown_requested() {
                warn!(cycle = self.cycles, "Shutdown requested, stopping cycle early");
                report.interrupted = true;
                break;
            }

            let quantity = held_quantity(&holdings, &asset);
            let outcome = match self.gate.route(&asset, quantity) {
                Route::Skip => AssetOutcome::Skipped,
                Route::Entry => self.evaluate_entry(&asset).await,
                Route::Exit { quantity } => {
                    let avg_buy_price = holdings
                        .iter()
                        .find(|h| h.currency == asset)
                        .map(|h| h.avg_buy_price)
                        .unwrap_or(Decimal::ZERO);
                    self.evaluate_exit(&asset, quantity, avg_buy_price).await
                }
            };
            report.push(asset, outcome);
        }

        let report = report.finish();
        debug!(
            cycle = report.cycle,
            orders = report.orders_placed(),
            failures = report.failures(),
            "Cycle finished"
        );
        report
    }

    async fn evaluate_entry(&self, asset: &str) -> AssetOutcome {
        let timeframe = self.entry.config().timeframe;
        let series = match self
            .call("fetch_series", self.gateway.fetch_series(asset, timeframe))
            .await
        {
            Ok(series) if series.is_empty() => {
                let e = GatewayError::DataUnavailable(format!("empty series for {}", asset));
                error!(asset, error = %e, kind = e.kind(), "No price data");
                return AssetOutcome::Failed(e);
            }
            Ok(series) => series,
            Err(e) => {
                error!(asset, error = %e, kind = e.kind(), "Failed to fetch price series");
                return AssetOutcome::Failed(e);
            }
        };

        let decision = self.entry.evaluate(&series);
        match decision.signal {
            EntrySignal::Enter => {
                info!(asset, k = ?decision.k, d = ?decision.d, "Entry signal");
                let intent = OrderIntent::buy_notional(asset, self.config.notional);
                match self.submit(&intent).await {
                    Ok(execution) => AssetOutcome::Bought(execution),
                    Err(error) => AssetOutcome::OrderFailed { intent, error },
                }
            }
            EntrySignal::NoEntry | EntrySignal::Undecided => {
                info!(
                    asset,
                    k = ?decision.k,
                    d = ?decision.d,
                    signal = %decision.signal,
                    "No entry"
                );
                AssetOutcome::NoEntry(decision)
            }
        }
    }

    async fn evaluate_exit(
        &self,
        asset: &str,
        quantity: Decimal,
        avg_buy_price: Decimal,
    ) -> AssetOutcome {
        let price = match self
            .call("fetch_current_price", self.gateway.fetch_current_price(asset))
            .await
        {
            Ok(price) if price <= Decimal::ZERO => {
                let e = GatewayError::DataUnavailable(format!(
                    "non-positive price {} for {}",
                    price, asset
                ));
                error!(asset, error = %e, kind = e.kind(), "No current price");
                return AssetOutcome::Failed(e);
            }
            Ok(price) => price,
            Err(e) => {
                error!(asset, error = %e, kind = e.kind(), "Failed to fetch current price");
                return AssetOutcome::Failed(e);
            }
        };

        match self.config.exit.evaluate(price, avg_buy_price) {
            ExitDecision::Exit(reason) => {
                info!(asset, %price, %avg_buy_price, %reason, "Exit signal");
                let intent = OrderIntent::sell_quantity(asset, quantity);
                match self.submit(&intent).await {
                    Ok(execution) => AssetOutcome::Sold { reason, execution },
                    Err(error) => AssetOutcome::OrderFailed { intent, error },
                }
            }
            ExitDecision::Hold => {
                let holding = Holding::new(asset, quantity, avg_buy_price);
                info!(
                    asset,
                    %price,
                    %avg_buy_price,
                    pnl_pct = %holding.unrealized_pnl_percent(price).round_dp(3),
                    "Holding position"
                );
                AssetOutcome::Held {
                    price,
                    avg_buy_price,
                }
            }
        }
    }

    /// Submit an intent once. Failures are logged and returned, never retried.
    async fn submit(&self, intent: &OrderIntent) -> OrderResult {
        let asset = intent.asset.as_str();
        let result = match intent.sizing {
            OrderSizing::Notional(notional) => {
                let order = self.gateway.submit_market_buy(asset, notional);
                self.call("submit_market_buy", order).await
            }
            OrderSizing::Quantity(quantity) => {
                let order = self.gateway.submit_market_sell(asset, quantity);
                self.call("submit_market_sell", order).await
            }
        };

        match &result {
            Ok(execution) => info!(
                asset,
                order = %intent,
                order_id = %execution.order_id,
                state = ?execution.state,
                "Order executed"
            ),
            Err(e) => error!(
                asset,
                order = %intent,
                error = %e,
                kind = e.kind(),
                "Order rejected"
            ),
        }
        result
    }
}
