//! Paper trading gateway for simulation and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;
use tracing::{debug, info};
use trading_core::error::GatewayError;
use trading_core::traits::Gateway;
use trading_core::types::{
    BarSeries, Execution, Holding, OrderResult, OrderSizing, OrderState, Side, Timeframe,
};
use uuid::Uuid;

/// Volume precision used by the exchange.
const VOLUME_DP: u32 = 8;

/// Where the paper gateway reads prices and candles from.
enum MarketData {
    /// Fixed series and prices, set up by the caller
    Seeded {
        series: HashMap<String, BarSeries>,
        prices: HashMap<String, Decimal>,
    },
    /// Public market data from another gateway
    Delegated(Arc<dyn Gateway>),
}

struct PaperAccount {
    cash: Decimal,
    holdings: HashMap<String, Holding>,
    rejections: HashMap<String, String>,
}

/// Simulated exchange account.
///
/// Market buys spend the requested notional at the current price and
/// update the weighted average buy price; market sells fill at the current
/// price. Nothing leaves the process.
pub struct PaperGateway {
    account: Mutex<PaperAccount>,
    market: Mutex<MarketData>,
    quote_currency: String,
    fee_rate: Decimal,
}

impl PaperGateway {
    /// Create a paper account with `initial_cash` and no market data.
    pub fn new(initial_cash: Decimal) -> Self {
        Self::with_market(
            initial_cash,
            MarketData::Seeded {
                series: HashMap::new(),
                prices: HashMap::new(),
            },
        )
    }

    /// Create a paper account that reads market data from `source`.
    pub fn with_market_data(initial_cash: Decimal, source: Arc<dyn Gateway>) -> Self {
        Self::with_market(initial_cash, MarketData::Delegated(source))
    }

    fn with_market(initial_cash: Decimal, market: MarketData) -> Self {
        Self {
            account: Mutex::new(PaperAccount {
                cash: initial_cash,
                holdings: HashMap::new(),
                rejections: HashMap::new(),
            }),
            market: Mutex::new(market),
            quote_currency: "KRW".to_string(),
            fee_rate: dec!(0.0005),
        }
    }

    /// Set the quote currency reported as the cash holding.
    pub fn with_quote_currency(mut self, currency: impl Into<String>) -> Self {
        self.quote_currency = currency.into();
        self
    }

    /// Set the trading fee charged on both sides.
    pub fn with_fee_rate(mut self, fee_rate: Decimal) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// Start with an open position.
    pub fn with_holding(mut self, holding: Holding) -> Self {
        self.account
            .get_mut()
            .holdings
            .insert(holding.currency.clone(), holding);
        self
    }

    /// Seed a candle series. Ignored when market data is delegated.
    pub async fn seed_series(&self, series: BarSeries) {
        if let MarketData::Seeded { series: seeded, .. } = &mut *self.market.lock().await {
            seeded.insert(series.asset.clone(), series);
        }
    }

    /// Seed the current price of `asset`. Ignored when market data is delegated.
    pub async fn seed_price(&self, asset: &str, price: Decimal) {
        if let MarketData::Seeded { prices, .. } = &mut *self.market.lock().await {
            prices.insert(asset.to_string(), price);
        }
    }

    /// Reject every order for `asset` with `reason`.
    pub async fn reject_orders(&self, asset: &str, reason: impl Into<String>) {
        self.account
            .lock()
            .await
            .rejections
            .insert(asset.to_string(), reason.into());
    }

    /// Get available cash.
    pub async fn cash(&self) -> Decimal {
        self.account.lock().await.cash
    }

    /// Get the holding for `asset`, if any.
    pub async fn holding(&self, asset: &str) -> Option<Holding> {
        self.account.lock().await.holdings.get(asset).cloned()
    }

    async fn check_rejection(&self, asset: &str) -> Result<(), GatewayError> {
        match self.account.lock().await.rejections.get(asset) {
            Some(reason) => Err(GatewayError::OrderRejected(reason.clone())),
            None => Ok(()),
        }
    }

    fn execution(asset: &str, side: Side, sizing: OrderSizing, volume: Decimal) -> Execution {
        Execution {
            order_id: Uuid::new_v4().to_string(),
            asset: asset.to_string(),
            side,
            sizing,
            state: OrderState::Done,
            executed_volume: Some(volume),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl Gateway for PaperGateway {
    async fn fetch_series(
        &self,
        asset: &str,
        timeframe: Timeframe,
    ) -> Result<BarSeries, GatewayError> {
        let source = match &*self.market.lock().await {
            MarketData::Seeded { series, .. } => {
                return series.get(asset).cloned().ok_or_else(|| {
                    GatewayError::DataUnavailable(format!("no series for {}", asset))
                });
            }
            MarketData::Delegated(source) => Arc::clone(source),
        };
        source.fetch_series(asset, timeframe).await
    }

    async fn fetch_current_price(&self, asset: &str) -> Result<Decimal, GatewayError> {
        let source = match &*self.market.lock().await {
            MarketData::Seeded { prices, .. } => {
                return prices.get(asset).copied().ok_or_else(|| {
                    GatewayError::DataUnavailable(format!("no price for {}", asset))
                });
            }
            MarketData::Delegated(source) => Arc::clone(source),
        };
        source.fetch_current_price(asset).await
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, GatewayError> {
        let account = self.account.lock().await;

        let mut holdings = vec![Holding::new(
            self.quote_currency.clone(),
            account.cash,
            Decimal::ZERO,
        )];
        holdings.extend(account.holdings.values().filter(|h| h.is_open()).cloned());
        Ok(holdings)
    }

    async fn submit_market_buy(&self, asset: &str, notional: Decimal) -> OrderResult {
        self.check_rejection(asset).await?;
        if notional <= Decimal::ZERO {
            return Err(GatewayError::OrderRejected(format!(
                "notional must be positive, got {}",
                notional
            )));
        }

        let price = self.fetch_current_price(asset).await?;
        if price <= Decimal::ZERO {
            return Err(GatewayError::OrderRejected(format!("no valid price for {}", asset)));
        }

        let mut account = self.account.lock().await;
        let fee = notional * self.fee_rate;
        if account.cash < notional + fee {
            return Err(GatewayError::OrderRejected(format!(
                "insufficient cash: need {}, have {}",
                notional + fee,
                account.cash
            )));
        }

        let volume = (notional / price).round_dp(VOLUME_DP);
        if volume.is_zero() {
            return Err(GatewayError::OrderRejected(format!(
                "notional {} buys nothing at {}",
                notional, price
            )));
        }

        account.cash -= notional + fee;
        let holding = account
            .holdings
            .entry(asset.to_string())
            .or_insert_with(|| Holding::new(asset, Decimal::ZERO, Decimal::ZERO));
        let cost_basis = holding.quantity * holding.avg_buy_price + notional;
        holding.quantity += volume;
        holding.avg_buy_price = cost_basis / holding.quantity;

        debug!(asset, %volume, %price, "Paper buy filled");
        info!(asset, %notional, "Paper market buy");

        Ok(Self::execution(
            asset,
            Side::Buy,
            OrderSizing::Notional(notional),
            volume,
        ))
    }

    async fn submit_market_sell(&self, asset: &str, quantity: Decimal) -> OrderResult {
        self.check_rejection(asset).await?;

        let held = self
            .holding(asset)
            .await
            .map(|h| h.quantity)
            .unwrap_or(Decimal::ZERO);
        if held.is_zero() {
            return Err(GatewayError::OrderRejected(format!("no holding for {}", asset)));
        }
        if quantity <= Decimal::ZERO || quantity > held {
            return Err(GatewayError::OrderRejected(format!(
                "cannot sell {} {}, holding {}",
                quantity, asset, held
            )));
        }

        let price = self.fetch_current_price(asset).await?;

        let mut account = self.account.lock().await;
        let proceeds = quantity * price;
        account.cash += proceeds - proceeds * self.fee_rate;

        let remaining = held - quantity;
        if remaining.is_zero() {
            account.holdings.remove(asset);
        } else if let Some(holding) = account.holdings.get_mut(asset) {
            holding.quantity = remaining;
        }

        info!(asset, %quantity, %price, "Paper market sell");

        Ok(Self::execution(
            asset,
            Side::Sell,
            OrderSizing::Quantity(quantity),
            quantity,
        ))
    }

    fn name(&self) -> &str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading_core::types::{held_quantity, Bar};

    fn create_gateway() -> PaperGateway {
        PaperGateway::new(dec!(100000)).with_fee_rate(Decimal::ZERO)
    }

    #[tokio::test]
    async fn test_paper_buy() {
        let gateway = create_gateway();
        gateway.seed_price("BTC", dec!(50000000)).await;

        let execution = gateway.submit_market_buy("BTC", dec!(10000)).await.unwrap();
        assert_eq!(execution.side, Side::Buy);
        assert_eq!(execution.state, OrderState::Done);
        assert_eq!(execution.executed_volume, Some(dec!(0.0002)));

        assert_eq!(gateway.cash().await, dec!(90000));
        let holding = gateway.holding("BTC").await.unwrap();
        assert_eq!(holding.quantity, dec!(0.0002));
        assert_eq!(holding.avg_buy_price, dec!(50000000));
    }

    #[tokio::test]
    async fn test_weighted_average_price() {
        let gateway = create_gateway();

        gateway.seed_price("ETH", dec!(1000)).await;
        gateway.submit_market_buy("ETH", dec!(10000)).await.unwrap();
        gateway.seed_price("ETH", dec!(2000)).await;
        gateway.submit_market_buy("ETH", dec!(10000)).await.unwrap();

        let holding = gateway.holding("ETH").await.unwrap();
        assert_eq!(holding.quantity, dec!(15));
        // 20000 spent for 15 units
        assert_eq!(holding.avg_buy_price.round_dp(4), dec!(1333.3333));
    }

    #[tokio::test]
    async fn test_paper_sell_closes_position() {
        let gateway =
            create_gateway().with_holding(Holding::new("BTC", dec!(0.0002), dec!(50000000)));
        gateway.seed_price("BTC", dec!(50200000)).await;

        let execution = gateway.submit_market_sell("BTC", dec!(0.0002)).await.unwrap();
        assert_eq!(execution.side, Side::Sell);
        assert_eq!(execution.sizing, OrderSizing::Quantity(dec!(0.0002)));

        assert!(gateway.holding("BTC").await.is_none());
        assert_eq!(gateway.cash().await, dec!(110040));
    }

    #[tokio::test]
    async fn test_fee_charged() {
        let gateway = PaperGateway::new(dec!(100000));
        gateway.seed_price("BTC", dec!(50000000)).await;

        gateway.submit_market_buy("BTC", dec!(10000)).await.unwrap();
        assert_eq!(gateway.cash().await, dec!(89995));
    }

    #[tokio::test]
    async fn test_insufficient_cash_rejected() {
        let gateway = PaperGateway::new(dec!(5000)).with_fee_rate(Decimal::ZERO);
        gateway.seed_price("BTC", dec!(50000000)).await;

        let err = gateway.submit_market_buy("BTC", dec!(10000)).await.unwrap_err();
        assert!(matches!(err, GatewayError::OrderRejected(_)));
        assert_eq!(gateway.cash().await, dec!(5000));
    }

    #[tokio::test]
    async fn test_sell_without_holding_rejected() {
        let gateway = create_gateway();
        gateway.seed_price("XRP", dec!(800)).await;

        let err = gateway.submit_market_sell("XRP", dec!(10)).await.unwrap_err();
        assert!(matches!(err, GatewayError::OrderRejected(_)));
    }

    #[tokio::test]
    async fn test_injected_rejection() {
        let gateway = create_gateway();
        gateway.seed_price("BTC", dec!(50000000)).await;
        gateway.reject_orders("BTC", "market suspended").await;

        let err = gateway.submit_market_buy("BTC", dec!(10000)).await.unwrap_err();
        assert_eq!(err, GatewayError::OrderRejected("market suspended".into()));
        assert_eq!(gateway.cash().await, dec!(100000));
    }

    #[tokio::test]
    async fn test_holdings_include_cash() {
        let gateway = create_gateway().with_holding(Holding::new("ETH", dec!(1.5), dec!(3000000)));

        let holdings = gateway.fetch_holdings().await.unwrap();
        assert_eq!(held_quantity(&holdings, "KRW"), dec!(100000));
        assert_eq!(held_quantity(&holdings, "ETH"), dec!(1.5));
    }

    #[tokio::test]
    async fn test_seeded_and_missing_market_data() {
        let gateway = create_gateway();
        let bars = vec![Bar::new(0, 1.0, 1.0, 1.0, 1.0, 1.0)];
        gateway
            .seed_series(BarSeries::new("BTC", Timeframe::Minute1, bars))
            .await;

        let series = gateway.fetch_series("BTC", Timeframe::Minute1).await.unwrap();
        assert_eq!(series.len(), 1);

        let err = gateway.fetch_series("ETH", Timeframe::Minute1).await.unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
        let err = gateway.fetch_current_price("ETH").await.unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[tokio::test]
    async fn test_delegated_market_data() {
        let source = Arc::new(create_gateway());
        source.seed_price("BTC", dec!(42)).await;

        let gateway = PaperGateway::with_market_data(dec!(1000), source);
        assert_eq!(gateway.fetch_current_price("BTC").await.unwrap(), dec!(42));
    }
}
