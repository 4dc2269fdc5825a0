//! Exchange gateway trait definition.

use crate::error::GatewayError;
use crate::types::{BarSeries, Holding, OrderResult, Timeframe};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Market data and order gateway.
///
/// The engine never assumes atomicity across calls: holdings, prices and
/// series are independent snapshots that may disagree by the time an order
/// is submitted. Exchange-side validation is the final authority.
///
/// Implementations decode exchange responses into typed values here, so
/// callers never inspect raw payload shapes.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch recent candles for an asset, oldest first.
    async fn fetch_series(
        &self,
        asset: &str,
        timeframe: Timeframe,
    ) -> Result<BarSeries, GatewayError>;

    /// Fetch the latest traded price of an asset in the quote currency.
    async fn fetch_current_price(&self, asset: &str) -> Result<Decimal, GatewayError>;

    /// Fetch every balance on the account, including the quote currency.
    async fn fetch_holdings(&self) -> Result<Vec<Holding>, GatewayError>;

    /// Submit a market buy spending `notional` of the quote currency.
    async fn submit_market_buy(&self, asset: &str, notional: Decimal) -> OrderResult;

    /// Submit a market sell of `quantity` units of the asset.
    async fn submit_market_sell(&self, asset: &str, quantity: Decimal) -> OrderResult;

    /// Get the gateway name.
    fn name(&self) -> &str;
}
