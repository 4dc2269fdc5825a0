//! Upbit REST v1 gateway.
//!
//! Public market data (candles, ticker) needs no credentials. Account and
//! order endpoints are signed with an HS256 JWT carrying the access key, a
//! fresh nonce and, when the request has parameters, a SHA-512 hash of the
//! query string.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{header, Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use tracing::{debug, info, warn};
use trading_core::error::GatewayError;
use trading_core::traits::Gateway;
use trading_core::types::{
    Bar, BarSeries, Execution, Holding, OrderResult, OrderSizing, OrderState, Side, Timeframe,
};
use url::Url;
use uuid::Uuid;

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.upbit.com";

/// Maximum candles Upbit returns per request.
const MAX_CANDLES: usize = 200;

/// Upbit API configuration.
#[derive(Debug, Clone)]
pub struct UpbitConfig {
    /// Access key, required for account and order endpoints
    pub access_key: Option<String>,
    /// Secret key used to sign tokens
    pub secret_key: Option<String>,
    /// REST base URL
    pub base_url: String,
    /// Quote currency of traded markets (market code `{quote}-{asset}`)
    pub quote_currency: String,
    /// Candles requested per series fetch (at most 200)
    pub candle_count: usize,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for UpbitConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            quote_currency: "KRW".to_string(),
            candle_count: MAX_CANDLES,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl UpbitConfig {
    /// Config for public market data only.
    pub fn public() -> Self {
        Self::default()
    }

    /// Config with credentials for private endpoints.
    pub fn with_credentials(access_key: String, secret_key: String) -> Self {
        Self {
            access_key: Some(access_key),
            secret_key: Some(secret_key),
            ..Self::default()
        }
    }

    /// Load credentials from the named environment variables.
    pub fn from_env(access_key_var: &str, secret_key_var: &str) -> Result<Self, GatewayError> {
        let access_key = std::env::var(access_key_var)
            .map_err(|_| GatewayError::Configuration(format!("{} not set", access_key_var)))?;
        let secret_key = std::env::var(secret_key_var)
            .map_err(|_| GatewayError::Configuration(format!("{} not set", secret_key_var)))?;
        Ok(Self::with_credentials(access_key, secret_key))
    }

    /// Exchange market code for `asset`, e.g. `KRW-BTC`.
    pub fn market(&self, asset: &str) -> String {
        format!("{}-{}", self.quote_currency, asset.to_uppercase())
    }

    fn has_credentials(&self) -> bool {
        self.access_key.is_some() && self.secret_key.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct UpbitCandle {
    timestamp: i64,
    opening_price: f64,
    high_price: f64,
    low_price: f64,
    trade_price: f64,
    candle_acc_trade_volume: f64,
}

#[derive(Debug, Deserialize)]
struct UpbitTicker {
    trade_price: f64,
}

#[derive(Debug, Deserialize)]
struct UpbitAccount {
    currency: String,
    balance: String,
    avg_buy_price: String,
}

#[derive(Debug, Deserialize)]
struct UpbitOrder {
    uuid: String,
    state: String,
    created_at: String,
    executed_volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpbitErrorBody {
    error: UpbitErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpbitErrorDetail {
    name: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    market: String,
    side: &'static str,
    ord_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<String>,
}

impl CreateOrderRequest {
    fn market_buy(market: String, notional: Decimal) -> Self {
        Self {
            market,
            side: "bid",
            ord_type: "price",
            price: Some(notional.normalize().to_string()),
            volume: None,
        }
    }

    fn market_sell(market: String, quantity: Decimal) -> Self {
        Self {
            market,
            side: "ask",
            ord_type: "market",
            price: None,
            volume: Some(quantity.normalize().to_string()),
        }
    }

    /// URL-encoded form of the body, in field order, for the query hash.
    fn query_string(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("market", &self.market);
        query.append_pair("side", self.side);
        query.append_pair("ord_type", self.ord_type);
        if let Some(price) = &self.price {
            query.append_pair("price", price);
        }
        if let Some(volume) = &self.volume {
            query.append_pair("volume", volume);
        }
        query.finish()
    }
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    access_key: &'a str,
    nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_hash_alg: Option<&'static str>,
}

/// SHA-512 hex digest of a URL-encoded query string.
fn query_hash(query: &str) -> String {
    hex::encode(Sha512::digest(query.as_bytes()))
}

/// Build an HS256 JWT for a private request.
fn sign_token(
    access_key: &str,
    secret_key: &str,
    query: Option<&str>,
) -> Result<String, GatewayError> {
    let claims = TokenClaims {
        access_key,
        nonce: Uuid::new_v4().to_string(),
        query_hash: query.map(query_hash),
        query_hash_alg: query.map(|_| "SHA512"),
    };

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = serde_json::to_vec(&claims)
        .map_err(|e| GatewayError::Authentication(e.to_string()))?;
    let signing_input = format!("{}.{}", header, URL_SAFE_NO_PAD.encode(payload));

    let mut mac = Hmac::<Sha256>::new_from_slice(secret_key.as_bytes())
        .map_err(|e| GatewayError::Authentication(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, GatewayError> {
    value.parse().map_err(|_| {
        GatewayError::MalformedResponse(format!("{} is not a decimal: {}", field, value))
    })
}

/// Shortest round-trip text of the float, so `812.5` stays `812.5`.
fn decimal_from_f64(value: f64, field: &str) -> Result<Decimal, GatewayError> {
    parse_decimal(&value.to_string(), field)
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

/// Decode a candle response (newest first) into a chronological series.
fn parse_candles(
    asset: &str,
    timeframe: Timeframe,
    body: &str,
) -> Result<BarSeries, GatewayError> {
    let candles: Vec<UpbitCandle> = decode(body)?;
    if candles.is_empty() {
        return Err(GatewayError::DataUnavailable(format!("no candles for {}", asset)));
    }

    let bars = candles
        .into_iter()
        .rev()
        .map(|c| {
            Bar::new(
                c.timestamp,
                c.opening_price,
                c.high_price,
                c.low_price,
                c.trade_price,
                c.candle_acc_trade_volume,
            )
        })
        .collect();

    Ok(BarSeries::new(asset, timeframe, bars))
}

fn parse_ticker(market: &str, body: &str) -> Result<Decimal, GatewayError> {
    let tickers: Vec<UpbitTicker> = decode(body)?;
    let ticker = tickers
        .first()
        .ok_or_else(|| GatewayError::DataUnavailable(format!("no ticker for {}", market)))?;
    let price = decimal_from_f64(ticker.trade_price, "trade_price")?;
    if price <= Decimal::ZERO {
        return Err(GatewayError::DataUnavailable(format!(
            "non-positive trade price {} for {}",
            price, market
        )));
    }
    Ok(price)
}

fn parse_accounts(body: &str) -> Result<Vec<Holding>, GatewayError> {
    let accounts: Vec<UpbitAccount> = decode(body)?;
    accounts
        .into_iter()
        .map(|a| {
            Ok(Holding {
                quantity: parse_decimal(&a.balance, "balance")?,
                avg_buy_price: parse_decimal(&a.avg_buy_price, "avg_buy_price")?,
                currency: a.currency,
            })
        })
        .collect()
}

fn parse_order(asset: &str, side: Side, sizing: OrderSizing, body: &str) -> OrderResult {
    let order: UpbitOrder = decode(body)?;

    let state: OrderState = order
        .state
        .parse()
        .map_err(GatewayError::MalformedResponse)?;
    let created_at = DateTime::parse_from_rfc3339(&order.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GatewayError::MalformedResponse(format!("created_at: {}", e)))?;
    let executed_volume = order
        .executed_volume
        .as_deref()
        .map(|v| parse_decimal(v, "executed_volume"))
        .transpose()?;

    Ok(Execution {
        order_id: order.uuid,
        asset: asset.to_string(),
        side,
        sizing,
        state,
        executed_volume,
        created_at,
    })
}

/// Map a non-2xx response body to a gateway error.
fn parse_error(status: StatusCode, body: &str, is_order: bool) -> GatewayError {
    let detail = match serde_json::from_str::<UpbitErrorBody>(body) {
        Ok(err) => format!("{}: {}", err.error.name, err.error.message),
        Err(_) => format!("{}: {}", status, body),
    };

    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Authentication(detail),
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited(detail),
        _ if is_order => GatewayError::OrderRejected(detail),
        _ => GatewayError::Api(detail),
    }
}

/// Upbit exchange gateway.
pub struct UpbitGateway {
    config: UpbitConfig,
    client: Client,
}

impl UpbitGateway {
    /// Create a new Upbit client.
    pub fn new(config: UpbitConfig) -> Result<Self, GatewayError> {
        Url::parse(&config.base_url)
            .map_err(|e| GatewayError::Configuration(format!("base URL: {}", e)))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create from environment credentials.
    pub fn from_env(access_key_var: &str, secret_key_var: &str) -> Result<Self, GatewayError> {
        Self::new(UpbitConfig::from_env(access_key_var, secret_key_var)?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &UpbitConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorization(&self, query: Option<&str>) -> Result<String, GatewayError> {
        match (&self.config.access_key, &self.config.secret_key) {
            (Some(access), Some(secret)) => {
                Ok(format!("Bearer {}", sign_token(access, secret, query)?))
            }
            _ => Err(GatewayError::Authentication(
                "access and secret keys are required for private endpoints".into(),
            )),
        }
    }

    async fn read_body(resp: Response, is_order: bool) -> Result<String, GatewayError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_error(status, &body, is_order));
        }
        Ok(body)
    }

    fn candles_path(timeframe: Timeframe) -> String {
        match timeframe {
            Timeframe::Day => "/v1/candles/days".to_string(),
            Timeframe::Week => "/v1/candles/weeks".to_string(),
            Timeframe::Month => "/v1/candles/months".to_string(),
            intraday => format!("/v1/candles/minutes/{}", intraday.minutes().unwrap_or(1)),
        }
    }

    async fn submit(
        &self,
        asset: &str,
        request: CreateOrderRequest,
        side: Side,
        sizing: OrderSizing,
    ) -> OrderResult {
        let authorization = self.authorization(Some(&request.query_string()))?;

        debug!(market = %request.market, side = request.side, "Submitting order");

        let resp = self
            .client
            .post(self.url("/v1/orders"))
            .header(header::AUTHORIZATION, authorization)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let body = Self::read_body(resp, true).await?;
        let execution = parse_order(asset, side, sizing, &body)?;

        info!(
            asset,
            side = %side,
            order_id = %execution.order_id,
            "Order accepted"
        );
        Ok(execution)
    }
}

#[async_trait]
impl Gateway for UpbitGateway {
    async fn fetch_series(
        &self,
        asset: &str,
        timeframe: Timeframe,
    ) -> Result<BarSeries, GatewayError> {
        let market = self.config.market(asset);
        let count = self.config.candle_count.clamp(1, MAX_CANDLES).to_string();

        let resp = self
            .client
            .get(self.url(&Self::candles_path(timeframe)))
            .query(&[("market", market.as_str()), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let body = Self::read_body(resp, false).await?;
        parse_candles(asset, timeframe, &body)
    }

    async fn fetch_current_price(&self, asset: &str) -> Result<Decimal, GatewayError> {
        let market = self.config.market(asset);

        let resp = self
            .client
            .get(self.url("/v1/ticker"))
            .query(&[("markets", market.as_str())])
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let body = Self::read_body(resp, false).await?;
        parse_ticker(&market, &body)
    }

    async fn fetch_holdings(&self) -> Result<Vec<Holding>, GatewayError> {
        if !self.config.has_credentials() {
            warn!("Fetching holdings without credentials");
        }
        let authorization = self.authorization(None)?;

        let resp = self
            .client
            .get(self.url("/v1/accounts"))
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let body = Self::read_body(resp, false).await?;
        parse_accounts(&body)
    }

    async fn submit_market_buy(&self, asset: &str, notional: Decimal) -> OrderResult {
        let request = CreateOrderRequest::market_buy(self.config.market(asset), notional);
        self.submit(asset, request, Side::Buy, OrderSizing::Notional(notional))
            .await
    }

    async fn submit_market_sell(&self, asset: &str, quantity: Decimal) -> OrderResult {
        let request = CreateOrderRequest::market_sell(self.config.market(asset), quantity);
        self.submit(asset, request, Side::Sell, OrderSizing::Quantity(quantity))
            .await
    }

    fn name(&self) -> &str {
        "upbit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_market_code() {
        let config = UpbitConfig::public();
        assert_eq!(config.market("btc"), "KRW-BTC");
    }

    #[test]
    fn test_token_without_query() {
        let token = sign_token("access", "secret", None).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header = decode_segment(parts[0]);
        assert_eq!(header["alg"], "HS256");

        let claims = decode_segment(parts[1]);
        assert_eq!(claims["access_key"], "access");
        assert!(Uuid::parse_str(claims["nonce"].as_str().unwrap()).is_ok());
        assert!(claims.get("query_hash").is_none());
    }

    #[test]
    fn test_token_with_query_hash() {
        let query = "market=KRW-BTC&side=bid&ord_type=price&price=10000";
        let token = sign_token("access", "secret", Some(query)).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let claims = decode_segment(parts[1]);
        assert_eq!(claims["query_hash_alg"], "SHA512");
        assert_eq!(claims["query_hash"], query_hash(query));
        assert_eq!(query_hash(query).len(), 128);
    }

    #[test]
    fn test_token_signature_verifies() {
        let token = sign_token("access", "secret", None).unwrap();
        let (signing_input, signature) = token.rsplit_once('.').unwrap();

        let mut mac = Hmac::<Sha256>::new_from_slice(b"secret").unwrap();
        mac.update(signing_input.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        assert_eq!(signature, expected);
    }

    #[test]
    fn test_order_request_query_string() {
        let buy = CreateOrderRequest::market_buy("KRW-BTC".into(), dec!(10000));
        assert_eq!(buy.query_string(), "market=KRW-BTC&side=bid&ord_type=price&price=10000");

        let sell = CreateOrderRequest::market_sell("KRW-ETH".into(), dec!(0.25000000));
        assert_eq!(sell.query_string(), "market=KRW-ETH&side=ask&ord_type=market&volume=0.25");
    }

    #[test]
    fn test_candles_reversed_to_chronological() {
        let body = r#"[
            {"market":"KRW-BTC","timestamp":1700000120000,"opening_price":3.0,"high_price":3.0,
             "low_price":3.0,"trade_price":3.0,"candle_acc_trade_volume":1.5},
            {"market":"KRW-BTC","timestamp":1700000060000,"opening_price":2.0,"high_price":2.0,
             "low_price":2.0,"trade_price":2.0,"candle_acc_trade_volume":1.0},
            {"market":"KRW-BTC","timestamp":1700000000000,"opening_price":1.0,"high_price":1.0,
             "low_price":1.0,"trade_price":1.0,"candle_acc_trade_volume":0.5}
        ]"#;

        let series = parse_candles("BTC", Timeframe::Minute1, body).unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.last().unwrap().volume, 1.5);
    }

    #[test]
    fn test_empty_candles_unavailable() {
        let err = parse_candles("BTC", Timeframe::Minute1, "[]").unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[test]
    fn test_malformed_candles() {
        let err = parse_candles("BTC", Timeframe::Minute1, r#"{"unexpected":true}"#).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_ticker_price() {
        let body = r#"[{"market":"KRW-BTC","trade_price":50125000.0}]"#;
        assert_eq!(parse_ticker("KRW-BTC", body).unwrap(), dec!(50125000));

        let body = r#"[{"market":"KRW-XRP","trade_price":812.5}]"#;
        assert_eq!(parse_ticker("KRW-XRP", body).unwrap(), dec!(812.5));

        assert!(matches!(
            parse_ticker("KRW-BTC", "[]"),
            Err(GatewayError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_ticker_without_price_is_unavailable() {
        let body = r#"[{"market":"KRW-BTC","trade_price":0.0}]"#;
        assert!(matches!(
            parse_ticker("KRW-BTC", body),
            Err(GatewayError::DataUnavailable(_))
        ));

        let body = r#"[{"market":"KRW-BTC","trade_price":-1.0}]"#;
        assert!(matches!(
            parse_ticker("KRW-BTC", body),
            Err(GatewayError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_accounts() {
        let body = r#"[
            {"currency":"KRW","balance":"150000.0","locked":"0.0","avg_buy_price":"0",
             "avg_buy_price_modified":false,"unit_currency":"KRW"},
            {"currency":"BTC","balance":"0.0002","locked":"0.0","avg_buy_price":"50000000",
             "avg_buy_price_modified":false,"unit_currency":"KRW"}
        ]"#;

        let holdings = parse_accounts(body).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[1].currency, "BTC");
        assert_eq!(holdings[1].quantity, dec!(0.0002));
        assert_eq!(holdings[1].avg_buy_price, dec!(50000000));
    }

    #[test]
    fn test_accounts_bad_number() {
        let body = r#"[{"currency":"BTC","balance":"abc","locked":"0","avg_buy_price":"1",
            "unit_currency":"KRW"}]"#;
        assert!(matches!(
            parse_accounts(body),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_order_response() {
        let body = r#"{"uuid":"cdd92199-2897-4e14-9448-f923320408ad","side":"bid",
            "ord_type":"price","price":"10000","state":"wait","market":"KRW-BTC",
            "created_at":"2024-04-10T15:42:23+09:00","volume":null,"executed_volume":"0"}"#;

        let execution =
            parse_order("BTC", Side::Buy, OrderSizing::Notional(dec!(10000)), body).unwrap();
        assert_eq!(execution.order_id, "cdd92199-2897-4e14-9448-f923320408ad");
        assert_eq!(execution.state, OrderState::Wait);
        assert_eq!(execution.executed_volume, Some(dec!(0)));
        assert_eq!(execution.created_at.timestamp(), 1_712_731_343);
    }

    #[test]
    fn test_error_body_becomes_order_rejected() {
        let body = r#"{"error":{"name":"insufficient_funds_bid","message":"Insufficient funds"}}"#;

        let err = parse_error(StatusCode::BAD_REQUEST, body, true);
        assert_eq!(
            err,
            GatewayError::OrderRejected("insufficient_funds_bid: Insufficient funds".into())
        );

        let err = parse_error(StatusCode::BAD_REQUEST, body, false);
        assert_eq!(err.kind(), "api");
    }

    #[test]
    fn test_auth_and_rate_limit_errors() {
        let body = r#"{"error":{"name":"invalid_access_key","message":"bad key"}}"#;
        assert_eq!(
            parse_error(StatusCode::UNAUTHORIZED, body, true).kind(),
            "authentication"
        );
        assert_eq!(
            parse_error(StatusCode::TOO_MANY_REQUESTS, "slow down", false).kind(),
            "rate_limited"
        );
    }

    #[test]
    fn test_candles_path() {
        assert_eq!(
            UpbitGateway::candles_path(Timeframe::Minute1),
            "/v1/candles/minutes/1"
        );
        assert_eq!(
            UpbitGateway::candles_path(Timeframe::Minute240),
            "/v1/candles/minutes/240"
        );
        assert_eq!(UpbitGateway::candles_path(Timeframe::Day), "/v1/candles/days");
    }

    #[tokio::test]
    async fn test_private_call_requires_credentials() {
        let gateway = UpbitGateway::new(UpbitConfig::public()).unwrap();
        let err = gateway.fetch_holdings().await.unwrap_err();
        assert_eq!(err.kind(), "authentication");
    }
}
