//! TradeOgre API Client
//!
//! HTTP client for the TradeOgre v1 REST API.
//! Public endpoints (ticker, history) need no credentials; account endpoints
//! (balances, orders) use HTTP basic auth with the API key and secret.
//! Each call is a single attempt. Callers decide what a failure means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::types::{parse_balances, rejection, HistoryEntry, OrderResponse, Ticker};
use crate::config::Config;
use crate::domain::{OrderRequest, Side};
use crate::ports::{
    AccountError, AccountPort, Balances, MarketDataError, MarketDataPort, OrderReceipt, PricePoint,
};

#[derive(Debug, Error)]
pub enum TradeOgreError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("API key and secret required for account endpoints")]
    MissingCredentials,
}

impl From<TradeOgreError> for MarketDataError {
    fn from(e: TradeOgreError) -> Self {
        match e {
            TradeOgreError::Rejected(msg) => MarketDataError::Rejected(msg),
            TradeOgreError::ParseError(msg) => MarketDataError::ParseError(msg),
            other => MarketDataError::RestError(other.to_string()),
        }
    }
}

impl From<TradeOgreError> for AccountError {
    fn from(e: TradeOgreError) -> Self {
        match e {
            TradeOgreError::Rejected(msg) => AccountError::Rejected(msg),
            TradeOgreError::ParseError(msg) => AccountError::ParseError(msg),
            TradeOgreError::MissingCredentials => {
                AccountError::Authentication("API key and secret required".to_string())
            }
            TradeOgreError::ApiError { status: 401 | 403, body } => AccountError::Authentication(body),
            other => AccountError::ApiError(other.to_string()),
        }
    }
}

/// TradeOgre client configuration
#[derive(Debug, Clone)]
pub struct TradeOgreConfig {
    /// Base URL for the API
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for TradeOgreConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://tradeogre.com/api/v1".to_string(),
            api_key: None,
            api_secret: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for TradeOgreConfig {
    fn from(config: &Config) -> Self {
        Self {
            api_base_url: config.exchange.api_url.trim_end_matches('/').to_string(),
            api_key: config.exchange.get_api_key(),
            api_secret: config.exchange.get_api_secret(),
            timeout: config.exchange.timeout(),
        }
    }
}

/// TradeOgre exchange client
#[derive(Debug, Clone)]
pub struct TradeOgreClient {
    config: TradeOgreConfig,
    http: Client,
}

impl TradeOgreClient {
    /// Create a client for public endpoints only
    pub fn new() -> Result<Self, TradeOgreError> {
        Self::with_config(TradeOgreConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: TradeOgreConfig) -> Result<Self, TradeOgreError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn from_config(config: &Config) -> Result<Self, TradeOgreError> {
        Self::with_config(TradeOgreConfig::from(config))
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self.config.api_secret = Some(api_secret.into());
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.config.api_key.is_some() && self.config.api_secret.is_some()
    }

    /// Get the configured API base URL
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn authenticate(&self, req: RequestBuilder) -> Result<RequestBuilder, TradeOgreError> {
        match (&self.config.api_key, &self.config.api_secret) {
            (Some(key), Some(secret)) => Ok(req.basic_auth(key, Some(secret))),
            _ => Err(TradeOgreError::MissingCredentials),
        }
    }

    /// Send a request and return the JSON body, turning `success: false` into an error
    async fn send(&self, req: RequestBuilder) -> Result<Value, TradeOgreError> {
        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TradeOgreError::ApiError { status: status.as_u16(), body });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| TradeOgreError::ParseError(format!("Failed to parse response: {}", e)))?;

        if let Some(message) = rejection(&value) {
            return Err(TradeOgreError::Rejected(message));
        }

        Ok(value)
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T, TradeOgreError> {
        serde_json::from_value(value).map_err(|e| TradeOgreError::ParseError(e.to_string()))
    }

    /// Current ticker for a market
    pub async fn get_ticker(&self, market: &str) -> Result<Ticker, TradeOgreError> {
        let value = self.send(self.http.get(self.url(&format!("/ticker/{}", market)))).await?;
        tracing::debug!("TICKER RAW: {}", value);
        Self::decode(value)
    }

    /// Recent trades for a market, in exchange order
    pub async fn get_history(&self, market: &str) -> Result<Vec<HistoryEntry>, TradeOgreError> {
        let value = self.send(self.http.get(self.url(&format!("/history/{}", market)))).await?;
        Self::decode(value)
    }

    /// All account balances
    pub async fn get_balances(&self) -> Result<Balances, TradeOgreError> {
        let req = self.authenticate(self.http.get(self.url("/account/balances")))?;
        let value = self.send(req).await?;
        parse_balances(&value).map_err(TradeOgreError::ParseError)
    }

    /// Place a limit order
    pub async fn place_order(
        &self,
        side: Side,
        market: &str,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderReceipt, TradeOgreError> {
        let form = [
            ("market", market.to_string()),
            ("quantity", quantity.to_string()),
            ("price", price.to_string()),
        ];
        let req = self.authenticate(
            self.http
                .post(self.url(&format!("/order/{}", side.as_str())))
                .form(&form),
        )?;

        let value = self.send(req).await?;
        let raw = value.to_string();
        let response: OrderResponse = Self::decode(value)?;

        Ok(OrderReceipt {
            order_id: response.uuid,
            raw,
        })
    }
}

#[async_trait]
impl MarketDataPort for TradeOgreClient {
    async fn ticker(&self, pair: &str) -> Result<Decimal, MarketDataError> {
        Ok(self.get_ticker(pair).await?.price)
    }

    async fn history(&self, pair: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        let entries = self.get_history(pair).await?;
        Ok(entries.into_iter().map(PricePoint::from).collect())
    }
}

#[async_trait]
impl AccountPort for TradeOgreClient {
    async fn balances(&self) -> Result<Balances, AccountError> {
        Ok(self.get_balances().await?)
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, AccountError> {
        Ok(self
            .place_order(order.side, &order.pair, order.quantity, order.price)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    fn client_for(server: &mockito::ServerGuard) -> TradeOgreClient {
        TradeOgreClient::with_config(TradeOgreConfig {
            api_base_url: server.url(),
            ..TradeOgreConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = TradeOgreConfig::default();
        assert_eq!(config.api_base_url, "https://tradeogre.com/api/v1");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_client_creation() {
        let client = TradeOgreClient::new().unwrap();
        assert!(!client.has_credentials());
        assert!(client.with_credentials("key", "secret").has_credentials());
    }

    #[tokio::test]
    async fn test_ticker() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ticker/TRX-USDT")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"initialprice":"0.24","price":"0.25120000","high":"0.26","low":"0.23","volume":"100","bid":"0.25","ask":"0.2513"}"#)
            .create_async()
            .await;

        let price = client_for(&server).ticker("TRX-USDT").await.unwrap();

        assert_eq!(price, dec!(0.2512));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ticker_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ticker/NOPE-USDT")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"Invalid market"}"#)
            .create_async()
            .await;

        let result = client_for(&server).ticker("NOPE-USDT").await;

        assert_eq!(result, Err(MarketDataError::Rejected("Invalid market".to_string())));
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ticker/TRX-USDT")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let result = client_for(&server).ticker("TRX-USDT").await;

        assert!(matches!(result, Err(MarketDataError::RestError(_))));
    }

    #[tokio::test]
    async fn test_history_keeps_exchange_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/history/TRX-USDT")
            .with_status(200)
            .with_body(r#"[
                {"date":3,"type":"buy","price":"10","quantity":"1"},
                {"date":1,"type":"sell","price":"8","quantity":"2"},
                {"date":2,"type":"buy","price":"9","quantity":"3"}
            ]"#)
            .create_async()
            .await;

        let history = client_for(&server).history("TRX-USDT").await.unwrap();

        let dates: Vec<i64> = history.iter().map(|p| p.timestamp).collect();
        assert_eq!(dates, vec![3, 1, 2]);
        assert_eq!(history[1].price, dec!(8));
    }

    #[tokio::test]
    async fn test_balances_require_credentials() {
        let server = mockito::Server::new_async().await;

        let result = client_for(&server).balances().await;

        assert!(matches!(result, Err(AccountError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_balances_with_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/account/balances")
            .match_header("authorization", "Basic a2V5OnNlY3JldA==")
            .with_status(200)
            .with_body(r#"{"success":true,"balances":{"TRX":"150.5","USDT":"4.2"}}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server).with_credentials("key", "secret");
        let balances = client.balances().await.unwrap();

        assert_eq!(balances.available("trx"), dec!(150.5));
        assert_eq!(client.available("USDT").await.unwrap(), dec!(4.2));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/order/sell")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("market".into(), "TRX-USDT".into()),
                Matcher::UrlEncoded("quantity".into(), "100.000000".into()),
                Matcher::UrlEncoded("price".into(), "0.2625".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"success":true,"uuid":"235ee8b4-7b09-4a0e-9d3a-5f3a1c0f3e11","bnewbalavail":"0.0","snewbalavail":"26.25"}"#)
            .create_async()
            .await;

        let client = client_for(&server).with_credentials("key", "secret");
        let order = OrderRequest::new(Side::Sell, "TRX-USDT", dec!(100.000000), dec!(0.2625));
        let receipt = client.submit_order(&order).await.unwrap();

        assert_eq!(receipt.order_id.as_deref(), Some("235ee8b4-7b09-4a0e-9d3a-5f3a1c0f3e11"));
        assert!(receipt.raw.contains("snewbalavail"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_order_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/order/buy")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"Insufficient funds"}"#)
            .create_async()
            .await;

        let client = client_for(&server).with_credentials("key", "secret");
        let order = OrderRequest::new(Side::Buy, "TRX-USDT", dec!(20.000000), dec!(0.25));
        let result = client.submit_order(&order).await;

        assert_eq!(result, Err(AccountError::Rejected("Insufficient funds".to_string())));
    }
}
