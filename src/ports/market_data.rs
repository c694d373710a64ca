//! Market Data Port
//!
//! Current price and trade history for a pair.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::models::PricePoint;

/// Market data error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    #[error("REST API error: {0}")]
    RestError(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Exchange rejected request: {0}")]
    Rejected(String),
}

/// Market data port trait
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Last traded price for the pair
    async fn ticker(&self, pair: &str) -> Result<Decimal, MarketDataError>;

    /// Recent trades for the pair, in whatever order the exchange returns them
    async fn history(&self, pair: &str) -> Result<Vec<PricePoint>, MarketDataError>;
}
