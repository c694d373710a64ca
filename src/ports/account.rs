//! Account Port
//!
//! Balance lookups and order submission.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::models::{Balances, OrderReceipt};
use crate::domain::OrderRequest;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("Authentication error: {0}")]
    Authentication(String),
    #[error("Order rejected by exchange: {0}")]
    Rejected(String),
    #[error("Data parsing error: {0}")]
    ParseError(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountPort: Send + Sync {
    /// All balances on the account, sentinel keys already removed
    async fn balances(&self) -> Result<Balances, AccountError>;

    /// Available amount of one currency, always fetched fresh
    async fn available(&self, currency: &str) -> Result<Decimal, AccountError> {
        Ok(self.balances().await?.available(currency))
    }

    /// Submit a limit order
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, AccountError>;
}
