use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::account::{AccountError, AccountPort};
use super::market_data::{MarketDataError, MarketDataPort};
use super::models::{Balances, OrderReceipt, PricePoint};
use crate::domain::OrderRequest;

/// Mock market data port that replays scripted ticker responses in order
#[derive(Debug, Clone, Default)]
pub struct MockMarketData {
    tickers: Arc<Mutex<VecDeque<Result<Decimal, MarketDataError>>>>,
    history: Arc<Mutex<Vec<PricePoint>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to queue a successful ticker response
    pub fn with_price(self, price: Decimal) -> Self {
        self.tickers.lock().unwrap().push_back(Ok(price));
        self
    }

    /// Builder method to queue a failing ticker response
    pub fn with_failure(self, message: &str) -> Self {
        self.tickers
            .lock()
            .unwrap()
            .push_back(Err(MarketDataError::RestError(message.to_string())));
        self
    }

    /// Builder method to set the trade history
    pub fn with_history(self, history: Vec<PricePoint>) -> Self {
        *self.history.lock().unwrap() = history;
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn ticker(&self, pair: &str) -> Result<Decimal, MarketDataError> {
        self.calls.lock().unwrap().push(format!("ticker:{}", pair));
        self.tickers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MarketDataError::RestError("No response configured".to_string())))
    }

    async fn history(&self, pair: &str) -> Result<Vec<PricePoint>, MarketDataError> {
        self.calls.lock().unwrap().push(format!("history:{}", pair));
        Ok(self.history.lock().unwrap().clone())
    }
}

/// Mock account port that records submitted orders
#[derive(Debug, Clone)]
pub struct MockAccount {
    balances: Arc<Mutex<Result<Balances, AccountError>>>,
    order_result: Arc<Mutex<Result<OrderReceipt, AccountError>>>,
    orders: Arc<Mutex<Vec<OrderRequest>>>,
    balance_calls: Arc<Mutex<usize>>,
}

impl Default for MockAccount {
    fn default() -> Self {
        Self {
            balances: Arc::new(Mutex::new(Ok(Balances::new()))),
            order_result: Arc::new(Mutex::new(Ok(OrderReceipt {
                order_id: Some("mock-order".to_string()),
                raw: "{\"success\":true}".to_string(),
            }))),
            orders: Arc::new(Mutex::new(Vec::new())),
            balance_calls: Arc::new(Mutex::new(0)),
        }
    }
}

impl MockAccount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the balances every lookup returns
    pub fn with_balances(self, balances: Balances) -> Self {
        *self.balances.lock().unwrap() = Ok(balances);
        self
    }

    /// Builder method to make balance lookups fail
    pub fn with_balance_failure(self, message: &str) -> Self {
        *self.balances.lock().unwrap() = Err(AccountError::ApiError(message.to_string()));
        self
    }

    /// Builder method to make order submission fail
    pub fn with_order_failure(self, message: &str) -> Self {
        *self.order_result.lock().unwrap() = Err(AccountError::Rejected(message.to_string()));
        self
    }

    /// Replace balances mid-test, e.g. after a simulated fill
    pub fn set_balances(&self, balances: Balances) {
        *self.balances.lock().unwrap() = Ok(balances);
    }

    /// Get all submitted orders
    pub fn get_orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    /// Number of balance lookups performed
    pub fn balance_calls(&self) -> usize {
        *self.balance_calls.lock().unwrap()
    }
}

#[async_trait]
impl AccountPort for MockAccount {
    async fn balances(&self) -> Result<Balances, AccountError> {
        *self.balance_calls.lock().unwrap() += 1;
        self.balances.lock().unwrap().clone()
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderReceipt, AccountError> {
        self.orders.lock().unwrap().push(order.clone());
        self.order_result.lock().unwrap().clone()
    }
}
