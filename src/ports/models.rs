//! Common data structures shared by all ports

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Key some exchanges put next to the currencies in a balances payload
pub const SENTINEL_KEY: &str = "success";

/// A single observed trade price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix seconds
    pub timestamp: i64,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Balance of one currency on the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: String,
    /// Total held, including amounts locked in open orders
    pub balance: Decimal,
    /// Free to trade
    pub available: Decimal,
}

/// Balances keyed by currency code as reported by the exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    entries: BTreeMap<String, Balance>,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a balance; the sentinel key is dropped by name.
    pub fn insert(&mut self, balance: Balance) {
        if balance.currency.eq_ignore_ascii_case(SENTINEL_KEY) {
            return;
        }
        self.entries.insert(balance.currency.clone(), balance);
    }

    pub fn with(mut self, currency: &str, balance: Decimal, available: Decimal) -> Self {
        self.insert(Balance {
            currency: currency.to_string(),
            balance,
            available,
        });
        self
    }

    /// Case-insensitive lookup
    pub fn get(&self, currency: &str) -> Option<&Balance> {
        self.entries
            .values()
            .find(|b| b.currency.eq_ignore_ascii_case(currency))
    }

    /// Available amount, zero when the currency is absent
    pub fn available(&self, currency: &str) -> Decimal {
        self.get(currency).map(|b| b.available).unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Balance> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Balance> for Balances {
    fn from_iter<I: IntoIterator<Item = Balance>>(iter: I) -> Self {
        let mut balances = Balances::new();
        for balance in iter {
            balances.insert(balance);
        }
        balances
    }
}

/// Exchange acknowledgement of a submitted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Exchange order id, when the exchange returns one
    pub order_id: Option<String>,
    /// Raw response body for the log
    pub raw: String,
}
