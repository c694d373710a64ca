use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Path segment used by exchange order endpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limit order ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub side: Side,
    pub pair: String,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl OrderRequest {
    pub fn new(side: Side, pair: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            side,
            pair: pair.into(),
            quantity,
            price,
        }
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} @ {}", self.side, self.quantity, self.pair, self.price)
    }
}
