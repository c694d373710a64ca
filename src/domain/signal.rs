use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::Side;

/// Outcome of comparing a price against the reference price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Sell,
    Buy,
    Hold,
}

impl Signal {
    /// Order side this signal trades on, `None` for Hold
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::Sell => Some(Side::Sell),
            Signal::Buy => Some(Side::Buy),
            Signal::Hold => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Sell => write!(f, "SELL"),
            Signal::Buy => write!(f, "BUY"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Classified price move: the signal plus the fractional change that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    pub signal: Signal,
    /// (current - previous) / previous
    pub change: Decimal,
}

impl PriceChange {
    /// Change expressed in percent, two decimals. `None` if it does not fit a `Decimal`.
    pub fn percent(&self) -> Option<Decimal> {
        self.change.checked_mul(Decimal::ONE_HUNDRED).map(|p| p.round_dp(2))
    }
}

impl fmt::Display for PriceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(percent) => write!(f, "{}%", percent),
            None => write!(f, "{}x reference", self.change.round_dp(2)),
        }
    }
}
