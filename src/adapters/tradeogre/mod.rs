//! TradeOgre Adapter
//!
//! Implements both `MarketDataPort` and `AccountPort` over the TradeOgre REST API.

mod client;
mod types;

pub use client::{TradeOgreClient, TradeOgreConfig, TradeOgreError};
pub use types::{HistoryEntry, OrderResponse, Ticker};
