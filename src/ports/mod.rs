//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data (ticker, trade history)
//! - Account access (balances, order submission)

pub mod market_data;
pub mod account;
pub mod models;
pub mod mocks;

pub use market_data::{MarketDataPort, MarketDataError};
pub use account::{AccountPort, AccountError};
pub use models::{PricePoint, Balance, Balances, OrderReceipt, SENTINEL_KEY};
