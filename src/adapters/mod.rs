//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - TradeOgre: REST client for prices, history, balances and orders
//! - CLI: Command-line interface handlers

pub mod tradeogre;
pub mod cli;

pub use tradeogre::TradeOgreClient;
pub use cli::CliApp;
