//! Swing Trader - Threshold Swing Bot Library
//!
//! Trades one pair on TradeOgre: sells the whole base balance after a rise of
//! at least the threshold, spends the whole quote balance after a drop of at
//! least the threshold, and can replay trade history through the same rule.
//!
//! # Modules
//!
//! - `domain`: Signals, orders and the sizing policy
//! - `ports`: Trait abstractions (MarketDataPort, AccountPort)
//! - `strategy`: Threshold decision and its parameters
//! - `adapters`: External implementations (TradeOgre, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Live loop and backtest runner

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
