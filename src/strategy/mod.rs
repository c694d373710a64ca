//! Strategy Layer - Fixed Percentage Threshold
//!
//! Compares each observed price with the previous one:
//! - rise of at least `threshold` -> SELL
//! - drop of at least `threshold` -> BUY
//! - anything else -> HOLD
//!
//! `decide` is shared by live trading and backtesting so the two modes
//! cannot classify the same move differently.

pub mod params;
pub mod threshold;

pub use params::{StrategyConfig, DEFAULT_THRESHOLD, DEFAULT_POLL_INTERVAL};
pub use threshold::{decide, DecisionError};
