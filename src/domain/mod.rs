//! Domain Layer - Core business logic
//!
//! Signals, orders and the sizing policy that decides how much to trade.
//! The only outside contact is the account balance lookup made through
//! the ports layer at sizing time.

pub mod signal;
pub mod order;
pub mod sizing;

pub use signal::{Signal, PriceChange};
pub use order::{OrderRequest, Side};
pub use sizing::{
    OrderSizer, Sizing, BlockReason,
    DEFAULT_MIN_BASE_BALANCE, DEFAULT_MIN_QUOTE_BALANCE, DEFAULT_QUANTITY_PRECISION,
};
