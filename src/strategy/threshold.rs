//! Threshold Decision
//!
//! The one classification function used by both the live loop and the
//! backtest runner. A move of at least `threshold` (as a fraction of the
//! previous price) in either direction is a trade signal; the boundary itself
//! counts as a move.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{PriceChange, Signal};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecisionError {
    #[error("Reference price is zero, change is undefined")]
    ZeroReference,
    #[error("Price change does not fit in a decimal")]
    Overflow,
}

/// Classify the move from `previous` to `current`.
///
/// Price rises sell and price drops buy.
pub fn decide(previous: Decimal, current: Decimal, threshold: Decimal) -> Result<PriceChange, DecisionError> {
    if previous.is_zero() {
        return Err(DecisionError::ZeroReference);
    }

    let change = current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .ok_or(DecisionError::Overflow)?;

    let signal = if change >= threshold {
        Signal::Sell
    } else if change <= -threshold {
        Signal::Buy
    } else {
        Signal::Hold
    };

    Ok(PriceChange { signal, change })
}
