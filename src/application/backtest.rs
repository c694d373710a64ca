//! Backtest Runner
//!
//! Replays historical trades through the same threshold decision the live
//! trader uses. Purely observational: no account access, no orders.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::Config;
use crate::domain::{PriceChange, Signal};
use crate::ports::PricePoint;
use crate::strategy::{decide, StrategyConfig};

/// One classified step of the replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: i64,
    pub price: Decimal,
    pub change: Decimal,
    pub signal: Signal,
}

impl LogEntry {
    fn new(point: PricePoint, change: PriceChange) -> Self {
        Self {
            timestamp: point.timestamp,
            price: point.price,
            change: change.change,
            signal: change.signal,
        }
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let when = self
            .datetime()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.timestamp.to_string());
        let arrow = match self.signal {
            Signal::Sell => "↑ ",
            Signal::Buy => "↓ ",
            Signal::Hold => "",
        };
        let change = PriceChange { signal: self.signal, change: self.change };
        write!(f, "{} - Price {}{:.4} ({}) -> {}", when, arrow, self.price, change, self.signal)
    }
}

/// Builds replays for a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktestRunner {
    threshold: Decimal,
}

impl BacktestRunner {
    pub fn new(strategy: &StrategyConfig) -> Self {
        Self { threshold: strategy.threshold }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&StrategyConfig::from(config))
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Sort the history by timestamp and replay it lazily.
    ///
    /// The sort is stable, so trades sharing a timestamp keep their input order.
    pub fn run(&self, history: impl IntoIterator<Item = PricePoint>) -> Backtest {
        let mut points: Vec<PricePoint> = history.into_iter().collect();
        points.sort_by_key(|p| p.timestamp);

        tracing::info!("Starting BACKTEST mode - {} trades, threshold {}", points.len(), self.threshold);

        Backtest {
            points: points.into_iter(),
            reference: None,
            threshold: self.threshold,
        }
    }
}

/// Lazy replay over a sorted history. Finite and single-pass.
#[derive(Debug)]
pub struct Backtest {
    points: std::vec::IntoIter<PricePoint>,
    reference: Option<Decimal>,
    threshold: Decimal,
}

impl Backtest {
    /// Price the next point will be compared against
    pub fn reference(&self) -> Option<Decimal> {
        self.reference
    }
}

impl Iterator for Backtest {
    type Item = LogEntry;

    fn next(&mut self) -> Option<LogEntry> {
        loop {
            let point = self.points.next()?;

            if point.price <= Decimal::ZERO {
                tracing::warn!("Skipping trade at {} with non-positive price {}", point.timestamp, point.price);
                continue;
            }

            // The first usable point only seeds the reference.
            let Some(reference) = self.reference.replace(point.price) else {
                continue;
            };

            match decide(reference, point.price, self.threshold) {
                Ok(change) => return Some(LogEntry::new(point, change)),
                Err(e) => tracing::warn!("Skipping trade at {}: {}", point.timestamp, e),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.points.len()))
    }
}

/// Signal counts over a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BacktestSummary {
    pub entries: usize,
    pub sells: usize,
    pub buys: usize,
    pub holds: usize,
}

impl BacktestSummary {
    pub fn record(&mut self, entry: &LogEntry) {
        self.entries += 1;
        match entry.signal {
            Signal::Sell => self.sells += 1,
            Signal::Buy => self.buys += 1,
            Signal::Hold => self.holds += 1,
        }
    }
}

impl<'a> FromIterator<&'a LogEntry> for BacktestSummary {
    fn from_iter<I: IntoIterator<Item = &'a LogEntry>>(iter: I) -> Self {
        let mut summary = BacktestSummary::default();
        for entry in iter {
            summary.record(entry);
        }
        summary
    }
}
