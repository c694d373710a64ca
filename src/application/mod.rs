pub mod live;
pub mod backtest;

pub use live::{LiveTrader, LiveError, LiveState, CycleOutcome, OrderOutcome};
pub use backtest::{BacktestRunner, Backtest, BacktestSummary, LogEntry};
