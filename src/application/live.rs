//! Live Trader
//!
//! Polls the exchange on a fixed interval, classifies each price against the
//! previous one and places orders sized off the current balance.
//!
//! The loop is a two-state machine. It waits in `AwaitingInitialPrice` until
//! the first ticker succeeds (a failure there is fatal) and then stays in
//! `Running` for the lifetime of the process. Inside `Running` a failed price
//! fetch only skips the cycle.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::Config;
use crate::domain::{BlockReason, OrderRequest, OrderSizer, PriceChange, Side, Signal, Sizing};
use crate::ports::{AccountError, AccountPort, MarketDataError, MarketDataPort, OrderReceipt};
use crate::strategy::{decide, DecisionError, StrategyConfig};

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("Initial price fetch failed: {0}")]
    InitialPrice(#[source] MarketDataError),
    #[error("Initial price must be positive, got {0}")]
    InvalidInitialPrice(Decimal),
    #[error("Live trader has not fetched an initial price yet")]
    NotStarted,
}

/// Live loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    AwaitingInitialPrice,
    Running { reference: Decimal },
}

/// What happened to the order side of a cycle
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    /// HOLD, nothing to do
    NoAction,
    Blocked(BlockReason),
    BalanceUnavailable(AccountError),
    Submitted { order: OrderRequest, receipt: OrderReceipt },
    SubmitFailed { order: OrderRequest, error: AccountError },
}

/// Result of one polling cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Ticker failed, reference price untouched
    FetchFailed(MarketDataError),
    /// Ticker returned a non-positive price, treated like a failed fetch
    InvalidPrice(Decimal),
    /// Change could not be computed against the reference
    Skipped(DecisionError),
    Evaluated {
        price: Decimal,
        change: PriceChange,
        order: OrderOutcome,
    },
}

/// Single-pair live trading loop
pub struct LiveTrader<M, A> {
    strategy: StrategyConfig,
    sizer: OrderSizer,
    market: M,
    account: A,
    state: LiveState,
}

impl<M, A> LiveTrader<M, A>
where
    M: MarketDataPort,
    A: AccountPort,
{
    pub fn new(strategy: StrategyConfig, sizer: OrderSizer, market: M, account: A) -> Self {
        Self {
            strategy,
            sizer,
            market,
            account,
            state: LiveState::AwaitingInitialPrice,
        }
    }

    pub fn from_config(config: &Config, market: M, account: A) -> Self {
        Self::new(StrategyConfig::from(config), OrderSizer::from(config), market, account)
    }

    pub fn state(&self) -> LiveState {
        self.state
    }

    /// Price the next cycle is compared against
    pub fn reference(&self) -> Option<Decimal> {
        match self.state {
            LiveState::Running { reference } => Some(reference),
            LiveState::AwaitingInitialPrice => None,
        }
    }

    fn pair(&self) -> &str {
        &self.sizer.pair
    }

    /// Run forever: fetch the initial price, then sleep and cycle.
    ///
    /// Only returns if the initial price cannot be fetched.
    pub async fn run(&mut self) -> Result<(), LiveError> {
        tracing::info!(
            "Starting LIVE trading mode - Pair: {}, Threshold: {}, Poll interval: {:?}",
            self.pair(),
            self.strategy.threshold,
            self.strategy.poll_interval
        );

        self.start().await?;

        loop {
            tokio::time::sleep(self.strategy.poll_interval).await;
            self.cycle().await?;
        }
    }

    /// Fetch the initial reference price and enter `Running`
    pub async fn start(&mut self) -> Result<Decimal, LiveError> {
        if let LiveState::Running { reference } = self.state {
            return Ok(reference);
        }

        let price = match self.market.ticker(self.pair()).await {
            Ok(price) => price,
            Err(e) => {
                tracing::error!("Initial price fetch failed: {}. Exiting.", e);
                return Err(LiveError::InitialPrice(e));
            }
        };

        if price <= Decimal::ZERO {
            tracing::error!("Initial price {} is not usable. Exiting.", price);
            return Err(LiveError::InvalidInitialPrice(price));
        }

        tracing::info!("Initial price: {:.4} {}", price, self.sizer.quote_currency);
        self.state = LiveState::Running { reference: price };
        Ok(price)
    }

    /// Execute one polling cycle (without the interval sleep)
    pub async fn cycle(&mut self) -> Result<CycleOutcome, LiveError> {
        let LiveState::Running { reference } = self.state else {
            return Err(LiveError::NotStarted);
        };

        let price = match self.market.ticker(self.pair()).await {
            Ok(price) => price,
            Err(e) => {
                tracing::error!("Error fetching ticker: {}", e);
                return Ok(CycleOutcome::FetchFailed(e));
            }
        };

        if price <= Decimal::ZERO {
            tracing::error!("Ignoring non-positive price {} for {}", price, self.pair());
            return Ok(CycleOutcome::InvalidPrice(price));
        }

        let outcome = match decide(reference, price, self.strategy.threshold) {
            Ok(change) => {
                tracing::info!("Price: {:.4} | Change: {}", price, change);
                let order = self.act(change.signal, price).await;
                CycleOutcome::Evaluated { price, change, order }
            }
            Err(e) => {
                tracing::error!("Skipping cycle: {}", e);
                CycleOutcome::Skipped(e)
            }
        };

        self.state = LiveState::Running { reference: price };
        Ok(outcome)
    }

    async fn act(&self, signal: Signal, price: Decimal) -> OrderOutcome {
        let Some(side) = signal.side() else {
            tracing::info!("No significant change. Waiting...");
            return OrderOutcome::NoAction;
        };

        let funds = match self.sizer.fetch_funds(side, &self.account).await {
            Ok(funds) => funds,
            Err(e) => {
                tracing::error!("Failed to get balance: {}", e);
                return OrderOutcome::BalanceUnavailable(e);
            }
        };

        let order = match self.sizer.size_with_balance(signal, funds, price) {
            Sizing::Order(order) => order,
            Sizing::Blocked(reason) => {
                self.log_blocked(signal, &reason);
                return OrderOutcome::Blocked(reason);
            }
        };

        match side {
            Side::Sell => tracing::info!(
                "Selling {} {} @ {} {}",
                order.quantity, self.sizer.base_currency, order.price, self.sizer.quote_currency
            ),
            Side::Buy => tracing::info!(
                "Buying {} {} with {:.2} {} @ {} {}",
                order.quantity,
                self.sizer.base_currency,
                funds,
                self.sizer.quote_currency,
                order.price,
                self.sizer.quote_currency
            ),
        }

        match self.account.submit_order(&order).await {
            Ok(receipt) => {
                tracing::info!(
                    side = %order.side,
                    order_id = receipt.order_id.as_deref().unwrap_or("-"),
                    "Order result: {}",
                    receipt.raw
                );
                OrderOutcome::Submitted { order, receipt }
            }
            Err(e) => {
                tracing::error!(side = %order.side, "Order submission failed: {}", e);
                OrderOutcome::SubmitFailed { order, error: e }
            }
        }
    }

    fn log_blocked(&self, signal: Signal, reason: &BlockReason) {
        match reason {
            BlockReason::InsufficientBase { available } => tracing::warn!(
                "Insufficient {} to sell: {}", self.sizer.base_currency, available
            ),
            BlockReason::InsufficientQuote { available } => tracing::warn!(
                "Insufficient {} to buy: {}", self.sizer.quote_currency, available
            ),
            other => tracing::warn!("{} blocked: {}", signal, other),
        }
    }
}
