//! Threshold Strategy Integration Tests
//!
//! Verify that the live loop and the backtest runner agree:
//! 1. Same price sequence -> same signals in both modes
//! 2. Live trades are sized off fresh balances and submitted in order
//! 3. Failed fetches leave the live reference untouched
//!
//! All tests are deterministic (no real network calls) and use mock ports.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

use swing_trader::application::{BacktestRunner, CycleOutcome, LiveTrader, LogEntry, OrderOutcome};
use swing_trader::domain::{OrderSizer, Side, Signal};
use swing_trader::ports::mocks::{MockAccount, MockMarketData};
use swing_trader::ports::{Balances, MarketDataPort, PricePoint};
use swing_trader::strategy::StrategyConfig;

// ============================================================================
// Test Fixtures
// ============================================================================

fn strategy(threshold: Decimal) -> StrategyConfig {
    StrategyConfig::default()
        .with_threshold(threshold)
        .with_poll_interval(Duration::from_millis(1))
}

fn sizer() -> OrderSizer {
    OrderSizer::new("TRX-USDT", "TRX", "USDT")
}

fn funded() -> Balances {
    Balances::new()
        .with("TRX", dec!(100), dec!(100))
        .with("USDT", dec!(5), dec!(5))
}

/// Feed `prices` through a live trader and collect the signal of every evaluated cycle
async fn live_signals(prices: &[Decimal], threshold: Decimal) -> Vec<Signal> {
    let market = prices
        .iter()
        .fold(MockMarketData::new(), |market, price| market.with_price(*price));
    let account = MockAccount::new().with_balances(funded());
    let mut trader = LiveTrader::new(strategy(threshold), sizer(), market, account);

    trader.start().await.unwrap();

    let mut signals = Vec::new();
    for _ in 1..prices.len() {
        if let CycleOutcome::Evaluated { change, .. } = trader.cycle().await.unwrap() {
            signals.push(change.signal);
        }
    }
    signals
}

fn backtest_signals(prices: &[Decimal], threshold: Decimal) -> Vec<Signal> {
    let history: Vec<PricePoint> = prices
        .iter()
        .enumerate()
        .map(|(i, price)| PricePoint::new(i as i64, *price))
        .collect();

    BacktestRunner::new(&strategy(threshold))
        .run(history)
        .map(|entry| entry.signal)
        .collect()
}

// ============================================================================
// Cross-mode consistency
// ============================================================================

#[tokio::test]
async fn test_live_and_backtest_agree() {
    let prices = [dec!(100), dec!(110), dec!(99), dec!(100), dec!(95), dec!(95)];

    let live = live_signals(&prices, dec!(0.05)).await;
    let backtest = backtest_signals(&prices, dec!(0.05));

    assert_eq!(live, vec![Signal::Sell, Signal::Buy, Signal::Hold, Signal::Buy, Signal::Hold]);
    assert_eq!(live, backtest);
}

#[tokio::test]
async fn test_modes_agree_on_exact_boundary() {
    let prices = [dec!(100), dec!(105), dec!(99.75)];

    let live = live_signals(&prices, dec!(0.05)).await;

    assert_eq!(live, vec![Signal::Sell, Signal::Buy]);
    assert_eq!(live, backtest_signals(&prices, dec!(0.05)));
}

#[test]
fn test_backtest_sorts_unordered_history() {
    let history = vec![
        PricePoint::new(3, dec!(10)),
        PricePoint::new(1, dec!(8)),
        PricePoint::new(2, dec!(9)),
    ];

    let entries: Vec<LogEntry> = BacktestRunner::new(&strategy(dec!(0.05))).run(history).collect();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].timestamp, 2);
    assert_eq!(entries[0].change, dec!(0.125));
    assert_eq!(entries[0].signal, Signal::Sell);
    assert_eq!(entries[1].timestamp, 3);
    assert_eq!(entries[1].signal, Signal::Sell);
}

#[tokio::test]
async fn test_backtest_over_port_history() {
    let market = MockMarketData::new().with_history(vec![
        PricePoint::new(30, dec!(0.2500)),
        PricePoint::new(10, dec!(0.2000)),
        PricePoint::new(20, dec!(0.2400)),
        PricePoint::new(40, dec!(0.2300)),
    ]);

    let history = market.history("TRX-USDT").await.unwrap();
    let entries: Vec<LogEntry> = BacktestRunner::new(&strategy(dec!(0.05))).run(history).collect();

    assert_eq!(market.get_calls(), vec!["history:TRX-USDT".to_string()]);
    let signals: Vec<Signal> = entries.iter().map(|e| e.signal).collect();
    assert_eq!(signals, vec![Signal::Sell, Signal::Hold, Signal::Buy]);
    assert_eq!(entries[0].change, dec!(0.2));
}

// ============================================================================
// Live trading flow
// ============================================================================

#[tokio::test]
async fn test_sell_then_buy_submits_sized_orders() {
    let market = MockMarketData::new()
        .with_price(dec!(100))
        .with_price(dec!(110))
        .with_price(dec!(99));
    let account = MockAccount::new().with_balances(funded());
    let mut trader = LiveTrader::new(strategy(dec!(0.05)), sizer(), market, account.clone());

    trader.start().await.unwrap();
    trader.cycle().await.unwrap();

    // The sale converted all TRX into USDT
    account.set_balances(
        Balances::new()
            .with("TRX", Decimal::ZERO, Decimal::ZERO)
            .with("USDT", dec!(11000), dec!(11000)),
    );
    trader.cycle().await.unwrap();

    let orders = account.get_orders();
    assert_eq!(orders.len(), 2);

    assert_eq!(orders[0].side, Side::Sell);
    assert_eq!(orders[0].quantity, dec!(100));
    assert_eq!(orders[0].price, dec!(110));

    assert_eq!(orders[1].side, Side::Buy);
    assert_eq!(orders[1].quantity, dec!(111.111111));
    assert_eq!(orders[1].price, dec!(99));

    assert_eq!(account.balance_calls(), 2);
    assert_eq!(trader.reference(), Some(dec!(99)));
}

#[tokio::test]
async fn test_empty_wallet_blocks_every_trade() {
    let market = MockMarketData::new()
        .with_price(dec!(100))
        .with_price(dec!(120))
        .with_price(dec!(90));
    let account = MockAccount::new().with_balances(Balances::new());
    let mut trader = LiveTrader::new(strategy(dec!(0.05)), sizer(), market, account.clone());

    trader.start().await.unwrap();

    for _ in 0..2 {
        match trader.cycle().await.unwrap() {
            CycleOutcome::Evaluated { order: OrderOutcome::Blocked(_), .. } => {}
            other => panic!("Expected blocked trade, got {:?}", other),
        }
    }

    assert!(account.get_orders().is_empty());
    assert_eq!(trader.reference(), Some(dec!(90)));
}

#[tokio::test]
async fn test_fetch_failure_does_not_move_reference() {
    let market = MockMarketData::new()
        .with_price(dec!(100))
        .with_failure("connection reset")
        .with_price(dec!(104))
        .with_price(dec!(110));
    let account = MockAccount::new().with_balances(funded());
    let mut trader = LiveTrader::new(strategy(dec!(0.05)), sizer(), market, account.clone());

    trader.start().await.unwrap();

    assert!(matches!(trader.cycle().await.unwrap(), CycleOutcome::FetchFailed(_)));
    assert_eq!(trader.reference(), Some(dec!(100)));

    // 100 -> 104 is below the threshold
    match trader.cycle().await.unwrap() {
        CycleOutcome::Evaluated { change, .. } => assert_eq!(change.signal, Signal::Hold),
        other => panic!("Expected evaluation, got {:?}", other),
    }

    // 104 -> 110 is measured from the last successful price, not the initial one
    match trader.cycle().await.unwrap() {
        CycleOutcome::Evaluated { change, .. } => {
            assert_eq!(change.signal, Signal::Sell);
            assert!(change.change > dec!(0.05));
        }
        other => panic!("Expected evaluation, got {:?}", other),
    }

    assert_eq!(account.get_orders().len(), 1);
}
