//! Order Sizing
//!
//! Turns a trade signal into an order sized off the account's current balance,
//! or explains why no order should be placed. Balances are looked up at the
//! moment of sizing and never reused between calls.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

use super::order::{OrderRequest, Side};
use super::signal::Signal;
use crate::ports::{AccountError, AccountPort};

/// Base currency below this amount is dust and not worth selling
pub const DEFAULT_MIN_BASE_BALANCE: Decimal = dec!(0.1);

/// Quote currency below this amount is dust and not worth spending
pub const DEFAULT_MIN_QUOTE_BALANCE: Decimal = dec!(0.01);

/// Decimal places order quantities are rounded to
pub const DEFAULT_QUANTITY_PRECISION: u32 = 6;

/// Why an order was not placed. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    InsufficientBase { available: Decimal },
    InsufficientQuote { available: Decimal },
    NoAction,
    InvalidPrice,
    ZeroQuantity,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::InsufficientBase { .. } => write!(f, "insufficient base currency"),
            BlockReason::InsufficientQuote { .. } => write!(f, "insufficient quote currency"),
            BlockReason::NoAction => write!(f, "no action"),
            BlockReason::InvalidPrice => write!(f, "invalid price"),
            BlockReason::ZeroQuantity => write!(f, "quantity rounds to zero"),
        }
    }
}

/// Result of sizing a signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sizing {
    Order(OrderRequest),
    Blocked(BlockReason),
}

impl Sizing {
    pub fn order(&self) -> Option<&OrderRequest> {
        match self {
            Sizing::Order(order) => Some(order),
            Sizing::Blocked(_) => None,
        }
    }
}

/// Sizes orders at the full available balance of the side being traded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSizer {
    pub pair: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub min_base_balance: Decimal,
    pub min_quote_balance: Decimal,
    pub precision: u32,
}

impl OrderSizer {
    pub fn new(
        pair: impl Into<String>,
        base_currency: impl Into<String>,
        quote_currency: impl Into<String>,
    ) -> Self {
        Self {
            pair: pair.into(),
            base_currency: base_currency.into(),
            quote_currency: quote_currency.into(),
            min_base_balance: DEFAULT_MIN_BASE_BALANCE,
            min_quote_balance: DEFAULT_MIN_QUOTE_BALANCE,
            precision: DEFAULT_QUANTITY_PRECISION,
        }
    }

    pub fn with_minimums(mut self, min_base_balance: Decimal, min_quote_balance: Decimal) -> Self {
        self.min_base_balance = min_base_balance;
        self.min_quote_balance = min_quote_balance;
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Currency whose balance funds the given side
    pub fn funding_currency(&self, side: Side) -> &str {
        match side {
            Side::Sell => &self.base_currency,
            Side::Buy => &self.quote_currency,
        }
    }

    /// Fetch the available balance of the currency funding `side`
    pub async fn fetch_funds<A>(&self, side: Side, account: &A) -> Result<Decimal, AccountError>
    where
        A: AccountPort + ?Sized,
    {
        account.available(self.funding_currency(side)).await
    }

    /// Size a signal against an already fetched balance of the funding currency
    pub fn size_with_balance(&self, signal: Signal, available: Decimal, price: Decimal) -> Sizing {
        let Some(side) = signal.side() else {
            return Sizing::Blocked(BlockReason::NoAction);
        };
        if price <= Decimal::ZERO {
            return Sizing::Blocked(BlockReason::InvalidPrice);
        }

        let quantity = match side {
            Side::Sell => {
                if available < self.min_base_balance {
                    return Sizing::Blocked(BlockReason::InsufficientBase { available });
                }
                self.round_quantity(available)
            }
            Side::Buy => {
                if available < self.min_quote_balance {
                    return Sizing::Blocked(BlockReason::InsufficientQuote { available });
                }
                let Some(quantity) = available.checked_div(price) else {
                    return Sizing::Blocked(BlockReason::InvalidPrice);
                };
                self.round_quantity(quantity)
            }
        };

        if quantity.is_zero() {
            return Sizing::Blocked(BlockReason::ZeroQuantity);
        }

        Sizing::Order(OrderRequest::new(side, self.pair.clone(), quantity, price))
    }

    /// Round to the configured precision and pin the scale to it
    pub fn round_quantity(&self, quantity: Decimal) -> Decimal {
        let mut rounded = quantity.round_dp(self.precision);
        rounded.rescale(self.precision);
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::account::MockAccountPort;
    use mockall::predicate::eq;

    fn sizer() -> OrderSizer {
        OrderSizer::new("TRX-USDT", "TRX", "USDT")
    }

    #[test]
    fn test_sell_dust_is_blocked() {
        let sizing = sizer().size_with_balance(Signal::Sell, dec!(0.05), dec!(0.25));
        assert_eq!(
            sizing,
            Sizing::Blocked(BlockReason::InsufficientBase { available: dec!(0.05) })
        );
        if let Sizing::Blocked(reason) = sizing {
            assert_eq!(reason.to_string(), "insufficient base currency");
        }
    }

    #[test]
    fn test_sell_uses_full_balance() {
        let sizing = sizer().size_with_balance(Signal::Sell, dec!(123.4567891), dec!(0.25));
        let order = sizing.order().unwrap();

        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.quantity, dec!(123.456789));
        assert_eq!(order.quantity.scale(), 6);
        assert_eq!(order.price, dec!(0.25));
    }

    #[test]
    fn test_sell_at_minimum_is_allowed() {
        let sizing = sizer().size_with_balance(Signal::Sell, dec!(0.1), dec!(0.25));
        assert_eq!(sizing.order().unwrap().quantity.to_string(), "0.100000");
    }

    #[test]
    fn test_buy_quantity_is_quote_over_price() {
        let sizing = sizer().size_with_balance(Signal::Buy, dec!(5), dec!(0.3));
        let order = sizing.order().unwrap();

        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.quantity, dec!(16.666667));
        assert_eq!(order.quantity.scale(), 6);
    }

    #[test]
    fn test_buy_dust_is_blocked() {
        let sizing = sizer().size_with_balance(Signal::Buy, dec!(0.009), dec!(0.3));
        match sizing {
            Sizing::Blocked(reason) => assert_eq!(reason.to_string(), "insufficient quote currency"),
            Sizing::Order(_) => panic!("dust quote balance must not produce an order"),
        }
    }

    #[test]
    fn test_below_minimum_never_orders_for_any_price() {
        let sizer = sizer();
        for price in [dec!(0.0001), dec!(0.3), dec!(1), dec!(42000)] {
            assert!(sizer.size_with_balance(Signal::Sell, dec!(0.099999), price).order().is_none());
            assert!(sizer.size_with_balance(Signal::Buy, dec!(0.009999), price).order().is_none());
        }
    }

    #[test]
    fn test_hold_is_no_action() {
        let sizing = sizer().size_with_balance(Signal::Hold, dec!(1000), dec!(0.3));
        assert_eq!(sizing, Sizing::Blocked(BlockReason::NoAction));
    }

    #[test]
    fn test_zero_price_is_blocked() {
        let sizing = sizer().size_with_balance(Signal::Buy, dec!(5), Decimal::ZERO);
        assert_eq!(sizing, Sizing::Blocked(BlockReason::InvalidPrice));
    }

    #[test]
    fn test_quantity_rounding_to_zero_is_blocked() {
        let sizing = sizer().size_with_balance(Signal::Buy, dec!(0.01), dec!(1000000));
        assert_eq!(sizing, Sizing::Blocked(BlockReason::ZeroQuantity));
    }

    #[test]
    fn test_custom_precision() {
        let sizer = sizer().with_precision(2);
        assert_eq!(sizer.round_quantity(dec!(1.005)).to_string(), "1.00");
        assert_eq!(sizer.round_quantity(dec!(3)).to_string(), "3.00");
    }

    #[test]
    fn test_buy_at_vanishing_price_is_blocked() {
        let available = Decimal::from_scientific("1e20").unwrap();
        let price = Decimal::from_scientific("1e-9").unwrap();

        let sizing = sizer().size_with_balance(Signal::Buy, available, price);
        assert_eq!(sizing, Sizing::Blocked(BlockReason::InvalidPrice));
    }

    #[tokio::test]
    async fn test_sell_fetches_base_balance() {
        let mut account = MockAccountPort::new();
        account
            .expect_available()
            .with(eq("TRX"))
            .times(1)
            .returning(|_| Ok(dec!(250)));

        let funds = sizer().fetch_funds(Side::Sell, &account).await.unwrap();
        let sizing = sizer().size_with_balance(Signal::Sell, funds, dec!(0.3));
        assert_eq!(sizing.order().unwrap().quantity, dec!(250));
    }

    #[tokio::test]
    async fn test_buy_fetches_quote_balance() {
        let mut account = MockAccountPort::new();
        account
            .expect_available()
            .with(eq("USDT"))
            .times(1)
            .returning(|_| Ok(dec!(6)));

        let funds = sizer().fetch_funds(Side::Buy, &account).await.unwrap();
        let sizing = sizer().size_with_balance(Signal::Buy, funds, dec!(0.3));
        assert_eq!(sizing.order().unwrap().quantity, dec!(20));
    }

    #[tokio::test]
    async fn test_balance_failure_propagates() {
        let mut account = MockAccountPort::new();
        account
            .expect_available()
            .returning(|_| Err(AccountError::ApiError("timeout".into())));

        let result = sizer().fetch_funds(Side::Sell, &account).await;
        assert_eq!(result, Err(AccountError::ApiError("timeout".into())));
    }
}
