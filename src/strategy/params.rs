use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

/// Default trigger: a 5% move from the reference price
pub const DEFAULT_THRESHOLD: Decimal = dec!(0.05);

/// Default delay between live price checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Parameters of the threshold strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyConfig {
    /// Fractional move that triggers a trade (0.05 = 5%)
    pub threshold: Decimal,
    /// Delay before every live price check
    pub poll_interval: Duration,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl StrategyConfig {
    pub fn with_threshold(mut self, threshold: Decimal) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Validate strategy parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.threshold <= Decimal::ZERO || self.threshold >= Decimal::ONE {
            return Err(format!("threshold must be between 0 and 1, got {}", self.threshold));
        }
        if self.poll_interval.is_zero() {
            return Err("poll interval must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StrategyConfig::default();
        assert_eq!(config.threshold, dec!(0.05));
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(StrategyConfig::default().with_threshold(Decimal::ZERO).validate().is_err());
        assert!(StrategyConfig::default().with_threshold(dec!(1.5)).validate().is_err());
    }

    #[test]
    fn test_zero_poll_interval() {
        let config = StrategyConfig::default().with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
