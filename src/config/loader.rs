//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/default.toml.
//! Every section is optional and falls back to the stock TRX-USDT setup.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{
    OrderSizer, DEFAULT_MIN_BASE_BALANCE, DEFAULT_MIN_QUOTE_BALANCE, DEFAULT_QUANTITY_PRECISION,
};
use crate::strategy::{StrategyConfig, DEFAULT_POLL_INTERVAL, DEFAULT_THRESHOLD};

/// Env var consulted when `exchange.api_key` is empty
pub const API_KEY_ENV: &str = "API_KEY";
/// Env var consulted when `exchange.api_secret` is empty
pub const API_SECRET_ENV: &str = "API_SECRET";

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub market: MarketSection,
    pub strategy: StrategySection,
    pub sizing: SizingSection,
    pub exchange: ExchangeSection,
    pub logging: LoggingSection,
}

/// Traded pair
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    /// Exchange market identifier
    pub pair: String,
    /// Currency sold on SELL signals
    pub base_currency: String,
    /// Currency spent on BUY signals
    pub quote_currency: String,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            pair: "TRX-USDT".to_string(),
            base_currency: "TRX".to_string(),
            quote_currency: "USDT".to_string(),
        }
    }
}

/// Strategy configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    /// Fractional move that triggers a trade (0.05 = 5%)
    pub threshold: Decimal,
    /// Seconds between live price checks
    pub poll_interval_secs: u64,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
        }
    }
}

/// Order sizing section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SizingSection {
    /// Minimum base balance worth selling
    pub min_base_balance: Decimal,
    /// Minimum quote balance worth spending
    pub min_quote_balance: Decimal,
    /// Decimal places for order quantities
    pub quantity_precision: u32,
}

impl Default for SizingSection {
    fn default() -> Self {
        Self {
            min_base_balance: DEFAULT_MIN_BASE_BALANCE,
            min_quote_balance: DEFAULT_MIN_QUOTE_BALANCE,
            quantity_precision: DEFAULT_QUANTITY_PRECISION,
        }
    }
}

/// Exchange API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeSection {
    /// REST API base URL
    pub api_url: String,
    /// API key (prefer the API_KEY env var or .env)
    pub api_key: Option<String>,
    /// API secret (prefer the API_SECRET env var or .env)
    pub api_secret: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            api_url: "https://tradeogre.com/api/v1".to_string(),
            api_key: None,
            api_secret: None,
            timeout_secs: 10,
        }
    }
}

impl ExchangeSection {
    /// Get API key with environment variable fallback
    pub fn get_api_key(&self) -> Option<String> {
        non_empty(self.api_key.as_deref()).or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    /// Get API secret with environment variable fallback
    pub fn get_api_secret(&self) -> Option<String> {
        non_empty(self.api_secret.as_deref())
            .or_else(|| std::env::var(API_SECRET_ENV).ok().filter(|s| !s.is_empty()))
    }

    /// Key and secret, both required for account endpoints
    pub fn credentials(&self) -> Result<(String, String), ConfigError> {
        match (self.get_api_key(), self.get_api_secret()) {
            (Some(key), Some(secret)) => Ok((key, secret)),
            _ => Err(ConfigError::MissingCredentials),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log to file (in addition to stdout)
    pub log_to_file: bool,
    /// Log file path
    pub log_file: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
            log_file: "trading_bot.log".to_string(),
        }
    }
}

impl LoggingSection {
    /// Log file path with `~` expanded
    pub fn log_file_path(&self) -> String {
        shellexpand::tilde(&self.log_file).to_string()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("API credentials missing: set API_KEY and API_SECRET (or exchange.api_key / exchange.api_secret)")]
    MissingCredentials,
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate market section
        if self.market.pair.is_empty() {
            return Err(ConfigError::ValidationError("pair cannot be empty".to_string()));
        }

        if self.market.base_currency.is_empty() || self.market.quote_currency.is_empty() {
            return Err(ConfigError::ValidationError(
                "base_currency and quote_currency cannot be empty".to_string(),
            ));
        }

        let pair = self.market.pair.to_ascii_uppercase();
        if !pair.contains(&self.market.base_currency.to_ascii_uppercase())
            || !pair.contains(&self.market.quote_currency.to_ascii_uppercase())
        {
            return Err(ConfigError::ValidationError(format!(
                "pair {} does not contain {} and {}",
                self.market.pair, self.market.base_currency, self.market.quote_currency
            )));
        }

        // Validate strategy section
        StrategyConfig::from(self)
            .validate()
            .map_err(ConfigError::ValidationError)?;

        // Validate sizing section
        if self.sizing.min_base_balance < Decimal::ZERO || self.sizing.min_quote_balance < Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "minimum balances must be >= 0, got {} / {}",
                self.sizing.min_base_balance, self.sizing.min_quote_balance
            )));
        }

        if self.sizing.quantity_precision > 18 {
            return Err(ConfigError::ValidationError(format!(
                "quantity_precision must be 0-18, got {}",
                self.sizing.quantity_precision
            )));
        }

        // Validate exchange
        if self.exchange.api_url.is_empty() {
            return Err(ConfigError::ValidationError("api_url cannot be empty".to_string()));
        }

        Ok(())
    }
}

impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        StrategyConfig {
            threshold: config.strategy.threshold,
            poll_interval: Duration::from_secs(config.strategy.poll_interval_secs),
        }
    }
}

impl From<&Config> for OrderSizer {
    fn from(config: &Config) -> Self {
        OrderSizer::new(
            config.market.pair.clone(),
            config.market.base_currency.clone(),
            config.market.quote_currency.clone(),
        )
        .with_minimums(config.sizing.min_base_balance, config.sizing.min_quote_balance)
        .with_precision(config.sizing.quantity_precision)
    }
}
