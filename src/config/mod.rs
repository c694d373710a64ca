//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, MarketSection, StrategySection, SizingSection, ExchangeSection, LoggingSection,
    load_config, API_KEY_ENV, API_SECRET_ENV,
};
