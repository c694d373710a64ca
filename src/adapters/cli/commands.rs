//! CLI Command Handlers
//!
//! Implementation of the live and backtest commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::adapters::tradeogre::{HistoryEntry, TradeOgreClient};
use crate::application::{BacktestRunner, BacktestSummary, LiveTrader, LogEntry};
use crate::config::{load_config, Config, LoggingSection};
use crate::ports::{MarketDataPort, PricePoint};

/// Config file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Swing Trader - Threshold Swing Bot for TradeOgre
#[derive(Parser, Debug)]
#[command(
    name = "swing-trader",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Threshold Swing Bot for TradeOgre",
    long_about = "Swing Trader sells the whole base balance after a rise of at least the \
                  threshold and spends the whole quote balance after a drop of at least the \
                  threshold. Without a subcommand it trades live."
)]
pub struct CliApp {
    /// The command to execute (defaults to live trading)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Enable verbose (debug level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable trace level logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the live trading loop
    Live(LiveCmd),

    /// Replay trade history through the strategy
    Backtest(BacktestCmd),
}

/// Start live trading
#[derive(Parser, Debug, Default)]
pub struct LiveCmd {
    /// Override the configured threshold (0.05 = 5%)
    #[arg(long, value_name = "FRACTION")]
    pub threshold: Option<Decimal>,
}

/// Run a backtest
#[derive(Parser, Debug, Default)]
pub struct BacktestCmd {
    /// Read history from a saved `/history` JSON response instead of the exchange
    #[arg(long, value_name = "FILE")]
    pub history_file: Option<PathBuf>,

    /// Override the configured threshold (0.05 = 5%)
    #[arg(long, value_name = "FRACTION")]
    pub threshold: Option<Decimal>,

    /// Export results to JSON
    #[arg(long, value_name = "FILE")]
    pub export_json: Option<PathBuf>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let (mut config, loaded) = load_or_default(&app.config)?;

    let threshold = match &app.command {
        Some(Command::Live(cmd)) => cmd.threshold,
        Some(Command::Backtest(cmd)) => cmd.threshold,
        None => None,
    };
    apply_threshold(&mut config, threshold)?;

    init_logging(&config.logging, app.verbose, app.debug)?;

    if loaded {
        tracing::info!("Config: {}", app.config.display());
    } else {
        tracing::warn!("Config file {} not found, using defaults", app.config.display());
    }

    match app.command {
        None => live_command(config).await,
        Some(Command::Live(_)) => live_command(config).await,
        Some(Command::Backtest(cmd)) => backtest_command(config, cmd).await,
    }
}

/// Load the config file, falling back to defaults only for a missing default path
fn load_or_default(path: &Path) -> Result<(Config, bool)> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        return Ok((Config::default(), false));
    }

    let config = load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok((config, true))
}

fn apply_threshold(config: &mut Config, threshold: Option<Decimal>) -> Result<()> {
    if let Some(threshold) = threshold {
        config.strategy.threshold = threshold;
        config.validate().context("Invalid --threshold")?;
    }
    Ok(())
}

/// Level used when `RUST_LOG` is unset: `--debug` > `-v` > config
fn log_level(logging: &LoggingSection, verbose: bool, debug: bool) -> &str {
    if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        logging.level.as_str()
    }
}

/// Initialize logging: stdout always, plus an append-only file when configured
fn init_logging(logging: &LoggingSection, verbose: bool, debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = log_level(logging, verbose, debug);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = if logging.log_to_file {
        let path = logging.log_file_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path))?;
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Handle live command
async fn live_command(config: Config) -> Result<()> {
    let (api_key, api_secret) = config.exchange.credentials()?;

    let client = TradeOgreClient::from_config(&config)
        .context("Failed to create TradeOgre client")?
        .with_credentials(api_key, api_secret);

    let mut trader = LiveTrader::from_config(&config, client.clone(), client);

    tokio::select! {
        result = trader.run() => result.context("Live trading stopped"),
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
    }
}

/// Handle backtest command
async fn backtest_command(config: Config, cmd: BacktestCmd) -> Result<()> {
    let history = match &cmd.history_file {
        Some(path) => read_history(path)?,
        None => {
            let client = TradeOgreClient::from_config(&config)
                .context("Failed to create TradeOgre client")?;
            client
                .history(&config.market.pair)
                .await
                .with_context(|| format!("Failed to fetch history for {}", config.market.pair))?
        }
    };

    let runner = BacktestRunner::from_config(&config);
    let mut entries = Vec::new();
    let mut summary = BacktestSummary::default();

    for entry in runner.run(history) {
        tracing::info!("{}", entry);
        summary.record(&entry);
        entries.push(entry);
    }

    println!("Backtest {} @ threshold {}", config.market.pair, runner.threshold());
    println!("  Entries: {}", summary.entries);
    println!("  SELL:    {}", summary.sells);
    println!("  BUY:     {}", summary.buys);
    println!("  HOLD:    {}", summary.holds);

    if let Some(path) = &cmd.export_json {
        let report = BacktestReport {
            pair: &config.market.pair,
            threshold: runner.threshold(),
            summary,
            entries: &entries,
        };
        export_json(path, &report)?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}

/// Serialized backtest results
#[derive(Debug, Serialize)]
struct BacktestReport<'a> {
    pair: &'a str,
    threshold: Decimal,
    summary: BacktestSummary,
    entries: &'a [LogEntry],
}

/// Read a history array in the exchange's `/history` format
fn read_history(path: &Path) -> Result<Vec<PricePoint>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    let entries: Vec<HistoryEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history file {}", path.display()))?;
    Ok(entries.into_iter().map(PricePoint::from).collect())
}

fn export_json(path: &Path, report: &BacktestReport<'_>) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
