//! Swing Trader - Threshold Swing Bot for TradeOgre
//!
//! Trades a single pair whenever the price moves past a fixed percentage.

use anyhow::Result;
use swing_trader::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (API_KEY / API_SECRET go here, not in the config)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
