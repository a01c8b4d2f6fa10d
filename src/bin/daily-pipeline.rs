//! Sovson daily pipeline
//!
//! Fetches daily bars for the configured ticker universe, derives
//! Heikin-Ashi and MACD series, and records qualifying signals.
//! Intended to be driven by cron once per trading day.

use dotenvy::dotenv;
use sovson::config::Config;
use sovson::logging;
use sovson::pipeline::DailyPipeline;
use sovson::providers::{FallbackPriceSource, PriceSource, YahooChartSource};
use sovson::store::SqliteStore;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env();
    info!(environment = %config.environment, "Starting Sovson daily pipeline");

    if config.tickers.is_empty() {
        warn!("No tickers configured - set TICKERS (comma-separated)");
        return Err("TICKERS must be set".into());
    }
    info!(tickers = ?config.tickers, "Ticker universe: {}", config.tickers.join(", "));

    let store = SqliteStore::new(&config.db_path)?
        .with_dedup_window(config.signal.duplicate_lookback_days);

    let source: Arc<dyn PriceSource> = Arc::new(FallbackPriceSource::new(vec![Arc::new(
        YahooChartSource::new(config.price_lookback_days),
    )]));

    let pipeline = DailyPipeline::new(&config, &store, source);
    let report = pipeline.run().await;

    if report.succeeded == 0 && report.failed > 0 {
        return Err(format!("all {} tickers failed", report.failed).into());
    }
    Ok(())
}
