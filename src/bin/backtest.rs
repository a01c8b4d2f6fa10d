//! Sovson backtest runner
//!
//! Replays signal detection across the stored MACD history for each
//! configured ticker, then computes retrospective returns for the BUY
//! signals produced inside the window.

use chrono::Utc;
use dotenvy::dotenv;
use sovson::backtest::BacktestScanner;
use sovson::config::Config;
use sovson::logging;
use sovson::store::SqliteStore;
use tracing::{error, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = Config::from_env();
    info!(environment = %config.environment, "Starting Sovson backtest");

    if config.tickers.is_empty() {
        warn!("No tickers configured - set TICKERS (comma-separated)");
        return Err("TICKERS must be set".into());
    }

    let store = SqliteStore::new(&config.db_path)?
        .with_dedup_window(config.signal.duplicate_lookback_days);
    let scanner = BacktestScanner::new(&store, &config);
    let as_of = Utc::now().date_naive();

    let mut succeeded = 0;
    let mut failed = 0;
    for ticker in &config.tickers {
        match scanner.scan_ticker(ticker, as_of) {
            Ok(summary) => {
                succeeded += 1;
                info!(
                    ticker = %ticker,
                    days = summary.days_scanned,
                    signals = summary.signals_recorded,
                    "{}: scanned {} days, {} signals",
                    ticker,
                    summary.days_scanned,
                    summary.signals_recorded
                );
            }
            Err(e) => {
                failed += 1;
                error!(ticker = %ticker, error = %e, "scan failed, continuing");
            }
        }
    }

    info!(
        succeeded = succeeded,
        failed = failed,
        "Done.  Success: {}   Failed: {}",
        succeeded,
        failed
    );
    Ok(())
}
