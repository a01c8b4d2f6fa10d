//! Historical replay of the detection chain.
//!
//! Every trading day with a stored MACD point inside the configured window
//! is evaluated as if it were "today", through the same detector the live
//! pipeline uses. The detector only ever reads points with
//! period_end_date <= the replayed day, so nothing leaks from the future.

use crate::backtest::returns;
use crate::config::Config;
use crate::error::Result;
use crate::signals::detector;
use crate::store::SignalStore;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub ticker: String,
    pub days_scanned: usize,
    pub signals_recorded: usize,
    pub returns_updated: usize,
}

pub struct BacktestScanner<'a, S: SignalStore + ?Sized> {
    store: &'a S,
    config: &'a Config,
}

impl<'a, S: SignalStore + ?Sized> BacktestScanner<'a, S> {
    pub fn new(store: &'a S, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Replay one ticker over the window ending at `as_of`, then compute
    /// returns for every BUY signal produced inside the window.
    pub fn scan_ticker(&self, ticker: &str, as_of: NaiveDate) -> Result<ScanSummary> {
        let from = as_of - Duration::days(self.config.backtest_window_days);
        let dates = self.store.get_macd_dates(ticker, from, as_of)?;

        if dates.is_empty() {
            debug!(ticker = %ticker, "no MACD points inside backtest window");
            return Ok(ScanSummary {
                ticker: ticker.to_string(),
                days_scanned: 0,
                signals_recorded: 0,
                returns_updated: 0,
            });
        }

        let mut signals_recorded = 0;
        for date in &dates {
            let recorded =
                detector::evaluate_ticker(self.store, ticker, *date, false, &self.config.signal)?;
            if recorded.is_some() {
                signals_recorded += 1;
            }
        }

        let returns_updated = returns::update_returns_between(self.store, ticker, from, as_of)?;

        info!(
            ticker = %ticker,
            days = dates.len(),
            signals = signals_recorded,
            returns = returns_updated,
            "backtest scan complete: {} days, {} signals, {} returns updated",
            dates.len(),
            signals_recorded,
            returns_updated
        );

        Ok(ScanSummary {
            ticker: ticker.to_string(),
            days_scanned: dates.len(),
            signals_recorded,
            returns_updated,
        })
    }
}
