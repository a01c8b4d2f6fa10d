//! Daily batch pipeline: fetch -> transform -> MACD -> detect.
//!
//! One ticker at a time; a per-ticker failure is logged and counted and
//! never aborts the rest of the batch.

use crate::config::Config;
use crate::error::Result;
use crate::indicators::{heikin_ashi, macd};
use crate::models::{Bar, Phase};
use crate::providers::PriceSource;
use crate::signals::detector;
use crate::store::SignalStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub succeeded: usize,
    pub failed: usize,
    pub signals: Vec<(String, Phase)>,
}

pub struct DailyPipeline<'a, S: SignalStore + ?Sized> {
    config: &'a Config,
    store: &'a S,
    source: Arc<dyn PriceSource>,
}

impl<'a, S: SignalStore + ?Sized> DailyPipeline<'a, S> {
    pub fn new(config: &'a Config, store: &'a S, source: Arc<dyn PriceSource>) -> Self {
        Self {
            config,
            store,
            source,
        }
    }

    /// Run the full batch over the configured ticker universe.
    pub async fn run(&self) -> PipelineReport {
        let mut report = PipelineReport::default();

        for ticker in &self.config.tickers {
            match self.process_ticker(ticker).await {
                Ok(Some(phase)) => {
                    report.succeeded += 1;
                    report.signals.push((ticker.clone(), phase));
                }
                Ok(None) => report.succeeded += 1,
                Err(e) => {
                    error!(ticker = %ticker, error = %e, "ticker failed, continuing batch");
                    report.failed += 1;
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            signals = report.signals.len(),
            "pipeline done: {} ok, {} failed, {} signals fired",
            report.succeeded,
            report.failed,
            report.signals.len()
        );
        for (ticker, phase) in &report.signals {
            info!(ticker = %ticker, phase = %phase, "  {}: {}", ticker, phase);
        }

        report
    }

    async fn process_ticker(&self, ticker: &str) -> Result<Option<Phase>> {
        let fetched = self.source.fetch_daily_bars(ticker).await?;

        // Reject individual bars with absent fields; keep the rest.
        let mut bars: Vec<Bar> = Vec::with_capacity(fetched.len());
        for bar in fetched {
            match bar.validate(ticker) {
                Ok(()) => bars.push(bar),
                Err(e) => warn!(ticker = %ticker, error = %e, "rejecting bar"),
            }
        }

        let bars = heikin_ashi::transform(ticker, &bars)?;
        for bar in &bars {
            self.store.upsert_bar(ticker, bar)?;
        }
        debug!(ticker = %ticker, rows = bars.len(), "stored {} bars", bars.len());

        let points = macd::compute(ticker, &bars, &self.config.signal)?;
        let mut stored = 0;
        for point in points.iter().filter(|p| p.warmed_up) {
            self.store.upsert_macd_point(point)?;
            stored += 1;
        }
        debug!(ticker = %ticker, rows = stored, "stored {} MACD points", stored);

        // Evaluate the latest trading day as "today".
        let Some(as_of) = bars.last().map(|b| b.date) else {
            return Ok(None);
        };
        let signal = detector::evaluate_ticker(self.store, ticker, as_of, true, &self.config.signal)?;
        Ok(signal.map(|s| s.signal_type))
    }
}
