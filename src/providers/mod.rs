//! Price data provider interface.
//!
//! Fetch I/O happens here, before the engine runs; the engine itself never
//! blocks on the network. Providers return fully materialized bar series,
//! oldest to newest, deduplicated by date.

pub mod yahoo;

pub use yahoo::YahooChartSource;

use crate::error::{EngineError, Result};
use crate::models::Bar;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Daily OHLCV bars for a ticker, oldest to newest. Rows with missing
    /// fields are dropped at the source.
    async fn fetch_daily_bars(&self, ticker: &str) -> Result<Vec<Bar>>;

    fn name(&self) -> &str;
}

/// Explicit, configurable fallback chain: sources are tried in order and
/// the first non-empty success wins. Retry policy beyond this chain lives
/// upstream, not here.
pub struct FallbackPriceSource {
    sources: Vec<Arc<dyn PriceSource>>,
}

impl FallbackPriceSource {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl PriceSource for FallbackPriceSource {
    async fn fetch_daily_bars(&self, ticker: &str) -> Result<Vec<Bar>> {
        let mut last_error: Option<EngineError> = None;

        for source in &self.sources {
            match source.fetch_daily_bars(ticker).await {
                Ok(bars) if !bars.is_empty() => return Ok(bars),
                Ok(_) => {
                    warn!(ticker = %ticker, provider = source.name(), "provider returned no bars");
                    last_error = Some(EngineError::Provider {
                        provider: source.name().to_string(),
                        message: "empty bar series".to_string(),
                    });
                }
                Err(e) => {
                    warn!(
                        ticker = %ticker,
                        provider = source.name(),
                        error = %e,
                        "provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| EngineError::Provider {
            provider: "fallback-chain".to_string(),
            message: "no price sources configured".to_string(),
        }))
    }

    fn name(&self) -> &str {
        "fallback-chain"
    }
}
