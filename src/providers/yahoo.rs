//! Yahoo Finance chart API price source.
//!
//! Hits the v8 chart endpoint directly; no auth is required for daily
//! candles. Null rows in the response (halted days, partial data) are
//! dropped before the bars reach the engine.

use crate::error::{EngineError, Result};
use crate::models::Bar;
use crate::providers::PriceSource;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooChartSource {
    client: reqwest::Client,
    base_url: String,
    lookback_days: i64,
}

impl YahooChartSource {
    pub fn new(lookback_days: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            lookback_days,
        }
    }

    /// Point at a different host; used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_bars(&self, ticker: &str, response: ChartResponse) -> Result<Vec<Bar>> {
        let result = response
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| EngineError::Provider {
                provider: self.name().to_string(),
                message: format!("{}: empty chart result", ticker),
            })?;

        let timestamps = result.timestamp.unwrap_or_default();
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .unwrap_or_default();

        // Deduplicate by date while keeping ascending order.
        let mut bars: BTreeMap<chrono::NaiveDate, Bar> = BTreeMap::new();
        for (i, ts) in timestamps.iter().enumerate() {
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                continue;
            };
            let row = (
                quote.open.get(i).copied().flatten(),
                quote.high.get(i).copied().flatten(),
                quote.low.get(i).copied().flatten(),
                quote.close.get(i).copied().flatten(),
                quote.volume.get(i).copied().flatten(),
            );
            if let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row {
                bars.insert(date, Bar::new(date, open, high, low, close, volume));
            }
        }

        debug!(
            ticker = %ticker,
            rows = bars.len(),
            "parsed {} daily bars from chart payload",
            bars.len()
        );
        Ok(bars.into_values().collect())
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    async fn fetch_daily_bars(&self, ticker: &str) -> Result<Vec<Bar>> {
        let end = Utc::now();
        let start = end - Duration::days(self.lookback_days);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EngineError::Provider {
                provider: self.name().to_string(),
                message: format!("{}: HTTP {}", ticker, response.status()),
            });
        }

        let payload: ChartResponse = response.json().await?;
        self.parse_bars(ticker, payload)
    }

    fn name(&self) -> &str {
        "yahoo-chart"
    }
}
