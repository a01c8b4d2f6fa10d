use crate::error::EngineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily OHLCV bar, with Heikin-Ashi values once derived.
///
/// Keyed by (ticker, date); a per-ticker series is strictly increasing by
/// date. HA fields stay `None` until the candle transformer has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha_open: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha_close: Option<f64>,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            ha_open: None,
            ha_high: None,
            ha_low: None,
            ha_close: None,
        }
    }

    /// Reject bars with absent or non-finite required fields.
    pub fn validate(&self, ticker: &str) -> Result<(), EngineError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(EngineError::MissingField {
                    ticker: ticker.to_string(),
                    date: self.date,
                    field,
                });
            }
        }
        Ok(())
    }
}
