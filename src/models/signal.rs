use crate::models::macd::Phase;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Retrospective return measurements for a recorded signal.
///
/// Every field is optional: `None` means the checkpoint is not reachable
/// yet (not enough subsequent history, or no exit signal exists). Partial
/// updates leave `None` fields untouched in the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestReturns {
    pub price_1w_later: Option<f64>,
    pub gain_1w_pct: Option<f64>,
    pub price_3w_later: Option<f64>,
    pub gain_3w_pct: Option<f64>,
    pub peak_price: Option<f64>,
    pub peak_gain_pct: Option<f64>,
    pub days_to_peak: Option<i64>,
    pub exit_signal_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub exit_gain_pct: Option<f64>,
    pub days_to_exit: Option<i64>,
}

/// A qualifying signal, unique by (ticker, signal_date, signal_type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub ticker: String,
    pub signal_date: NaiveDate,
    pub signal_type: Phase,
    pub price_at_signal: f64,
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_vs_avg_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_days_out: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_ratio: Option<f64>,
    pub confidence_score: u8,
    #[serde(default)]
    pub backtest: BacktestReturns,
}
