use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signal phase for a ticker on a trading day.
///
/// `Neutral` is both the default and a non-signal outcome; only the other
/// four phases are ever recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Buy,
    Sell,
    ApproachingBuy,
    ApproachingSell,
    Neutral,
}

impl Phase {
    /// True for the four phases worth recording.
    pub fn is_signal(&self) -> bool {
        !matches!(self, Phase::Neutral)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Buy => "BUY",
            Phase::Sell => "SELL",
            Phase::ApproachingBuy => "APPROACHING_BUY",
            Phase::ApproachingSell => "APPROACHING_SELL",
            Phase::Neutral => "NEUTRAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(Phase::Buy),
            "SELL" => Some(Phase::Sell),
            "APPROACHING_BUY" => Some(Phase::ApproachingBuy),
            "APPROACHING_SELL" => Some(Phase::ApproachingSell),
            "NEUTRAL" => Some(Phase::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One MACD evaluation per trading day per ticker.
///
/// `calculation_date` equals the trading day (`period_end_date`);
/// `period_start_date` is five trading days back, clamped at series start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdPoint {
    pub ticker: String,
    pub calculation_date: NaiveDate,
    pub period_start_date: NaiveDate,
    pub period_end_date: NaiveDate,
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_5d_avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma_50d: Option<f64>,
    pub current_phase: Phase,
    /// False until the slow+signal EMA chain is fully seeded. Unwarmed
    /// points are excluded from classification and never persisted.
    pub warmed_up: bool,
}

impl MacdPoint {
    /// MACD line minus signal line; sign indicates which line leads.
    pub fn gap(&self) -> f64 {
        self.macd_line - self.signal_line
    }

    /// Copy with values rounded for persistence. Applied by store
    /// implementations only, never mid-computation.
    pub fn rounded(&self) -> Self {
        Self {
            macd_line: round_to(self.macd_line, 6),
            signal_line: round_to(self.signal_line, 6),
            histogram: round_to(self.histogram, 6),
            volume_5d_avg: self.volume_5d_avg.map(|v| round_to(v, 2)),
            ma_50d: self.ma_50d.map(|v| round_to(v, 4)),
            ..self.clone()
        }
    }
}

pub(crate) fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
