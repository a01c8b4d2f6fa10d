use serde::{Deserialize, Serialize};

/// Latest analyst/earnings context for a ticker, read-only input to the
/// confidence scorer. All fields are optional; an absent value contributes
/// nothing to the score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningsSnapshot {
    pub days_until_earnings: Option<i64>,
    pub buy_ratio: Option<f64>,
    pub upside_to_target_pct: Option<f64>,
    pub current_price: Option<f64>,
}

/// Price context for a ticker as of an evaluation day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceContext {
    pub close: f64,
    pub volume: f64,
    pub ma_50d: Option<f64>,
    pub volume_5d_avg: Option<f64>,
}

impl PriceContext {
    /// Percent difference between current volume and the trailing 5-day
    /// average, 2dp, or `None` when the average is unavailable.
    pub fn volume_vs_avg_pct(&self) -> Option<f64> {
        let avg = self.volume_5d_avg?;
        if avg <= 0.0 {
            return None;
        }
        Some(crate::models::macd::round_to(
            (self.volume - avg) / avg * 100.0,
            2,
        ))
    }
}
