//! Phase classification over a sliding window of MACD points.
//!
//! Re-derived fresh on every evaluation from the most recent points
//! ordered by trading day; no state is carried between evaluations, so the
//! live and historical paths are indistinguishable to this module.

use crate::config::SignalConfig;
use crate::models::{MacdPoint, Phase};

/// Classify the current phase from a window of MACD points
/// (oldest to newest). Fewer than 2 points is Neutral, not an error.
pub fn classify(points: &[MacdPoint], cfg: &SignalConfig) -> Phase {
    let gaps: Vec<f64> = points.iter().map(|p| p.gap()).collect();
    classify_gaps(&gaps, cfg)
}

/// Classification on the raw gap series (macd_line - signal_line).
///
/// A crossover between the last two days dominates. Otherwise the gap must
/// be genuinely converging: the average closing speed over up to the last
/// `convergence_lookback` adjacent pairs projects a crossover within
/// `approaching_days_threshold` days, or the outcome is Neutral. A
/// shrinking gap alone does not trigger approaching.
pub fn classify_gaps(gaps: &[f64], cfg: &SignalConfig) -> Phase {
    if gaps.len() < 2 {
        return Phase::Neutral;
    }

    let gap_today = gaps[gaps.len() - 1];
    let gap_prev = gaps[gaps.len() - 2];

    // Crossover detection (highest priority)
    if gap_prev < 0.0 && gap_today >= 0.0 {
        return Phase::Buy;
    }
    if gap_prev > 0.0 && gap_today <= 0.0 {
        return Phase::Sell;
    }

    // Daily closing speeds: how much the absolute gap shrank each day.
    // Positive = converging.
    let speeds: Vec<f64> = gaps.windows(2).map(|w| w[0].abs() - w[1].abs()).collect();
    let take = speeds.len().min(cfg.convergence_lookback);
    let recent = &speeds[speeds.len() - take..];
    let avg_closing_speed = recent.iter().sum::<f64>() / take as f64;

    if avg_closing_speed <= 0.0 {
        return Phase::Neutral;
    }

    let days_to_cross = gap_today.abs() / avg_closing_speed;
    if days_to_cross <= cfg.approaching_days_threshold {
        if gap_today < 0.0 {
            return Phase::ApproachingBuy;
        }
        if gap_today > 0.0 {
            return Phase::ApproachingSell;
        }
    }

    Phase::Neutral
}
