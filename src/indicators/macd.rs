//! MACD (Moving Average Convergence Divergence) series calculation.

use crate::config::SignalConfig;
use crate::error::{EngineError, Result};
use crate::indicators::ema::{ema_scan, trailing_mean};
use crate::models::{Bar, MacdPoint, Phase};
use crate::signals::phase;

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;
pub const MA_WINDOW: usize = 50;
pub const VOLUME_WINDOW: usize = 5;

/// Observations needed before a point counts as fully seeded.
pub const WARMUP_POINTS: usize = SLOW_SPAN + SIGNAL_SPAN;
/// Series length below which the calculation is refused outright.
pub const MIN_POINTS: usize = WARMUP_POINTS + 5;

/// Trading days covered by a point's reporting period.
const PERIOD_DAYS: usize = 5;

/// Compute the full per-day MACD series for an ordered bar series.
///
/// macd = EMA(close, 12) - EMA(close, 26); signal = EMA(macd, 9);
/// histogram = macd - signal. ma_50d and volume_5d_avg are trailing simple
/// means, `None` before their windows fill. Points with fewer than
/// slow+signal observations behind them are marked not warmed up; warmed
/// points get their phase classified from the trailing window of warmed
/// points ending at that day.
pub fn compute(ticker: &str, bars: &[Bar], cfg: &SignalConfig) -> Result<Vec<MacdPoint>> {
    if bars.len() < MIN_POINTS {
        return Err(EngineError::InsufficientHistory {
            ticker: ticker.to_string(),
            have: bars.len(),
            need: MIN_POINTS,
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let fast = ema_scan(&closes, FAST_SPAN);
    let slow = ema_scan(&closes, SLOW_SPAN);
    let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal_line = ema_scan(&macd_line, SIGNAL_SPAN);

    let ma_50d = trailing_mean(&closes, MA_WINDOW);
    let volume_5d_avg = trailing_mean(&volumes, VOLUME_WINDOW);

    let mut points: Vec<MacdPoint> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let start_idx = i.saturating_sub(PERIOD_DAYS - 1);
            MacdPoint {
                ticker: ticker.to_string(),
                calculation_date: bar.date,
                period_start_date: bars[start_idx].date,
                period_end_date: bar.date,
                macd_line: macd_line[i],
                signal_line: signal_line[i],
                histogram: macd_line[i] - signal_line[i],
                volume_5d_avg: volume_5d_avg[i],
                ma_50d: ma_50d[i],
                current_phase: Phase::Neutral,
                warmed_up: i + 1 >= WARMUP_POINTS,
            }
        })
        .collect();

    // Warmed points form a contiguous suffix, so the classification window
    // for day i is a slice ending at i that never reaches into warm-up.
    let first_warmed = WARMUP_POINTS - 1;
    for i in first_warmed..points.len() {
        let window_start = i.saturating_sub(cfg.window.saturating_sub(1)).max(first_warmed);
        let classified = phase::classify(&points[window_start..=i], cfg);
        points[i].current_phase = classified;
    }

    Ok(points)
}
