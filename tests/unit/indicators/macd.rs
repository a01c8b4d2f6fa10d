//! Unit tests for the MACD series calculator

use chrono::{Duration, NaiveDate};
use sovson::config::SignalConfig;
use sovson::indicators::macd::{compute, MIN_POINTS, WARMUP_POINTS};
use sovson::models::{Bar, Phase};

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            Bar::new(
                start + Duration::days(i as i64),
                close,
                close + 0.5,
                close - 0.5,
                close,
                1_000_000.0,
            )
        })
        .collect()
}

#[test]
fn test_insufficient_history() {
    let bars = bars_from_closes(&vec![100.0; MIN_POINTS - 1]);
    assert!(compute("AAPL", &bars, &SignalConfig::default()).is_err());
}

#[test]
fn test_constant_series_converges_to_zero() {
    let bars = bars_from_closes(&vec![100.0; 60]);
    let points = compute("AAPL", &bars, &SignalConfig::default()).unwrap();
    for point in &points {
        assert!(point.macd_line.abs() < 1e-9);
        assert!(point.signal_line.abs() < 1e-9);
        assert!(point.histogram.abs() < 1e-9);
    }
    // Flat data never crosses: every warmed point stays Neutral.
    for point in points.iter().filter(|p| p.warmed_up) {
        assert_eq!(point.current_phase, Phase::Neutral);
    }
}

#[test]
fn test_warmup_marking() {
    let bars = bars_from_closes(&vec![100.0; 60]);
    let points = compute("AAPL", &bars, &SignalConfig::default()).unwrap();
    assert_eq!(points.len(), 60);
    for (i, point) in points.iter().enumerate() {
        assert_eq!(point.warmed_up, i + 1 >= WARMUP_POINTS);
    }
}

#[test]
fn test_rolling_averages_fill_in() {
    let closes: Vec<f64> = (0..70).map(|i| 100.0 + i as f64 * 0.3).collect();
    let bars = bars_from_closes(&closes);
    let points = compute("AAPL", &bars, &SignalConfig::default()).unwrap();

    assert!(points[3].volume_5d_avg.is_none());
    assert!(points[4].volume_5d_avg.is_some());
    assert!(points[48].ma_50d.is_none());
    assert!(points[49].ma_50d.is_some());

    // Constant volume: any filled average equals the constant.
    assert_eq!(points[10].volume_5d_avg, Some(1_000_000.0));
}

#[test]
fn test_histogram_is_macd_minus_signal() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.9).sin() * 4.0).collect();
    let bars = bars_from_closes(&closes);
    let points = compute("AAPL", &bars, &SignalConfig::default()).unwrap();
    for point in &points {
        assert!((point.histogram - (point.macd_line - point.signal_line)).abs() < 1e-12);
    }
}

#[test]
fn test_period_dates() {
    let bars = bars_from_closes(&vec![100.0; 50]);
    let points = compute("AAPL", &bars, &SignalConfig::default()).unwrap();

    // calculation_date is the trading day itself.
    for (bar, point) in bars.iter().zip(&points) {
        assert_eq!(point.calculation_date, bar.date);
        assert_eq!(point.period_end_date, bar.date);
    }
    // period_start clamps at series start, then trails by five trading days.
    assert_eq!(points[0].period_start_date, bars[0].date);
    assert_eq!(points[2].period_start_date, bars[0].date);
    assert_eq!(points[10].period_start_date, bars[6].date);
}

#[test]
fn test_rounding_only_for_persistence() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 1.3).cos()).collect();
    let bars = bars_from_closes(&closes);
    let points = compute("AAPL", &bars, &SignalConfig::default()).unwrap();

    let point = &points[50];
    let rounded = point.rounded();
    assert!((rounded.macd_line - point.macd_line).abs() < 5e-7);
    // The rounded copy carries at most 6 decimal places.
    let scaled = rounded.macd_line * 1e6;
    assert!((scaled - scaled.round()).abs() < 1e-6);
}

#[test]
fn test_decline_then_rally_produces_buy_crossover() {
    let mut closes: Vec<f64> = Vec::new();
    closes.extend(std::iter::repeat(100.0).take(50));
    closes.extend((0..40).map(|i| 100.0 - i as f64 * 1.5)); // decline
    closes.extend((0..40).map(|i| 40.0 + i as f64 * 2.0)); // sharp rally
    let bars = bars_from_closes(&closes);
    let points = compute("AAPL", &bars, &SignalConfig::default()).unwrap();

    let buys = points
        .iter()
        .filter(|p| p.warmed_up && p.current_phase == Phase::Buy)
        .count();
    assert!(buys >= 1, "sustained rally after a decline must cross over");
}
