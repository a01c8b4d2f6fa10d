//! Unit tests for the EMA and trailing-mean scans

use sovson::indicators::{ema_scan, trailing_mean};

#[test]
fn test_ema_seeded_by_first_value() {
    let values = vec![42.0, 43.0, 44.0];
    let ema = ema_scan(&values, 12);
    assert_eq!(ema[0], 42.0);
}

#[test]
fn test_ema_constant_series_stays_constant() {
    let values = vec![100.0; 50];
    let ema = ema_scan(&values, 26);
    for v in &ema {
        assert!((v - 100.0).abs() < 1e-12);
    }
}

#[test]
fn test_ema_closed_form_second_value() {
    // ema[1] = alpha * x[1] + (1 - alpha) * x[0], alpha = 2 / (span + 1)
    let values = vec![10.0, 20.0];
    let span = 9;
    let alpha = 2.0 / (span as f64 + 1.0);
    let ema = ema_scan(&values, span);
    let expected = alpha * 20.0 + (1.0 - alpha) * 10.0;
    assert!((ema[1] - expected).abs() < 1e-12);
}

#[test]
fn test_ema_output_length_matches_input() {
    let values: Vec<f64> = (0..37).map(|i| i as f64).collect();
    assert_eq!(ema_scan(&values, 12).len(), values.len());
}

#[test]
fn test_ema_tracks_rising_series_from_below() {
    let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    let ema = ema_scan(&values, 12);
    // A lagging average of a strictly rising series stays below the input.
    for i in 1..values.len() {
        assert!(ema[i] < values[i]);
        assert!(ema[i] > ema[i - 1]);
    }
}

#[test]
fn test_trailing_mean_none_before_window_fills() {
    let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let means = trailing_mean(&values, 5);
    assert_eq!(means[0], None);
    assert_eq!(means[3], None);
    assert_eq!(means[4], Some(3.0));
    assert_eq!(means[5], Some(4.0));
}

#[test]
fn test_trailing_mean_window_one_is_identity() {
    let values = vec![7.0, 8.0, 9.0];
    let means = trailing_mean(&values, 1);
    assert_eq!(means, vec![Some(7.0), Some(8.0), Some(9.0)]);
}

#[test]
fn test_trailing_mean_length_matches_input() {
    let values: Vec<f64> = (0..80).map(|i| i as f64).collect();
    assert_eq!(trailing_mean(&values, 50).len(), values.len());
}
