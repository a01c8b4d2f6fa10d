//! Unit tests for the Heikin-Ashi transform

use chrono::NaiveDate;
use sovson::indicators::heikin_ashi::{transform, MIN_BARS};
use sovson::models::Bar;

fn create_test_bars(count: usize) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    (0..count)
        .map(|i| {
            let price = 100.0 + (i as f64 * 0.7) + ((i % 5) as f64 - 2.0);
            Bar::new(
                start + chrono::Duration::days(i as i64),
                price,
                price + 1.5,
                price - 1.2,
                price + 0.4,
                1_000_000.0 + (i as f64 * 500.0),
            )
        })
        .collect()
}

#[test]
fn test_insufficient_history() {
    let bars = create_test_bars(MIN_BARS - 1);
    assert!(transform("AAPL", &bars).is_err());
}

#[test]
fn test_all_ha_fields_populated() {
    let bars = create_test_bars(40);
    let derived = transform("AAPL", &bars).unwrap();
    assert_eq!(derived.len(), bars.len());
    for bar in &derived {
        assert!(bar.ha_open.is_some());
        assert!(bar.ha_high.is_some());
        assert!(bar.ha_low.is_some());
        assert!(bar.ha_close.is_some());
    }
}

#[test]
fn test_ha_close_within_raw_range() {
    let bars = create_test_bars(60);
    let derived = transform("AAPL", &bars).unwrap();
    for bar in &derived {
        let lo = bar.open.min(bar.high).min(bar.low).min(bar.close);
        let hi = bar.open.max(bar.high).max(bar.low).max(bar.close);
        let ha_close = bar.ha_close.unwrap();
        assert!(ha_close >= lo && ha_close <= hi);
    }
}

#[test]
fn test_ha_open_recurrence() {
    let bars = create_test_bars(40);
    let derived = transform("AAPL", &bars).unwrap();

    let seed = (bars[0].open + bars[0].close) / 2.0;
    assert_eq!(derived[0].ha_open.unwrap(), seed);

    for i in 1..derived.len() {
        let expected =
            (derived[i - 1].ha_open.unwrap() + derived[i - 1].ha_close.unwrap()) / 2.0;
        assert_eq!(derived[i].ha_open.unwrap(), expected);
    }
}

#[test]
fn test_ha_high_low_envelope() {
    let bars = create_test_bars(40);
    let derived = transform("AAPL", &bars).unwrap();
    for bar in &derived {
        let ha_open = bar.ha_open.unwrap();
        let ha_close = bar.ha_close.unwrap();
        let ha_high = bar.ha_high.unwrap();
        let ha_low = bar.ha_low.unwrap();
        assert!(ha_high >= bar.high.max(ha_open).max(ha_close) - 1e-12);
        assert!(ha_low <= bar.low.min(ha_open).min(ha_close) + 1e-12);
    }
}

#[test]
fn test_deterministic() {
    let bars = create_test_bars(50);
    let first = transform("AAPL", &bars).unwrap();
    let second = transform("AAPL", &bars).unwrap();
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.ha_open, b.ha_open);
        assert_eq!(a.ha_high, b.ha_high);
        assert_eq!(a.ha_low, b.ha_low);
        assert_eq!(a.ha_close, b.ha_close);
    }
}

#[test]
fn test_raw_fields_untouched() {
    let bars = create_test_bars(35);
    let derived = transform("AAPL", &bars).unwrap();
    for (raw, out) in bars.iter().zip(&derived) {
        assert_eq!(raw.date, out.date);
        assert_eq!(raw.open, out.open);
        assert_eq!(raw.close, out.close);
        assert_eq!(raw.volume, out.volume);
    }
}
