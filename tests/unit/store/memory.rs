//! Unit tests for the in-memory store

use chrono::NaiveDate;
use sovson::models::{BacktestReturns, Phase, Signal};
use sovson::store::{MemoryStore, RecordOutcome, SignalStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn signal(ticker: &str, day: NaiveDate, phase: Phase) -> Signal {
    Signal {
        ticker: ticker.to_string(),
        signal_date: day,
        signal_type: phase,
        price_at_signal: 100.0,
        macd_line: 0.5,
        signal_line: 0.3,
        histogram: 0.2,
        volume_vs_avg_pct: None,
        earnings_days_out: None,
        buy_ratio: None,
        confidence_score: 50,
        backtest: BacktestReturns::default(),
    }
}

#[test]
fn test_same_phase_within_window_suppressed() {
    let store = MemoryStore::new();
    let first = signal("AAPL", date(2024, 3, 4), Phase::Buy);
    let second = signal("AAPL", date(2024, 3, 6), Phase::Buy);

    assert_eq!(store.record_signal(&first).unwrap(), RecordOutcome::Inserted);
    assert_eq!(
        store.record_signal(&second).unwrap(),
        RecordOutcome::DuplicatePhase
    );
    assert_eq!(store.get_signals("AAPL").unwrap().len(), 1);
}

#[test]
fn test_same_key_is_idempotent() {
    let store = MemoryStore::new();
    let sig = signal("AAPL", date(2024, 3, 4), Phase::Buy);
    assert_eq!(store.record_signal(&sig).unwrap(), RecordOutcome::Inserted);
    assert_eq!(
        store.record_signal(&sig).unwrap(),
        RecordOutcome::DuplicateKey
    );
    assert_eq!(store.get_signals("AAPL").unwrap().len(), 1);
}

#[test]
fn test_same_phase_outside_window_recorded() {
    let store = MemoryStore::new();
    let first = signal("AAPL", date(2024, 3, 4), Phase::Buy);
    let later = signal("AAPL", date(2024, 3, 11), Phase::Buy);
    assert_eq!(store.record_signal(&first).unwrap(), RecordOutcome::Inserted);
    assert_eq!(store.record_signal(&later).unwrap(), RecordOutcome::Inserted);
    assert_eq!(store.get_signals("AAPL").unwrap().len(), 2);
}

#[test]
fn test_different_phases_inside_window_both_recorded() {
    let store = MemoryStore::new();
    let approaching = signal("AAPL", date(2024, 3, 4), Phase::ApproachingBuy);
    let buy = signal("AAPL", date(2024, 3, 5), Phase::Buy);
    assert_eq!(
        store.record_signal(&approaching).unwrap(),
        RecordOutcome::Inserted
    );
    assert_eq!(store.record_signal(&buy).unwrap(), RecordOutcome::Inserted);
}

#[test]
fn test_dedup_scoped_per_ticker() {
    let store = MemoryStore::new();
    let a = signal("AAPL", date(2024, 3, 4), Phase::Buy);
    let b = signal("MSFT", date(2024, 3, 5), Phase::Buy);
    assert_eq!(store.record_signal(&a).unwrap(), RecordOutcome::Inserted);
    assert_eq!(store.record_signal(&b).unwrap(), RecordOutcome::Inserted);
}

#[test]
fn test_partial_backtest_update_preserves_unset_fields() {
    let store = MemoryStore::new();
    let sig = signal("AAPL", date(2024, 3, 4), Phase::Buy);
    store.record_signal(&sig).unwrap();

    let first = BacktestReturns {
        price_1w_later: Some(104.0),
        gain_1w_pct: Some(4.0),
        ..Default::default()
    };
    store
        .update_backtest_returns("AAPL", sig.signal_date, &first)
        .unwrap();

    let second = BacktestReturns {
        peak_price: Some(110.0),
        peak_gain_pct: Some(10.0),
        days_to_peak: Some(12),
        ..Default::default()
    };
    store
        .update_backtest_returns("AAPL", sig.signal_date, &second)
        .unwrap();

    let stored = &store.get_signals("AAPL").unwrap()[0];
    assert_eq!(stored.backtest.price_1w_later, Some(104.0));
    assert_eq!(stored.backtest.peak_price, Some(110.0));
    assert_eq!(stored.backtest.price_3w_later, None);
}

#[test]
fn test_custom_dedup_window() {
    let store = MemoryStore::new().with_dedup_window(7);
    let first = signal("AAPL", date(2024, 3, 4), Phase::Buy);
    let later = signal("AAPL", date(2024, 3, 9), Phase::Buy);
    assert_eq!(store.record_signal(&first).unwrap(), RecordOutcome::Inserted);
    assert_eq!(
        store.record_signal(&later).unwrap(),
        RecordOutcome::DuplicatePhase
    );
}
