//! Unit tests for the confidence scorer

use sovson::models::{EarningsSnapshot, Phase, PriceContext};
use sovson::signals::confidence_score;

fn earnings(days: Option<i64>, buy_ratio: Option<f64>, upside: Option<f64>) -> EarningsSnapshot {
    EarningsSnapshot {
        days_until_earnings: days,
        buy_ratio,
        upside_to_target_pct: upside,
        current_price: None,
    }
}

fn price(close: f64, volume: f64, ma_50d: Option<f64>, vol_avg: Option<f64>) -> PriceContext {
    PriceContext {
        close,
        volume,
        ma_50d,
        volume_5d_avg: vol_avg,
    }
}

#[test]
fn test_base_scores_without_auxiliaries() {
    assert_eq!(confidence_score(Phase::Buy, None, None), 50);
    assert_eq!(confidence_score(Phase::Sell, None, None), 50);
    assert_eq!(confidence_score(Phase::ApproachingBuy, None, None), 30);
    assert_eq!(confidence_score(Phase::ApproachingSell, None, None), 30);
}

#[test]
fn test_strong_buy_ratio_bonus() {
    let e = earnings(None, Some(0.85), None);
    assert_eq!(confidence_score(Phase::Buy, Some(&e), None), 65);
    // Exactly at the threshold does not qualify.
    let at = earnings(None, Some(0.70), None);
    assert_eq!(confidence_score(Phase::Buy, Some(&at), None), 50);
}

#[test]
fn test_upside_bonus() {
    let e = earnings(None, None, Some(22.0));
    assert_eq!(confidence_score(Phase::Buy, Some(&e), None), 60);
}

#[test]
fn test_earnings_timing_terms_are_exclusive() {
    let safe = earnings(Some(20), None, None);
    assert_eq!(confidence_score(Phase::Buy, Some(&safe), None), 60);

    let imminent = earnings(Some(5), None, None);
    assert_eq!(confidence_score(Phase::Buy, Some(&imminent), None), 35);

    // The in-between band contributes nothing.
    let middle = earnings(Some(10), None, None);
    assert_eq!(confidence_score(Phase::Buy, Some(&middle), None), 50);
}

#[test]
fn test_price_context_terms() {
    let p = price(105.0, 2_000_000.0, Some(100.0), Some(1_500_000.0));
    assert_eq!(confidence_score(Phase::Buy, None, Some(&p)), 65);

    let below_ma = price(95.0, 1_000_000.0, Some(100.0), Some(1_500_000.0));
    assert_eq!(confidence_score(Phase::Buy, None, Some(&below_ma)), 50);
}

#[test]
fn test_missing_averages_contribute_nothing() {
    let p = price(105.0, 2_000_000.0, None, None);
    assert_eq!(confidence_score(Phase::Buy, None, Some(&p)), 50);
}

#[test]
fn test_everything_stacked_hits_the_ceiling() {
    // 50 + 15 + 10 + 10 + 5 + 10 = 100
    let e = earnings(Some(30), Some(0.9), Some(25.0));
    let p = price(110.0, 3_000_000.0, Some(100.0), Some(1_000_000.0));
    assert_eq!(confidence_score(Phase::Buy, Some(&e), Some(&p)), 100);
}

#[test]
fn test_score_always_in_bounds() {
    let inputs = [
        earnings(Some(1), None, None),
        earnings(Some(100), Some(1.0), Some(100.0)),
        earnings(None, None, None),
    ];
    for e in &inputs {
        for phase in [
            Phase::Buy,
            Phase::Sell,
            Phase::ApproachingBuy,
            Phase::ApproachingSell,
        ] {
            let score = confidence_score(phase, Some(e), None);
            assert!(score <= 100);
        }
    }
}

#[test]
fn test_approaching_with_imminent_earnings() {
    let e = earnings(Some(3), None, None);
    assert_eq!(confidence_score(Phase::ApproachingBuy, Some(&e), None), 15);
}
