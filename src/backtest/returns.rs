//! Retrospective return computation for recorded BUY signals.
//!
//! Invoked on demand and overwrites in place; it is not incrementally
//! maintained. Checkpoints that are not reachable yet stay `None`.

use crate::error::Result;
use crate::models::{BacktestReturns, Bar, Phase, Signal};
use crate::store::SignalStore;
use chrono::NaiveDate;

/// Trading days to the first checkpoint (one week).
pub const WEEK_1_TRADING_DAYS: usize = 5;
/// Trading days to the second checkpoint (three weeks).
pub const WEEK_3_TRADING_DAYS: usize = 15;

fn gain_pct(entry: f64, later: f64) -> f64 {
    (later - entry) / entry * 100.0
}

/// Compute returns for one BUY signal from the full bar series and the
/// full signal history of its ticker.
pub fn compute_returns(signal: &Signal, bars: &[Bar], signals: &[Signal]) -> BacktestReturns {
    let mut out = BacktestReturns::default();
    let entry = signal.price_at_signal;
    if entry <= 0.0 {
        return out;
    }

    let after: Vec<&Bar> = bars
        .iter()
        .filter(|b| b.date > signal.signal_date)
        .collect();

    if let Some(bar) = after.get(WEEK_1_TRADING_DAYS - 1) {
        out.price_1w_later = Some(bar.close);
        out.gain_1w_pct = Some(gain_pct(entry, bar.close));
    }
    if let Some(bar) = after.get(WEEK_3_TRADING_DAYS - 1) {
        out.price_3w_later = Some(bar.close);
        out.gain_3w_pct = Some(gain_pct(entry, bar.close));
    }

    // Peak high over every subsequent bar available at computation time.
    let mut peak: Option<&Bar> = None;
    for &bar in &after {
        if peak.map_or(true, |p| bar.high > p.high) {
            peak = Some(bar);
        }
    }
    if let Some(peak) = peak {
        out.peak_price = Some(peak.high);
        out.peak_gain_pct = Some(gain_pct(entry, peak.high));
        out.days_to_peak = Some((peak.date - signal.signal_date).num_days());
    }

    // Exit at the next SELL for the same ticker strictly after the entry.
    let exit = signals
        .iter()
        .filter(|s| s.signal_type == Phase::Sell && s.signal_date > signal.signal_date)
        .min_by_key(|s| s.signal_date);
    if let Some(exit) = exit {
        out.exit_signal_date = Some(exit.signal_date);
        out.exit_price = Some(exit.price_at_signal);
        out.exit_gain_pct = Some(gain_pct(entry, exit.price_at_signal));
        out.days_to_exit = Some((exit.signal_date - signal.signal_date).num_days());
    }

    out
}

/// Recompute and store returns for every BUY signal of a ticker whose
/// signal date falls inside [from, to]. Returns the number updated.
pub fn update_returns_between<S: SignalStore + ?Sized>(
    store: &S,
    ticker: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<usize> {
    let bars = store.get_price_series(ticker)?;
    let signals = store.get_signals(ticker)?;

    let mut updated = 0;
    for signal in signals
        .iter()
        .filter(|s| s.signal_type == Phase::Buy && s.signal_date >= from && s.signal_date <= to)
    {
        let returns = compute_returns(signal, &bars, &signals);
        store.update_backtest_returns(ticker, signal.signal_date, &returns)?;
        updated += 1;
    }
    Ok(updated)
}

/// Recompute returns for every BUY signal of a ticker.
pub fn update_ticker_returns<S: SignalStore + ?Sized>(store: &S, ticker: &str) -> Result<usize> {
    update_returns_between(store, ticker, NaiveDate::MIN, NaiveDate::MAX)
}
