//! Per-ticker signal detection.
//!
//! One code path serves both the live daily pipeline and the backtest
//! scanner: the classifier only ever sees MACD points with
//! period_end_date <= `as_of`, so evaluating a historical day is
//! indistinguishable from evaluating today.

use crate::config::SignalConfig;
use crate::error::Result;
use crate::models::{BacktestReturns, Phase, Signal};
use crate::signals::{phase, scoring};
use crate::store::{RecordOutcome, SignalStore};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Evaluate a ticker as of a trading day, recording a qualifying signal
/// through the ledger. Returns the recorded signal, or `None` when the
/// phase is Neutral, the window is too short, or the ledger suppressed a
/// duplicate.
///
/// `use_earnings` is false during historical replay: earnings snapshots
/// are fetch-dated and cannot be reconstructed for past days.
pub fn evaluate_ticker<S: SignalStore + ?Sized>(
    store: &S,
    ticker: &str,
    as_of: NaiveDate,
    use_earnings: bool,
    cfg: &SignalConfig,
) -> Result<Option<Signal>> {
    let window = store.get_macd_window(ticker, as_of, cfg.window)?;
    let Some(latest) = window.last() else {
        debug!(ticker = %ticker, %as_of, "no MACD points available");
        return Ok(None);
    };

    let detected = phase::classify(&window, cfg);
    if !detected.is_signal() {
        debug!(ticker = %ticker, %as_of, "NEUTRAL - no signal");
        return Ok(None);
    }

    let earnings = if use_earnings {
        store.get_latest_earnings(ticker)?
    } else {
        None
    };
    let price = store.get_latest_price_context(ticker, as_of)?;
    let confidence = scoring::confidence_score(detected, earnings.as_ref(), price.as_ref());

    let signal = Signal {
        ticker: ticker.to_string(),
        signal_date: latest.period_end_date,
        signal_type: detected,
        price_at_signal: price.as_ref().map(|p| p.close).unwrap_or(0.0),
        macd_line: latest.macd_line,
        signal_line: latest.signal_line,
        histogram: latest.histogram,
        volume_vs_avg_pct: price.as_ref().and_then(|p| p.volume_vs_avg_pct()),
        earnings_days_out: earnings.as_ref().and_then(|e| e.days_until_earnings),
        buy_ratio: earnings.as_ref().and_then(|e| e.buy_ratio),
        confidence_score: confidence,
        backtest: BacktestReturns::default(),
    };

    match store.record_signal(&signal)? {
        RecordOutcome::Inserted => {
            info!(
                ticker = %ticker,
                phase = %detected,
                confidence = confidence,
                date = %signal.signal_date,
                "{} signal recorded - confidence {}/100",
                detected,
                confidence
            );
            Ok(Some(signal))
        }
        RecordOutcome::DuplicatePhase => {
            debug!(
                ticker = %ticker,
                phase = %detected,
                "{} already recorded within {} days - skipping",
                detected,
                cfg.duplicate_lookback_days
            );
            Ok(None)
        }
        RecordOutcome::DuplicateKey => {
            debug!(ticker = %ticker, phase = %detected, "signal already stored for this day");
            Ok(None)
        }
    }
}

/// Classify without recording; used where only the phase is needed.
pub fn peek_phase<S: SignalStore + ?Sized>(
    store: &S,
    ticker: &str,
    as_of: NaiveDate,
    cfg: &SignalConfig,
) -> Result<Phase> {
    let window = store.get_macd_window(ticker, as_of, cfg.window)?;
    Ok(phase::classify(&window, cfg))
}
