//! Heikin-Ashi candle derivation.

use crate::error::{EngineError, Result};
use crate::models::Bar;

/// Minimum bars for a meaningful transform.
pub const MIN_BARS: usize = 30;

/// Derive Heikin-Ashi values over an ordered series of raw bars.
///
/// HA close = (O + H + L + C) / 4
/// HA open  = (prev HA open + prev HA close) / 2, seeded with (O + C) / 2
/// HA high  = max(H, HA open, HA close)
/// HA low   = min(L, HA open, HA close)
///
/// The ha_open recurrence is first-order: each output depends on the
/// previous output, so the series must be walked oldest to newest in a
/// single pass. Recomputing a suffix requires the carried-forward seed.
pub fn transform(ticker: &str, bars: &[Bar]) -> Result<Vec<Bar>> {
    if bars.len() < MIN_BARS {
        return Err(EngineError::InsufficientHistory {
            ticker: ticker.to_string(),
            have: bars.len(),
            need: MIN_BARS,
        });
    }

    let mut out = Vec::with_capacity(bars.len());
    // (previous ha_open, previous ha_close)
    let mut carry: Option<(f64, f64)> = None;

    for bar in bars {
        let ha_close = (bar.open + bar.high + bar.low + bar.close) / 4.0;
        let ha_open = match carry {
            None => (bar.open + bar.close) / 2.0,
            Some((prev_open, prev_close)) => (prev_open + prev_close) / 2.0,
        };
        let ha_high = bar.high.max(ha_open).max(ha_close);
        let ha_low = bar.low.min(ha_open).min(ha_close);

        carry = Some((ha_open, ha_close));

        let mut derived = bar.clone();
        derived.ha_open = Some(ha_open);
        derived.ha_high = Some(ha_high);
        derived.ha_low = Some(ha_low);
        derived.ha_close = Some(ha_close);
        out.push(derived);
    }

    Ok(out)
}
