//! Rolling-average scans over ordered series.
//!
//! Both scans take an ordered input and return an equal-length ordered
//! output where each element is a pure function of the prior output and
//! the current input, making the process-in-date-order requirement part of
//! the interface rather than a loop detail.

/// Exponential moving average scan, seeded by the first raw value,
/// smoothing factor 2 / (span + 1).
pub fn ema_scan(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let ema = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        prev = Some(ema);
        out.push(ema);
    }

    out
}

/// Trailing simple-mean scan; `None` until the window is filled.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }

    out
}
