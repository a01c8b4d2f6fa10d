//! In-memory SignalStore for tests and pure replay runs.

use crate::error::Result;
use crate::models::{BacktestReturns, Bar, EarningsSnapshot, MacdPoint, PriceContext, Signal};
use crate::store::{RecordOutcome, SignalStore, DEFAULT_DEDUP_WINDOW_DAYS};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    bars: HashMap<String, BTreeMap<NaiveDate, Bar>>,
    points: HashMap<String, BTreeMap<NaiveDate, MacdPoint>>,
    earnings: HashMap<String, BTreeMap<NaiveDate, EarningsSnapshot>>,
    signals: Vec<Signal>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    dedup_window_days: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            dedup_window_days: DEFAULT_DEDUP_WINDOW_DAYS,
        }
    }

    pub fn with_dedup_window(mut self, days: i64) -> Self {
        self.dedup_window_days = days;
        self
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalStore for MemoryStore {
    fn upsert_bar(&self, ticker: &str, bar: &Bar) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .bars
            .entry(ticker.to_string())
            .or_default()
            .insert(bar.date, bar.clone());
        Ok(())
    }

    fn upsert_macd_point(&self, point: &MacdPoint) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let rounded = point.rounded();
        inner
            .points
            .entry(point.ticker.clone())
            .or_default()
            .insert(rounded.calculation_date, rounded);
        Ok(())
    }

    fn record_signal(&self, signal: &Signal) -> Result<RecordOutcome> {
        let mut inner = self.inner.lock().unwrap();

        let key_covered = inner.signals.iter().any(|s| {
            s.ticker == signal.ticker
                && s.signal_date == signal.signal_date
                && s.signal_type == signal.signal_type
        });
        if key_covered {
            return Ok(RecordOutcome::DuplicateKey);
        }

        let cutoff = signal.signal_date - Duration::days(self.dedup_window_days);
        let phase_covered = inner.signals.iter().any(|s| {
            s.ticker == signal.ticker
                && s.signal_type == signal.signal_type
                && s.signal_date >= cutoff
                && s.signal_date <= signal.signal_date
        });
        if phase_covered {
            return Ok(RecordOutcome::DuplicatePhase);
        }

        inner.signals.push(signal.clone());
        Ok(RecordOutcome::Inserted)
    }

    fn update_backtest_returns(
        &self,
        ticker: &str,
        signal_date: NaiveDate,
        fields: &BacktestReturns,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        for signal in inner
            .signals
            .iter_mut()
            .filter(|s| s.ticker == ticker && s.signal_date == signal_date)
        {
            let b = &mut signal.backtest;
            merge(&mut b.price_1w_later, fields.price_1w_later);
            merge(&mut b.gain_1w_pct, fields.gain_1w_pct);
            merge(&mut b.price_3w_later, fields.price_3w_later);
            merge(&mut b.gain_3w_pct, fields.gain_3w_pct);
            merge(&mut b.peak_price, fields.peak_price);
            merge(&mut b.peak_gain_pct, fields.peak_gain_pct);
            merge(&mut b.days_to_peak, fields.days_to_peak);
            merge(&mut b.exit_signal_date, fields.exit_signal_date);
            merge(&mut b.exit_price, fields.exit_price);
            merge(&mut b.exit_gain_pct, fields.exit_gain_pct);
            merge(&mut b.days_to_exit, fields.days_to_exit);
        }
        Ok(())
    }

    fn get_price_series(&self, ticker: &str) -> Result<Vec<Bar>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .bars
            .get(ticker)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get_macd_window(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        count: usize,
    ) -> Result<Vec<MacdPoint>> {
        let inner = self.inner.lock().unwrap();
        let Some(points) = inner.points.get(ticker) else {
            return Ok(Vec::new());
        };
        let mut window: Vec<MacdPoint> = points
            .values()
            .filter(|p| p.period_end_date <= as_of)
            .rev()
            .take(count)
            .cloned()
            .collect();
        window.reverse(); // oldest first
        Ok(window)
    }

    fn get_macd_dates(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .points
            .get(ticker)
            .map(|m| {
                m.values()
                    .map(|p| p.period_end_date)
                    .filter(|d| *d >= from && *d <= to)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_latest_earnings(&self, ticker: &str) -> Result<Option<EarningsSnapshot>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .earnings
            .get(ticker)
            .and_then(|m| m.values().next_back().cloned()))
    }

    fn get_latest_price_context(
        &self,
        ticker: &str,
        as_of: NaiveDate,
    ) -> Result<Option<PriceContext>> {
        let inner = self.inner.lock().unwrap();
        let Some(bars) = inner.bars.get(ticker) else {
            return Ok(None);
        };
        let Some((date, bar)) = bars.range(..=as_of).next_back() else {
            return Ok(None);
        };
        let averages = inner
            .points
            .get(ticker)
            .and_then(|m| m.values().find(|p| p.period_end_date == *date));

        Ok(Some(PriceContext {
            close: bar.close,
            volume: bar.volume,
            ma_50d: averages.and_then(|p| p.ma_50d),
            volume_5d_avg: averages.and_then(|p| p.volume_5d_avg),
        }))
    }

    fn get_signals(&self, ticker: &str) -> Result<Vec<Signal>> {
        let inner = self.inner.lock().unwrap();
        let mut signals: Vec<Signal> = inner
            .signals
            .iter()
            .filter(|s| s.ticker == ticker)
            .cloned()
            .collect();
        signals.sort_by_key(|s| s.signal_date);
        Ok(signals)
    }

    fn upsert_earnings(
        &self,
        ticker: &str,
        fetched: NaiveDate,
        snapshot: &EarningsSnapshot,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .earnings
            .entry(ticker.to_string())
            .or_default()
            .insert(fetched, snapshot.clone());
        Ok(())
    }
}

fn merge<T>(target: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *target = incoming;
    }
}
