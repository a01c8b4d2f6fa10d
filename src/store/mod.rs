//! Storage collaborator interface.
//!
//! The engine consumes and exposes a handful of access patterns; anything
//! beyond them (schema evolution, vacuuming, dashboards) is out of scope.
//! Two implementations exist: SQLite for the real pipeline and an
//! in-memory store for tests and pure replay.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{BacktestReturns, Bar, EarningsSnapshot, MacdPoint, PriceContext, Signal};
use chrono::NaiveDate;

/// Default trailing window for same-ticker/same-phase suppression.
pub const DEFAULT_DEDUP_WINDOW_DAYS: i64 = 3;

/// What happened to a `record_signal` call. Suppression is a silent
/// outcome, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// New signal stored.
    Inserted,
    /// Same (ticker, signal_date, signal_type) already stored; no-op.
    DuplicateKey,
    /// Same ticker/phase already recorded within the trailing dedup
    /// window; no-op.
    DuplicatePhase,
}

/// The signal ledger and its supporting reads.
///
/// Writes are idempotent per their natural keys. Reads honoring `as_of`
/// never return rows past it, which is what makes historical replay safe.
pub trait SignalStore: Send + Sync {
    /// Idempotent by (ticker, date).
    fn upsert_bar(&self, ticker: &str, bar: &Bar) -> Result<()>;

    /// Idempotent by (ticker, calculation_date). Values are rounded here,
    /// at the persistence boundary, never mid-computation.
    fn upsert_macd_point(&self, point: &MacdPoint) -> Result<()>;

    /// Write contract: suppressed when the same ticker/phase exists within
    /// the trailing dedup window ending at the signal date; otherwise an
    /// idempotent insert keyed (ticker, signal_date, signal_type).
    fn record_signal(&self, signal: &Signal) -> Result<RecordOutcome>;

    /// Partial update of backtest fields; `None` fields are left untouched.
    fn update_backtest_returns(
        &self,
        ticker: &str,
        signal_date: NaiveDate,
        fields: &BacktestReturns,
    ) -> Result<()>;

    /// All bars for a ticker, oldest to newest, deduplicated by date.
    fn get_price_series(&self, ticker: &str) -> Result<Vec<Bar>>;

    /// The most recent `count` MACD points with period_end_date <= `as_of`,
    /// oldest to newest.
    fn get_macd_window(&self, ticker: &str, as_of: NaiveDate, count: usize)
        -> Result<Vec<MacdPoint>>;

    /// Trading days with a stored MACD point inside [from, to], ascending.
    fn get_macd_dates(&self, ticker: &str, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<NaiveDate>>;

    /// Latest earnings snapshot by fetch date, if any.
    fn get_latest_earnings(&self, ticker: &str) -> Result<Option<EarningsSnapshot>>;

    /// Close/volume of the last bar on or before `as_of`, with the rolling
    /// averages stored for that day.
    fn get_latest_price_context(
        &self,
        ticker: &str,
        as_of: NaiveDate,
    ) -> Result<Option<PriceContext>>;

    /// All recorded signals for a ticker, ascending by signal date.
    fn get_signals(&self, ticker: &str) -> Result<Vec<Signal>>;

    /// Idempotent by (ticker, fetched_date).
    fn upsert_earnings(
        &self,
        ticker: &str,
        fetched: NaiveDate,
        snapshot: &EarningsSnapshot,
    ) -> Result<()>;
}
