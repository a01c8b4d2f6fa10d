//! SQLite persistence for bars, MACD points, earnings and signals.
//!
//! WAL journal mode lets concurrent readers (a dashboard) work while the
//! engine writes; the engine itself only performs per-ticker upserts.

use crate::error::Result;
use crate::models::{BacktestReturns, Bar, EarningsSnapshot, MacdPoint, Phase, PriceContext, Signal};
use crate::store::{RecordOutcome, SignalStore, DEFAULT_DEDUP_WINDOW_DAYS};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

const DATE_FMT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    dedup_window_days: i64,
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = Self {
            conn: Mutex::new(conn),
            dedup_window_days: DEFAULT_DEDUP_WINDOW_DAYS,
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
            dedup_window_days: DEFAULT_DEDUP_WINDOW_DAYS,
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    pub fn with_dedup_window(mut self, days: i64) -> Self {
        self.dedup_window_days = days;
        self
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS daily_prices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume REAL NOT NULL,
                ha_open REAL,
                ha_high REAL,
                ha_low REAL,
                ha_close REAL,
                UNIQUE(ticker, date)
            );
            CREATE INDEX IF NOT EXISTS idx_daily_ticker_date ON daily_prices(ticker, date);

            CREATE TABLE IF NOT EXISTS macd_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                calculation_date TEXT NOT NULL,
                period_start_date TEXT NOT NULL,
                period_end_date TEXT NOT NULL,
                macd_line REAL NOT NULL,
                signal_line REAL NOT NULL,
                histogram REAL NOT NULL,
                volume_5d_avg REAL,
                ma_50d REAL,
                current_phase TEXT NOT NULL,
                UNIQUE(ticker, calculation_date)
            );
            CREATE INDEX IF NOT EXISTS idx_macd_ticker_end ON macd_data(ticker, period_end_date);

            CREATE TABLE IF NOT EXISTS earnings_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                fetched_date TEXT NOT NULL,
                days_until_earnings INTEGER,
                buy_ratio REAL,
                upside_to_target_pct REAL,
                current_price REAL,
                UNIQUE(ticker, fetched_date)
            );
            CREATE INDEX IF NOT EXISTS idx_earnings_ticker ON earnings_data(ticker);

            CREATE TABLE IF NOT EXISTS signals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                signal_date TEXT NOT NULL,
                signal_type TEXT NOT NULL,
                price_at_signal REAL NOT NULL,
                macd_line REAL NOT NULL,
                signal_line REAL NOT NULL,
                histogram REAL NOT NULL,
                volume_vs_avg_pct REAL,
                earnings_days_out INTEGER,
                buy_ratio REAL,
                confidence_score INTEGER NOT NULL,
                price_1w_later REAL,
                gain_1w_pct REAL,
                price_3w_later REAL,
                gain_3w_pct REAL,
                peak_price REAL,
                peak_gain_pct REAL,
                days_to_peak INTEGER,
                exit_signal_date TEXT,
                exit_price REAL,
                exit_gain_pct REAL,
                days_to_exit INTEGER,
                UNIQUE(ticker, signal_date, signal_type)
            );
            CREATE INDEX IF NOT EXISTS idx_signals_ticker ON signals(ticker);
            CREATE INDEX IF NOT EXISTS idx_signals_ticker_type ON signals(ticker, signal_type);",
        )?;

        Ok(())
    }
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

fn parse_date(text: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FMT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_phase(text: &str) -> rusqlite::Result<Phase> {
    Phase::parse(text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown phase '{}'", text).into(),
        )
    })
}

fn bar_from_row(row: &Row<'_>) -> rusqlite::Result<Bar> {
    let date: String = row.get(0)?;
    Ok(Bar {
        date: parse_date(&date)?,
        open: row.get(1)?,
        high: row.get(2)?,
        low: row.get(3)?,
        close: row.get(4)?,
        volume: row.get(5)?,
        ha_open: row.get(6)?,
        ha_high: row.get(7)?,
        ha_low: row.get(8)?,
        ha_close: row.get(9)?,
    })
}

fn macd_from_row(ticker: &str, row: &Row<'_>) -> rusqlite::Result<MacdPoint> {
    let calc: String = row.get(0)?;
    let start: String = row.get(1)?;
    let end: String = row.get(2)?;
    let phase: String = row.get(8)?;
    Ok(MacdPoint {
        ticker: ticker.to_string(),
        calculation_date: parse_date(&calc)?,
        period_start_date: parse_date(&start)?,
        period_end_date: parse_date(&end)?,
        macd_line: row.get(3)?,
        signal_line: row.get(4)?,
        histogram: row.get(5)?,
        volume_5d_avg: row.get(6)?,
        ma_50d: row.get(7)?,
        current_phase: parse_phase(&phase)?,
        // Only warmed points are ever persisted.
        warmed_up: true,
    })
}

fn signal_from_row(row: &Row<'_>) -> rusqlite::Result<Signal> {
    let ticker: String = row.get(0)?;
    let date: String = row.get(1)?;
    let kind: String = row.get(2)?;
    let exit_date: Option<String> = row.get(18)?;
    Ok(Signal {
        ticker,
        signal_date: parse_date(&date)?,
        signal_type: parse_phase(&kind)?,
        price_at_signal: row.get(3)?,
        macd_line: row.get(4)?,
        signal_line: row.get(5)?,
        histogram: row.get(6)?,
        volume_vs_avg_pct: row.get(7)?,
        earnings_days_out: row.get(8)?,
        buy_ratio: row.get(9)?,
        confidence_score: row.get::<_, i64>(10)? as u8,
        backtest: BacktestReturns {
            price_1w_later: row.get(11)?,
            gain_1w_pct: row.get(12)?,
            price_3w_later: row.get(13)?,
            gain_3w_pct: row.get(14)?,
            peak_price: row.get(15)?,
            peak_gain_pct: row.get(16)?,
            days_to_peak: row.get(17)?,
            exit_signal_date: match exit_date {
                Some(d) => Some(parse_date(&d)?),
                None => None,
            },
            exit_price: row.get(19)?,
            exit_gain_pct: row.get(20)?,
            days_to_exit: row.get(21)?,
        },
    })
}

const SIGNAL_COLUMNS: &str = "ticker, signal_date, signal_type, price_at_signal, \
     macd_line, signal_line, histogram, volume_vs_avg_pct, earnings_days_out, buy_ratio, \
     confidence_score, price_1w_later, gain_1w_pct, price_3w_later, gain_3w_pct, \
     peak_price, peak_gain_pct, days_to_peak, exit_signal_date, exit_price, exit_gain_pct, \
     days_to_exit";

impl SignalStore for SqliteStore {
    fn upsert_bar(&self, ticker: &str, bar: &Bar) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO daily_prices
                (ticker, date, open, high, low, close, volume,
                 ha_open, ha_high, ha_low, ha_close)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(ticker, date) DO UPDATE SET
                open = excluded.open,
                high = excluded.high,
                low = excluded.low,
                close = excluded.close,
                volume = excluded.volume,
                ha_open = excluded.ha_open,
                ha_high = excluded.ha_high,
                ha_low = excluded.ha_low,
                ha_close = excluded.ha_close",
            params![
                ticker,
                fmt_date(bar.date),
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume,
                bar.ha_open,
                bar.ha_high,
                bar.ha_low,
                bar.ha_close,
            ],
        )?;
        Ok(())
    }

    fn upsert_macd_point(&self, point: &MacdPoint) -> Result<()> {
        let point = point.rounded();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO macd_data
                (ticker, calculation_date, period_start_date, period_end_date,
                 macd_line, signal_line, histogram, volume_5d_avg, ma_50d, current_phase)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(ticker, calculation_date) DO UPDATE SET
                period_start_date = excluded.period_start_date,
                period_end_date = excluded.period_end_date,
                macd_line = excluded.macd_line,
                signal_line = excluded.signal_line,
                histogram = excluded.histogram,
                volume_5d_avg = excluded.volume_5d_avg,
                ma_50d = excluded.ma_50d,
                current_phase = excluded.current_phase",
            params![
                point.ticker,
                fmt_date(point.calculation_date),
                fmt_date(point.period_start_date),
                fmt_date(point.period_end_date),
                point.macd_line,
                point.signal_line,
                point.histogram,
                point.volume_5d_avg,
                point.ma_50d,
                point.current_phase.as_str(),
            ],
        )?;
        Ok(())
    }

    fn record_signal(&self, signal: &Signal) -> Result<RecordOutcome> {
        let conn = self.conn.lock().unwrap();

        // Exact key already covered: idempotent no-op.
        let key_exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM signals
                 WHERE ticker = ?1 AND signal_date = ?2 AND signal_type = ?3",
                params![
                    signal.ticker,
                    fmt_date(signal.signal_date),
                    signal.signal_type.as_str()
                ],
                |row| row.get(0),
            )
            .optional()?;
        if key_exists.is_some() {
            return Ok(RecordOutcome::DuplicateKey);
        }

        // Same phase within the trailing window: suppress.
        let cutoff = signal.signal_date - Duration::days(self.dedup_window_days);
        let phase_exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM signals
                 WHERE ticker = ?1 AND signal_type = ?2
                   AND signal_date >= ?3 AND signal_date <= ?4
                 LIMIT 1",
                params![
                    signal.ticker,
                    signal.signal_type.as_str(),
                    fmt_date(cutoff),
                    fmt_date(signal.signal_date)
                ],
                |row| row.get(0),
            )
            .optional()?;
        if phase_exists.is_some() {
            return Ok(RecordOutcome::DuplicatePhase);
        }

        conn.execute(
            "INSERT INTO signals
                (ticker, signal_date, signal_type, price_at_signal,
                 macd_line, signal_line, histogram,
                 volume_vs_avg_pct, earnings_days_out, buy_ratio, confidence_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(ticker, signal_date, signal_type) DO NOTHING",
            params![
                signal.ticker,
                fmt_date(signal.signal_date),
                signal.signal_type.as_str(),
                signal.price_at_signal,
                signal.macd_line,
                signal.signal_line,
                signal.histogram,
                signal.volume_vs_avg_pct,
                signal.earnings_days_out,
                signal.buy_ratio,
                signal.confidence_score as i64,
            ],
        )?;
        Ok(RecordOutcome::Inserted)
    }

    fn update_backtest_returns(
        &self,
        ticker: &str,
        signal_date: NaiveDate,
        fields: &BacktestReturns,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        // COALESCE keeps the stored value wherever the incoming field is
        // NULL, which is exactly the partial-update contract.
        conn.execute(
            "UPDATE signals SET
                price_1w_later = COALESCE(?1, price_1w_later),
                gain_1w_pct = COALESCE(?2, gain_1w_pct),
                price_3w_later = COALESCE(?3, price_3w_later),
                gain_3w_pct = COALESCE(?4, gain_3w_pct),
                peak_price = COALESCE(?5, peak_price),
                peak_gain_pct = COALESCE(?6, peak_gain_pct),
                days_to_peak = COALESCE(?7, days_to_peak),
                exit_signal_date = COALESCE(?8, exit_signal_date),
                exit_price = COALESCE(?9, exit_price),
                exit_gain_pct = COALESCE(?10, exit_gain_pct),
                days_to_exit = COALESCE(?11, days_to_exit)
             WHERE ticker = ?12 AND signal_date = ?13",
            params![
                fields.price_1w_later,
                fields.gain_1w_pct,
                fields.price_3w_later,
                fields.gain_3w_pct,
                fields.peak_price,
                fields.peak_gain_pct,
                fields.days_to_peak,
                fields.exit_signal_date.map(fmt_date),
                fields.exit_price,
                fields.exit_gain_pct,
                fields.days_to_exit,
                ticker,
                fmt_date(signal_date),
            ],
        )?;
        Ok(())
    }

    fn get_price_series(&self, ticker: &str) -> Result<Vec<Bar>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT date, open, high, low, close, volume,
                    ha_open, ha_high, ha_low, ha_close
             FROM daily_prices
             WHERE ticker = ?1
             ORDER BY date ASC",
        )?;
        let bars = stmt
            .query_map(params![ticker], |row| bar_from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bars)
    }

    fn get_macd_window(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        count: usize,
    ) -> Result<Vec<MacdPoint>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT calculation_date, period_start_date, period_end_date,
                    macd_line, signal_line, histogram, volume_5d_avg, ma_50d, current_phase
             FROM macd_data
             WHERE ticker = ?1 AND period_end_date <= ?2
             ORDER BY period_end_date DESC
             LIMIT ?3",
        )?;
        let mut points = stmt
            .query_map(params![ticker, fmt_date(as_of), count as i64], |row| {
                macd_from_row(ticker, row)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        points.reverse(); // oldest first
        Ok(points)
    }

    fn get_macd_dates(
        &self,
        ticker: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT period_end_date FROM macd_data
             WHERE ticker = ?1 AND period_end_date >= ?2 AND period_end_date <= ?3
             ORDER BY period_end_date ASC",
        )?;
        let dates = stmt
            .query_map(params![ticker, fmt_date(from), fmt_date(to)], |row| {
                let text: String = row.get(0)?;
                parse_date(&text)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(dates)
    }

    fn get_latest_earnings(&self, ticker: &str) -> Result<Option<EarningsSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let snapshot = conn
            .query_row(
                "SELECT days_until_earnings, buy_ratio, upside_to_target_pct, current_price
                 FROM earnings_data
                 WHERE ticker = ?1
                 ORDER BY fetched_date DESC
                 LIMIT 1",
                params![ticker],
                |row| {
                    Ok(EarningsSnapshot {
                        days_until_earnings: row.get(0)?,
                        buy_ratio: row.get(1)?,
                        upside_to_target_pct: row.get(2)?,
                        current_price: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(snapshot)
    }

    fn get_latest_price_context(
        &self,
        ticker: &str,
        as_of: NaiveDate,
    ) -> Result<Option<PriceContext>> {
        let conn = self.conn.lock().unwrap();
        let price: Option<(String, f64, f64)> = conn
            .query_row(
                "SELECT date, close, volume FROM daily_prices
                 WHERE ticker = ?1 AND date <= ?2
                 ORDER BY date DESC
                 LIMIT 1",
                params![ticker, fmt_date(as_of)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((date, close, volume)) = price else {
            return Ok(None);
        };

        let averages: Option<(Option<f64>, Option<f64>)> = conn
            .query_row(
                "SELECT ma_50d, volume_5d_avg FROM macd_data
                 WHERE ticker = ?1 AND period_end_date = ?2",
                params![ticker, date],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (ma_50d, volume_5d_avg) = averages.unwrap_or((None, None));

        Ok(Some(PriceContext {
            close,
            volume,
            ma_50d,
            volume_5d_avg,
        }))
    }

    fn get_signals(&self, ticker: &str) -> Result<Vec<Signal>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SIGNAL_COLUMNS} FROM signals WHERE ticker = ?1 ORDER BY signal_date ASC"
        ))?;
        let signals = stmt
            .query_map(params![ticker], |row| signal_from_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(signals)
    }

    fn upsert_earnings(
        &self,
        ticker: &str,
        fetched: NaiveDate,
        snapshot: &EarningsSnapshot,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO earnings_data
                (ticker, fetched_date, days_until_earnings, buy_ratio,
                 upside_to_target_pct, current_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(ticker, fetched_date) DO UPDATE SET
                days_until_earnings = excluded.days_until_earnings,
                buy_ratio = excluded.buy_ratio,
                upside_to_target_pct = excluded.upside_to_target_pct,
                current_price = excluded.current_price",
            params![
                ticker,
                fmt_date(fetched),
                snapshot.days_until_earnings,
                snapshot.buy_ratio,
                snapshot.upside_to_target_pct,
                snapshot.current_price,
            ],
        )?;
        Ok(())
    }
}
