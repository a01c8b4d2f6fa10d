//! Runtime configuration, loaded once from the environment and threaded
//! through every component call.

use std::env;

/// Thresholds driving phase classification and signal deduplication.
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Number of MACD points in the classification window.
    pub window: usize,
    /// Adjacent gap pairs averaged for the convergence speed.
    pub convergence_lookback: usize,
    /// A crossover must be projected within this many days to count as
    /// approaching.
    pub approaching_days_threshold: f64,
    /// Suppress the same ticker/phase within this trailing window.
    pub duplicate_lookback_days: i64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            window: 5,
            convergence_lookback: 3,
            approaching_days_threshold: 3.0,
            duplicate_lookback_days: 3,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment name ("production" enables JSON logs).
    pub environment: String,
    /// SQLite database path.
    pub db_path: String,
    /// Ticker universe to process.
    pub tickers: Vec<String>,
    /// Calendar days of daily bars requested from price providers.
    pub price_lookback_days: i64,
    /// Calendar days covered by a backtest scan.
    pub backtest_window_days: i64,
    pub signal: SignalConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let tickers = env::var("TICKERS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|t| t.trim().to_uppercase())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            environment: get_environment(),
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "data/sovson.db".to_string()),
            tickers,
            price_lookback_days: env::var("PRICE_LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3 * 365 + 60),
            backtest_window_days: env::var("BACKTEST_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3 * 365),
            signal: SignalConfig {
                window: env::var("SIGNAL_WINDOW")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                convergence_lookback: env::var("CONVERGENCE_LOOKBACK")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                approaching_days_threshold: env::var("APPROACHING_DAYS_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3.0),
                duplicate_lookback_days: env::var("DUPLICATE_LOOKBACK_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            db_path: "data/sovson.db".to_string(),
            tickers: Vec::new(),
            price_lookback_days: 3 * 365 + 60,
            backtest_window_days: 3 * 365,
            signal: SignalConfig::default(),
        }
    }
}

/// Deployment environment name, defaulting to "sandbox".
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}
