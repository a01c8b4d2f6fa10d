//! Historical replay and return measurement.

pub mod returns;
pub mod scanner;

pub use returns::{compute_returns, update_ticker_returns};
pub use scanner::{BacktestScanner, ScanSummary};
