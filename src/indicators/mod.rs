pub mod ema;
pub mod heikin_ashi;
pub mod macd;

pub use ema::{ema_scan, trailing_mean};
