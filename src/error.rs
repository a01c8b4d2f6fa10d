use chrono::NaiveDate;
use thiserror::Error;

/// Engine error taxonomy.
///
/// Warm-up gaps and duplicate signals are deliberately absent: a point that
/// is not yet warmed up carries a flag instead, and a suppressed signal is
/// reported through `store::RecordOutcome`. Neither is an error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{ticker}: insufficient history ({have} rows, need {need})")]
    InsufficientHistory {
        ticker: String,
        have: usize,
        need: usize,
    },

    #[error("{ticker} {date}: missing or non-finite field '{field}'")]
    MissingField {
        ticker: String,
        date: NaiveDate,
        field: &'static str,
    },

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
