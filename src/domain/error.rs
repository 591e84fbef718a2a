//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stocklens.
#[derive(Debug, thiserror::Error)]
pub enum StockLensError {
    #[error("insufficient data for {what}: have {have} points, need {need}")]
    InsufficientData {
        what: String,
        have: usize,
        need: usize,
    },

    #[error("no data found for {symbol}")]
    NotFound { symbol: String },

    #[error("data source error for {symbol}: {reason}")]
    Source { symbol: String, reason: String },

    #[error("no documents to score for {query}")]
    EmptyCorpus { query: String },

    #[error("insufficient history for portfolio risk: have {have} aligned returns, need {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid portfolio weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("non-positive price for {symbol} on {date}")]
    InvalidPrice { symbol: String, date: NaiveDate },

    #[error("duplicate date {date} in series for {symbol}")]
    DuplicateDate { symbol: String, date: NaiveDate },

    #[error("holdings parse error: {reason}")]
    HoldingsParse { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockLensError> for std::process::ExitCode {
    fn from(err: &StockLensError) -> Self {
        let code: u8 = match err {
            StockLensError::Io(_) => 1,
            StockLensError::ConfigParse { .. }
            | StockLensError::ConfigMissing { .. }
            | StockLensError::ConfigInvalid { .. } => 2,
            StockLensError::NotFound { .. } | StockLensError::Source { .. } => 3,
            StockLensError::HoldingsParse { .. }
            | StockLensError::InvalidParameter { .. }
            | StockLensError::InvalidWeights { .. } => 4,
            StockLensError::InsufficientData { .. }
            | StockLensError::InsufficientHistory { .. }
            | StockLensError::EmptyCorpus { .. }
            | StockLensError::InvalidPrice { .. }
            | StockLensError::DuplicateDate { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
