//! Symbol lists, holdings input, and multi-symbol fetch results.
//!
//! Parses symbol and holdings lists from configuration or the command line,
//! and collects per-symbol outcomes of batch fetches so one failing symbol
//! never aborts the rest.

use crate::domain::error::StockLensError;
use crate::domain::price::PriceSeries;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("missing amount for {0} (expected SYMBOL:AMOUNT)")]
    MissingAmount(String),

    #[error("invalid amount for {symbol}: {value}")]
    InvalidAmount { symbol: String, value: String },

    #[error("invalid symbol '{0}' (letters, digits, '.', '-', '^' and '=' only)")]
    InvalidSymbol(String),
}

impl From<UniverseError> for StockLensError {
    fn from(err: UniverseError) -> Self {
        StockLensError::HoldingsParse {
            reason: err.to_string(),
        }
    }
}

/// Normalizes one ticker. Symbols double as file names, so path
/// separators and `..` are refused.
pub fn parse_symbol(input: &str) -> Result<String, UniverseError> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(UniverseError::EmptyToken);
    }
    let allowed = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if !allowed || symbol.contains("..") {
        return Err(UniverseError::InvalidSymbol(input.trim().to_string()));
    }
    Ok(symbol)
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = parse_symbol(token)?;
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Parses `"AAPL:100, GOOGL:50"` into ordered (symbol, amount) pairs.
pub fn parse_holdings(input: &str) -> Result<Vec<(String, f64)>, UniverseError> {
    let mut holdings = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let (symbol, amount) = match trimmed.split_once(':') {
            Some((s, a)) => (parse_symbol(s)?, a.trim()),
            None => return Err(UniverseError::MissingAmount(trimmed.to_uppercase())),
        };
        if amount.is_empty() {
            return Err(UniverseError::MissingAmount(symbol));
        }
        let value: f64 = amount.parse().map_err(|_| UniverseError::InvalidAmount {
            symbol: symbol.clone(),
            value: amount.to_string(),
        })?;
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        holdings.push((symbol, value));
    }

    Ok(holdings)
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotFound,
    SourceError(String),
    InsufficientBars { bars: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

impl SkippedSymbol {
    pub fn from_error(symbol: &str, err: StockLensError) -> Self {
        let reason = match err {
            StockLensError::NotFound { .. } => SkipReason::NotFound,
            other => SkipReason::SourceError(other.to_string()),
        };
        Self {
            symbol: symbol.to_string(),
            reason,
        }
    }
}

/// Outcome of a batch fetch: the series that arrived and the symbols that did not.
#[derive(Debug, Clone, Default)]
pub struct MultiFetch {
    pub series: Vec<PriceSeries>,
    pub skipped: Vec<SkippedSymbol>,
}

impl MultiFetch {
    pub fn symbols(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.symbol()).collect()
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.iter().find(|s| s.symbol() == symbol)
    }

    /// Moves series shorter than `min_bars` into `skipped`.
    pub fn require_bars(mut self, min_bars: usize) -> Self {
        let (keep, short): (Vec<_>, Vec<_>) = self
            .series
            .into_iter()
            .partition(|s| s.len() >= min_bars);
        for s in short {
            debug!(symbol = s.symbol(), bars = s.len(), min_bars, "too few bars");
            self.skipped.push(SkippedSymbol {
                symbol: s.symbol().to_string(),
                reason: SkipReason::InsufficientBars { bars: s.len() },
            });
        }
        self.series = keep;
        self
    }
}

/// Prices for `start..=end`; a single-day range asks for the latest
/// observed price instead and yields a one-bar series.
pub fn load_prices(
    source: &dyn PriceSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, StockLensError> {
    if start > end {
        return Err(StockLensError::InvalidParameter {
            name: "start".into(),
            reason: format!("{} is after {}", start, end),
        });
    }
    if start == end {
        let bar = source.latest_bar(symbol, end)?;
        return PriceSeries::new(symbol, vec![bar]);
    }
    let series = source.fetch_prices(symbol, start, end)?;
    if series.is_empty() {
        return Err(StockLensError::NotFound {
            symbol: symbol.to_string(),
        });
    }
    Ok(series)
}
