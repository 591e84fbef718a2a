//! Caller-owned watchlist of symbols and their latest observed prices.

use crate::domain::error::StockLensError;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Quote {
    Pending,
    Price { date: NaiveDate, close: f64 },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchEntry {
    pub symbol: String,
    pub quote: Quote,
}

#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    entries: Vec<WatchEntry>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `symbol` (upper-cased) unless already present. Returns whether it was added.
    pub fn add(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || self.contains(&symbol) {
            return false;
        }
        self.entries.push(WatchEntry {
            symbol,
            quote: Quote::Pending,
        });
        true
    }

    pub fn remove(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        let before = self.entries.len();
        self.entries.retain(|e| e.symbol != symbol);
        self.entries.len() != before
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    pub fn entries(&self) -> &[WatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-quotes every entry as of `as_of`. A failing symbol is marked
    /// unavailable and the rest still refresh. Returns the number of
    /// entries that received a price.
    pub fn refresh(&mut self, source: &dyn PriceSource, as_of: NaiveDate) -> usize {
        let mut priced = 0;
        for entry in &mut self.entries {
            entry.quote = match source.latest_bar(&entry.symbol, as_of) {
                Ok(bar) => {
                    priced += 1;
                    Quote::Price {
                        date: bar.date,
                        close: bar.close,
                    }
                }
                Err(e) => {
                    warn!(symbol = %entry.symbol, error = %e, "quote unavailable");
                    Quote::Unavailable {
                        reason: unavailable_reason(&e),
                    }
                }
            };
        }
        priced
    }
}

fn unavailable_reason(err: &StockLensError) -> String {
    match err {
        StockLensError::NotFound { .. } => "no data".to_string(),
        other => other.to_string(),
    }
}
