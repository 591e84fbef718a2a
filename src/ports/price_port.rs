//! Price data port trait.

use crate::domain::error::StockLensError;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::domain::universe::{MultiFetch, SkipReason, SkippedSymbol};
use chrono::NaiveDate;
use tracing::warn;

pub trait PriceSource {
    /// Bars for `symbol` dated within `start..=end`.
    ///
    /// `NotFound` when the source has no such symbol; `Source` when the
    /// source could not be read.
    fn fetch_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, StockLensError>;

    /// The last bar dated on or before `as_of`.
    fn latest_bar(&self, symbol: &str, as_of: NaiveDate) -> Result<PriceBar, StockLensError>;

    /// Fetches each symbol independently; failures are recorded, not fatal.
    fn fetch_prices_multi(&self, symbols: &[String], start: NaiveDate, end: NaiveDate) -> MultiFetch {
        let mut fetched = MultiFetch::default();
        for symbol in symbols {
            match self.fetch_prices(symbol, start, end) {
                Ok(series) if series.is_empty() => {
                    warn!(symbol = %symbol, "no bars in range, skipping symbol");
                    fetched.skipped.push(SkippedSymbol {
                        symbol: symbol.clone(),
                        reason: SkipReason::NotFound,
                    });
                }
                Ok(series) => fetched.series.push(series),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "skipping symbol");
                    fetched.skipped.push(SkippedSymbol::from_error(symbol, e));
                }
            }
        }
        fetched
    }
}
