//! CSV price adapter: one `<SYMBOL>.csv` file per symbol.

use crate::domain::error::StockLensError;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn source_error(symbol: &str, reason: String) -> StockLensError {
        StockLensError::Source {
            symbol: symbol.to_string(),
            reason,
        }
    }

    fn parse_field<T: std::str::FromStr>(
        symbol: &str,
        record: &csv::StringRecord,
        index: usize,
        name: &str,
    ) -> Result<T, StockLensError>
    where
        T::Err: std::fmt::Display,
    {
        record
            .get(index)
            .ok_or_else(|| Self::source_error(symbol, format!("missing {} column", name)))?
            .trim()
            .parse()
            .map_err(|e| Self::source_error(symbol, format!("invalid {} value: {}", name, e)))
    }

    /// Every bar in the file, in file order.
    fn read_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, StockLensError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StockLensError::NotFound {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(Self::source_error(
                    symbol,
                    format!("failed to read {}: {}", path.display(), e),
                ));
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| Self::source_error(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = record
                .get(0)
                .ok_or_else(|| Self::source_error(symbol, "missing date column".into()))?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                Self::source_error(symbol, format!("invalid date format: {}", e))
            })?;

            bars.push(PriceBar {
                date,
                open: Self::parse_field(symbol, &record, 1, "open")?,
                high: Self::parse_field(symbol, &record, 2, "high")?,
                low: Self::parse_field(symbol, &record, 3, "low")?,
                close: Self::parse_field(symbol, &record, 4, "close")?,
                volume: Self::parse_field(symbol, &record, 5, "volume")?,
            });
        }

        debug!(symbol, bars = bars.len(), path = %path.display(), "read price file");
        Ok(bars)
    }
}

impl PriceSource for CsvPriceAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, StockLensError> {
        let bars = self
            .read_bars(symbol)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        PriceSeries::new(symbol, bars)
    }

    fn latest_bar(&self, symbol: &str, as_of: NaiveDate) -> Result<PriceBar, StockLensError> {
        self.read_bars(symbol)?
            .into_iter()
            .filter(|b| b.date <= as_of)
            .max_by_key(|b| b.date)
            .ok_or_else(|| StockLensError::NotFound {
                symbol: symbol.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::universe::SkipReason;
    use tempfile::TempDir;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("AAPL.csv"), csv_content).unwrap();
        fs::write(path.join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(
            path.join("BROKEN.csv"),
            "date,open,high,low,close,volume\n2024-01-15,100.0,110.0,90.0,abc,50000\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_prices_returns_sorted_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let series = adapter.fetch_prices("AAPL", date(1, 15), date(1, 17)).unwrap();

        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 3);
        let first = &series.bars()[0];
        assert_eq!(first.date, date(1, 15));
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 50000);
        assert_eq!(series.last_date(), Some(date(1, 17)));
    }

    #[test]
    fn fetch_prices_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let series = adapter.fetch_prices("AAPL", date(1, 16), date(1, 16)).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.bars()[0].date, date(1, 16));
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch_prices("XYZ", date(1, 1), date(1, 31));

        assert!(matches!(result, Err(StockLensError::NotFound { ref symbol }) if symbol == "XYZ"));
    }

    #[test]
    fn malformed_value_is_source_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        let result = adapter.fetch_prices("BROKEN", date(1, 1), date(1, 31));

        assert!(matches!(
            result,
            Err(StockLensError::Source { ref reason, .. }) if reason.contains("close")
        ));
    }

    #[test]
    fn latest_bar_picks_last_on_or_before() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);

        assert_eq!(adapter.latest_bar("AAPL", date(1, 16)).unwrap().close, 110.0);
        assert_eq!(adapter.latest_bar("AAPL", date(6, 1)).unwrap().close, 115.0);
        assert!(matches!(
            adapter.latest_bar("AAPL", date(1, 1)),
            Err(StockLensError::NotFound { .. })
        ));
    }

    #[test]
    fn multi_fetch_isolates_failures() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvPriceAdapter::new(path);
        let symbols = vec!["AAPL".to_string(), "XYZ".to_string(), "EMPTY".to_string()];

        let fetched = adapter.fetch_prices_multi(&symbols, date(1, 1), date(1, 31));

        assert_eq!(fetched.symbols(), vec!["AAPL"]);
        assert_eq!(fetched.skipped.len(), 2);
        assert!(fetched.skipped.iter().all(|s| s.reason == SkipReason::NotFound));
    }
}
