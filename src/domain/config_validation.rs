//! Configuration validation.
//!
//! Validates every config field before a command runs. Absent optional keys
//! fall back to their defaults; present keys must hold usable values.

use crate::domain::error::StockLensError;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_RSI_WINDOW;
use crate::domain::indicator::sma::DEFAULT_SMA_WINDOW;
use crate::domain::portfolio::{CovarianceAlignment, PerformanceWeighting};
use crate::domain::settings::{
    DEFAULT_LANGUAGE, DEFAULT_LIMIT, DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS, is_language_code,
};
use crate::domain::universe::{parse_holdings, parse_symbol};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockLensError> {
    validate_data(config)?;
    validate_indicators(config)?;
    validate_portfolio(config)?;
    validate_sentiment(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StockLensError {
    StockLensError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Reads an integer key, rejecting values that are present but not integers.
pub fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, StockLensError> {
    match config.get_nonempty(section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| invalid(section, key, format!("expected an integer, got '{}'", raw))),
    }
}

/// Reads a positive count such as a window length or article limit.
pub fn read_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StockLensError> {
    let value = read_int(config, section, key, default as i64)?;
    if value < 1 {
        return Err(invalid(section, key, format!("{} must be at least 1", key)));
    }
    Ok(value as usize)
}

pub fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, StockLensError> {
    match config.get_nonempty(section, key) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(section, key, format!("invalid {} format, expected YYYY-MM-DD", key))),
    }
}

pub fn read_choice<T: FromStr<Err = String> + Default>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<T, StockLensError> {
    match config.get_nonempty(section, key) {
        None => Ok(T::default()),
        Some(s) => s.parse().map_err(|reason: String| invalid(section, key, reason)),
    }
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), StockLensError> {
    if config.get_nonempty("data", "prices_dir").is_none() {
        return Err(StockLensError::ConfigMissing {
            section: "data".to_string(),
            key: "prices_dir".to_string(),
        });
    }
    Ok(())
}

fn validate_indicators(config: &dyn ConfigPort) -> Result<(), StockLensError> {
    read_positive(config, "indicators", "sma_window", DEFAULT_SMA_WINDOW)?;
    read_positive(config, "indicators", "rsi_window", DEFAULT_RSI_WINDOW)?;
    let fast = read_positive(config, "indicators", "macd_fast", DEFAULT_FAST)?;
    let slow = read_positive(config, "indicators", "macd_slow", DEFAULT_SLOW)?;
    read_positive(config, "indicators", "macd_signal", DEFAULT_SIGNAL)?;

    if fast >= slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

fn validate_portfolio(config: &dyn ConfigPort) -> Result<(), StockLensError> {
    if let Some(holdings) = config.get_nonempty("portfolio", "holdings") {
        parse_holdings(&holdings).map_err(|e| invalid("portfolio", "holdings", e.to_string()))?;
    }
    if let Some(benchmark) = config.get_nonempty("portfolio", "benchmark") {
        parse_symbol(&benchmark).map_err(|e| invalid("portfolio", "benchmark", e.to_string()))?;
    }

    let start = read_date(config, "portfolio", "start_date")?;
    let end = read_date(config, "portfolio", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(
                "portfolio",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }

    read_choice::<PerformanceWeighting>(config, "portfolio", "performance_weighting")?;
    read_choice::<CovarianceAlignment>(config, "portfolio", "covariance")?;
    Ok(())
}

fn validate_sentiment(config: &dyn ConfigPort) -> Result<(), StockLensError> {
    let lookback = read_positive(config, "sentiment", "lookback_days", DEFAULT_LOOKBACK_DAYS)?;
    if lookback > MAX_LOOKBACK_DAYS {
        return Err(invalid(
            "sentiment",
            "lookback_days",
            format!("lookback_days must be at most {}", MAX_LOOKBACK_DAYS),
        ));
    }
    read_positive(config, "sentiment", "limit", DEFAULT_LIMIT)?;

    let language = config
        .get_nonempty("sentiment", "language")
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    if !is_language_code(&language) {
        return Err(invalid(
            "sentiment",
            "language",
            "language must be a two-letter code",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const DATA: &str = "[data]\nprices_dir = prices\n";

    fn with_data(rest: &str) -> FileConfigAdapter {
        make_config(&format!("{}{}", DATA, rest))
    }

    #[test]
    fn full_config_passes() {
        let config = make_config(
            r#"
[data]
prices_dir = /data/prices
news_file = /data/news.csv

[indicators]
sma_window = 50
rsi_window = 14
macd_fast = 12
macd_slow = 26
macd_signal = 9

[portfolio]
holdings = AAPL:100, GOOGL:50
start_date = 2023-01-01
end_date = 2023-12-31
benchmark = SPY
performance_weighting = equal
covariance = inner

[sentiment]
lookback_days = 7
language = en
limit = 10
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn minimal_config_uses_defaults() {
        assert!(validate_config(&make_config(DATA)).is_ok());
    }

    #[test]
    fn missing_prices_dir_fails() {
        let err = validate_config(&make_config("[indicators]\nsma_window = 5\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigMissing { key, .. } if key == "prices_dir"));
    }

    #[test]
    fn zero_window_fails() {
        let err = validate_config(&with_data("[indicators]\nrsi_window = 0\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "rsi_window"));
    }

    #[test]
    fn non_numeric_window_fails() {
        let err = validate_config(&with_data("[indicators]\nsma_window = twenty\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "sma_window"));
    }

    #[test]
    fn macd_fast_must_be_below_slow() {
        let err = validate_config(&with_data("[indicators]\nmacd_fast = 26\nmacd_slow = 12\n"))
            .unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "macd_fast"));
    }

    #[test]
    fn invalid_start_date_format_fails() {
        let err = validate_config(&with_data("[portfolio]\nstart_date = 2023/01/01\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn start_date_after_end_date_fails() {
        let err = validate_config(&with_data(
            "[portfolio]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n",
        ))
        .unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn malformed_holdings_fail() {
        let err = validate_config(&with_data("[portfolio]\nholdings = AAPL, MSFT:2\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "holdings"));
    }

    #[test]
    fn unknown_weighting_fails() {
        let err = validate_config(&with_data("[portfolio]\nperformance_weighting = market\n"))
            .unwrap_err();
        assert!(
            matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "performance_weighting")
        );
    }

    #[test]
    fn unknown_covariance_fails() {
        let err = validate_config(&with_data("[portfolio]\ncovariance = outer\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "covariance"));
    }

    #[test]
    fn zero_limit_fails() {
        let err = validate_config(&with_data("[sentiment]\nlimit = 0\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "limit"));
    }

    #[test]
    fn bad_language_fails() {
        let err = validate_config(&with_data("[sentiment]\nlanguage = english\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "language"));
    }

    #[test]
    fn path_like_benchmark_fails() {
        let err = validate_config(&with_data("[portfolio]\nbenchmark = ../spy\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "benchmark"));
    }

    #[test]
    fn oversized_lookback_fails() {
        let err =
            validate_config(&with_data("[sentiment]\nlookback_days = 1000000000\n")).unwrap_err();
        assert!(matches!(err, StockLensError::ConfigInvalid { key, .. } if key == "lookback_days"));

        let config = with_data("[sentiment]\nlookback_days = 36500\n");
        assert!(validate_config(&config).is_ok());
    }
}
