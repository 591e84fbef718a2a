//! Typed views over the INI configuration, one per section.

use crate::domain::config_validation::{read_choice, read_date, read_positive};
use crate::domain::error::StockLensError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_RSI_WINDOW;
use crate::domain::indicator::sma::DEFAULT_SMA_WINDOW;
use crate::domain::portfolio::{CovarianceAlignment, PerformanceWeighting};
use crate::domain::universe::{parse_holdings, parse_symbol};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_LOOKBACK_DAYS: usize = 7;
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_LIMIT: usize = 10;
/// Upper bound on `[sentiment] lookback_days`, roughly a century.
pub const MAX_LOOKBACK_DAYS: usize = 36_500;

/// Two ASCII letters, e.g. `en`.
pub fn is_language_code(language: &str) -> bool {
    language.len() == 2 && language.chars().all(|c| c.is_ascii_alphabetic())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub prices_dir: PathBuf,
    pub news_file: Option<PathBuf>,
}

impl DataSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockLensError> {
        let prices_dir = config
            .get_nonempty("data", "prices_dir")
            .ok_or_else(|| StockLensError::ConfigMissing {
                section: "data".into(),
                key: "prices_dir".into(),
            })?;
        Ok(Self {
            prices_dir: PathBuf::from(prices_dir),
            news_file: config.get_nonempty("data", "news_file").map(PathBuf::from),
        })
    }

    pub fn require_news_file(&self) -> Result<&PathBuf, StockLensError> {
        self.news_file
            .as_ref()
            .ok_or_else(|| StockLensError::ConfigMissing {
                section: "data".into(),
                key: "news_file".into(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSettings {
    pub sma_window: usize,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_window: DEFAULT_SMA_WINDOW,
            rsi_window: DEFAULT_RSI_WINDOW,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
        }
    }
}

impl IndicatorSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockLensError> {
        let d = Self::default();
        Ok(Self {
            sma_window: read_positive(config, "indicators", "sma_window", d.sma_window)?,
            rsi_window: read_positive(config, "indicators", "rsi_window", d.rsi_window)?,
            macd_fast: read_positive(config, "indicators", "macd_fast", d.macd_fast)?,
            macd_slow: read_positive(config, "indicators", "macd_slow", d.macd_slow)?,
            macd_signal: read_positive(config, "indicators", "macd_signal", d.macd_signal)?,
        })
    }

    pub fn sma(&self) -> IndicatorType {
        IndicatorType::Sma(self.sma_window)
    }

    pub fn rsi(&self) -> IndicatorType {
        IndicatorType::Rsi(self.rsi_window)
    }

    pub fn macd(&self) -> IndicatorType {
        IndicatorType::Macd {
            fast: self.macd_fast,
            slow: self.macd_slow,
            signal: self.macd_signal,
        }
    }

    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        vec![self.sma(), self.rsi(), self.macd()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioSettings {
    pub holdings: Vec<(String, f64)>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub benchmark: Option<String>,
    pub weighting: PerformanceWeighting,
    pub covariance: CovarianceAlignment,
}

impl PortfolioSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockLensError> {
        let holdings = match config.get_nonempty("portfolio", "holdings") {
            Some(raw) => parse_holdings(&raw)?,
            None => Vec::new(),
        };
        Ok(Self {
            holdings,
            start_date: read_date(config, "portfolio", "start_date")?,
            end_date: read_date(config, "portfolio", "end_date")?,
            benchmark: config
                .get_nonempty("portfolio", "benchmark")
                .map(|b| parse_symbol(&b))
                .transpose()?,
            weighting: read_choice(config, "portfolio", "performance_weighting")?,
            covariance: read_choice(config, "portfolio", "covariance")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentimentSettings {
    pub lookback_days: usize,
    pub language: String,
    pub limit: usize,
}

impl Default for SentimentSettings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            language: DEFAULT_LANGUAGE.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SentimentSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockLensError> {
        Ok(Self {
            lookback_days: read_positive(
                config,
                "sentiment",
                "lookback_days",
                DEFAULT_LOOKBACK_DAYS,
            )?,
            language: config
                .get_nonempty("sentiment", "language")
                .map(|l| l.to_lowercase())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            limit: read_positive(config, "sentiment", "limit", DEFAULT_LIMIT)?,
        })
    }

    /// Applies `--language` / `--limit` flags under the same rules as the
    /// config keys.
    pub fn apply_overrides(
        &mut self,
        language: Option<String>,
        limit: Option<usize>,
    ) -> Result<(), StockLensError> {
        if let Some(language) = language {
            if !is_language_code(&language) {
                return Err(StockLensError::InvalidParameter {
                    name: "language".into(),
                    reason: format!("'{}' is not a two-letter language code", language),
                });
            }
            self.language = language.to_lowercase();
        }
        if let Some(limit) = limit {
            if limit == 0 {
                return Err(StockLensError::InvalidParameter {
                    name: "limit".into(),
                    reason: "limit must be at least 1".into(),
                });
            }
            self.limit = limit;
        }
        Ok(())
    }

    /// First day of the lookback window ending on `today`.
    pub fn since(&self, today: NaiveDate) -> Result<NaiveDate, StockLensError> {
        i64::try_from(self.lookback_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .and_then(|lookback| today.checked_sub_signed(lookback))
            .ok_or_else(|| StockLensError::ConfigInvalid {
                section: "sentiment".into(),
                key: "lookback_days".into(),
                reason: format!("{} days reaches before the earliest date", self.lookback_days),
            })
    }
}
