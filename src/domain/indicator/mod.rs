//! Technical indicator engine.
//!
//! The raw functions in the submodules take a slice of closes and return a
//! vector of the same length. This module adds the dated view used by callers:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::exponential_moving_average;
pub use macd::{macd, MacdOutput};
pub use rsi::relative_strength_index;
pub use sma::simple_moving_average;

use crate::domain::error::StockLensError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd { line: f64, signal: f64, histogram: f64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Pairs raw single-valued output with dates; NaN entries are marked invalid.
    fn from_simple(indicator_type: IndicatorType, dates: &[NaiveDate], raw: Vec<f64>) -> Self {
        let values = dates
            .iter()
            .zip(raw)
            .map(|(&date, v)| IndicatorPoint {
                date,
                valid: !v.is_nan(),
                value: IndicatorValue::Simple(v),
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    /// Value at `date` if present and valid.
    pub fn value_on(&self, date: NaiveDate) -> Option<&IndicatorValue> {
        self.values
            .iter()
            .find(|p| p.date == date && p.valid)
            .map(|p| &p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}

pub(crate) fn require_data(values: &[f64], what: &str) -> Result<(), StockLensError> {
    if values.is_empty() {
        return Err(StockLensError::InsufficientData {
            what: what.to_string(),
            have: 0,
            need: 1,
        });
    }
    Ok(())
}

pub(crate) fn require_window(name: &str, window: usize) -> Result<(), StockLensError> {
    if window == 0 {
        return Err(StockLensError::InvalidParameter {
            name: name.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Computes one indicator over a price series' closes.
pub fn compute_indicator(
    series: &PriceSeries,
    indicator_type: &IndicatorType,
) -> Result<IndicatorSeries, StockLensError> {
    let closes = series.closes();
    let dates = series.dates();

    let computed = match *indicator_type {
        IndicatorType::Sma(window) => IndicatorSeries::from_simple(
            indicator_type.clone(),
            &dates,
            simple_moving_average(&closes, window)?,
        ),
        IndicatorType::Ema(span) => IndicatorSeries::from_simple(
            indicator_type.clone(),
            &dates,
            exponential_moving_average(&closes, span)?,
        ),
        IndicatorType::Rsi(window) => IndicatorSeries::from_simple(
            indicator_type.clone(),
            &dates,
            relative_strength_index(&closes, window)?,
        ),
        IndicatorType::Macd { fast, slow, signal } => {
            let out = macd(&closes, fast, slow, signal)?;
            let values = dates
                .iter()
                .enumerate()
                .map(|(i, &date)| IndicatorPoint {
                    date,
                    valid: true,
                    value: IndicatorValue::Macd {
                        line: out.macd_line[i],
                        signal: out.signal_line[i],
                        histogram: out.histogram[i],
                    },
                })
                .collect();
            IndicatorSeries {
                indicator_type: indicator_type.clone(),
                values,
            }
        }
    };

    Ok(computed)
}

/// Computes every requested indicator; the first failure aborts.
pub fn compute_indicators(
    series: &PriceSeries,
    types: &[IndicatorType],
) -> Result<HashMap<IndicatorType, IndicatorSeries>, StockLensError> {
    let mut out = HashMap::with_capacity(types.len());
    for t in types {
        if out.contains_key(t) {
            continue;
        }
        let computed = compute_indicator(series, t)?;
        out.insert(t.clone(), computed);
    }
    Ok(out)
}
