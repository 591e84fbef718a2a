//! Portfolio weights, covariance, performance and risk.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use super::error::StockLensError;
use super::price::PriceSeries;
use super::returns::{
    build_common_timeline, build_unified_timeline, compute_returns, cumulative_return,
    ReturnPoint, ReturnSeries,
};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const PORTFOLIO_SYMBOL: &str = "PORTFOLIO";

/// Relative slack below zero tolerated in wᵀΣw before it is reported.
const PSD_TOLERANCE: f64 = 1e-12;

/// Normalized non-negative weights keyed by symbol, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioWeights {
    symbols: Vec<String>,
    weights: Vec<f64>,
}

impl PortfolioWeights {
    /// Normalizes raw amounts so the weights sum to 1.
    pub fn from_amounts(amounts: &[(String, f64)]) -> Result<Self, StockLensError> {
        if amounts.is_empty() {
            return Err(StockLensError::InvalidWeights {
                reason: "no assets".into(),
            });
        }
        if let Some((symbol, amount)) = amounts
            .iter()
            .find(|(_, a)| !a.is_finite() || *a < 0.0)
        {
            return Err(StockLensError::InvalidWeights {
                reason: format!("amount for {} must be a non-negative number, got {}", symbol, amount),
            });
        }
        for (i, (symbol, _)) in amounts.iter().enumerate() {
            if amounts[..i].iter().any(|(s, _)| s == symbol) {
                return Err(StockLensError::InvalidWeights {
                    reason: format!("duplicate symbol {}", symbol),
                });
            }
        }

        let total: f64 = amounts.iter().map(|(_, a)| a).sum();
        if total <= 0.0 {
            return Err(StockLensError::InvalidWeights {
                reason: "amounts sum to zero".into(),
            });
        }

        Ok(Self {
            symbols: amounts.iter().map(|(s, _)| s.clone()).collect(),
            weights: amounts.iter().map(|(_, a)| a / total).collect(),
        })
    }

    /// 1/n for each symbol.
    pub fn equal<S: AsRef<str>>(symbols: &[S]) -> Result<Self, StockLensError> {
        let amounts: Vec<(String, f64)> = symbols
            .iter()
            .map(|s| (s.as_ref().to_string(), 1.0))
            .collect();
        Self::from_amounts(&amounts)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.weights[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
    }

    /// Drops symbols not in `keep` and renormalizes the rest.
    pub fn restrict_to<S: AsRef<str>>(&self, keep: &[S]) -> Result<Self, StockLensError> {
        let amounts: Vec<(String, f64)> = self
            .iter()
            .filter(|(s, _)| keep.iter().any(|k| k.as_ref() == *s))
            .map(|(s, w)| (s.to_string(), w))
            .collect();
        Self::from_amounts(&amounts)
    }

    /// Weights in the order of `symbols`; the symbol sets must match exactly.
    fn aligned_to(&self, symbols: &[&str]) -> Result<Vec<f64>, StockLensError> {
        if symbols.len() != self.symbols.len() {
            return Err(StockLensError::InvalidWeights {
                reason: format!(
                    "{} weights for {} assets",
                    self.symbols.len(),
                    symbols.len()
                ),
            });
        }
        symbols
            .iter()
            .map(|s| {
                self.get(s).ok_or_else(|| StockLensError::InvalidWeights {
                    reason: format!("no weight for {}", s),
                })
            })
            .collect()
    }
}

/// How return observations are matched when building the covariance matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CovarianceAlignment {
    /// Each pair uses the dates both assets have.
    #[default]
    Pairwise,
    /// Only dates present for every asset.
    Inner,
}

impl FromStr for CovarianceAlignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pairwise" => Ok(Self::Pairwise),
            "inner" => Ok(Self::Inner),
            other => Err(format!("unknown covariance alignment '{}' (expected pairwise or inner)", other)),
        }
    }
}

/// Which weights drive the cumulative performance series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PerformanceWeighting {
    /// Same weights as the risk figure.
    #[default]
    Holdings,
    /// Plain mean across assets, ignoring amounts.
    Equal,
}

impl FromStr for PerformanceWeighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "holdings" => Ok(Self::Holdings),
            "equal" => Ok(Self::Equal),
            other => Err(format!("unknown performance weighting '{}' (expected holdings or equal)", other)),
        }
    }
}

impl fmt::Display for PerformanceWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Holdings => write!(f, "holdings"),
            Self::Equal => write!(f, "equal"),
        }
    }
}

/// Symmetric sample covariance matrix (ddof = 1) of asset returns.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceMatrix {
    symbols: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CovarianceMatrix {
    pub fn from_returns(
        returns: &[ReturnSeries],
        alignment: CovarianceAlignment,
    ) -> Result<Self, StockLensError> {
        if returns.is_empty() {
            return Err(StockLensError::InsufficientHistory { have: 0, need: 2 });
        }

        let common = match alignment {
            CovarianceAlignment::Inner => {
                let dates = build_common_timeline(returns);
                if dates.len() < 2 {
                    return Err(StockLensError::InsufficientHistory {
                        have: dates.len(),
                        need: 2,
                    });
                }
                Some(dates)
            }
            CovarianceAlignment::Pairwise => None,
        };

        let n = returns.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let (xs, ys) = aligned_pair(&returns[i], &returns[j], common.as_deref());
                let cov = if xs.len() >= 2 {
                    sample_covariance(&xs, &ys)
                } else if i == j {
                    return Err(StockLensError::InsufficientHistory {
                        have: xs.len(),
                        need: 2,
                    });
                } else {
                    // Pairwise only: the pair barely overlaps, so it adds no co-movement.
                    warn!(
                        a = returns[i].symbol(),
                        b = returns[j].symbol(),
                        overlap = xs.len(),
                        "too few shared return dates; treating covariance as 0"
                    );
                    0.0
                };
                values[i][j] = cov;
                values[j][i] = cov;
            }
        }

        Ok(Self {
            symbols: returns.iter().map(|r| r.symbol().to_string()).collect(),
            values,
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn variance(&self, symbol: &str) -> Option<f64> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.values[i][i])
    }

    /// wᵀ Σ w for weights ordered like `symbols()`.
    pub fn quadratic_form(&self, w: &[f64]) -> Result<f64, StockLensError> {
        if w.len() != self.symbols.len() {
            return Err(StockLensError::InvalidWeights {
                reason: format!(
                    "{} weights for a {}-asset covariance matrix",
                    w.len(),
                    self.symbols.len()
                ),
            });
        }
        let mut total = 0.0;
        for (i, row) in self.values.iter().enumerate() {
            for (j, cov) in row.iter().enumerate() {
                total += w[i] * cov * w[j];
            }
        }
        Ok(total)
    }
}

fn aligned_pair(
    a: &ReturnSeries,
    b: &ReturnSeries,
    dates: Option<&[NaiveDate]>,
) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    match dates {
        Some(dates) => {
            for d in dates {
                if let (Some(x), Some(y)) = (a.value_on(*d), b.value_on(*d)) {
                    xs.push(x);
                    ys.push(y);
                }
            }
        }
        None => {
            for p in a.points() {
                if let Some(y) = b.value_on(p.date) {
                    xs.push(p.value);
                    ys.push(y);
                }
            }
        }
    }
    (xs, ys)
}

fn sample_covariance(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>()
        / (n - 1.0)
}

/// Sample standard deviation (ddof = 1); None below two observations.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(sample_covariance(values, values).sqrt())
}

/// Equal-weighted mean of per-asset cumulative returns on the union timeline.
/// Assets without a value on a date are left out of that date's mean.
pub fn portfolio_cumulative_return(per_asset_cumulative: &[ReturnSeries]) -> ReturnSeries {
    let timeline = build_unified_timeline(per_asset_cumulative);
    let points = timeline
        .into_iter()
        .filter_map(|date| {
            let present: Vec<f64> = per_asset_cumulative
                .iter()
                .filter_map(|s| s.value_on(date))
                .collect();
            if present.is_empty() {
                return None;
            }
            Some(ReturnPoint {
                date,
                value: present.iter().sum::<f64>() / present.len() as f64,
            })
        })
        .collect();
    ReturnSeries::new(PORTFOLIO_SYMBOL, points)
}

/// Weighted mean of per-asset cumulative returns, renormalizing over the
/// assets present on each date. Dates where only zero-weight assets are
/// present are skipped.
pub fn weighted_portfolio_cumulative_return(
    per_asset_cumulative: &[ReturnSeries],
    weights: &PortfolioWeights,
) -> Result<ReturnSeries, StockLensError> {
    let symbols: Vec<&str> = per_asset_cumulative.iter().map(|s| s.symbol()).collect();
    let w = weights.aligned_to(&symbols)?;

    let timeline = build_unified_timeline(per_asset_cumulative);
    let points = timeline
        .into_iter()
        .filter_map(|date| {
            let mut weighted = 0.0;
            let mut weight_sum = 0.0;
            for (series, &wi) in per_asset_cumulative.iter().zip(&w) {
                if let Some(v) = series.value_on(date) {
                    weighted += wi * v;
                    weight_sum += wi;
                }
            }
            (weight_sum > 0.0).then(|| ReturnPoint {
                date,
                value: weighted / weight_sum,
            })
        })
        .collect();

    Ok(ReturnSeries::new(PORTFOLIO_SYMBOL, points))
}

/// Portfolio standard deviation sqrt(wᵀ Σ w) with pairwise covariance.
/// `None` weights means 1/n per asset.
pub fn portfolio_risk(
    returns: &[ReturnSeries],
    weights: Option<&PortfolioWeights>,
) -> Result<f64, StockLensError> {
    portfolio_risk_with(returns, weights, CovarianceAlignment::Pairwise)
}

/// Like [`portfolio_risk`] with an explicit covariance alignment.
///
/// A negative wᵀΣw (the matrix can be indefinite when pairs use different
/// dates) is clamped to zero; values beyond rounding noise are logged.
pub fn portfolio_risk_with(
    returns: &[ReturnSeries],
    weights: Option<&PortfolioWeights>,
    alignment: CovarianceAlignment,
) -> Result<f64, StockLensError> {
    let cov = CovarianceMatrix::from_returns(returns, alignment)?;
    let symbols: Vec<&str> = returns.iter().map(|r| r.symbol()).collect();

    let w = match weights {
        Some(weights) => weights.aligned_to(&symbols)?,
        None => vec![1.0 / symbols.len() as f64; symbols.len()],
    };

    let variance = cov.quadratic_form(&w)?;
    if variance >= 0.0 {
        return Ok(variance.sqrt());
    }

    let scale: f64 = w
        .iter()
        .enumerate()
        .map(|(i, wi)| wi * wi * cov.get(i, i))
        .sum();
    if variance < -PSD_TOLERANCE * scale {
        warn!(
            variance,
            "covariance matrix is not positive semi-definite; clamping portfolio variance to 0"
        );
    } else {
        debug!(variance, "clamping rounding-level negative variance to 0");
    }
    Ok(0.0)
}

/// Scales a daily standard deviation to a yearly one.
pub fn annualized_risk(daily_risk: f64) -> f64 {
    daily_risk * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Everything the portfolio view needs from one set of price series.
#[derive(Debug, Clone)]
pub struct PortfolioAnalysis {
    pub weights: PortfolioWeights,
    pub returns: Vec<ReturnSeries>,
    pub cumulative: Vec<ReturnSeries>,
    pub performance: ReturnSeries,
    pub daily_risk: f64,
    pub annualized_risk: f64,
}

pub fn analyze_portfolio(
    prices: &[PriceSeries],
    weights: &PortfolioWeights,
    weighting: PerformanceWeighting,
    alignment: CovarianceAlignment,
) -> Result<PortfolioAnalysis, StockLensError> {
    let returns = compute_returns(prices)?;
    let cumulative: Vec<ReturnSeries> = returns.iter().map(cumulative_return).collect();

    let performance = match weighting {
        PerformanceWeighting::Holdings => weighted_portfolio_cumulative_return(&cumulative, weights)?,
        PerformanceWeighting::Equal => portfolio_cumulative_return(&cumulative),
    };

    let daily_risk = portfolio_risk_with(&returns, Some(weights), alignment)?;

    Ok(PortfolioAnalysis {
        weights: weights.clone(),
        returns,
        cumulative,
        performance,
        daily_risk,
        annualized_risk: annualized_risk(daily_risk),
    })
}
