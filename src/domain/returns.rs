//! Return series, compounding, and timeline alignment across assets.

use crate::domain::error::StockLensError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Fractional returns for one symbol, ordered by date.
#[derive(Debug, Clone)]
pub struct ReturnSeries {
    symbol: String,
    points: Vec<ReturnPoint>,
    date_index: HashMap<NaiveDate, usize>,
}

impl ReturnSeries {
    /// `points` must already be in strictly increasing date order.
    pub fn new(symbol: impl Into<String>, points: Vec<ReturnPoint>) -> Self {
        let date_index = points
            .iter()
            .enumerate()
            .map(|(i, p)| (p.date, i))
            .collect();
        Self {
            symbol: symbol.into(),
            points,
            date_index,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.date_index.get(&date).map(|&i| self.points[i].value)
    }

    pub fn last(&self) -> Option<&ReturnPoint> {
        self.points.last()
    }
}

/// r[t] = p[t] / p[t-1] - 1 between consecutive observations.
pub fn series_returns(series: &PriceSeries) -> Result<ReturnSeries, StockLensError> {
    let bars = series.bars();
    let mut points = Vec::with_capacity(bars.len().saturating_sub(1));

    for w in bars.windows(2) {
        let prev = w[0].close;
        if !(prev > 0.0 && prev.is_finite()) {
            return Err(StockLensError::InvalidPrice {
                symbol: series.symbol().to_string(),
                date: w[0].date,
            });
        }
        points.push(ReturnPoint {
            date: w[1].date,
            value: w[1].close / prev - 1.0,
        });
    }

    Ok(ReturnSeries::new(series.symbol(), points))
}

/// Per-asset returns. Each asset keeps its own dates; nothing is zero-filled.
pub fn compute_returns(prices: &[PriceSeries]) -> Result<Vec<ReturnSeries>, StockLensError> {
    prices.iter().map(series_returns).collect()
}

/// Running prod(1 + r) - 1. The first value equals the first return.
pub fn cumulative_return(returns: &ReturnSeries) -> ReturnSeries {
    let mut growth = 1.0;
    let points = returns
        .points()
        .iter()
        .map(|p| {
            growth *= 1.0 + p.value;
            ReturnPoint {
                date: p.date,
                value: growth - 1.0,
            }
        })
        .collect();
    ReturnSeries::new(returns.symbol(), points)
}

/// Prices implied by a starting price and a cumulative return series.
pub fn reconstruct_prices(initial_price: f64, cumulative: &ReturnSeries) -> Vec<f64> {
    std::iter::once(initial_price)
        .chain(cumulative.points().iter().map(|p| initial_price * (1.0 + p.value)))
        .collect()
}

/// Every date seen in any series, sorted.
pub fn build_unified_timeline(series: &[ReturnSeries]) -> Vec<NaiveDate> {
    let unique_dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points().iter().map(|p| p.date))
        .collect();
    unique_dates.into_iter().collect()
}

/// Dates present in every series, sorted.
pub fn build_common_timeline(series: &[ReturnSeries]) -> Vec<NaiveDate> {
    let Some((first, rest)) = series.split_first() else {
        return Vec::new();
    };
    first
        .points()
        .iter()
        .map(|p| p.date)
        .filter(|d| rest.iter().all(|s| s.value_on(*d).is_some()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PriceBar;
    use approx::assert_relative_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn make_series(symbol: &str, closes: &[(u32, f64)]) -> PriceSeries {
        let bars = closes
            .iter()
            .map(|&(d, c)| PriceBar::from_close(date(d), c))
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    #[test]
    fn returns_length_is_one_less_than_prices() {
        let series = make_series("BHP", &[(1, 100.0), (2, 110.0), (3, 99.0)]);
        let returns = series_returns(&series).unwrap();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns.points()[0].date, date(2));
        assert_relative_eq!(returns.points()[0].value, 0.1);
        assert_relative_eq!(returns.points()[1].value, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn returns_of_single_price_is_empty() {
        let series = make_series("BHP", &[(1, 100.0)]);
        assert!(series_returns(&series).unwrap().is_empty());
    }

    #[test]
    fn returns_span_missing_days() {
        let series = make_series("BHP", &[(1, 100.0), (5, 120.0)]);
        let returns = series_returns(&series).unwrap();

        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns.value_on(date(5)).unwrap(), 0.2, epsilon = 1e-12);
        assert!(returns.value_on(date(2)).is_none());
    }

    #[test]
    fn returns_reject_non_positive_price() {
        let series = make_series("BHP", &[(1, 0.0), (2, 10.0)]);
        assert!(matches!(
            series_returns(&series),
            Err(StockLensError::InvalidPrice { ref symbol, .. }) if symbol == "BHP"
        ));
    }

    #[test]
    fn compute_returns_keeps_asset_order() {
        let a = make_series("AAA", &[(1, 10.0), (2, 11.0)]);
        let b = make_series("BBB", &[(1, 20.0), (2, 19.0)]);
        let returns = compute_returns(&[a, b]).unwrap();

        assert_eq!(returns[0].symbol(), "AAA");
        assert_eq!(returns[1].symbol(), "BBB");
    }

    #[test]
    fn cumulative_return_compounds() {
        let returns = ReturnSeries::new(
            "BHP",
            vec![
                ReturnPoint { date: date(2), value: 0.1 },
                ReturnPoint { date: date(3), value: -0.5 },
                ReturnPoint { date: date(4), value: 1.0 },
            ],
        );
        let cumul = cumulative_return(&returns);

        assert_relative_eq!(cumul.points()[0].value, 0.1);
        assert_relative_eq!(cumul.points()[1].value, 1.1 * 0.5 - 1.0);
        assert_relative_eq!(cumul.points()[2].value, 1.1 * 0.5 * 2.0 - 1.0);
    }

    #[test]
    fn prices_round_trip_through_cumulative_returns() {
        let closes = [(1, 50.0), (2, 52.5), (3, 49.0), (4, 60.25), (8, 61.0)];
        let series = make_series("BHP", &closes);
        let cumul = cumulative_return(&series_returns(&series).unwrap());
        let rebuilt = reconstruct_prices(50.0, &cumul);

        assert_eq!(rebuilt.len(), closes.len());
        for (r, (_, c)) in rebuilt.iter().zip(closes.iter()) {
            assert_relative_eq!(*r, *c, epsilon = 1e-9);
        }
    }

    #[test]
    fn unified_timeline_merges_and_sorts() {
        let a = series_returns(&make_series("AAA", &[(1, 1.0), (2, 1.0), (5, 1.0)])).unwrap();
        let b = series_returns(&make_series("BBB", &[(1, 1.0), (3, 1.0)])).unwrap();

        let timeline = build_unified_timeline(&[a, b]);
        assert_eq!(timeline, vec![date(2), date(3), date(5)]);
    }

    #[test]
    fn common_timeline_is_intersection() {
        let a = series_returns(&make_series("AAA", &[(1, 1.0), (2, 1.0), (3, 1.0), (4, 1.0)])).unwrap();
        let b = series_returns(&make_series("BBB", &[(1, 1.0), (3, 1.0), (4, 1.0)])).unwrap();

        let timeline = build_common_timeline(&[a, b]);
        assert_eq!(timeline, vec![date(3), date(4)]);
    }

    #[test]
    fn timelines_of_nothing_are_empty() {
        assert!(build_unified_timeline(&[]).is_empty());
        assert!(build_common_timeline(&[]).is_empty());
    }
}
