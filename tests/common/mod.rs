#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stocklens::domain::error::StockLensError;
pub use stocklens::domain::price::{PriceBar, PriceSeries};
use stocklens::domain::sentiment::NewsArticle;
use stocklens::ports::news_port::NewsSource;
use stocklens::ports::price_port::PriceSource;

pub struct MockPriceSource {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_closes(self, symbol: &str, start: &str, closes: &[f64]) -> Self {
        self.with_bars(symbol, make_bars(start, closes))
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn bars(&self, symbol: &str) -> Result<&Vec<PriceBar>, StockLensError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockLensError::Source {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        self.data.get(symbol).ok_or_else(|| StockLensError::NotFound {
            symbol: symbol.to_string(),
        })
    }
}

impl PriceSource for MockPriceSource {
    fn fetch_prices(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, StockLensError> {
        let bars = self
            .bars(symbol)?
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        PriceSeries::new(symbol, bars)
    }

    fn latest_bar(&self, symbol: &str, as_of: NaiveDate) -> Result<PriceBar, StockLensError> {
        self.bars(symbol)?
            .iter()
            .filter(|b| b.date <= as_of)
            .max_by_key(|b| b.date)
            .cloned()
            .ok_or_else(|| StockLensError::NotFound {
                symbol: symbol.to_string(),
            })
    }
}

pub struct MockNewsSource {
    pub articles: HashMap<String, Vec<NewsArticle>>,
    pub errors: HashMap<String, String>,
}

impl MockNewsSource {
    pub fn new() -> Self {
        Self {
            articles: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_headlines(mut self, query: &str, date: &str, headlines: &[&str]) -> Self {
        let published = parse_date(date);
        self.articles.insert(
            query.to_string(),
            headlines
                .iter()
                .map(|h| NewsArticle {
                    published,
                    title: h.to_string(),
                    description: None,
                })
                .collect(),
        );
        self
    }

    pub fn with_error(mut self, query: &str, reason: &str) -> Self {
        self.errors.insert(query.to_string(), reason.to_string());
        self
    }
}

impl NewsSource for MockNewsSource {
    fn fetch_news(
        &self,
        query: &str,
        since: NaiveDate,
        _language: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, StockLensError> {
        if let Some(reason) = self.errors.get(query) {
            return Err(StockLensError::Source {
                symbol: query.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .articles
            .get(query)
            .map(|a| {
                a.iter()
                    .filter(|a| a.published >= since)
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn parse_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

/// Consecutive daily bars starting at `start`.
pub fn make_bars(start: &str, closes: &[f64]) -> Vec<PriceBar> {
    let first = parse_date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(first + chrono::Duration::days(i as i64), c))
        .collect()
}

pub fn make_series(symbol: &str, start: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol, make_bars(start, closes)).unwrap()
}
