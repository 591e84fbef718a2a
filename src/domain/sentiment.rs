//! News sentiment scoring and summary statistics.

use crate::domain::error::StockLensError;
use crate::ports::sentiment_port::SentimentModel;
use chrono::NaiveDate;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct NewsArticle {
    pub published: NaiveDate,
    pub title: String,
    pub description: Option<String>,
}

impl NewsArticle {
    pub fn document(&self) -> String {
        article_document(&self.title, self.description.as_deref())
    }
}

/// Headline and description joined into one scoring document.
pub fn article_document(title: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(desc) => format!("{}. {}", title.trim(), desc),
        None => title.trim().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentRecord {
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentSummary {
    pub mean: f64,
    pub count: usize,
}

/// One record per document, in input order.
pub fn score_corpus<S: AsRef<str>>(model: &dyn SentimentModel, documents: &[S]) -> Vec<SentimentRecord> {
    documents
        .iter()
        .map(|d| SentimentRecord {
            text: d.as_ref().to_string(),
            score: model.score_document(d.as_ref()),
        })
        .collect()
}

/// Arithmetic mean of the scores. An empty corpus has no mean.
pub fn summarize(query: &str, corpus: &[SentimentRecord]) -> Result<SentimentSummary, StockLensError> {
    if corpus.is_empty() {
        return Err(StockLensError::EmptyCorpus {
            query: query.to_string(),
        });
    }
    let total: f64 = corpus.iter().map(|r| r.score).sum();
    Ok(SentimentSummary {
        mean: total / corpus.len() as f64,
        count: corpus.len(),
    })
}

/// Orders labelled summaries from most to least positive.
pub fn compare<'a>(summaries: &[(&'a str, SentimentSummary)]) -> Vec<(&'a str, SentimentSummary)> {
    let mut ranked = summaries.to_vec();
    ranked.sort_by(|a, b| b.1.mean.partial_cmp(&a.1.mean).unwrap_or(Ordering::Equal));
    ranked
}
