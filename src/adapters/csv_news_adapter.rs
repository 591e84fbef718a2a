//! CSV news adapter.
//!
//! Reads a single file with the header `published,language,title,description`
//! and answers queries by case-insensitive substring match on the title or
//! description.

use crate::domain::error::StockLensError;
use crate::domain::sentiment::NewsArticle;
use crate::ports::news_port::NewsSource;
use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Reverse;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct NewsRow {
    published: String,
    language: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
}

pub struct CsvNewsAdapter {
    path: PathBuf,
}

impl CsvNewsAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn source_error(query: &str, reason: String) -> StockLensError {
        StockLensError::Source {
            symbol: query.to_string(),
            reason,
        }
    }

    fn read_rows(&self, query: &str) -> Result<Vec<NewsArticleRow>, StockLensError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            Self::source_error(query, format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for (line, result) in rdr.deserialize::<NewsRow>().enumerate() {
            let row = result
                .map_err(|e| Self::source_error(query, format!("CSV parse error: {}", e)))?;
            let published = NaiveDate::parse_from_str(row.published.trim(), "%Y-%m-%d")
                .map_err(|e| {
                    Self::source_error(
                        query,
                        format!("invalid published date on row {}: {}", line + 1, e),
                    )
                })?;
            rows.push(NewsArticleRow {
                language: row.language.trim().to_lowercase(),
                article: NewsArticle {
                    published,
                    title: row.title,
                    description: row.description.filter(|d| !d.trim().is_empty()),
                },
            });
        }
        Ok(rows)
    }
}

struct NewsArticleRow {
    language: String,
    article: NewsArticle,
}

fn matches_query(article: &NewsArticle, needle: &str) -> bool {
    article.title.to_lowercase().contains(needle)
        || article
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

impl NewsSource for CsvNewsAdapter {
    fn fetch_news(
        &self,
        query: &str,
        since: NaiveDate,
        language: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, StockLensError> {
        let needle = query.trim().to_lowercase();
        let language = language.trim().to_lowercase();

        let mut articles: Vec<NewsArticle> = self
            .read_rows(query)?
            .into_iter()
            .filter(|r| r.language == language)
            .map(|r| r.article)
            .filter(|a| a.published >= since && matches_query(a, &needle))
            .collect();

        // Newest first; ties keep file order.
        articles.sort_by_key(|a| Reverse(a.published));
        articles.truncate(limit);

        debug!(query, found = articles.len(), "news query");
        Ok(articles)
    }
}
