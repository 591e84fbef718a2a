//! News data port trait.

use crate::domain::error::StockLensError;
use crate::domain::sentiment::NewsArticle;
use chrono::NaiveDate;

pub trait NewsSource {
    /// Up to `limit` articles matching `query`, published on or after
    /// `since` in `language`, most relevant first.
    fn fetch_news(
        &self,
        query: &str,
        since: NaiveDate,
        language: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, StockLensError>;
}
