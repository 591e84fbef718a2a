//! Polarity model port trait.

pub trait SentimentModel {
    /// Compound polarity in [-1, 1]; higher is more positive. Must be a pure
    /// function of `text` for a given model version.
    fn score_document(&self, text: &str) -> f64;

    fn version(&self) -> &str;
}
