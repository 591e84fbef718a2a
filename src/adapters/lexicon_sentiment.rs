//! Lexicon-based polarity model.
//!
//! Each token found in the lexicon contributes its valence. Booster words in
//! the three tokens before it scale the valence, a negation in the same window
//! flips and damps it, and "but" shifts weight to the clause after it. The
//! summed valence plus exclamation emphasis is mapped into (-1, 1) with
//! x / sqrt(x² + 15).

use crate::ports::sentiment_port::SentimentModel;
use std::collections::{HashMap, HashSet};

pub const LEXICON_VERSION: &str = "stocklens-lexicon-1";

const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_SCALAR: f64 = -0.74;
const LOOKBACK_WINDOW: usize = 3;
const BOOSTER_INCREMENT: f64 = 0.293;
const BOOSTER_DISTANCE_DECAY: [f64; LOOKBACK_WINDOW] = [1.0, 0.95, 0.9];
const BEFORE_BUT_WEIGHT: f64 = 0.5;
const AFTER_BUT_WEIGHT: f64 = 1.5;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "none", "nothing", "nobody", "neither", "nor", "without",
    "cannot", "can't", "don't", "doesn't", "didn't", "isn't", "aren't", "wasn't",
    "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hasn't", "haven't",
    "hardly", "barely",
];

const BOOSTER_WORDS: &[(&str, f64)] = &[
    ("very", 1.0),
    ("extremely", 1.0),
    ("highly", 1.0),
    ("hugely", 1.0),
    ("really", 1.0),
    ("significantly", 1.0),
    ("substantially", 1.0),
    ("sharply", 1.0),
    ("strongly", 1.0),
    ("most", 1.0),
    ("slightly", -1.0),
    ("somewhat", -1.0),
    ("marginally", -1.0),
    ("modestly", -1.0),
    ("partly", -1.0),
];

const BASE_LEXICON: &[(&str, f64)] = &[
    // general
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("positive", 2.3),
    ("strong", 2.3),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("optimistic", 2.0),
    ("confident", 2.2),
    ("improve", 1.9),
    ("improved", 2.1),
    ("improvement", 2.0),
    ("best", 3.2),
    ("happy", 2.7),
    ("bad", -2.5),
    ("poor", -2.1),
    ("terrible", -2.5),
    ("negative", -2.7),
    ("weak", -1.9),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("worst", -3.1),
    ("fear", -2.2),
    ("worry", -1.9),
    ("worried", -1.8),
    ("concern", -1.3),
    ("concerns", -1.3),
    ("trouble", -1.7),
    ("uncertain", -1.2),
    ("uncertainty", -1.4),
    ("disappoint", -2.0),
    ("disappointing", -2.2),
    ("pessimistic", -1.5),
    // market
    ("bullish", 2.0),
    ("rally", 1.8),
    ("rallies", 1.8),
    ("surge", 1.9),
    ("surges", 1.9),
    ("soar", 2.2),
    ("soars", 2.2),
    ("gain", 2.0),
    ("gains", 1.8),
    ("growth", 1.6),
    ("profit", 1.9),
    ("profits", 1.9),
    ("profitable", 1.9),
    ("beat", 1.5),
    ("beats", 1.5),
    ("upgrade", 1.8),
    ("upgraded", 1.8),
    ("outperform", 1.9),
    ("record", 1.0),
    ("rebound", 1.5),
    ("recovery", 1.6),
    ("dividend", 0.8),
    ("buyback", 1.0),
    ("upside", 1.4),
    ("momentum", 0.8),
    ("breakthrough", 2.1),
    ("robust", 1.7),
    ("bearish", -2.0),
    ("decline", -1.6),
    ("declines", -1.6),
    ("fall", -1.3),
    ("falls", -1.3),
    ("drop", -1.3),
    ("drops", -1.3),
    ("plunge", -2.2),
    ("plunges", -2.2),
    ("slump", -1.9),
    ("crash", -2.7),
    ("loss", -1.8),
    ("losses", -1.8),
    ("miss", -1.4),
    ("misses", -1.4),
    ("downgrade", -1.8),
    ("downgraded", -1.8),
    ("underperform", -1.9),
    ("lawsuit", -1.7),
    ("investigation", -1.5),
    ("probe", -1.3),
    ("recall", -1.5),
    ("default", -2.0),
    ("bankruptcy", -2.8),
    ("layoffs", -1.9),
    ("downside", -1.3),
    ("overvalued", -1.2),
    ("bubble", -1.4),
    ("volatile", -0.8),
    ("headwind", -1.2),
    ("headwinds", -1.2),
];

#[derive(Debug, Clone)]
pub struct LexiconSentimentModel {
    lexicon: HashMap<String, f64>,
    negations: HashSet<&'static str>,
    boosters: HashMap<&'static str, f64>,
    version: String,
}

impl LexiconSentimentModel {
    pub fn new() -> Self {
        Self {
            lexicon: BASE_LEXICON
                .iter()
                .map(|&(w, v)| (w.to_string(), v))
                .collect(),
            negations: NEGATION_WORDS.iter().copied().collect(),
            boosters: BOOSTER_WORDS.iter().copied().collect(),
            version: LEXICON_VERSION.to_string(),
        }
    }

    /// Adds or overrides one lexicon entry. The version gains a `+custom` suffix.
    pub fn with_term(mut self, word: &str, valence: f64) -> Self {
        self.lexicon.insert(word.to_lowercase(), valence);
        if !self.version.ends_with("+custom") {
            self.version.push_str("+custom");
        }
        self
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|t| {
                t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .trim_matches('\'')
                    .to_lowercase()
            })
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn valence_at(&self, tokens: &[String], i: usize, base: f64) -> f64 {
        let mut valence = base;
        let mut negated = false;

        for distance in 1..=LOOKBACK_WINDOW.min(i) {
            let prior = tokens[i - distance].as_str();
            if let Some(direction) = self.boosters.get(prior) {
                valence += base.signum()
                    * direction
                    * BOOSTER_INCREMENT
                    * BOOSTER_DISTANCE_DECAY[distance - 1];
            }
            if self.negations.contains(prior) {
                negated = true;
            }
        }

        if negated {
            valence *= NEGATION_SCALAR;
        }
        valence
    }

    fn raw_score(&self, text: &str) -> f64 {
        let tokens = Self::tokenize(text);
        let mut valences: Vec<f64> = tokens
            .iter()
            .enumerate()
            .map(|(i, tok)| match self.lexicon.get(tok) {
                Some(&base) => self.valence_at(&tokens, i, base),
                None => 0.0,
            })
            .collect();

        if let Some(but) = tokens.iter().position(|t| t == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < but {
                    *v *= BEFORE_BUT_WEIGHT;
                } else if i > but {
                    *v *= AFTER_BUT_WEIGHT;
                }
            }
        }

        let sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return 0.0;
        }

        let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
        sum + sum.signum() * exclamations as f64 * EXCLAMATION_INCREMENT
    }
}

impl Default for LexiconSentimentModel {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

impl SentimentModel for LexiconSentimentModel {
    fn score_document(&self, text: &str) -> f64 {
        normalize(self.raw_score(text))
    }

    fn version(&self) -> &str {
        &self.version
    }
}
