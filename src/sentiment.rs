//! # Sentiment
//! Lexicon-based text polarity scoring and the three-way classification shared
//! by every consumer (per article, per sector, per company).
//!
//! The scorer sits behind the [`TextScorer`] capability so the aggregators never
//! depend on a concrete lexicon.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::article::Article;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Scores strictly above this are Positive.
pub const POSITIVE_ABOVE: i32 = 1;
/// Scores strictly below this are Negative.
pub const NEGATIVE_BELOW: i32 = -1;

/// Anything that can turn free text into a signed polarity score.
pub trait TextScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<i32>;

    fn name(&self) -> &'static str {
        "scorer"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Positive => write!(f, "Positive"),
            Classification::Neutral => write!(f, "Neutral"),
            Classification::Negative => write!(f, "Negative"),
        }
    }
}

/// Strict thresholds: `s > 1` Positive, `s < -1` Negative, `±1` stays Neutral.
pub fn classify(score: i32) -> Classification {
    if score > POSITIVE_ABOVE {
        Classification::Positive
    } else if score < NEGATIVE_BELOW {
        Classification::Negative
    } else {
        Classification::Neutral
    }
}

/// Same thresholds applied to an averaged score.
pub fn classify_mean(mean: f64) -> Classification {
    if mean > f64::from(POSITIVE_ABOVE) {
        Classification::Positive
    } else if mean < f64::from(NEGATIVE_BELOW) {
        Classification::Negative
    } else {
        Classification::Neutral
    }
}

/// Arithmetic mean of the scores; 0.0 for an empty slice.
pub fn mean_score<'a, I>(items: I) -> (f64, usize)
where
    I: IntoIterator<Item = &'a ScoredArticle>,
{
    let mut sum = 0i64;
    let mut n = 0usize;
    for it in items {
        sum += i64::from(it.score);
        n += 1;
    }
    if n == 0 {
        (0.0, 0)
    } else {
        (sum as f64 / n as f64, n)
    }
}

/// An article together with the scorer's verdict for this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: i32,
    pub classification: Classification,
}

impl ScoredArticle {
    pub fn new(article: Article, score: i32) -> Self {
        Self {
            article,
            score,
            classification: classify(score),
        }
    }
}

/// AFINN-style dictionary scorer with negation and intensifier handling.
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer {
    overrides: HashMap<String, i32>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra or replacement word polarities, consulted before the embedded lexicon.
    pub fn with_overrides(overrides: HashMap<String, i32>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        Self { overrides }
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        self.overrides
            .get(w)
            .or_else(|| LEXICON.get(w))
            .copied()
            .unwrap_or(0)
    }

    /// Returns `(score, token count)`.
    /// A negator within the previous 1..=3 tokens flips the sign of a scored word;
    /// an intensifier right before it doubles the magnitude.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;

        for (i, w) in tokens.iter().enumerate() {
            let base = self.word_score(w);
            if base == 0 {
                continue;
            }

            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            let intensified = i >= 1 && is_intensifier(tokens[i - 1].as_str());

            let mut adj = if negated { -base } else { base };
            if intensified {
                adj *= 2;
            }
            score += adj;
        }

        (score, tokens.len())
    }
}

impl TextScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<i32> {
        if text.trim().is_empty() {
            bail!("refusing to score empty text");
        }
        Ok(self.score_text(text).0)
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Lowercased word tokens; apostrophes stay inside words so "isn't" survives.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\u{2019}', "'").to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "none"
            | "nothing"
            | "neither"
            | "nor"
            | "without"
            | "hardly"
            | "cannot"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "won't"
            | "can't"
            | "don't"
            | "doesn't"
            | "didn't"
            | "shouldn't"
            | "wouldn't"
            | "couldn't"
    )
}

fn is_intensifier(tok: &str) -> bool {
    matches!(
        tok,
        "very"
            | "extremely"
            | "highly"
            | "sharply"
            | "strongly"
            | "significantly"
            | "deeply"
            | "hugely"
    )
}
