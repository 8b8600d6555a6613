//! Overall market mood: a bucket count over every processed article,
//! independent of the per-sector and per-company means.

use serde::{Deserialize, Serialize};

use crate::sentiment::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMood {
    pub mood: Classification,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl Default for MarketMood {
    fn default() -> Self {
        Self {
            mood: Classification::Neutral,
            positive: 0,
            neutral: 0,
            negative: 0,
        }
    }
}

/// Positive wins on more Positive than Negative items, Negative on the reverse,
/// otherwise Neutral. Neutral items are counted but never decide.
pub fn summarize<I>(classifications: I) -> MarketMood
where
    I: IntoIterator<Item = Classification>,
{
    let mut m = MarketMood::default();
    for c in classifications {
        match c {
            Classification::Positive => m.positive += 1,
            Classification::Neutral => m.neutral += 1,
            Classification::Negative => m.negative += 1,
        }
    }
    m.mood = match m.positive.cmp(&m.negative) {
        std::cmp::Ordering::Greater => Classification::Positive,
        std::cmp::Ordering::Less => Classification::Negative,
        std::cmp::Ordering::Equal => Classification::Neutral,
    };
    m
}
