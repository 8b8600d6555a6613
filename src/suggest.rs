//! # Company suggestions
//! Pure mapping from a cycle's scored articles to a Buy/Hold/Sell suggestion
//! per tracked company. No I/O, no state between calls.
//!
//! Policy: mean sentiment of the articles naming the company (display name or
//! ticker, whole word). Strictly above +1 is BUY, strictly below -1 is SELL,
//! anything else is HOLD. A company nobody wrote about is HOLD with an empty
//! article list, which is how callers tell "no data" from "neutral news".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::article::Article;
use crate::matcher::KeywordSet;
use crate::sentiment::{mean_score, ScoredArticle, NEGATIVE_BELOW, POSITIVE_ABOVE};

/// Action for a tracked company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Hold,
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "Buy"),
            Action::Hold => write!(f, "Hold"),
            Action::Sell => write!(f, "Sell"),
        }
    }
}

/// Static company configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDefinition {
    pub display_name: String,
    pub ticker: String,
}

impl CompanyDefinition {
    pub fn new(display_name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ticker: ticker.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySuggestion {
    pub company: String,
    pub ticker: String,
    pub action: Action,
    pub rationale: String,
    /// `None` when no article mentioned the company this cycle.
    pub mean_sentiment: Option<f64>,
    pub related_articles: Vec<Article>,
}

impl CompanySuggestion {
    /// True when the suggestion rests on at least one article.
    pub fn has_data(&self) -> bool {
        !self.related_articles.is_empty()
    }
}

/// Maps a mean score onto an action using the shared strict thresholds.
pub fn action_for(mean: f64) -> Action {
    if mean > f64::from(POSITIVE_ABOVE) {
        Action::Buy
    } else if mean < f64::from(NEGATIVE_BELOW) {
        Action::Sell
    } else {
        Action::Hold
    }
}

/// One suggestion per company, in configuration order.
pub fn suggest(articles: &[ScoredArticle], companies: &[CompanyDefinition]) -> Vec<CompanySuggestion> {
    companies
        .iter()
        .map(|c| suggestion_for(articles, c))
        .collect()
}

fn suggestion_for(articles: &[ScoredArticle], company: &CompanyDefinition) -> CompanySuggestion {
    let set = KeywordSet::new(
        company.display_name.as_str(),
        &[company.display_name.as_str(), company.ticker.as_str()],
    );
    let matched: Vec<&ScoredArticle> = articles
        .iter()
        .filter(|a| set.is_match(&a.article.headline) || set.is_match(&a.article.summary))
        .collect();

    if matched.is_empty() {
        return CompanySuggestion {
            company: company.display_name.clone(),
            ticker: company.ticker.clone(),
            action: Action::Hold,
            rationale: format!("No recent news found for {}.", company.display_name),
            mean_sentiment: None,
            related_articles: Vec::new(),
        };
    }

    let (mean, n) = mean_score(matched.iter().copied());
    let action = action_for(mean);
    let noun = if n == 1 { "article" } else { "articles" };

    CompanySuggestion {
        company: company.display_name.clone(),
        ticker: company.ticker.clone(),
        action,
        rationale: format!("{action} based on {n} recent {noun} with average sentiment {mean:.2}."),
        mean_sentiment: Some(mean),
        related_articles: matched.iter().map(|a| a.article.clone()).collect(),
    }
}
