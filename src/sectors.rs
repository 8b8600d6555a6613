//! Sector impact: group the cycle's scored articles by sector keywords and
//! classify each sector by its mean sentiment.

use serde::{Deserialize, Serialize};

use crate::matcher::KeywordSet;
use crate::sentiment::{classify_mean, mean_score, Classification, ScoredArticle};

/// Summary shown for a sector without any matching article.
pub const NO_MAJOR_NEWS: &str = "No major news";

/// Static sector configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorDefinition {
    pub name: String,
    pub keywords: Vec<String>,
}

impl SectorDefinition {
    pub fn new<S: AsRef<str>>(name: impl Into<String>, keywords: &[S]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorImpact {
    pub sector: String,
    pub representative_summary: String,
    pub mean_sentiment: f64,
    pub classification: Classification,
    pub article_count: usize,
}

/// One impact per configured sector, most-discussed first.
/// Ties keep configuration order.
pub fn aggregate(articles: &[ScoredArticle], sectors: &[SectorDefinition]) -> Vec<SectorImpact> {
    let mut out: Vec<SectorImpact> = sectors
        .iter()
        .map(|def| {
            let set = KeywordSet::new(def.name.as_str(), &def.keywords);
            let matched: Vec<&ScoredArticle> = articles
                .iter()
                .filter(|a| set.is_match(&a.article.text()))
                .collect();
            impact_for(&def.name, &matched)
        })
        .collect();

    // stable: equal counts stay in configuration order
    out.sort_by(|a, b| b.article_count.cmp(&a.article_count));
    out
}

fn impact_for(sector: &str, matched: &[&ScoredArticle]) -> SectorImpact {
    let (mean, n) = mean_score(matched.iter().copied());
    if n == 0 {
        return SectorImpact {
            sector: sector.to_string(),
            representative_summary: NO_MAJOR_NEWS.to_string(),
            mean_sentiment: 0.0,
            classification: Classification::Neutral,
            article_count: 0,
        };
    }

    // strongest signal wins; first one on ties
    let representative = matched
        .iter()
        .fold(None::<&ScoredArticle>, |best, a| match best {
            Some(b) if b.score.abs() >= a.score.abs() => Some(b),
            _ => Some(a),
        })
        .map(|a| a.article.summary.clone())
        .unwrap_or_else(|| NO_MAJOR_NEWS.to_string());

    SectorImpact {
        sector: sector.to_string(),
        representative_summary: representative,
        mean_sentiment: mean,
        classification: classify_mean(mean),
        article_count: n,
    }
}
