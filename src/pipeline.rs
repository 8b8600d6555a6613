//! One classification pass over a cycle's articles.
//!
//! validate → topic/region filter → score → sector impact, company suggestions,
//! market mood. Fully synchronous; everything it returns is derived from the
//! inputs of this call alone.

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};

use crate::article::{
    is_business_relevant, regional_filter, validate_batch, Article, DropReason, DropStats,
    RawArticle,
};
use crate::config::UniverseConfig;
use crate::mood::{summarize, MarketMood};
use crate::sectors::{aggregate, SectorImpact};
use crate::sentiment::{ScoredArticle, TextScorer};
use crate::suggest::{suggest, CompanySuggestion};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cycle: u64,
    pub generated_at: DateTime<Utc>,
    pub articles: Vec<ScoredArticle>,
    pub sectors: Vec<SectorImpact>,
    pub suggestions: Vec<CompanySuggestion>,
    pub mood: MarketMood,
    pub dropped: DropStats,
}

impl Snapshot {
    /// What an empty cycle looks like: all sectors Neutral, all companies Hold.
    pub fn empty(cycle: u64, universe: &UniverseConfig) -> Self {
        Self {
            cycle,
            generated_at: Utc::now(),
            articles: Vec::new(),
            sectors: aggregate(&[], &universe.sectors),
            suggestions: suggest(&[], &universe.companies),
            mood: MarketMood::default(),
            dropped: DropStats::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Drop articles that are not about business/finance.
    pub business_only: bool,
    /// With `business_only`, also require an image (dashboard cards need one).
    pub require_image: bool,
    /// Prefer regional articles when any exist.
    pub regional_keywords: Vec<String>,
    /// Keep at most this many articles after filtering; 0 keeps all.
    pub limit: usize,
}

/// Score one article; a failing or panicking scorer excludes the article.
fn score_article(scorer: &dyn TextScorer, article: &Article) -> Option<i32> {
    let outcome = catch_unwind(AssertUnwindSafe(|| scorer.score(&article.summary)));
    match outcome {
        Ok(Ok(score)) => Some(score),
        Ok(Err(e)) => {
            warn!(target: "pipeline", id = %article.fingerprint(), scorer = scorer.name(), error = %e, "scorer error; article excluded");
            None
        }
        Err(_) => {
            warn!(target: "pipeline", id = %article.fingerprint(), scorer = scorer.name(), "scorer panicked; article excluded");
            None
        }
    }
}

/// Score validated articles, counting failures into `stats`.
pub fn score_articles(
    articles: Vec<Article>,
    scorer: &dyn TextScorer,
    stats: &mut DropStats,
) -> Vec<ScoredArticle> {
    let mut out = Vec::with_capacity(articles.len());
    for a in articles {
        match score_article(scorer, &a) {
            Some(score) => out.push(ScoredArticle::new(a, score)),
            None => {
                stats.record(DropReason::ScorerError);
                counter!("news_scorer_errors_total").increment(1);
            }
        }
    }
    out
}

/// Run the whole classification for one cycle.
pub fn run_cycle(
    cycle: u64,
    raws: Vec<RawArticle>,
    scorer: &dyn TextScorer,
    universe: &UniverseConfig,
    opts: &PipelineOptions,
) -> Snapshot {
    let t0 = std::time::Instant::now();
    let fetched = raws.len();

    let (mut articles, mut dropped) = validate_batch(raws);

    if opts.business_only {
        let before = articles.len();
        articles.retain(|a| is_business_relevant(a, opts.require_image));
        for _ in articles.len()..before {
            dropped.record(DropReason::OffTopic);
        }
    }
    if !opts.regional_keywords.is_empty() {
        articles = regional_filter(articles, &opts.regional_keywords);
    }
    if opts.limit > 0 {
        articles.truncate(opts.limit);
    }

    let scored = score_articles(articles, scorer, &mut dropped);
    let sectors = aggregate(&scored, &universe.sectors);
    let suggestions = suggest(&scored, &universe.companies);
    let mood = summarize(scored.iter().map(|a| a.classification));

    for a in &scored {
        debug!(target: "pipeline", id = %a.article.fingerprint(), score = a.score, class = %a.classification, "scored");
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("news_cycle_ms").record(ms);
    counter!("news_articles_dropped_total").increment(dropped.total() as u64);

    info!(
        target: "pipeline",
        cycle,
        fetched,
        kept = scored.len(),
        dropped = dropped.total(),
        mood = %mood.mood,
        "cycle classified"
    );

    Snapshot {
        cycle,
        generated_at: Utc::now(),
        articles: scored,
        sectors,
        suggestions,
        mood,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{Classification, LexiconScorer};
    use crate::suggest::Action;

    struct Flaky;

    impl TextScorer for Flaky {
        fn score(&self, text: &str) -> anyhow::Result<i32> {
            if text.contains("boom") {
                panic!("scorer blew up");
            }
            if text.contains("bad input") {
                anyhow::bail!("cannot score");
            }
            Ok(3)
        }
    }

    fn raw(headline: &str, summary: &str) -> RawArticle {
        RawArticle {
            headline: Some(headline.into()),
            summary: Some(summary.into()),
            image: Some("https://img".into()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_cycle_is_all_defaults() {
        let u = UniverseConfig::default_seed();
        let snap = run_cycle(1, Vec::new(), &LexiconScorer::new(), &u, &PipelineOptions::default());
        assert!(snap.articles.is_empty());
        assert_eq!(snap.sectors.len(), u.sectors.len());
        assert!(snap
            .sectors
            .iter()
            .all(|s| s.classification == Classification::Neutral && s.article_count == 0));
        assert!(snap.suggestions.iter().all(|s| s.action == Action::Hold && !s.has_data()));
        assert_eq!(snap.mood.mood, Classification::Neutral);

        let empty = Snapshot::empty(1, &u);
        assert_eq!(empty.sectors, snap.sectors);
        assert_eq!(empty.suggestions, snap.suggestions);
    }

    #[test]
    fn scorer_failures_exclude_only_that_article() {
        let u = UniverseConfig::default_seed();
        let raws = vec![
            raw("Oil rallies", "crude gains"),
            raw("Oil boom", "boom time"),
            raw("Oil glitch", "bad input"),
            raw("", "no headline"),
        ];
        let snap = run_cycle(7, raws, &Flaky, &u, &PipelineOptions::default());
        assert_eq!(snap.cycle, 7);
        assert_eq!(snap.articles.len(), 1);
        assert_eq!(snap.dropped.scorer_errors, 2);
        assert_eq!(snap.dropped.missing_headline, 1);
        let energy = snap.sectors.iter().find(|s| s.sector == "Energy").unwrap();
        assert_eq!(energy.article_count, 1);
        assert_eq!(energy.mean_sentiment, 3.0);
    }

    #[test]
    fn business_filter_counts_off_topic() {
        let u = UniverseConfig::default_seed();
        let opts = PipelineOptions {
            business_only: true,
            require_image: true,
            ..PipelineOptions::default()
        };
        let mut no_img = raw("Stock market steady", "calm");
        no_img.image = None;
        let raws = vec![raw("Stock market rallies", "gains"), raw("Cricket final", "match"), no_img];
        let snap = run_cycle(2, raws, &LexiconScorer::new(), &u, &opts);
        assert_eq!(snap.articles.len(), 1);
        assert_eq!(snap.dropped.off_topic, 2);
    }
}
