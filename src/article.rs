//! Article shape at the system boundary.
//!
//! Providers hand us loosely-typed records ([`RawArticle`]); nothing reaches the
//! scorer until it has been normalized and validated into an [`Article`].
//! Validation fails closed: a record without a usable headline or summary is
//! dropped and counted, never passed on with blanks.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::matcher::KeywordSet;

/// Characters kept from a normalized field.
pub const MAX_FIELD_CHARS: usize = 2000;

/// Provider-shaped news record (Finnhub `/news` layout); every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawArticle {
    pub id: Option<i64>,
    pub category: Option<String>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    /// Unix seconds.
    pub datetime: Option<i64>,
    pub image: Option<String>,
    pub related: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub headline: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingHeadline,
    MissingSummary,
    Duplicate,
    OffTopic,
    ScorerError,
}

/// Per-cycle tally of records that never made it into the aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropStats {
    pub missing_headline: usize,
    pub missing_summary: usize,
    pub duplicate: usize,
    pub off_topic: usize,
    pub scorer_errors: usize,
}

impl DropStats {
    pub fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingHeadline => self.missing_headline += 1,
            DropReason::MissingSummary => self.missing_summary += 1,
            DropReason::Duplicate => self.duplicate += 1,
            DropReason::OffTopic => self.off_topic += 1,
            DropReason::ScorerError => self.scorer_errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_headline
            + self.missing_summary
            + self.duplicate
            + self.off_topic
            + self.scorer_errors
    }
}

impl Article {
    /// Normalize and validate a provider record.
    pub fn try_from_raw(raw: RawArticle) -> Result<Self, DropReason> {
        let headline = raw.headline.as_deref().map(normalize_text).unwrap_or_default();
        if headline.is_empty() {
            return Err(DropReason::MissingHeadline);
        }
        let summary = raw.summary.as_deref().map(normalize_text).unwrap_or_default();
        if summary.is_empty() {
            return Err(DropReason::MissingSummary);
        }

        let published_at = raw
            .datetime
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default();

        Ok(Self {
            headline,
            summary,
            source: raw.source.map(|s| s.trim().to_string()).unwrap_or_default(),
            url: raw.url.map(|s| s.trim().to_string()).unwrap_or_default(),
            published_at,
            image_url: non_blank(raw.image),
            related: non_blank(raw.related),
        })
    }

    /// Text searched by the keyword matchers.
    pub fn text(&self) -> String {
        format!("{} {}", self.headline, self.summary)
    }

    /// Short stable id for logs; raw text is never logged.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.headline)
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub(crate) fn fingerprint(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Normalize text: decode entities, strip tags, ASCII quotes, collapse whitespace, cap length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_FIELD_CHARS {
        out = out.chars().take(MAX_FIELD_CHARS).collect();
    }
    out
}

/// Validate a batch, dropping malformed records and repeated headlines.
/// Input order is preserved for the survivors.
pub fn validate_batch(raws: Vec<RawArticle>) -> (Vec<Article>, DropStats) {
    let mut stats = DropStats::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(raws.len());

    for raw in raws {
        match Article::try_from_raw(raw) {
            Ok(a) => {
                if !seen.insert(a.headline.to_lowercase()) {
                    stats.record(DropReason::Duplicate);
                    continue;
                }
                kept.push(a);
            }
            Err(reason) => stats.record(reason),
        }
    }
    (kept, stats)
}

/// Business/finance topic check used to filter the general news feed.
pub fn is_business_text(text: &str) -> bool {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)business|finance|stock|market|invest|econom").expect("business regex")
    })
    .is_match(text)
}

pub fn is_business_relevant(article: &Article, require_image: bool) -> bool {
    if require_image && article.image_url.is_none() {
        return false;
    }
    is_business_text(&article.text())
}

/// Keep articles mentioning the region; if none do, keep everything.
pub fn regional_filter(articles: Vec<Article>, keywords: &[String]) -> Vec<Article> {
    if keywords.is_empty() {
        return articles;
    }
    let set = KeywordSet::new("region", keywords);
    let regional: Vec<Article> = articles
        .iter()
        .filter(|a| set.is_match(&a.text()))
        .cloned()
        .collect();
    if regional.is_empty() {
        articles
    } else {
        regional
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headline: &str, summary: &str) -> RawArticle {
        RawArticle {
            headline: Some(headline.to_string()),
            summary: Some(summary.to_string()),
            source: Some(" Reuters ".into()),
            datetime: Some(1_700_000_000),
            image: Some(String::new()),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_text_decodes_and_collapses() {
        let out = normalize_text("  <b>Stocks&nbsp;&nbsp;rally</b>\n on \u{201C}hopes\u{201D}  ");
        assert_eq!(out, "Stocks rally on \"hopes\"");
    }

    #[test]
    fn normalize_keeps_comparisons_that_look_like_tags() {
        assert_eq!(normalize_text("margin < 5% > expected"), "margin < 5% > expected");
    }

    #[test]
    fn missing_fields_fail_closed() {
        assert_eq!(
            Article::try_from_raw(raw("  ", "body")),
            Err(DropReason::MissingHeadline)
        );
        assert_eq!(
            Article::try_from_raw(raw("Title", "<p></p>")),
            Err(DropReason::MissingSummary)
        );
        let mut r = raw("Title", "body");
        r.summary = None;
        assert_eq!(Article::try_from_raw(r), Err(DropReason::MissingSummary));
    }

    #[test]
    fn valid_record_is_cleaned() {
        let a = Article::try_from_raw(raw("Title", "body")).unwrap();
        assert_eq!(a.source, "Reuters");
        assert_eq!(a.image_url, None);
        assert_eq!(a.published_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn batch_drops_duplicates_and_counts() {
        let (kept, stats) = validate_batch(vec![
            raw("Markets up", "a"),
            raw("markets UP", "b"),
            raw("", "c"),
            raw("Other", "d"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(stats.duplicate, 1);
        assert_eq!(stats.missing_headline, 1);
        assert_eq!(stats.total(), 2);
    }

    #[test]
    fn business_filter_honours_image_requirement() {
        let mut a = Article::try_from_raw(raw("Stock market opens higher", "x")).unwrap();
        assert!(is_business_relevant(&a, false));
        assert!(!is_business_relevant(&a, true));
        a.image_url = Some("https://img".into());
        assert!(is_business_relevant(&a, true));

        let b = Article::try_from_raw(raw("Football final tonight", "x")).unwrap();
        assert!(!is_business_relevant(&b, false));
    }

    #[test]
    fn regional_filter_falls_back_to_all() {
        let (arts, _) = validate_batch(vec![
            raw("Sensex closes higher", "x"),
            raw("Wall Street drifts", "y"),
        ]);
        let kw = vec!["sensex".to_string(), "nifty".to_string()];
        assert_eq!(regional_filter(arts.clone(), &kw).len(), 1);

        let kw_none = vec!["tokyo".to_string()];
        assert_eq!(regional_filter(arts, &kw_none).len(), 2);
    }
}
