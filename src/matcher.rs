//! Keyword / entity matching.
//!
//! Whole-word, case-insensitive matching only: a keyword `IT` must not fire on
//! `ITC` or `item`. Each category compiles its keywords once into a single
//! alternation; keywords are escaped, so config text is never interpreted as regex.

use regex::Regex;
use std::collections::BTreeSet;
use tracing::warn;

use crate::article::Article;

/// One category (sector, company, region) and its compiled keyword alternation.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    category: String,
    keywords: Vec<String>,
    re: Option<Regex>,
}

impl KeywordSet {
    /// Blank keywords are ignored; a set without usable keywords never matches.
    pub fn new<S: AsRef<str>>(category: impl Into<String>, keywords: &[S]) -> Self {
        let category = category.into();
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let re = if keywords.is_empty() {
            None
        } else {
            let alts = keywords
                .iter()
                .map(|k| keyword_pattern(k))
                .collect::<Vec<_>>()
                .join("|");
            match Regex::new(&format!("(?i)(?:{alts})")) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(target: "matcher", %category, error = %e, "keyword set failed to compile");
                    None
                }
            }
        };

        Self {
            category,
            keywords,
            re,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.re.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Keywords of this set that occur in `text`, in configuration order.
    pub fn matched_keywords(&self, text: &str) -> Vec<String> {
        if !self.is_match(text) {
            return Vec::new();
        }
        self.keywords
            .iter()
            .filter(|k| keyword_matches(k, text))
            .cloned()
            .collect()
    }
}

/// Word boundaries are only asserted on edges that are word characters, so
/// keywords like `S&P` or `$AAPL` still anchor sensibly. All-caps keywords
/// (acronyms, tickers) match case-sensitively: `IT` must not hit "it".
fn keyword_pattern(keyword: &str) -> String {
    let body = keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let starts_word = keyword.chars().next().is_some_and(is_word_char);
    let ends_word = keyword.chars().last().is_some_and(is_word_char);
    let anchored = format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        body,
        if ends_word { r"\b" } else { "" }
    );
    if is_acronym(keyword) {
        format!("(?-i:{anchored})")
    } else {
        anchored
    }
}

fn is_acronym(keyword: &str) -> bool {
    let letters: Vec<char> = keyword.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Single keyword check with the same whole-word semantics as [`KeywordSet`].
pub fn keyword_matches(keyword: &str, text: &str) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return false;
    }
    Regex::new(&format!("(?i){}", keyword_pattern(keyword)))
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// A dictionary of categories, compiled once and reused across a cycle.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    sets: Vec<KeywordSet>,
}

impl KeywordMatcher {
    pub fn new<C, K, S>(dictionary: impl IntoIterator<Item = (C, K)>) -> Self
    where
        C: Into<String>,
        K: AsRef<[S]>,
        S: AsRef<str>,
    {
        let sets = dictionary
            .into_iter()
            .map(|(cat, kws)| KeywordSet::new(cat, kws.as_ref()))
            .collect();
        Self { sets }
    }

    pub fn sets(&self) -> &[KeywordSet] {
        &self.sets
    }

    /// All categories whose keywords occur in `text`. No winner is picked.
    pub fn match_text(&self, text: &str) -> BTreeSet<String> {
        self.sets
            .iter()
            .filter(|s| s.is_match(text))
            .map(|s| s.category.clone())
            .collect()
    }

    /// Matches against headline and summary together.
    pub fn match_article(&self, article: &Article) -> BTreeSet<String> {
        self.match_text(&article.text())
    }
}

/// One-shot form of [`KeywordMatcher::match_article`] for ad-hoc dictionaries.
pub fn match_categories<C, K, S>(
    article: &Article,
    dictionary: impl IntoIterator<Item = (C, K)>,
) -> BTreeSet<String>
where
    C: Into<String>,
    K: AsRef<[S]>,
    S: AsRef<str>,
{
    KeywordMatcher::new(dictionary).match_article(article)
}
