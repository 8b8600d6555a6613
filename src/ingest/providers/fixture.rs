use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::article::RawArticle;
use crate::ingest::types::NewsProvider;

/// Serves a fixed list of records; used offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticNewsProvider {
    name: &'static str,
    items: Vec<RawArticle>,
}

impl StaticNewsProvider {
    pub fn new(name: &'static str, items: Vec<RawArticle>) -> Self {
        Self { name, items }
    }

    /// Parse a Finnhub-shaped JSON array.
    pub fn from_json(name: &'static str, json: &str) -> Result<Self> {
        let items: Vec<RawArticle> =
            serde_json::from_str(json).context("parsing news fixture json")?;
        Ok(Self::new(name, items))
    }
}

#[async_trait]
impl NewsProvider for StaticNewsProvider {
    async fn fetch_news(&self) -> Result<Vec<RawArticle>> {
        Ok(self.items.clone())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
