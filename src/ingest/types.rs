// src/ingest/types.rs
use anyhow::Result;

use crate::article::RawArticle;
use crate::market::{Candle, Quote, SymbolInfo};

/// Source of raw news records for one fetch cycle.
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self) -> Result<Vec<RawArticle>>;
    fn name(&self) -> &'static str;
}

/// Quotes, symbol lists and candles for the movers strip and charts.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote>;
    async fn symbols(&self, exchange: &str) -> Result<Vec<SymbolInfo>>;
    async fn candles(&self, symbol: &str, days: u32) -> Result<Vec<Candle>>;
}
