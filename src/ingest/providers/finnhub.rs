use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::de::DeserializeOwned;

use crate::article::RawArticle;
use crate::config::ServiceConfig;
use crate::ingest::types::{MarketDataProvider, NewsProvider};
use crate::market::{candle_window, resolution_for_days, Candle, CandleResponse, Quote, SymbolInfo};

/// Finnhub REST client. The token is passed per request and never logged.
/// Failures are returned, not counted; callers own `news_provider_errors_total`.
#[derive(Clone)]
pub struct FinnhubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for FinnhubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinnhubClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FinnhubClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(cfg: &ServiceConfig) -> Result<Self> {
        let token = cfg
            .finnhub_api_key
            .clone()
            .ok_or_else(|| anyhow!("FINNHUB_API_KEY is not set"))?;
        Ok(Self::new(cfg.finnhub_base_url.clone(), token))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let t0 = std::time::Instant::now();
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(target: "ingest", error = ?e.without_url(), path, "finnhub http error");
                anyhow!("finnhub GET {path} failed")
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("finnhub GET {path} returned {status}"));
        }

        let body = resp
            .json::<T>()
            .await
            .with_context(|| format!("decoding finnhub {path} json"))?;
        histogram!("news_provider_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(body)
    }
}

#[async_trait]
impl NewsProvider for FinnhubClient {
    async fn fetch_news(&self) -> Result<Vec<RawArticle>> {
        let items: Vec<RawArticle> = self
            .get_json("/news", &[("category", "general".to_string())])
            .await?;
        counter!("news_articles_fetched_total").increment(items.len() as u64);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "Finnhub"
    }
}

#[async_trait]
impl MarketDataProvider for FinnhubClient {
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.get_json("/quote", &[("symbol", symbol.to_string())]).await
    }

    async fn symbols(&self, exchange: &str) -> Result<Vec<SymbolInfo>> {
        self.get_json("/stock/symbol", &[("exchange", exchange.to_string())])
            .await
    }

    async fn candles(&self, symbol: &str, days: u32) -> Result<Vec<Candle>> {
        let (from, to) = candle_window(days, chrono::Utc::now());
        let raw: CandleResponse = self
            .get_json(
                "/stock/candle",
                &[
                    ("symbol", symbol.to_string()),
                    ("resolution", resolution_for_days(days).to_string()),
                    ("from", from.to_string()),
                    ("to", to.to_string()),
                ],
            )
            .await?;
        Ok(raw.into_candles())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_api_key() {
        let cfg = ServiceConfig::default();
        assert!(FinnhubClient::from_config(&cfg).is_err());

        let cfg = ServiceConfig {
            finnhub_api_key: Some("k".into()),
            ..ServiceConfig::default()
        };
        let c = FinnhubClient::from_config(&cfg).unwrap();
        assert_eq!(c.base_url, "https://finnhub.io/api/v1");
        assert!(!format!("{c:?}").contains("token"));
    }

    #[test]
    fn news_payload_deserializes() {
        let body = r#"[{"category":"business","datetime":1700000000,"headline":"Sensex climbs",
            "id":1,"image":"https://i","related":"","source":"Reuters","summary":"Gains led by banks",
            "url":"https://u"}]"#;
        let items: Vec<RawArticle> = serde_json::from_str(body).unwrap();
        assert_eq!(items[0].headline.as_deref(), Some("Sensex climbs"));
        assert_eq!(items[0].datetime, Some(1_700_000_000));
    }
}
