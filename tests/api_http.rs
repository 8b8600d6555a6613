// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use axum::{
    body::{self, Body},
    Router,
};
use http::{Request, StatusCode};
use serde_json::json;
use serde_json::Value as Json;
use std::sync::Arc;
use tower::ServiceExt as _; // for `oneshot`

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use market_news_impact::api::{self, AppState};
use market_news_impact::config::UniverseConfig;
use market_news_impact::ingest::types::MarketDataProvider;
use market_news_impact::market::{Candle, Quote, SymbolInfo};
use market_news_impact::metrics::Metrics;
use market_news_impact::pipeline::{run_cycle, PipelineOptions};
use market_news_impact::{RawArticle, TextScorer};

/// Quotes for AAPL and TSLA only; candles for AAPL only.
struct FakeMarket;

#[async_trait]
impl MarketDataProvider for FakeMarket {
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let (c, pc) = match symbol {
            "AAPL" => (220.0, 200.0),
            "TSLA" => (180.0, 200.0),
            _ => return Err(anyhow!("no quote for {symbol}")),
        };
        Ok(Quote {
            c: Some(c),
            pc: Some(pc),
            ..Default::default()
        })
    }

    async fn symbols(&self, _exchange: &str) -> Result<Vec<SymbolInfo>> {
        Ok(Vec::new())
    }

    async fn candles(&self, symbol: &str, days: u32) -> Result<Vec<Candle>> {
        if symbol != "AAPL" {
            return Err(anyhow!("no candles"));
        }
        Ok((0..days)
            .map(|i| Candle {
                open: 1.0,
                close: 2.0,
                high: 2.5,
                low: 0.5,
                volume: 10.0,
                time: Utc.timestamp_opt(1_700_000_000 + i64::from(i) * 86_400, 0).unwrap(),
            })
            .collect())
    }
}

/// Scores every text the same, regardless of content.
struct Constant(i32);

impl TextScorer for Constant {
    fn score(&self, _text: &str) -> Result<i32> {
        Ok(self.0)
    }
}

const BODY_LIMIT: usize = 1024 * 1024;

fn fresh_state() -> AppState {
    AppState::new(UniverseConfig::default_seed())
}

fn raw(headline: &str, summary: &str) -> RawArticle {
    RawArticle {
        headline: Some(headline.into()),
        summary: Some(summary.into()),
        ..Default::default()
    }
}

/// State with one published cycle.
fn published_state() -> AppState {
    let state = fresh_state();
    let cycle = state.coordinator.begin();
    let snap = run_cycle(
        cycle,
        vec![
            raw("Oil prices surge", "Crude gains on strong demand"),
            raw("Tesla plunge", "Tesla losses deepen after weak deliveries"),
        ],
        state.scorer.as_ref(),
        &state.universe,
        &PipelineOptions::default(),
    );
    assert!(state.coordinator.publish(snap));
    state
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, body) = get(api::router(fresh_state()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap().trim(), "OK");
}

#[tokio::test]
async fn snapshot_is_404_before_first_cycle() {
    let (status, _) = get(api::router(fresh_state()), "/snapshot").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn views_fall_back_to_defaults_before_first_cycle() {
    let state = fresh_state();
    let n_sectors = state.universe.sectors.len();
    let n_companies = state.universe.companies.len();

    let (status, body) = get(api::router(state.clone()), "/sectors").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    let sectors = v.as_array().unwrap();
    assert_eq!(sectors.len(), n_sectors);
    assert!(sectors.iter().all(|s| s["classification"] == "Neutral"
        && s["article_count"] == 0
        && s["representative_summary"] == "No major news"));

    let (_, body) = get(api::router(state.clone()), "/suggestions").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    let suggestions = v.as_array().unwrap();
    assert_eq!(suggestions.len(), n_companies);
    assert!(suggestions
        .iter()
        .all(|s| s["action"] == "HOLD" && s["mean_sentiment"].is_null()));

    let (_, body) = get(api::router(state), "/mood").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["mood"], "Neutral");
    assert_eq!(v["positive"], 0);
}

#[tokio::test]
async fn published_snapshot_is_served() {
    let state = published_state();

    let (status, body) = get(api::router(state.clone()), "/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["cycle"], 1);
    assert_eq!(v["articles"].as_array().unwrap().len(), 2);

    let (_, body) = get(api::router(state.clone()), "/suggestions").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    let tesla = v
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["ticker"] == "TSLA")
        .expect("tesla suggestion");
    assert_eq!(tesla["action"], "SELL");

    let (_, body) = get(api::router(state), "/sectors").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v[0]["sector"], "Energy", "most-discussed sector first");
    assert_eq!(v[0]["classification"], "Positive");
}

#[tokio::test]
async fn classify_does_not_publish() {
    let state = fresh_state();
    let payload = json!([
        { "headline": "Infosys profits surge", "summary": "Infosys profits surge on strong deals" },
        { "headline": "", "summary": "no headline" }
    ]);
    let (status, body) = post_json(api::router(state.clone()), "/classify", payload).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["articles"].as_array().unwrap().len(), 1);
    assert_eq!(v["dropped"]["missing_headline"], 1);

    let infy = v["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["ticker"] == "INFY")
        .unwrap();
    assert_eq!(infy["action"], "BUY");

    assert!(state.coordinator.latest().is_none());
    let (status, _) = get(api::router(state), "/snapshot").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sentiment_scores_text() {
    let payload = json!({ "text": "Markets surge on strong earnings" });
    let (status, body) = post_json(api::router(fresh_state()), "/sentiment", payload).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["score"], 4);
    assert_eq!(v["classification"], "Positive");
    assert_eq!(v["tokens"], 5);
}

#[tokio::test]
async fn sentiment_rejects_blank_text() {
    let payload = json!({ "text": "   " });
    let (status, body) = post_json(api::router(fresh_state()), "/sentiment", payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert!(v["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn strip_is_404_until_first_rotation() {
    let (status, _) = get(api::router(fresh_state()), "/strip").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_render_recorded_series() {
    // install the recorder before anything is recorded
    Metrics::global();
    metrics::counter!("news_articles_fetched_total").increment(3);
    let state = published_state();

    let (status, body) = get(api::router(state), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("news_articles_fetched_total"), "got: {text}");
    assert!(text.contains("news_cycles_published_total"), "got: {text}");
    assert!(text.contains("news_cycle_ms"), "got: {text}");
}

#[tokio::test]
async fn quotes_cover_tracked_companies() {
    let state = fresh_state().with_market(Arc::new(FakeMarket));
    let (status, body) = get(api::router(state), "/quotes").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    let movers = v.as_array().unwrap();
    // seed order: Apple before Tesla; tickers without a quote are skipped
    assert_eq!(movers.len(), 2);
    assert_eq!(movers[0]["symbol"], "AAPL");
    assert_eq!(movers[0]["change"], 10.0);
    assert_eq!(movers[1]["symbol"], "TSLA");
    assert_eq!(movers[1]["change"], -10.0);
}

#[tokio::test]
async fn chart_returns_candles() {
    let state = fresh_state().with_market(Arc::new(FakeMarket));
    let (status, body) = get(api::router(state.clone()), "/chart/AAPL?days=7").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 7);
    assert_eq!(v[0]["close"], 2.0);

    let (_, body) = get(api::router(state.clone()), "/chart/AAPL").await;
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 1, "defaults to one day");

    let (status, body) = get(api::router(state), "/chart/ZZZ").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert!(v["error"].as_str().is_some());
}

#[tokio::test]
async fn market_routes_need_a_provider() {
    let (status, _) = get(api::router(fresh_state()), "/quotes").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = get(api::router(fresh_state()), "/chart/AAPL").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn classify_uses_the_configured_scorer() {
    let state = fresh_state().with_scorer(Arc::new(Constant(-5)));
    let payload = json!([
        { "headline": "Infosys profits surge", "summary": "Infosys profits surge on strong deals" }
    ]);
    let (status, body) = post_json(api::router(state), "/classify", payload).await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["articles"][0]["score"], -5);
    let infy = v["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["ticker"] == "INFY")
        .unwrap();
    assert_eq!(infy["action"], "SELL");
}
