use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::article::RawArticle;
use crate::config::UniverseConfig;
use crate::cycle::CycleCoordinator;
use crate::ingest::fetch_quotes;
use crate::ingest::scheduler::{Strip, StripBoard};
use crate::ingest::types::MarketDataProvider;
use crate::market::{Candle, Mover};
use crate::metrics::Metrics;
use crate::mood::MarketMood;
use crate::pipeline::{run_cycle, PipelineOptions, Snapshot};
use crate::sectors::SectorImpact;
use crate::sentiment::{classify, Classification, LexiconScorer, TextScorer};
use crate::suggest::CompanySuggestion;

/// Lookback used by `/chart/{symbol}` when `days` is not given.
pub const DEFAULT_CHART_DAYS: u32 = 1;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<CycleCoordinator>,
    pub universe: Arc<UniverseConfig>,
    /// Scorer used for classification (`/classify` and the refresh loop).
    pub scorer: Arc<dyn TextScorer>,
    /// Lexicon behind `/sentiment` token counts.
    pub lexicon: Arc<LexiconScorer>,
    pub strip: Arc<StripBoard>,
    /// Quotes and candles; `None` when no upstream is configured.
    pub market: Option<Arc<dyn MarketDataProvider>>,
}

impl AppState {
    /// Fresh state with no published cycle; the lexicon picks up the universe's overrides.
    pub fn new(universe: UniverseConfig) -> Self {
        let lexicon = Arc::new(LexiconScorer::with_overrides(universe.lexicon.clone()));
        Self {
            coordinator: Arc::new(CycleCoordinator::new()),
            universe: Arc::new(universe),
            scorer: lexicon.clone(),
            lexicon,
            strip: Arc::new(StripBoard::new()),
            market: None,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn TextScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_market(mut self, market: Arc<dyn MarketDataProvider>) -> Self {
        self.market = Some(market);
        self
    }

    /// Latest snapshot, or the all-defaults one when nothing has been published yet.
    fn current_or_empty(&self) -> Snapshot {
        match self.coordinator.latest() {
            Some(s) => s.as_ref().clone(),
            None => Snapshot::empty(0, &self.universe),
        }
    }

    fn market(&self) -> Result<&Arc<dyn MarketDataProvider>, ApiError> {
        self.market.as_ref().ok_or_else(|| {
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "no market data provider configured",
            )
        })
    }
}

pub fn router(state: AppState) -> Router {
    let metrics = Metrics::global();

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/snapshot", get(snapshot))
        .route("/sectors", get(sectors))
        .route("/suggestions", get(suggestions))
        .route("/mood", get(mood))
        .route("/strip", get(strip))
        .route("/quotes", get(quotes))
        .route("/chart/{symbol}", get(chart))
        .route("/classify", post(classify_batch))
        .route("/sentiment", post(sentiment))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
        .merge(metrics.router())
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody { error: msg.into() }))
}

async fn snapshot(State(state): State<AppState>) -> Result<Json<Snapshot>, StatusCode> {
    state
        .coordinator
        .latest()
        .map(|s| Json(s.as_ref().clone()))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn sectors(State(state): State<AppState>) -> Json<Vec<SectorImpact>> {
    Json(state.current_or_empty().sectors)
}

async fn suggestions(State(state): State<AppState>) -> Json<Vec<CompanySuggestion>> {
    Json(state.current_or_empty().suggestions)
}

async fn mood(State(state): State<AppState>) -> Json<MarketMood> {
    Json(
        state
            .coordinator
            .latest()
            .map(|s| s.mood)
            .unwrap_or_default(),
    )
}

async fn strip(State(state): State<AppState>) -> Result<Json<Strip>, StatusCode> {
    state.strip.get().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// Market overview: one mover per tracked company, in configuration order.
async fn quotes(State(state): State<AppState>) -> Result<Json<Vec<Mover>>, ApiError> {
    let market = state.market()?;
    let tickers: Vec<&str> = state
        .universe
        .companies
        .iter()
        .map(|c| c.ticker.as_str())
        .collect();
    Ok(Json(fetch_quotes(market.as_ref(), &tickers).await))
}

#[derive(serde::Deserialize)]
struct ChartParams {
    days: Option<u32>,
}

async fn chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Json<Vec<Candle>>, ApiError> {
    let market = state.market()?;
    let days = params.days.unwrap_or(DEFAULT_CHART_DAYS);
    market.candles(&symbol, days).await.map(Json).map_err(|e| {
        tracing::warn!(target: "api", error = ?e, %symbol, days, "chart fetch failed");
        metrics::counter!("news_provider_errors_total").increment(1);
        api_error(StatusCode::BAD_GATEWAY, format!("chart for {symbol} unavailable"))
    })
}

/// Classify an ad-hoc batch in-process; the result is not published.
async fn classify_batch(
    State(state): State<AppState>,
    Json(items): Json<Vec<RawArticle>>,
) -> Json<Snapshot> {
    let snap = run_cycle(
        0,
        items,
        state.scorer.as_ref(),
        &state.universe,
        &PipelineOptions::default(),
    );
    Json(snap)
}

#[derive(serde::Deserialize)]
struct SentimentReq {
    text: String,
}

#[derive(serde::Serialize)]
struct SentimentResp {
    score: i32,
    classification: Classification,
    tokens: usize,
}

async fn sentiment(
    State(state): State<AppState>,
    Json(body): Json<SentimentReq>,
) -> Result<Json<SentimentResp>, ApiError> {
    let score = state
        .scorer
        .score(&body.text)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let (_, tokens) = state.lexicon.score_text(&body.text);
    Ok(Json(SentimentResp {
        score,
        classification: classify(score),
        tokens,
    }))
}
