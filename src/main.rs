//! Market news impact service: binary entrypoint.
//! Loads config, starts the refresh loop and strip rotation, serves the API.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_news_impact::api::{self, AppState};
use market_news_impact::config::{ServiceConfig, UniverseConfig};
use market_news_impact::ingest::providers::FinnhubClient;
use market_news_impact::ingest::scheduler::{spawn_refresh_loop, RefreshContext, StripSource};
use market_news_impact::ingest::types::NewsProvider;
use market_news_impact::pipeline::PipelineOptions;

/// Compact logs by default, JSON lines with `LOG_FORMAT=json`.
/// `try_init` so an already-installed subscriber (platform runtime) wins quietly.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("market_news_impact=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let universe = UniverseConfig::load_default()?;
    let cfg = ServiceConfig::from_env();
    tracing::info!(
        sectors = universe.sectors.len(),
        companies = universe.companies.len(),
        region = %cfg.region,
        "configuration loaded"
    );

    let client = match FinnhubClient::from_config(&cfg) {
        Ok(c) => Some(Arc::new(c)),
        Err(e) => {
            tracing::warn!(error = %e, "no upstream configured; cycles will be empty");
            None
        }
    };

    let mut state = AppState::new(universe);
    let mut providers: Vec<Box<dyn NewsProvider>> = Vec::new();
    if let Some(c) = &client {
        providers.push(Box::new(c.as_ref().clone()));
        state = state.with_market(c.clone());
    }

    let ctx = RefreshContext {
        providers: Arc::new(providers),
        scorer: state.scorer.clone(),
        universe: state.universe.clone(),
        coordinator: state.coordinator.clone(),
        options: PipelineOptions {
            business_only: true,
            require_image: cfg.require_image,
            regional_keywords: if cfg.regional() {
                state.universe.regional_keywords.clone()
            } else {
                Vec::new()
            },
            limit: cfg.news_count,
        },
    };
    spawn_refresh_loop(ctx, cfg.refresh_interval());

    if let Some(market) = state.market.clone() {
        let source = StripSource {
            provider: market,
            board: state.strip.clone(),
            exchange: cfg.movers_exchange.clone(),
            universe: cfg.movers_universe,
            top: cfg.movers_top,
        };
        Arc::new(source).spawn_rotation(cfg.strip_interval());
    }

    Ok(api::router(state).into())
}
