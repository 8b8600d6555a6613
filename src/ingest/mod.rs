// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::article::RawArticle;
use crate::ingest::types::{MarketDataProvider, NewsProvider};
use crate::market::Mover;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "news_articles_fetched_total",
            "Raw news records returned by providers."
        );
        describe_counter!(
            "news_articles_dropped_total",
            "Records dropped by validation, topic filter or scorer errors."
        );
        describe_counter!(
            "news_scorer_errors_total",
            "Articles excluded because the scorer failed."
        );
        describe_counter!(
            "news_provider_errors_total",
            "Provider fetch/decode errors."
        );
        describe_counter!(
            "news_cycles_published_total",
            "Snapshots published as the latest cycle."
        );
        describe_counter!(
            "news_cycles_discarded_total",
            "Snapshots discarded because a newer cycle had started."
        );
        describe_histogram!("news_cycle_ms", "Classification time per cycle in milliseconds.");
        describe_histogram!(
            "news_provider_fetch_ms",
            "Provider request time in milliseconds."
        );
        describe_gauge!("news_last_cycle_ts", "Unix ts of the last published cycle.");
    });
}

/// Collect records from every provider. A failing provider contributes nothing;
/// the cycle carries on with whatever the others returned.
pub async fn fetch_all(providers: &[Box<dyn NewsProvider>]) -> Vec<RawArticle> {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for p in providers {
        match p.fetch_news().await {
            Ok(mut v) => {
                tracing::debug!(target: "ingest", provider = p.name(), count = v.len(), "fetched");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = p.name(), "provider error");
                counter!("news_provider_errors_total").increment(1);
            }
        }
    }
    raw
}

/// Quotes for `symbols` as movers, in input order. Symbols whose quote fails
/// are skipped and counted.
pub async fn fetch_quotes<S: AsRef<str>>(
    provider: &dyn MarketDataProvider,
    symbols: &[S],
) -> Vec<Mover> {
    ensure_metrics_described();

    let mut out = Vec::with_capacity(symbols.len());
    for s in symbols {
        let symbol = s.as_ref();
        match provider.quote(symbol).await {
            Ok(q) => out.push(Mover::from_quote(symbol, &q)),
            Err(e) => {
                tracing::debug!(target: "ingest", error = ?e, symbol, "quote skipped");
                counter!("news_provider_errors_total").increment(1);
            }
        }
    }
    out
}

/// Quotes for the first `universe` symbols of `exchange`, as movers.
pub async fn fetch_movers(
    provider: &dyn MarketDataProvider,
    exchange: &str,
    universe: usize,
) -> anyhow::Result<Vec<Mover>> {
    let symbols = match provider.symbols(exchange).await {
        Ok(v) => v,
        Err(e) => {
            counter!("news_provider_errors_total").increment(1);
            return Err(e);
        }
    };
    let picked: Vec<String> = symbols.into_iter().take(universe).map(|s| s.symbol).collect();
    Ok(fetch_quotes(provider, &picked).await)
}
