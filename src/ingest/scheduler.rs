// src/ingest/scheduler.rs
//! Background tasks: the news refresh loop and the gainers/losers strip rotation.
//! Neither lives inside the classifier; both are spawned and owned by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::UniverseConfig;
use crate::cycle::CycleCoordinator;
use crate::ingest::fetch_movers;
use crate::ingest::types::{MarketDataProvider, NewsProvider};
use crate::market::{top_gainers, top_losers, Mover};
use crate::pipeline::{run_cycle, PipelineOptions};
use crate::sentiment::TextScorer;

/// Everything a refresh needs, shared between ticks.
#[derive(Clone)]
pub struct RefreshContext {
    pub providers: Arc<Vec<Box<dyn NewsProvider>>>,
    pub scorer: Arc<dyn TextScorer>,
    pub universe: Arc<UniverseConfig>,
    pub coordinator: Arc<CycleCoordinator>,
    pub options: PipelineOptions,
}

/// Begin a cycle, fetch, classify, publish. Returns whether the snapshot won.
pub async fn refresh_once(ctx: &RefreshContext) -> bool {
    let cycle = ctx.coordinator.begin();
    let raws = crate::ingest::fetch_all(&ctx.providers).await;

    let snapshot = run_cycle(
        cycle,
        raws,
        ctx.scorer.as_ref(),
        &ctx.universe,
        &ctx.options,
    );
    ctx.coordinator.publish(snapshot)
}

/// Spawn the periodic refresh. The first tick fires immediately.
pub fn spawn_refresh_loop(ctx: RefreshContext, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let published = refresh_once(&ctx).await;
            tracing::info!(
                target: "ingest",
                cycle = ctx.coordinator.current(),
                published,
                "refresh tick"
            );
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripKind {
    Gainers,
    Losers,
}

impl StripKind {
    pub fn toggled(self) -> Self {
        match self {
            StripKind::Gainers => StripKind::Losers,
            StripKind::Losers => StripKind::Gainers,
        }
    }
}

/// Flips between gainers and losers on a fixed period and reports each change
/// through the injected callback. The first call happens right away.
#[derive(Debug, Clone, Copy)]
pub struct StripRotation {
    pub interval: Duration,
    pub initial: StripKind,
}

impl StripRotation {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            initial: StripKind::Gainers,
        }
    }

    pub fn spawn<F>(self, on_change: F) -> JoinHandle<()>
    where
        F: Fn(StripKind) + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            let mut kind = self.initial;
            loop {
                ticker.tick().await;
                on_change(kind);
                kind = kind.toggled();
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strip {
    /// Rotation tick this strip was fetched for.
    pub seq: u64,
    pub kind: StripKind,
    pub movers: Vec<Mover>,
    pub updated_at: DateTime<Utc>,
}

/// Latest strip content. Same rule as cycles: a fetch is only shown if no
/// newer rotation tick has begun since it started.
#[derive(Debug, Default)]
pub struct StripBoard {
    started: AtomicU64,
    inner: RwLock<Option<Strip>>,
}

impl StripBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a rotation tick and return its sequence number (1, 2, ...).
    pub fn begin(&self) -> u64 {
        self.started.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `strip` if it belongs to the newest tick. Returns whether it was kept.
    pub fn publish(&self, strip: Strip) -> bool {
        let mut guard = match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let newest = self.started.load(Ordering::SeqCst);
        let already_newer = guard.as_ref().is_some_and(|s| s.seq >= strip.seq);
        if strip.seq != newest || already_newer {
            debug!(target: "ingest", seq = strip.seq, newest, "stale strip discarded");
            return false;
        }
        *guard = Some(strip);
        true
    }

    pub fn get(&self) -> Option<Strip> {
        match self.inner.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Where the strip's movers come from and how many to show.
pub struct StripSource {
    pub provider: Arc<dyn MarketDataProvider>,
    pub board: Arc<StripBoard>,
    pub exchange: String,
    /// Symbols of `exchange` quoted per refresh.
    pub universe: usize,
    /// Movers kept per strip.
    pub top: usize,
}

impl StripSource {
    /// Fetch movers for tick `seq` and publish them. Returns whether the strip was shown.
    pub async fn refresh(&self, seq: u64, kind: StripKind) -> bool {
        let movers = match fetch_movers(self.provider.as_ref(), &self.exchange, self.universe).await {
            Ok(m) => m,
            Err(e) => {
                warn!(target: "ingest", error = ?e, "movers fetch failed");
                return false;
            }
        };
        let movers = match kind {
            StripKind::Gainers => top_gainers(movers, self.top),
            StripKind::Losers => top_losers(movers, self.top),
        };
        self.board.publish(Strip {
            seq,
            kind,
            movers,
            updated_at: Utc::now(),
        })
    }

    /// Drive a [`StripRotation`]: each tick begins a board sequence and starts a
    /// fetch; a fetch still running from the previous tick is aborted.
    pub fn spawn_rotation(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let in_flight: Mutex<Option<JoinHandle<()>>> = Mutex::new(None);
        StripRotation::new(interval).spawn(move |kind| {
            let seq = self.board.begin();
            let source = self.clone();
            let task = tokio::spawn(async move {
                source.refresh(seq, kind).await;
            });
            let mut slot = match in_flight.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(prev) = slot.replace(task) {
                prev.abort();
            }
        })
    }
}
