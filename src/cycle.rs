//! Cycle bookkeeping with last-cycle-wins publication.
//!
//! Every refresh calls [`CycleCoordinator::begin`] before fetching. When its
//! snapshot is ready it is published only if no newer cycle has begun in the
//! meantime; late results from a superseded fetch are dropped, never merged.

use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::pipeline::Snapshot;

#[derive(Debug, Default)]
pub struct CycleCoordinator {
    started: AtomicU64,
    slot: RwLock<Option<Arc<Snapshot>>>,
}

impl CycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle and return its id (1, 2, 3, ...).
    pub fn begin(&self) -> u64 {
        let id = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(target: "cycle", cycle = id, "cycle started");
        id
    }

    /// Id of the most recently started cycle (0 before the first).
    pub fn current(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    /// Store `snapshot` if it belongs to the newest cycle. Returns whether it was kept.
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        let cycle = snapshot.cycle;
        let mut guard = match self.slot.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };

        // checked under the write lock so two publishers cannot interleave
        let newest = self.current();
        let already_newer = guard.as_ref().is_some_and(|s| s.cycle >= cycle);
        if cycle != newest || already_newer {
            counter!("news_cycles_discarded_total").increment(1);
            info!(target: "cycle", cycle, newest, "stale snapshot discarded");
            return false;
        }

        *guard = Some(Arc::new(snapshot));
        counter!("news_cycles_published_total").increment(1);
        metrics::gauge!("news_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);
        true
    }

    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        match self.slot.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
