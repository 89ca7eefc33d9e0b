use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::summary::MarketSummary;

#[derive(Default)]
struct Slot {
    current: Option<Arc<MarketSummary>>,
    generation: u64,
}

/// Holder of the latest market summary.
///
/// Cloning the store clones the handle, not the snapshot: the refresher and
/// every reader share the same slot. Readers take the read lock only long
/// enough to clone an `Arc`, so concurrent `get`s never block each other and a
/// `set` only waits for those clones to finish.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Slot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if one has been published.
    pub fn get(&self) -> Option<Arc<MarketSummary>> {
        self.inner.read().current.clone()
    }

    /// Number of snapshots installed so far.
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Replaces the held snapshot and returns the new generation.
    pub fn set(&self, summary: MarketSummary) -> u64 {
        let summary = Arc::new(summary);

        let mut slot = self.inner.write();
        slot.current = Some(summary);
        slot.generation += 1;
        slot.generation
    }

    /// Returns the current snapshot, running `refresh` first when none exists yet.
    ///
    /// No lock is held while `refresh` runs. The result is still `None` when
    /// the refresh could not produce a snapshot.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Option<Arc<MarketSummary>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        if let Some(current) = self.get() {
            return Some(current);
        }

        debug!("no market summary yet; refreshing on demand");
        refresh().await;
        self.get()
    }
}
