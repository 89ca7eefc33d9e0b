//! Market summary refresh cycle.
//!
//! One cycle: read every quote ordered by change, build a fresh
//! [`MarketSummary`], install it in the [`SnapshotStore`] and hand the
//! installed snapshot to each [`SummaryListener`].
//!
//! A cycle never fails outward. Query errors are logged and the previous
//! snapshot stays in place, so the schedule driving [`Refresher::refresh`]
//! keeps running.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, instrument, warn};

use common::logger::{child_span, warn_if_slow};

use crate::error::MarketError;
use crate::snapshot_store::SnapshotStore;
use crate::source::QuoteSource;
use crate::summary::{MarketSummary, TOP_MOVERS, round_money};
use crate::types::Quote;

/// Smallest quote set that yields distinct gainer and loser lists.
pub const MIN_QUOTES_FOR_SUMMARY: usize = TOP_MOVERS + 1;

const SLOW_QUERY: Duration = Duration::from_millis(250);

/// Observer told about every newly installed snapshot.
///
/// Called on the refreshing task; implementations must not block.
pub trait SummaryListener: Send + Sync {
    fn summary_updated(&self, summary: &MarketSummary);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was installed.
    Published { generation: u64, quotes: usize },
    /// Too few quotes; the previous snapshot was kept.
    Skipped { quotes: usize },
    /// The quote query failed; the previous snapshot was kept.
    Failed,
}

pub struct Refresher {
    source: Arc<dyn QuoteSource>,
    store: SnapshotStore,
    listeners: Vec<Arc<dyn SummaryListener>>,
    /// Serialises cycles so timer and on-demand refreshes never interleave.
    gate: Mutex<()>,
}

impl Refresher {
    pub fn new(source: Arc<dyn QuoteSource>, store: SnapshotStore) -> Self {
        Self {
            source,
            store,
            listeners: Vec::new(),
            gate: Mutex::new(()),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn SummaryListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Runs one cycle. Failures are logged and reported as [`RefreshOutcome::Failed`].
    #[instrument(skip(self), target = "refresher")]
    pub async fn refresh(&self) -> RefreshOutcome {
        match self.try_refresh().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "market summary refresh failed; skipping cycle");
                RefreshOutcome::Failed
            }
        }
    }

    /// Runs one cycle and returns the query error instead of logging it.
    pub async fn try_refresh(&self) -> Result<RefreshOutcome, MarketError> {
        let _cycle = self.gate.lock().await;
        self.run_cycle().instrument(child_span("refresh_cycle")).await
    }

    /// Latest snapshot, refreshing on demand when none has been published yet.
    pub async fn market_summary(&self) -> Option<Arc<MarketSummary>> {
        self.store
            .get_or_refresh(|| self.refresh_if_empty())
            .await
    }

    async fn refresh_if_empty(&self) {
        let _cycle = self.gate.lock().await;

        // Another reader may have completed the cycle while we waited.
        if self.store.get().is_some() {
            return;
        }

        if let Err(e) = self
            .run_cycle()
            .instrument(child_span("refresh_cycle"))
            .await
        {
            warn!(error = %e, "on-demand market summary refresh failed");
        }
    }

    async fn run_cycle(&self) -> Result<RefreshOutcome, MarketError> {
        let quotes = warn_if_slow(
            "quotes_by_change_desc",
            SLOW_QUERY,
            self.source.quotes_by_change_desc(),
        )
        .await
        .map_err(|e| MarketError::SourceUnavailable(format!("{e:#}")))?;

        let count = quotes.len();
        let Some(summary) = summarize(&quotes, Utc::now()) else {
            debug!(
                quotes = count,
                min = MIN_QUOTES_FOR_SUMMARY,
                "not enough quotes for a market summary; keeping previous snapshot"
            );
            return Ok(RefreshOutcome::Skipped { quotes: count });
        };

        let generation = self.store.set(summary);

        if let Some(current) = self.store.get() {
            for listener in &self.listeners {
                listener.summary_updated(&current);
            }
        }

        info!(
            generation,
            quotes = count,
            listeners = self.listeners.len(),
            "market summary published"
        );

        Ok(RefreshOutcome::Published {
            generation,
            quotes: count,
        })
    }
}

/// Builds a summary from quotes already ordered by `change` descending.
///
/// Gainers are the first [`TOP_MOVERS`] quotes. Losers are the last
/// [`TOP_MOVERS`], worst first. Index averages are taken over the whole set.
/// Returns `None` below [`MIN_QUOTES_FOR_SUMMARY`] quotes.
pub fn summarize(quotes: &[Quote], as_of: DateTime<Utc>) -> Option<MarketSummary> {
    if quotes.len() < MIN_QUOTES_FOR_SUMMARY {
        return None;
    }

    let top_gainers = quotes.iter().take(TOP_MOVERS).cloned().collect();
    let top_losers = quotes.iter().rev().take(TOP_MOVERS).cloned().collect();

    let (price_sum, open_sum, volume) = quotes.iter().fold(
        (Decimal::ZERO, Decimal::ZERO, 0.0_f64),
        |(price, open, volume), q| (price + q.price, open + q.open, volume + q.volume),
    );
    let count = Decimal::from(quotes.len());

    Some(MarketSummary::new(
        round_money(price_sum / count),
        round_money(open_sum / count),
        volume,
        top_gainers,
        top_losers,
        as_of,
    ))
}
