use std::sync::Arc;

use market::{Quote, RecentQuoteChanges};

use crate::notifier::{BroadcastReport, Notifier};

/// Entry point for quote price changes coming from the trading side.
///
/// A tracked change is recorded and the refreshed list is pushed to every
/// subscriber; untracked symbols are dropped silently.
pub struct QuoteChangeFeed {
    recent: Arc<RecentQuoteChanges>,
    notifier: Arc<Notifier>,
}

impl QuoteChangeFeed {
    pub fn new(recent: Arc<RecentQuoteChanges>, notifier: Arc<Notifier>) -> Self {
        Self { recent, notifier }
    }

    /// `None` when the symbol is not tracked and nothing was broadcast.
    pub fn publish(&self, quote: Quote) -> Option<BroadcastReport> {
        if !self.recent.record(quote) {
            return None;
        }
        Some(self.notifier.broadcast_quote_changes(&self.recent.recent()))
    }

    pub fn recent(&self) -> Vec<Quote> {
        self.recent.recent()
    }
}
