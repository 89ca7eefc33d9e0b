use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, instrument, warn};

use market::{MarketSummary, Quote, SummaryListener};

use crate::error::SendError;
use crate::model::{Payload, SubscriberId};
use crate::payload::{quote_changes_payload, summary_payload};
use crate::subscriber::Subscriber;

/// Per-broadcast delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Subscribers that reported themselves closed and were not sent to.
    pub skipped_closed: usize,
    pub failed: usize,
}

/// Fan-out of market updates to every connected subscriber.
///
/// A subscriber is `Connected` from [`Notifier::connect`] until
/// [`Notifier::disconnect`]; nothing else removes it. A failed or skipped send
/// leaves the subscriber registered, so the transport layer must report
/// disconnects.
///
/// Broadcasts iterate over a copy of the registry taken under a short read
/// lock: sends never hold the lock and connects/disconnects during a broadcast
/// take effect on the next one.
#[derive(Default)]
pub struct Notifier {
    subscribers: RwLock<HashMap<SubscriberId, Arc<dyn Subscriber>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip_all, target = "notifier", fields(subscriber_id = %subscriber.id()))]
    pub fn connect(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = subscriber.id();
        let total = {
            let mut map = self.subscribers.write();
            map.insert(id, subscriber);
            map.len()
        };

        info!(total, "subscriber connected");
        id
    }

    /// Returns `false` if the subscriber was not connected.
    #[instrument(skip(self), target = "notifier")]
    pub fn disconnect(&self, id: SubscriberId) -> bool {
        let (removed, total) = {
            let mut map = self.subscribers.write();
            (map.remove(&id).is_some(), map.len())
        };

        if removed {
            info!(total, "subscriber disconnected");
        } else {
            debug!("disconnect for unknown subscriber ignored");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.subscribers.read().contains_key(id)
    }

    /// Sends the encoded summary to every open subscriber.
    pub fn broadcast_summary_changed(&self, summary: &MarketSummary) -> BroadcastReport {
        match summary_payload(summary) {
            Ok(payload) => self.broadcast("market_summary", payload),
            Err(e) => {
                error!(error = %e, "failed to encode market summary; broadcast dropped");
                BroadcastReport::default()
            }
        }
    }

    /// Sends the recent price-change list to every open subscriber.
    pub fn broadcast_quote_changes(&self, quotes: &[Quote]) -> BroadcastReport {
        match quote_changes_payload(quotes) {
            Ok(payload) => self.broadcast("quote_price_change", payload),
            Err(e) => {
                error!(error = %e, "failed to encode quote changes; broadcast dropped");
                BroadcastReport::default()
            }
        }
    }

    /// Sends the summary to one subscriber, answering its explicit request.
    pub fn send_summary_to(
        &self,
        id: SubscriberId,
        summary: &MarketSummary,
    ) -> Result<(), SendError> {
        let payload = summary_payload(summary).map_err(|e| SendError::Encode(e.to_string()))?;
        self.send_to(id, payload)
    }

    /// Sends the recent price-change list to one subscriber.
    pub fn send_quote_changes_to(&self, id: SubscriberId, quotes: &[Quote]) -> Result<(), SendError> {
        let payload = quote_changes_payload(quotes).map_err(|e| SendError::Encode(e.to_string()))?;
        self.send_to(id, payload)
    }

    fn send_to(&self, id: SubscriberId, payload: Payload) -> Result<(), SendError> {
        let subscriber = self
            .subscribers
            .read()
            .get(&id)
            .cloned()
            .ok_or(SendError::NotConnected(id))?;

        subscriber.send(payload)
    }

    fn broadcast(&self, kind: &'static str, payload: Payload) -> BroadcastReport {
        let targets: Vec<Arc<dyn Subscriber>> = self.subscribers.read().values().cloned().collect();
        let mut report = BroadcastReport::default();

        for subscriber in targets {
            if !subscriber.is_open() {
                report.skipped_closed += 1;
                continue;
            }

            match subscriber.send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        subscriber_id = %subscriber.id(),
                        error = %e,
                        kind,
                        "send to subscriber failed; skipping"
                    );
                }
            }
        }

        debug!(
            kind,
            bytes = payload.len(),
            delivered = report.delivered,
            skipped_closed = report.skipped_closed,
            failed = report.failed,
            "broadcast complete"
        );
        report
    }
}

impl SummaryListener for Notifier {
    fn summary_updated(&self, summary: &MarketSummary) {
        self.broadcast_summary_changed(summary);
    }
}
