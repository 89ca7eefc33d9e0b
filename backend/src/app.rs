use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use market::{RecentQuoteChanges, Refresher, SnapshotStore};
use scheduler::{CancellationToken, PeriodicTask};
use session::{BroadcastReport, Notifier, QuoteChangeFeed};

use crate::config::AppConfig;
use crate::quotes::SqlxQuoteSource;

/// Process-wide wiring: one snapshot store, one refresher feeding one notifier.
pub struct App {
    pub config: AppConfig,
    pub quotes: Arc<SqlxQuoteSource>,
    pub refresher: Arc<Refresher>,
    pub notifier: Arc<Notifier>,
    pub feed: QuoteChangeFeed,
}

impl App {
    pub fn new(config: AppConfig, quotes: Arc<SqlxQuoteSource>) -> Arc<Self> {
        let notifier = Arc::new(Notifier::new());

        let refresher = Refresher::new(quotes.clone(), SnapshotStore::new())
            .with_listener(notifier.clone());

        let recent = RecentQuoteChanges::new(
            config.max_quotes,
            config.list_quote_price_change_frequency,
        );
        let feed = QuoteChangeFeed::new(Arc::new(recent), notifier.clone());

        Arc::new(Self {
            config,
            quotes,
            refresher: Arc::new(refresher),
            notifier,
            feed,
        })
    }

    /// Starts the periodic market summary refresh.
    pub fn spawn_refresh(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<u64> {
        let refresher = Arc::clone(&self.refresher);

        PeriodicTask::new("market_summary", self.config.market_summary_interval).spawn(
            cancel,
            move || {
                let refresher = Arc::clone(&refresher);
                async move {
                    refresher.refresh().await;
                }
            },
        )
    }

    /// Records a traded price and pushes the recent-change list to subscribers.
    ///
    /// Returns `None` for an unknown symbol or one outside the tracked slice.
    #[instrument(skip(self), target = "app")]
    pub async fn apply_price_change(
        &self,
        symbol: &str,
        price: Decimal,
        shares: f64,
    ) -> anyhow::Result<Option<BroadcastReport>> {
        let Some(quote) = self.quotes.update_price(symbol, price, shares).await? else {
            debug!("price change for unknown symbol ignored");
            return Ok(None);
        };

        Ok(self.feed.publish(quote))
    }
}
