//! Market summary core: the quote data model, the cached snapshot and the
//! refresh cycle that rebuilds it.

pub mod error;
pub mod recent_changes;
pub mod refresher;
pub mod snapshot_store;
pub mod source;
pub mod summary;
pub mod types;

pub use error::MarketError;
pub use recent_changes::RecentQuoteChanges;
pub use refresher::{RefreshOutcome, Refresher, SummaryListener, summarize};
pub use snapshot_store::SnapshotStore;
pub use source::QuoteSource;
pub use summary::MarketSummary;
pub use types::Quote;
