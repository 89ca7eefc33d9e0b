use async_trait::async_trait;

use crate::types::Quote;

/// Read-only access to the quote table.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Every known quote, ordered by `change` descending (biggest gainer first).
    async fn quotes_by_change_desc(&self) -> anyhow::Result<Vec<Quote>>;
}
