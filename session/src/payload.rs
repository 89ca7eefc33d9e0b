//! JSON encoding of outbound messages.
//!
//! Every message carries a `type` tag so a dashboard can route it:
//!
//! ```json
//! {"type":"marketSummary","tradeIndexAverage":"102.33", ...}
//! {"type":"recentQuotePriceChange","quotes":[{"symbol":"s:1", ...}]}
//! ```

use serde::Serialize;

use market::{MarketSummary, Quote};

use crate::model::Payload;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Outbound<'a> {
    MarketSummary(&'a MarketSummary),
    RecentQuotePriceChange { quotes: &'a [Quote] },
}

pub fn summary_payload(summary: &MarketSummary) -> serde_json::Result<Payload> {
    encode(&Outbound::MarketSummary(summary))
}

pub fn quote_changes_payload(quotes: &[Quote]) -> serde_json::Result<Payload> {
    encode(&Outbound::RecentQuotePriceChange { quotes })
}

fn encode(msg: &Outbound<'_>) -> serde_json::Result<Payload> {
    serde_json::to_string(msg).map(Payload::text)
}
