use serde::Deserialize;

/// Client requests understood by the market summary endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Reply with the current market summary.
    UpdateMarketSummary,
    /// Reply with the recent quote price changes.
    UpdateRecentQuotePriceChange,
}

#[derive(Deserialize)]
struct ActionMessage {
    action: Action,
}

/// Decodes `{"action": "<name>"}`.
pub fn decode_action(text: &str) -> serde_json::Result<Action> {
    serde_json::from_str::<ActionMessage>(text).map(|m| m.action)
}
