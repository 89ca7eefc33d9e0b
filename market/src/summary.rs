use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::types::Quote;

/// Number of gainers and losers carried by a summary.
pub const TOP_MOVERS: usize = 5;

/// Immutable market snapshot published once per refresh cycle.
///
/// Built in one step by [`MarketSummary::new`]; there are no setters, so a
/// shared `Arc<MarketSummary>` can never be observed half-written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    /// Trade stock index average (mean current price).
    trade_index_average: Decimal,
    /// Index average at the open (mean opening price).
    open_index_average: Decimal,
    volume: f64,
    gain_percent: Decimal,
    top_gainers: Vec<Quote>,
    top_losers: Vec<Quote>,
    as_of: DateTime<Utc>,
}

impl MarketSummary {
    /// Mover lists longer than [`TOP_MOVERS`] are truncated.
    pub fn new(
        trade_index_average: Decimal,
        open_index_average: Decimal,
        volume: f64,
        mut top_gainers: Vec<Quote>,
        mut top_losers: Vec<Quote>,
        as_of: DateTime<Utc>,
    ) -> Self {
        top_gainers.truncate(TOP_MOVERS);
        top_losers.truncate(TOP_MOVERS);

        Self {
            gain_percent: gain_percent(trade_index_average, open_index_average),
            trade_index_average,
            open_index_average,
            volume,
            top_gainers,
            top_losers,
            as_of,
        }
    }

    pub fn trade_index_average(&self) -> Decimal {
        self.trade_index_average
    }

    pub fn open_index_average(&self) -> Decimal {
        self.open_index_average
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn gain_percent(&self) -> Decimal {
        self.gain_percent
    }

    pub fn top_gainers(&self) -> &[Quote] {
        &self.top_gainers
    }

    pub fn top_losers(&self) -> &[Quote] {
        &self.top_losers
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }
}

/// Percentage move from `open` to `current`, two decimals, half-up.
/// A zero open yields zero.
pub fn gain_percent(current: Decimal, open: Decimal) -> Decimal {
    if open.is_zero() {
        return Decimal::ZERO;
    }
    round_money((current / open - Decimal::ONE) * Decimal::ONE_HUNDRED)
}

/// Two decimals, half-up, always carried at scale 2 (`20` renders as `20.00`).
pub(crate) fn round_money(v: Decimal) -> Decimal {
    let mut out = v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    out.rescale(2);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(n: u32) -> Quote {
        Quote::new(format!("s:{n}"), "", dec!(10), dec!(10), 1.0)
    }

    #[test]
    fn gain_percent_rounds_half_up() {
        assert_eq!(gain_percent(dec!(110), dec!(100)), dec!(10.00));
        assert_eq!(gain_percent(dec!(100.005), dec!(100)), dec!(0.01));
        assert_eq!(gain_percent(dec!(90), dec!(100)), dec!(-10.00));
    }

    #[test]
    fn gain_percent_is_always_two_places() {
        assert_eq!(gain_percent(dec!(12), dec!(10)).to_string(), "20.00");
    }

    #[test]
    fn gain_percent_zero_open_is_zero() {
        assert_eq!(gain_percent(dec!(12), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn movers_are_capped() {
        let many: Vec<_> = (0..8).map(quote).collect();
        let s = MarketSummary::new(dec!(1), dec!(1), 0.0, many.clone(), many, Utc::now());

        assert_eq!(s.top_gainers().len(), TOP_MOVERS);
        assert_eq!(s.top_losers().len(), TOP_MOVERS);
        assert_eq!(s.top_gainers()[0].symbol, "s:0");
    }

    #[test]
    fn serializes_decimals_as_strings() {
        let s = MarketSummary::new(dec!(21.50), dec!(20.00), 300.0, vec![], vec![], Utc::now());
        let v = serde_json::to_value(&s).unwrap();

        assert_eq!(v["tradeIndexAverage"], "21.50");
        assert_eq!(v["gainPercent"], "7.50");
        assert!(v["asOf"].is_string());
    }
}
