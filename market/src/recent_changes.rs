use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::debug;

use crate::types::Quote;

/// Number of price changes kept for subscribers.
pub const RECENT_CHANGES_CAPACITY: usize = 5;

/// The most recent quote price changes, newest first.
///
/// Only symbols numbered below `max_quotes * frequency_pct / 100` are
/// tracked, which lets a deployment publish changes for a slice of the
/// quote universe.
pub struct RecentQuoteChanges {
    list: Mutex<VecDeque<Quote>>,
    symbol_limit: f64,
}

impl RecentQuoteChanges {
    pub fn new(max_quotes: u32, frequency_pct: u32) -> Self {
        Self {
            list: Mutex::new(VecDeque::with_capacity(RECENT_CHANGES_CAPACITY + 1)),
            symbol_limit: f64::from(max_quotes) * f64::from(frequency_pct) * 0.01,
        }
    }

    /// Records a changed quote. Returns `false` when the symbol is not tracked.
    pub fn record(&self, quote: Quote) -> bool {
        let Some(n) = quote.symbol_number() else {
            debug!(symbol = %quote.symbol, "untracked symbol shape; price change ignored");
            return false;
        };
        if f64::from(n) >= self.symbol_limit {
            return false;
        }

        let mut list = self.list.lock();
        list.push_front(quote);
        list.truncate(RECENT_CHANGES_CAPACITY);
        true
    }

    pub fn recent(&self) -> Vec<Quote> {
        self.list.lock().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.list.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(n: u32) -> Quote {
        Quote::new(format!("s:{n}"), format!("S{n} Incorporated"), dec!(10), dec!(11), 100.0)
    }

    #[test]
    fn keeps_newest_first_and_caps() {
        let recent = RecentQuoteChanges::new(400, 100);

        for n in 0..7 {
            assert!(recent.record(quote(n)));
        }

        let symbols: Vec<_> = recent.recent().into_iter().map(|q| q.symbol).collect();
        assert_eq!(symbols, ["s:6", "s:5", "s:4", "s:3", "s:2"]);
    }

    #[test]
    fn frequency_limits_tracked_symbols() {
        // 400 * 10% -> only s:0 .. s:39 are tracked
        let recent = RecentQuoteChanges::new(400, 10);

        assert!(recent.record(quote(39)));
        assert!(!recent.record(quote(40)));
        assert_eq!(recent.recent().len(), 1);
    }

    #[test]
    fn malformed_symbols_are_ignored() {
        let recent = RecentQuoteChanges::new(400, 100);
        let mut q = quote(1);
        q.symbol = "IBM".into();

        assert!(!recent.record(q));
        assert!(recent.is_empty());
    }
}
