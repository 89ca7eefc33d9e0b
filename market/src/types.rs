use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prefix carried by every generated trade symbol (`s:0`, `s:1`, ...).
pub const SYMBOL_PREFIX: &str = "s:";

/// One row of the quote table, as read by the refresh cycle.
///
/// `change` is `price - open` and is the ordering key for gainers/losers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub company_name: String,
    pub price: Decimal,
    pub open: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub change: Decimal,
    pub volume: f64,
}

impl Quote {
    /// Builds a quote whose session range and change are derived from `open` and `price`.
    pub fn new(
        symbol: impl Into<String>,
        company_name: impl Into<String>,
        open: Decimal,
        price: Decimal,
        volume: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
            price,
            open,
            low: open.min(price),
            high: open.max(price),
            change: price - open,
            volume,
        }
    }

    /// Numeric part of an `s:<n>` symbol, if the symbol follows that shape.
    pub fn symbol_number(&self) -> Option<u32> {
        self.symbol.strip_prefix(SYMBOL_PREFIX)?.parse().ok()
    }

    /// Returns the quote after a trade moved its price; range and change follow.
    pub fn with_price(&self, price: Decimal) -> Self {
        Self {
            price,
            low: self.low.min(price),
            high: self.high.max(price),
            change: price - self.open,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_derives_range_and_change() {
        let q = Quote::new("s:1", "S1 Incorporated", dec!(20.00), dec!(18.50), 1_000.0);

        assert_eq!(q.low, dec!(18.50));
        assert_eq!(q.high, dec!(20.00));
        assert_eq!(q.change, dec!(-1.50));
    }

    #[test]
    fn symbol_number_requires_prefix() {
        let mut q = Quote::new("s:42", "", dec!(1), dec!(1), 0.0);
        assert_eq!(q.symbol_number(), Some(42));

        q.symbol = "IBM".into();
        assert_eq!(q.symbol_number(), None);

        q.symbol = "s:x".into();
        assert_eq!(q.symbol_number(), None);
    }

    #[test]
    fn with_price_widens_range() {
        let q = Quote::new("s:3", "", dec!(10), dec!(11), 5.0).with_price(dec!(12.25));

        assert_eq!(q.high, dec!(12.25));
        assert_eq!(q.low, dec!(10));
        assert_eq!(q.change, dec!(2.25));
        assert_eq!(q.volume, 5.0);
    }
}
