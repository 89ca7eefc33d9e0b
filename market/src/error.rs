use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("quote source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid quote {symbol}: {reason}")]
    InvalidQuote { symbol: String, reason: String },
}
