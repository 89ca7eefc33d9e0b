use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string. The default in-memory database is only
    /// useful together with `seed_quotes`.
    pub database_url: String,

    /// Address the WebSocket endpoint listens on.
    pub bind_addr: SocketAddr,

    // =========================
    // Market summary
    // =========================
    /// Period of the market summary refresh cycle.
    pub market_summary_interval: Duration,

    /// Size of the quote universe (`s:0` .. `s:<max_quotes - 1>`).
    pub max_quotes: u32,

    /// Percentage of the quote universe whose price changes are pushed to
    /// subscribers. 100 tracks every symbol.
    pub list_quote_price_change_frequency: u32,

    /// Populate an empty quote table with `max_quotes` generated quotes at startup.
    pub seed_quotes: bool,

    // =========================
    // Subscribers
    // =========================
    /// Outbound messages buffered per WebSocket connection. A subscriber
    /// whose buffer is full misses updates until it drains.
    pub subscriber_queue_capacity: usize,

    /// One JSON object per log line; set when `APP_ENV=production`.
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9080)),
            market_summary_interval: Duration::from_secs(20),
            max_quotes: 400,
            list_quote_price_change_frequency: 100,
            seed_quotes: true,
            subscriber_queue_capacity: 32,
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();

        let interval_secs: u64 = parse(
            &lookup,
            "MARKET_SUMMARY_INTERVAL_SECS",
            d.market_summary_interval.as_secs(),
        )?;
        if interval_secs == 0 {
            return Err(AppError::InvalidConfig {
                key: "MARKET_SUMMARY_INTERVAL_SECS",
                reason: "must be at least 1".into(),
            });
        }

        let frequency: u32 = parse(
            &lookup,
            "LIST_QUOTE_PRICE_CHANGE_FREQUENCY",
            d.list_quote_price_change_frequency,
        )?;
        if frequency > 100 {
            return Err(AppError::InvalidConfig {
                key: "LIST_QUOTE_PRICE_CHANGE_FREQUENCY",
                reason: format!("{frequency} is not a percentage"),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(d.database_url),
            bind_addr: parse(&lookup, "BIND_ADDR", d.bind_addr)?,
            market_summary_interval: Duration::from_secs(interval_secs),
            max_quotes: parse(&lookup, "MAX_QUOTES", d.max_quotes)?,
            list_quote_price_change_frequency: frequency,
            seed_quotes: parse(&lookup, "SEED_QUOTES", d.seed_quotes)?,
            subscriber_queue_capacity: parse(
                &lookup,
                "SUBSCRIBER_QUEUE_CAPACITY",
                d.subscriber_queue_capacity,
            )?,
            json_logs: lookup("APP_ENV").is_some_and(|env| env.trim() == "production"),
        })
    }
}

fn parse<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| AppError::InvalidConfig {
            key,
            reason: format!("{raw:?}: {e}"),
        }),
    }
}
