use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use tracing::{instrument, warn};

use market::{MarketError, Quote, QuoteSource};

const SELECT_QUOTE: &str = r#"
SELECT symbol, company_name, price, open, low, high, volume
FROM quotes
"#;

/// SQLx-backed quote table.
/// Responsible only for persistence and row mapping.
pub struct SqlxQuoteSource {
    pool: SqlitePool,
}

impl SqlxQuoteSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, quote: &Quote) -> anyhow::Result<()> {
        insert_quote(&self.pool, quote).await
    }

    pub async fn fetch(&self, symbol: &str) -> anyhow::Result<Option<Quote>> {
        let row = sqlx::query(&format!("{SELECT_QUOTE} WHERE symbol = ?;"))
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(row_to_quote(&r)?)),
            None => Ok(None),
        }
    }

    /// Applies a trade to a quote: new price, traded shares added to volume.
    /// Returns the updated quote, or `None` for an unknown symbol.
    #[instrument(skip(self), target = "quotes")]
    pub async fn update_price(
        &self,
        symbol: &str,
        price: Decimal,
        shares: f64,
    ) -> anyhow::Result<Option<Quote>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("{SELECT_QUOTE} WHERE symbol = ?;"))
            .bind(symbol)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut quote = row_to_quote(&row)?.with_price(price);
        quote.volume += shares;

        insert_quote(&mut *tx, &quote).await?;
        tx.commit().await?;

        Ok(Some(quote))
    }
}

#[async_trait]
impl QuoteSource for SqlxQuoteSource {
    async fn quotes_by_change_desc(&self) -> anyhow::Result<Vec<Quote>> {
        let rows = sqlx::query(&format!("{SELECT_QUOTE} ORDER BY change DESC, symbol ASC;"))
            .fetch_all(&self.pool)
            .await
            .context("failed to query quotes")?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            match row_to_quote(&r) {
                Ok(q) => out.push(q),
                Err(e) => {
                    // poison-row resilience: skip but don't fail the cycle
                    warn!(error = %e, "skipping malformed quote row");
                }
            }
        }

        Ok(out)
    }
}

/// Insert or replace one quote row.
pub async fn insert_quote<'e, E>(exec: E, quote: &Quote) -> anyhow::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
INSERT INTO quotes (symbol, company_name, price, open, low, high, change, volume)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(symbol) DO UPDATE SET
  company_name = excluded.company_name,
  price = excluded.price,
  open = excluded.open,
  low = excluded.low,
  high = excluded.high,
  change = excluded.change,
  volume = excluded.volume;
"#,
    )
    .bind(&quote.symbol)
    .bind(&quote.company_name)
    .bind(quote.price.to_string())
    .bind(quote.open.to_string())
    .bind(quote.low.to_string())
    .bind(quote.high.to_string())
    .bind(quote.change.to_f64().unwrap_or(0.0))
    .bind(quote.volume)
    .execute(exec)
    .await
    .with_context(|| format!("failed to write quote {}", quote.symbol))?;

    Ok(())
}

fn row_to_quote(r: &SqliteRow) -> Result<Quote, MarketError> {
    let symbol: String = r
        .try_get("symbol")
        .map_err(|e| invalid("<unknown>", "symbol", e))?;

    let decimal = |col: &str| -> Result<Decimal, MarketError> {
        let raw: String = r.try_get(col).map_err(|e| invalid(&symbol, col, e))?;
        Decimal::from_str(&raw).map_err(|e| invalid(&symbol, col, e))
    };

    let price = decimal("price")?;
    let open = decimal("open")?;
    let low = decimal("low")?;
    let high = decimal("high")?;

    Ok(Quote {
        company_name: r
            .try_get("company_name")
            .map_err(|e| invalid(&symbol, "company_name", e))?,
        volume: r
            .try_get("volume")
            .map_err(|e| invalid(&symbol, "volume", e))?,
        change: price - open,
        price,
        open,
        low,
        high,
        symbol,
    })
}

fn invalid(symbol: &str, column: &str, e: impl std::fmt::Display) -> MarketError {
    MarketError::InvalidQuote {
        symbol: symbol.to_string(),
        reason: format!("{column}: {e}"),
    }
}
