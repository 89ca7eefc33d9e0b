use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::info;

use market::Quote;

use crate::quotes::insert_quote;

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    // Prices are stored as decimal text; `change` is duplicated as REAL so
    // the table can be ordered by it.
    sqlx::query(
        r#"
CREATE TABLE IF NOT EXISTS quotes (
  symbol TEXT PRIMARY KEY,
  company_name TEXT NOT NULL,
  price TEXT NOT NULL,
  open TEXT NOT NULL,
  low TEXT NOT NULL,
  high TEXT NOT NULL,
  change REAL NOT NULL,
  volume REAL NOT NULL DEFAULT 0
);
"#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_quotes_change ON quotes (change DESC);")
        .execute(pool)
        .await?;

    Ok(())
}

/// Fills an empty quote table with `count` deterministic quotes `s:0 .. s:<count-1>`.
/// Returns how many rows were inserted; a non-empty table is left alone.
pub async fn seed_quotes(pool: &SqlitePool, count: u32) -> anyhow::Result<u32> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM quotes")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(existing, "quote table already populated; skipping seed");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for i in 0..count {
        insert_quote(&mut *tx, &seed_quote(i)).await?;
    }
    tx.commit().await?;

    info!(count, "seeded quote table");
    Ok(count)
}

/// Open between 10 and 109, price within +/-10% of open.
fn seed_quote(i: u32) -> Quote {
    // Widened so any configured quote count stays in range.
    let n = u64::from(i);
    let open = Decimal::from(10 + (n * 7) % 100);
    let pct = Decimal::from((n * 37) % 21) - Decimal::from(10);
    let price = (open + open * pct / Decimal::ONE_HUNDRED).round_dp(2);
    let volume = ((n * 131) % 10_000) as f64;

    Quote::new(format!("s:{i}"), format!("S{i} Incorporated"), open, price, volume)
}
