use rust_decimal_macros::dec;
use sqlx::SqlitePool;

use backend::db::{Db, seed_quotes};
use backend::quotes::SqlxQuoteSource;
use market::{Quote, QuoteSource};

/// Fresh in-memory database with the quote table in place.
async fn setup_db() -> SqlitePool {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();
    db.pool
}

fn quote(symbol: &str, open: rust_decimal::Decimal, price: rust_decimal::Decimal) -> Quote {
    Quote::new(symbol, format!("{symbol} Incorporated"), open, price, 100.0)
}

#[tokio::test]
async fn quotes_come_back_ordered_by_change_desc() {
    let pool = setup_db().await;
    let source = SqlxQuoteSource::new(pool);

    source.upsert(&quote("s:0", dec!(10), dec!(9))).await.unwrap();
    source.upsert(&quote("s:1", dec!(10), dec!(15))).await.unwrap();
    source.upsert(&quote("s:2", dec!(10), dec!(10))).await.unwrap();
    source.upsert(&quote("s:3", dec!(10), dec!(12.50))).await.unwrap();

    let quotes = source.quotes_by_change_desc().await.unwrap();
    let symbols: Vec<_> = quotes.iter().map(|q| q.symbol.as_str()).collect();

    assert_eq!(symbols, ["s:1", "s:3", "s:2", "s:0"]);
    assert_eq!(quotes[1].price, dec!(12.50));
    assert_eq!(quotes[1].change, dec!(2.50));
}

#[tokio::test]
async fn seeding_fills_only_an_empty_table() {
    let pool = setup_db().await;

    assert_eq!(seed_quotes(&pool, 25).await.unwrap(), 25);
    assert_eq!(seed_quotes(&pool, 25).await.unwrap(), 0);

    let source = SqlxQuoteSource::new(pool);
    let quotes = source.quotes_by_change_desc().await.unwrap();
    assert_eq!(quotes.len(), 25);
    assert!(quotes.windows(2).all(|w| w[0].change >= w[1].change));
}

#[tokio::test]
async fn update_price_moves_price_and_accumulates_volume() {
    let pool = setup_db().await;
    let source = SqlxQuoteSource::new(pool);
    source.upsert(&quote("s:7", dec!(20), dec!(20))).await.unwrap();

    let updated = source
        .update_price("s:7", dec!(24.10), 50.0)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.price, dec!(24.10));
    assert_eq!(updated.change, dec!(4.10));
    assert_eq!(updated.high, dec!(24.10));
    assert_eq!(updated.volume, 150.0);

    let stored = source.fetch("s:7").await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_price_for_unknown_symbol_is_none() {
    let pool = setup_db().await;
    let source = SqlxQuoteSource::new(pool);

    assert!(source.update_price("s:404", dec!(1), 1.0).await.unwrap().is_none());
    assert!(source.fetch("s:404").await.unwrap().is_none());
}

#[tokio::test]
async fn malformed_row_is_skipped_not_fatal() {
    let pool = setup_db().await;
    let source = SqlxQuoteSource::new(pool.clone());
    source.upsert(&quote("s:1", dec!(10), dec!(11))).await.unwrap();

    sqlx::query(
        "INSERT INTO quotes (symbol, company_name, price, open, low, high, change, volume) \
         VALUES ('s:2', 'Broken', 'not-a-price', '10', '10', '10', 5.0, 0);",
    )
    .execute(&pool)
    .await
    .unwrap();

    let quotes = source.quotes_by_change_desc().await.unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].symbol, "s:1");

    assert!(source.fetch("s:2").await.is_err());
}
