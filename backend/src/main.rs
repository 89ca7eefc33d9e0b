use std::sync::Arc;

use backend::{app::App, config::AppConfig, db::Db, quotes::SqlxQuoteSource, ws};
use common::logger::init_logger;
use scheduler::CancellationToken;

/// Connects the database, runs migrations and seeds an empty quote table
/// when configured to.
async fn init_quotes(cfg: &AppConfig) -> anyhow::Result<Arc<SqlxQuoteSource>> {
    let db = Db::connect(&cfg.database_url).await?;
    db.migrate().await?;

    if cfg.seed_quotes {
        backend::db::seed_quotes(&db.pool, cfg.max_quotes).await?;
    }

    Ok(Arc::new(SqlxQuoteSource::new(db.pool)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_logger("market-summary", cfg.json_logs);

    tracing::info!(
        bind = %cfg.bind_addr,
        interval_secs = cfg.market_summary_interval.as_secs(),
        max_quotes = cfg.max_quotes,
        "starting market summary service"
    );

    let quotes = init_quotes(&cfg).await?;
    let listener = ws::bind(cfg.bind_addr).await?;
    let app = App::new(cfg, quotes);

    let cancel = CancellationToken::new();
    let refresh = app.spawn_refresh(cancel.clone());
    let server = tokio::spawn(ws::serve(listener, Arc::clone(&app), cancel.clone()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    cancel.cancel();

    let cycles = refresh.await?;
    server.await??;
    tracing::info!(cycles, "market summary service stopped");

    Ok(())
}
