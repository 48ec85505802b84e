use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod admin;
mod config;
mod domain;
mod metrics;
mod store;
mod utils;

use config::AppConfig;
use store::{MemoryStore, PgStore, Store};
use utils::{retry_with_backoff, RetryConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, INFO by default, overridable with RUST_LOG
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shop_admin=debug")),
        )
        .init();

    tracing::info!("🚀 Starting shop admin");

    let config = AppConfig::from_env()?;

    // === 1. Storage ===
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to PostgreSQL...");
            let retry = RetryConfig::default().with_max_attempts(config.connect_attempts);
            let pg = retry_with_backoff(&retry, "postgres connect", |_attempt| {
                PgStore::connect(url, config.max_connections)
            })
            .await?;

            pg.migrate().await?;
            tracing::info!("✅ Database schema is up to date");
            Arc::new(pg)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, data lives in memory and is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    // === 2. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 3. Admin server (also serves /metrics and /health) ===
    admin::serve(&config.bind_addr, store, metrics).await?;

    tracing::info!("Admin server stopped");
    Ok(())
}
