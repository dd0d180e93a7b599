//! Terminal application for the KR-EN vocabulary drill.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod source;
pub mod state;
pub mod ticker;

use std::sync::Arc;

use drill_core::{Controller, KeyValueStore, MemoryStore, Storage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use db::SqliteStore;
use source::{CatalogFetcher, CatalogSource};
use state::AppState;

/// Open the configured database, or run from memory if it cannot be opened.
fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    match SqliteStore::open(&config.db_path) {
        Ok(store) => {
            tracing::info!(path = %config.db_path.display(), "opened database");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                path = %config.db_path.display(),
                error = %e,
                "database unavailable; progress will not be saved"
            );
            Arc::new(MemoryStore::new())
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let storage = Storage::new(open_store(&config), config.storage_prefix.clone());

    let fetcher = CatalogFetcher::new(CatalogSource::parse(&config.catalog_source));
    let fetched = fetcher.fetch().await;
    let controller = Controller::new(storage, fetched);
    tracing::info!(
        source = %fetcher.source(),
        levels = controller.catalog().levels().len(),
        "catalog loaded"
    );

    let state = AppState::new(controller, fetcher);
    cli::run_repl(&state).await
}
