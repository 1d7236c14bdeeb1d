//! Huginn server binary
//!
//! Startup sequence: environment + settings, tracing, chat store schema,
//! chat service (engine is initialized lazily on first use), API server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use huginn::Settings;
use huginn_api::ApiServer;
use huginn_core::ChatService;
use huginn_databases::ChatStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let settings = Settings::load().context("failed to load settings")?;

    let default_filter = if settings.debug {
        "huginn=debug,huginn_core=debug,huginn_api=debug,huginn_databases=debug,tower_http=debug"
    } else {
        "huginn=info,huginn_core=info,huginn_api=info,huginn_databases=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    info!("Starting Huginn API...");

    let store = ChatStore::connect(&settings.database_url)
        .await
        .context("failed to open chat store")?;
    store
        .init_schema()
        .await
        .context("failed to initialize chat store schema")?;
    info!("Database initialized");

    let chat = Arc::new(ChatService::new(settings.engine_config()));
    let server = ApiServer::new(settings.api_config(), chat);
    server.start().await?;

    info!("Shutting down Huginn API...");
    Ok(())
}
