use actix_web::web;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod metrics;
mod store;
mod utils;

use config::AppConfig;
use domain::order::OrderCommandHandler;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_ingest=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        backend = ?config.store.backend,
        port = config.server.port,
        "Loaded configuration"
    );

    // === 1. Metrics registry ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metric families",
        metrics.registry().gather().len()
    );

    // === 2. Order store (retries while the database comes up) ===
    let store = store::connect(&config.store, &config.connect_retry).await?;

    // === 3. Ingestion pipeline ===
    let handler = web::Data::new(OrderCommandHandler::new(store, metrics));

    // === 4. HTTP API ===
    api::start_server(&config.server, handler).await?;

    tracing::info!("Order API stopped");
    Ok(())
}
