//! Planpago API Server
//!
//! Main entry point for the payment plan service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planpago_api::{AppState, create_router};
use planpago_core::plan::{PlanDefaults, PlanService, PlanStorage};
use planpago_db::JsonFileStorage;
use planpago_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planpago=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let storage = Arc::new(JsonFileStorage::new(config.storage.snapshot_path()));
    storage
        .remove_stale_temp_files()
        .await
        .with_context(|| format!("Failed to clean up {}", storage.path().display()))?;

    // Fail fast on a corrupt snapshot
    let existing = storage
        .load()
        .await
        .with_context(|| format!("Failed to open {}", storage.path().display()))?;
    info!(
        path = %storage.path().display(),
        plans = existing.plans.len(),
        "Plan store opened"
    );

    let service = PlanService::with_defaults(storage, PlanDefaults::from(&config.defaults));
    let app = create_router(AppState::new(service));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
