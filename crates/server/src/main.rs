//! AIMS API - marine engine fault diagnosis service
//!
//! Loads the exported model artifacts once at startup and serves
//! predictions over HTTP. Startup never fails on missing or invalid
//! artifacts; the service then reports itself unready and rejects
//! every prediction until restarted with valid artifacts.

use aims_lib::{ArtifactState, FaultPredictor, StructuredLogger};
use aims_server::{api, ServerConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_NAME: &str = "aims-api";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting {}", SERVICE_NAME);

    let config = ServerConfig::load()?;
    info!(
        addr = %config.bind_addr(),
        artifacts_dir = %config.artifacts_dir.display(),
        "Service configured"
    );

    let logger = StructuredLogger::new(SERVICE_NAME);
    let dir = config.artifacts_dir.display().to_string();
    let artifacts = ArtifactState::load(&config.artifacts_dir);
    match &artifacts {
        ArtifactState::Loaded(_) => logger.log_artifacts_loaded(&dir),
        ArtifactState::Unavailable { reason } => logger.log_artifacts_unavailable(&dir, reason),
    }
    let artifacts_loaded = artifacts.is_loaded();

    let predictor = FaultPredictor::new(artifacts);
    let state = Arc::new(api::AppState::initialize(predictor, logger.clone()).await);
    let router = api::create_router(state.clone(), api::cors_layer(&config.cors_origins)?);

    let addr = config.bind_addr();
    logger.log_startup(env!("CARGO_PKG_VERSION"), &addr, artifacts_loaded);

    let shutdown_logger = logger.clone();
    api::serve(&addr, router, async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_logger.log_shutdown("SIGINT received");
        }
    })
    .await?;

    let stats = state.predictor.stats();
    info!(
        total_predictions = stats.total_predictions,
        slow_predictions = stats.slow_predictions,
        "Shutting down"
    );
    Ok(())
}
