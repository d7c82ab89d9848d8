//! HTTP API: prediction, fault catalogue, health checks and Prometheus metrics

use crate::error::{AppError, AppResult};
use aims_lib::{
    fault_catalog,
    health::{components, ComponentHealth, ComponentStatus, HealthRegistry, LivenessResponse},
    predictor::SLOW_PREDICTION_MS,
    validate_body, ArtifactState, FaultPredictor, MaintenanceAdvice, PredictError,
    PredictionResponse, ServiceMetrics, StructuredLogger,
};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Version reported by the liveness endpoints
pub const API_VERSION: &str = "1.0";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<FaultPredictor>,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    /// Build state around a predictor and record its artifact status
    pub async fn initialize(predictor: FaultPredictor, logger: StructuredLogger) -> Self {
        let health_registry = HealthRegistry::new();
        match predictor.state() {
            ArtifactState::Loaded(_) => health_registry.set_healthy(components::ARTIFACTS).await,
            ArtifactState::Unavailable { reason } => {
                health_registry
                    .set_unhealthy(components::ARTIFACTS, reason.clone())
                    .await
            }
        }
        health_registry.register(components::PREDICTOR).await;

        let metrics = ServiceMetrics::new();
        metrics.set_artifacts_loaded(predictor.is_ready());

        Self {
            predictor: Arc::new(predictor),
            health_registry,
            metrics,
            logger,
        }
    }
}

/// Liveness: answers as long as the process is up
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse::new(API_VERSION))
}

/// Readiness check response - returns 200 if artifacts are loaded, 503 otherwise
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<PredictionResponse>> {
    // Unavailable artifacts fail every request the same way, valid or not
    if !state.predictor.is_ready() {
        let err = PredictError::ArtifactsUnavailable;
        state.metrics.inc_prediction_failures(err.kind());
        state.logger.log_prediction_failed(err.kind(), &err.to_string());
        return Err(err.into());
    }

    let reading = validate_body(&body).map_err(|errors| {
        state.metrics.inc_validation_failures();
        state
            .logger
            .log_validation_failed(&errors.fields().collect::<Vec<_>>());
        AppError::from(errors)
    })?;

    let (result, elapsed) = state.predictor.predict_timed(&reading);
    state
        .metrics
        .observe_prediction_latency(elapsed.as_secs_f64());
    update_predictor_health(&state, result.as_ref().err()).await;

    match result {
        Ok(response) => {
            state.metrics.inc_predictions(&response.prediction_label);
            state.logger.log_prediction(
                &response.prediction_label,
                response.confidence(),
                elapsed.as_micros(),
            );
            Ok(Json(response))
        }
        Err(err) => {
            state.metrics.inc_prediction_failures(err.kind());
            state.logger.log_prediction_failed(err.kind(), &err.to_string());
            Err(err.into())
        }
    }
}

/// Degrade the predictor component on inference failures or sustained slowness
async fn update_predictor_health(state: &AppState, error: Option<&PredictError>) {
    let stats = state.predictor.stats();
    let health = match error {
        Some(err) => ComponentHealth::degraded(format!("last prediction failed: {}", err)),
        None if stats.is_slow() => ComponentHealth::degraded(format!(
            "{} of {} predictions exceeded {}ms",
            stats.slow_predictions, stats.total_predictions, SLOW_PREDICTION_MS
        )),
        None => ComponentHealth::healthy(),
    };

    let current = state.health_registry.status(components::PREDICTOR).await;
    if health.status == ComponentStatus::Healthy && current == Some(ComponentStatus::Healthy) {
        return;
    }
    state
        .health_registry
        .update(components::PREDICTOR, health)
        .await;
}

async fn faults() -> Json<Vec<MaintenanceAdvice>> {
    Json(fault_catalog())
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> AppResult<impl IntoResponse> {
    let text = state.metrics.render()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        text,
    ))
}

/// CORS policy for the configured browser origins
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin {:?}", o))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/healthz", get(liveness))
        .route("/readyz", get(readyz))
        .route("/predict", post(predict))
        .route("/faults", get(faults))
        .route("/metrics", get(metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router until `shutdown` resolves
pub async fn serve(
    addr: &str,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(addr = %addr, "Starting API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
