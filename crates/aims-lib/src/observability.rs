//! Observability for the diagnosis service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes by label and failure kind, artifact state)
//! - Structured JSON logging events with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions: IntCounterVec,
    prediction_failures: IntCounterVec,
    validation_failures: IntCounter,
    artifacts_loaded: IntGauge,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "aims_prediction_latency_seconds",
                "Time spent scaling, classifying and explaining one reading",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions: register_int_counter_vec!(
                "aims_predictions_total",
                "Predictions served, by predicted fault category",
                &["label"]
            )
            .expect("Failed to register predictions_total"),

            prediction_failures: register_int_counter_vec!(
                "aims_prediction_failures_total",
                "Prediction requests that failed after validation",
                &["kind"]
            )
            .expect("Failed to register prediction_failures_total"),

            validation_failures: register_int_counter!(
                "aims_validation_failures_total",
                "Prediction requests rejected by input validation"
            )
            .expect("Failed to register validation_failures_total"),

            artifacts_loaded: register_int_gauge!(
                "aims_artifacts_loaded",
                "1 when the model artifacts are loaded, 0 otherwise"
            )
            .expect("Failed to register artifacts_loaded"),
        }
    }
}

/// Handle to the global service metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, label: &str) {
        self.inner().predictions.with_label_values(&[label]).inc();
    }

    pub fn inc_prediction_failures(&self, kind: &str) {
        self.inner()
            .prediction_failures
            .with_label_values(&[kind])
            .inc();
    }

    pub fn inc_validation_failures(&self) {
        self.inner().validation_failures.inc();
    }

    pub fn set_artifacts_loaded(&self, loaded: bool) {
        self.inner().artifacts_loaded.set(i64::from(loaded));
    }

    /// Render the default registry in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, addr: &str, artifacts_loaded: bool) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            addr = %addr,
            artifacts_loaded = artifacts_loaded,
            "AIMS API started"
        );
    }

    pub fn log_artifacts_loaded(&self, dir: &str) {
        info!(
            event = "artifacts_loaded",
            service = %self.service,
            dir = %dir,
            "Model artifacts loaded"
        );
    }

    /// Logged once at startup; every prediction will fail until restart
    pub fn log_artifacts_unavailable(&self, dir: &str, reason: &str) {
        warn!(
            event = "artifacts_unavailable",
            service = %self.service,
            dir = %dir,
            reason = %reason,
            "Model artifacts not loaded, predictions disabled"
        );
    }

    pub fn log_prediction(&self, label: &str, confidence: f64, latency_us: u128) {
        info!(
            event = "prediction",
            service = %self.service,
            label = %label,
            confidence = confidence,
            latency_us = latency_us as u64,
            "Fault prediction served"
        );
    }

    pub fn log_prediction_failed(&self, kind: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service,
            kind = %kind,
            error = %error,
            "Prediction failed"
        );
    }

    pub fn log_validation_failed(&self, fields: &[&str]) {
        info!(
            event = "validation_failed",
            service = %self.service,
            fields = ?fields,
            "Rejected sensor payload"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "AIMS API shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_metrics_render() {
        let metrics = ServiceMetrics::new();
        metrics.observe_prediction_latency(0.0004);
        metrics.inc_predictions("Normal");
        metrics.inc_prediction_failures("inference");
        metrics.set_artifacts_loaded(true);

        let text = metrics.render().unwrap();
        assert!(text.contains("aims_prediction_latency_seconds"));
        assert!(text.contains("aims_validation_failures_total"));
        assert!(text.contains("aims_predictions_total{label=\"Normal\"}"));
        assert!(text.contains("aims_artifacts_loaded"));
    }

    fn validation_failures(metrics: &ServiceMetrics) -> u64 {
        metrics
            .render()
            .unwrap()
            .lines()
            .find_map(|line| line.strip_prefix("aims_validation_failures_total "))
            .map(|value| value.trim().parse().unwrap())
            .unwrap()
    }

    #[test]
    fn test_handles_share_metrics() {
        let a = ServiceMetrics::new();
        let b = a.clone();
        let before = validation_failures(&a);

        a.inc_validation_failures();
        b.inc_validation_failures();

        assert_eq!(validation_failures(&b), before + 2);
        assert_eq!(validation_failures(&ServiceMetrics::new()), before + 2);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("aims-api");
        assert_eq!(logger.service, "aims-api");
    }
}
