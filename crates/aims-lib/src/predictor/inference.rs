//! Inference adapter
//!
//! Runs one validated reading through scaler, classifier and explainer and
//! hands the raw outputs to the formatter. Any failure along the way is
//! reported as a single error; no partial result is ever returned.

use super::output::OutputFormatter;
use crate::artifacts::{argmax, ArtifactState, Artifacts};
use crate::error::PredictError;
use crate::models::{PredictionResponse, SensorReading};
use crate::schema::{NUM_CLASSES, NUM_FEATURES};
use anyhow::{bail, Context, Result};
use ndarray::Array2;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Latency above which a single prediction is logged as slow
pub const SLOW_PREDICTION_MS: u128 = 50;

/// Share of slow predictions above which the predictor counts as degraded
const SLOW_PREDICTION_RATIO: f64 = 0.1;

/// Fault predictor over the process-wide artifact state
pub struct FaultPredictor {
    state: ArtifactState,
    formatter: OutputFormatter,
    prediction_count: AtomicU64,
    slow_prediction_count: AtomicU64,
}

impl FaultPredictor {
    pub fn new(state: ArtifactState) -> Self {
        Self {
            state,
            formatter: OutputFormatter::new(),
            prediction_count: AtomicU64::new(0),
            slow_prediction_count: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> &ArtifactState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_loaded()
    }

    /// Classify and explain one reading
    pub fn predict(&self, reading: &SensorReading) -> Result<PredictionResponse, PredictError> {
        self.predict_timed(reading).0
    }

    /// Like [`predict`](Self::predict), also returning the pipeline latency.
    ///
    /// The latency is zero when artifacts are unavailable.
    pub fn predict_timed(
        &self,
        reading: &SensorReading,
    ) -> (Result<PredictionResponse, PredictError>, Duration) {
        let Some(artifacts) = self.state.artifacts() else {
            return (Err(PredictError::ArtifactsUnavailable), Duration::ZERO);
        };

        let start = Instant::now();
        let result = self.run(artifacts, reading);
        let elapsed = start.elapsed();
        self.prediction_count.fetch_add(1, Ordering::Relaxed);

        if elapsed.as_millis() > SLOW_PREDICTION_MS {
            self.slow_prediction_count.fetch_add(1, Ordering::Relaxed);
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Prediction exceeded {}ms", SLOW_PREDICTION_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "Prediction completed");
        }

        let result = result.map_err(|e| PredictError::Inference(format!("{:#}", e)));
        (result, elapsed)
    }

    fn run(&self, artifacts: &Artifacts, reading: &SensorReading) -> Result<PredictionResponse> {
        let row = Array2::from_shape_vec((1, NUM_FEATURES), reading.to_values().to_vec())
            .context("failed to build input row")?;

        let scaled = artifacts
            .scaler
            .transform(row.view())
            .context("scaler transform failed")?;
        if scaled.dim() != (1, NUM_FEATURES) {
            bail!("scaler returned shape {:?}", scaled.dim());
        }
        ensure_finite("scaler output", scaled.iter())?;

        let labels = artifacts
            .classifier
            .predict(scaled.view())
            .context("classifier predict failed")?;
        let proba = artifacts
            .classifier
            .predict_proba(scaled.view())
            .context("classifier predict_proba failed")?;
        if proba.dim() != (1, NUM_CLASSES) {
            bail!("classifier returned probability shape {:?}", proba.dim());
        }
        let probabilities = proba.row(0).to_vec();
        ensure_finite("probabilities", probabilities.iter())?;
        if probabilities.iter().any(|p| *p < 0.0) {
            bail!("classifier returned a negative probability");
        }

        let Some(&class_index) = labels.first() else {
            bail!("classifier returned no label");
        };
        if class_index >= NUM_CLASSES {
            bail!("classifier returned unknown class index {}", class_index);
        }
        let best = argmax(probabilities.iter().copied());
        if probabilities[class_index] < probabilities[best] {
            bail!(
                "classifier label {} disagrees with most probable class {}",
                class_index,
                best
            );
        }

        let attribution = artifacts
            .explainer
            .shap_values(scaled.view())
            .context("explainer failed")?;
        let attributions = attribution
            .for_class(0, class_index)
            .context("unexpected explainer output")?;
        ensure_finite("attributions", attributions.iter())?;

        self.formatter.format(class_index, &probabilities, &attributions)
    }

    pub fn stats(&self) -> PredictionStats {
        PredictionStats {
            total_predictions: self.prediction_count.load(Ordering::Relaxed),
            slow_predictions: self.slow_prediction_count.load(Ordering::Relaxed),
        }
    }
}

/// Prediction counters since startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionStats {
    pub total_predictions: u64,
    pub slow_predictions: u64,
}

impl PredictionStats {
    /// Whether too many predictions so far exceeded the slow threshold
    pub fn is_slow(&self) -> bool {
        self.total_predictions > 0
            && self.slow_predictions as f64 / self.total_predictions as f64 > SLOW_PREDICTION_RATIO
    }
}

fn ensure_finite<'a>(what: &str, mut values: impl Iterator<Item = &'a f64>) -> Result<()> {
    if values.any(|v| !v.is_finite()) {
        bail!("{} contain non-finite values", what);
    }
    Ok(())
}
