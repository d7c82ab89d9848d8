//! Fault prediction pipeline
//!
//! The three artifact roles are expressed as traits so the adapter does not
//! care how a scaler, classifier or explainer was produced.

mod attribution;
mod inference;
mod output;

pub use attribution::Attribution;
pub use inference::{FaultPredictor, PredictionStats, SLOW_PREDICTION_MS};
pub use output::OutputFormatter;

use anyhow::Result;
use ndarray::{Array2, ArrayView2};

/// Feature normalization fitted offline
pub trait Scaler: Send + Sync {
    /// Transform a `[samples, features]` matrix
    fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>>;
}

/// Multiclass classifier over scaled rows
pub trait Classifier: Send + Sync {
    /// Number of classes the model scores
    fn num_classes(&self) -> usize;

    /// Predicted class index for each row
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Vec<usize>>;

    /// `[samples, classes]` probability matrix
    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>>;
}

/// Per-feature attribution for scaled rows
pub trait Explainer: Send + Sync {
    fn shap_values(&self, rows: ArrayView2<'_, f64>) -> Result<Attribution>;
}
