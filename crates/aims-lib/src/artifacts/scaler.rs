//! Standard scaler artifact

use crate::error::ArtifactError;
use crate::predictor::Scaler;
use anyhow::{bail, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Serialized form of a fitted standard scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScalerArtifact {
    pub kind: String,
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Zero-mean, unit-variance feature scaling
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub const KIND: &'static str = "standard_scaler";

    pub fn from_artifact(artifact: StandardScalerArtifact) -> Result<Self, ArtifactError> {
        let name = "preprocessor";
        if artifact.kind != Self::KIND {
            return Err(ArtifactError::invalid(
                name,
                format!("expected kind {:?}, found {:?}", Self::KIND, artifact.kind),
            ));
        }
        let n = artifact.feature_names.len();
        if artifact.mean.len() != n || artifact.scale.len() != n {
            return Err(ArtifactError::invalid(
                name,
                format!(
                    "mean has {} and scale has {} entries for {} features",
                    artifact.mean.len(),
                    artifact.scale.len(),
                    n
                ),
            ));
        }
        if artifact
            .mean
            .iter()
            .chain(artifact.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ArtifactError::invalid(name, "non-finite scaling parameter"));
        }

        // Constant columns were fitted with zero variance; leave them unscaled
        let scale = artifact
            .scale
            .iter()
            .map(|&s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self {
            mean: Array1::from_vec(artifact.mean),
            scale: Array1::from_vec(scale),
        })
    }

    pub fn num_features(&self) -> usize {
        self.mean.len()
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if rows.ncols() != self.num_features() {
            bail!(
                "scaler expects {} features, got {}",
                self.num_features(),
                rows.ncols()
            );
        }
        let mean = self.mean.view().insert_axis(Axis(0));
        let scale = self.scale.view().insert_axis(Axis(0));
        Ok((&rows - &mean) / &scale)
    }
}
