//! Explainer output shapes

use anyhow::{bail, Result};
use ndarray::{s, Array2, Array3};

/// Attribution values as returned by an explainer
///
/// Explainers either hand back one `[samples, features]` matrix per class,
/// or a single tensor indexed `[sample, feature, class]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribution {
    PerClass(Vec<Array2<f64>>),
    Stacked(Array3<f64>),
}

impl Attribution {
    /// Number of classes present in the output
    pub fn num_classes(&self) -> usize {
        match self {
            Attribution::PerClass(matrices) => matrices.len(),
            Attribution::Stacked(tensor) => tensor.dim().2,
        }
    }

    /// Attribution vector of one sample toward one class
    pub fn for_class(&self, sample: usize, class: usize) -> Result<Vec<f64>> {
        match self {
            Attribution::PerClass(matrices) => {
                let Some(matrix) = matrices.get(class) else {
                    bail!(
                        "explainer returned {} class matrices, class {} requested",
                        matrices.len(),
                        class
                    );
                };
                if sample >= matrix.nrows() {
                    bail!(
                        "explainer returned {} samples, sample {} requested",
                        matrix.nrows(),
                        sample
                    );
                }
                Ok(matrix.row(sample).to_vec())
            }
            Attribution::Stacked(tensor) => {
                let (samples, _, classes) = tensor.dim();
                if sample >= samples || class >= classes {
                    bail!(
                        "explainer returned shape {:?}, sample {} class {} requested",
                        tensor.dim(),
                        sample,
                        class
                    );
                }
                Ok(tensor.slice(s![sample, .., class]).to_vec())
            }
        }
    }

    /// Convert to the per-class layout
    pub fn into_per_class(self) -> Vec<Array2<f64>> {
        match self {
            Attribution::PerClass(matrices) => matrices,
            Attribution::Stacked(tensor) => {
                let classes = tensor.dim().2;
                (0..classes)
                    .map(|k| tensor.slice(s![.., .., k]).to_owned())
                    .collect()
            }
        }
    }

    /// Convert to the stacked `[sample, feature, class]` layout
    pub fn into_stacked(self) -> Result<Array3<f64>> {
        match self {
            Attribution::Stacked(tensor) => Ok(tensor),
            Attribution::PerClass(matrices) => {
                let Some(first) = matrices.first() else {
                    bail!("explainer returned no class matrices");
                };
                let (samples, features) = first.dim();
                let mut tensor = Array3::zeros((samples, features, matrices.len()));
                for (k, matrix) in matrices.iter().enumerate() {
                    if matrix.dim() != (samples, features) {
                        bail!(
                            "class {} matrix has shape {:?}, expected {:?}",
                            k,
                            matrix.dim(),
                            (samples, features)
                        );
                    }
                    tensor.slice_mut(s![.., .., k]).assign(matrix);
                }
                Ok(tensor)
            }
        }
    }
}
