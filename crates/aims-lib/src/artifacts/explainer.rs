//! Tree SHAP explainer artifact

use super::ensemble::{EnsembleArtifact, TreeEnsemble};
use super::treeshap::tree_shap;
use crate::error::ArtifactError;
use crate::predictor::{Attribution, Explainer};
use anyhow::{bail, Result};
use ndarray::{Array3, ArrayView2};
use serde::{Deserialize, Serialize};

/// Output shape the explainer was exported with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// One `[samples, features]` matrix per class
    PerClass,
    /// One `[samples, features, classes]` tensor
    Stacked,
}

/// Explainer artifact file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeExplainerArtifact {
    pub kind: String,
    pub feature_names: Vec<String>,
    pub output_layout: OutputLayout,
    pub model: EnsembleArtifact,
}

/// Raw-score Tree SHAP over a tree ensemble
#[derive(Debug, Clone)]
pub struct TreeExplainer {
    layout: OutputLayout,
    model: TreeEnsemble,
    expected_value: Vec<f64>,
}

impl TreeExplainer {
    pub const KIND: &'static str = "tree_explainer";

    pub fn from_artifact(artifact: TreeExplainerArtifact) -> Result<Self, ArtifactError> {
        if artifact.kind != Self::KIND {
            return Err(ArtifactError::invalid(
                "shap_explainer",
                format!("expected kind {:?}, found {:?}", Self::KIND, artifact.kind),
            ));
        }
        if artifact.feature_names != artifact.model.feature_names {
            return Err(ArtifactError::invalid(
                "shap_explainer",
                "explainer and model feature names differ",
            ));
        }
        let model = TreeEnsemble::from_artifact("shap_explainer", artifact.model)?;
        Ok(Self::new(model, artifact.output_layout))
    }

    pub fn new(model: TreeEnsemble, layout: OutputLayout) -> Self {
        let mut expected_value = model.base_score().to_vec();
        for tree in model.trees() {
            expected_value[tree.class_index] += tree.expected_value();
        }
        Self {
            layout,
            model,
            expected_value,
        }
    }

    /// Mean raw score per class over the training distribution
    pub fn expected_value(&self) -> &[f64] {
        &self.expected_value
    }

    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    pub fn num_classes(&self) -> usize {
        self.model.num_class()
    }
}

impl Explainer for TreeExplainer {
    fn shap_values(&self, rows: ArrayView2<'_, f64>) -> Result<Attribution> {
        let features = self.model.num_features();
        if rows.ncols() != features {
            bail!("explainer expects {} features, got {}", features, rows.ncols());
        }
        let samples = rows.nrows();
        let classes = self.model.num_class();

        let mut tensor = Array3::<f64>::zeros((samples, features, classes));
        let mut phi = vec![0.0; features];
        for (i, row) in rows.outer_iter().enumerate() {
            for class in 0..classes {
                phi.iter_mut().for_each(|v| *v = 0.0);
                for tree in self.model.trees().iter().filter(|t| t.class_index == class) {
                    tree_shap(tree, row, &mut phi);
                }
                for (j, v) in phi.iter().enumerate() {
                    tensor[[i, j, class]] = *v;
                }
            }
        }

        Ok(match self.layout {
            OutputLayout::Stacked => Attribution::Stacked(tensor),
            OutputLayout::PerClass => {
                Attribution::PerClass(Attribution::Stacked(tensor).into_per_class())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ensemble::{Node, Tree};
    use ndarray::array;

    fn model() -> EnsembleArtifact {
        let stump = |class_index, feature, left, right| Tree {
            class_index,
            nodes: vec![
                Node::Split {
                    feature,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                    cover: 10.0,
                },
                Node::Leaf {
                    value: left,
                    cover: 5.0,
                },
                Node::Leaf {
                    value: right,
                    cover: 5.0,
                },
            ],
        };
        EnsembleArtifact {
            feature_names: vec!["a".to_string(), "b".to_string()],
            num_class: 2,
            base_score: vec![0.5, -0.5],
            trees: vec![stump(0, 0, 1.0, -1.0), stump(0, 1, 2.0, 0.0), stump(1, 1, -3.0, 3.0)],
        }
    }

    fn explainer(layout: OutputLayout) -> TreeExplainer {
        TreeExplainer::from_artifact(TreeExplainerArtifact {
            kind: TreeExplainer::KIND.to_string(),
            feature_names: model().feature_names,
            output_layout: layout,
            model: model(),
        })
        .unwrap()
    }

    #[test]
    fn test_expected_value() {
        let e = explainer(OutputLayout::Stacked);
        assert_eq!(e.expected_value(), &[1.5, -0.5]);
    }

    #[test]
    fn test_layouts_agree() {
        let rows = array![[1.0, -1.0]];
        let stacked = explainer(OutputLayout::Stacked).shap_values(rows.view()).unwrap();
        let per_class = explainer(OutputLayout::PerClass).shap_values(rows.view()).unwrap();

        assert!(matches!(stacked, Attribution::Stacked(_)));
        assert!(matches!(per_class, Attribution::PerClass(_)));
        for class in 0..2 {
            assert_eq!(
                stacked.for_class(0, class).unwrap(),
                per_class.for_class(0, class).unwrap()
            );
        }
    }

    #[test]
    fn test_attributions_sum_to_raw_score() {
        let e = explainer(OutputLayout::Stacked);
        let model = TreeEnsemble::from_artifact("classifier", model()).unwrap();
        let rows = array![[1.0, -1.0], [-2.0, 4.0]];
        let raw = model.raw_scores(rows.view()).unwrap();
        let shap = e.shap_values(rows.view()).unwrap();

        for sample in 0..2 {
            for class in 0..2 {
                let total: f64 = shap.for_class(sample, class).unwrap().iter().sum();
                let reconstructed = e.expected_value()[class] + total;
                assert!((reconstructed - raw[[sample, class]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let err = TreeExplainer::from_artifact(TreeExplainerArtifact {
            kind: "kernel_explainer".to_string(),
            feature_names: model().feature_names,
            output_layout: OutputLayout::Stacked,
            model: model(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("tree_explainer"));
    }
}
