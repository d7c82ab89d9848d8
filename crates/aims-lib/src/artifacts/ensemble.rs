//! Gradient-boosted multiclass tree ensemble
//!
//! Each class owns a set of regression trees. A class's raw score is its
//! base score plus the sum of its tree outputs; probabilities are the
//! softmax of the raw scores.

use crate::error::ArtifactError;
use crate::predictor::Classifier;
use anyhow::{bail, Result};
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// A tree node in flat array form; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl Node {
    pub fn cover(&self) -> f64 {
        match self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => *cover,
        }
    }
}

/// One regression tree contributing to a single class score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub class_index: usize,
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Leaf value reached by `row`; `x <= threshold` descends left
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Cover-weighted mean of the leaf values
    pub fn expected_value(&self) -> f64 {
        self.expected_from(0)
    }

    fn expected_from(&self, index: usize) -> f64 {
        match &self.nodes[index] {
            Node::Leaf { value, .. } => *value,
            Node::Split {
                left, right, cover, ..
            } => {
                let l = &self.nodes[*left];
                let r = &self.nodes[*right];
                (l.cover() * self.expected_from(*left) + r.cover() * self.expected_from(*right))
                    / cover
            }
        }
    }

    fn check(&self, num_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        if self.nodes[0].cover() <= 0.0 {
            return Err("root cover must be positive".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if !(node.cover() >= 0.0) {
                return Err(format!("node {} has invalid cover {}", i, node.cover()));
            }
            match node {
                Node::Leaf { value, .. } if !value.is_finite() => {
                    return Err(format!("node {} has non-finite value", i));
                }
                Node::Split {
                    feature,
                    left,
                    right,
                    cover,
                    ..
                } => {
                    if *feature >= num_features {
                        return Err(format!("node {} splits on unknown feature {}", i, feature));
                    }
                    // Children after their parent guarantees the walk terminates
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", i, child));
                        }
                    }
                    if *cover <= 0.0 {
                        return Err(format!("split node {} has zero cover", i));
                    }
                }
                Node::Leaf { .. } => {}
            }
        }
        Ok(())
    }
}

/// Serialized ensemble, shared by the classifier and explainer artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleArtifact {
    pub feature_names: Vec<String>,
    pub num_class: usize,
    pub base_score: Vec<f64>,
    pub trees: Vec<Tree>,
}

/// Classifier artifact file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub kind: String,
    #[serde(flatten)]
    pub model: EnsembleArtifact,
}

/// A validated tree ensemble
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    num_features: usize,
    num_class: usize,
    base_score: Vec<f64>,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Artifact kind of a serialized classifier
    pub const KIND: &'static str = "gradient_boosting_classifier";

    pub fn from_artifact(name: &str, artifact: EnsembleArtifact) -> Result<Self, ArtifactError> {
        let num_features = artifact.feature_names.len();
        if artifact.num_class == 0 {
            return Err(ArtifactError::invalid(name, "num_class must be positive"));
        }
        if artifact.base_score.len() != artifact.num_class {
            return Err(ArtifactError::invalid(
                name,
                format!(
                    "base_score has {} entries for {} classes",
                    artifact.base_score.len(),
                    artifact.num_class
                ),
            ));
        }
        for (t, tree) in artifact.trees.iter().enumerate() {
            if tree.class_index >= artifact.num_class {
                return Err(ArtifactError::invalid(
                    name,
                    format!("tree {} targets unknown class {}", t, tree.class_index),
                ));
            }
            tree.check(num_features)
                .map_err(|reason| ArtifactError::invalid(name, format!("tree {}: {}", t, reason)))?;
        }

        Ok(Self {
            num_features,
            num_class: artifact.num_class,
            base_score: artifact.base_score,
            trees: artifact.trees,
        })
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_class(&self) -> usize {
        self.num_class
    }

    pub fn base_score(&self) -> &[f64] {
        &self.base_score
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    fn check_width(&self, rows: &ArrayView2<'_, f64>) -> Result<()> {
        if rows.ncols() != self.num_features {
            bail!(
                "model expects {} features, got {}",
                self.num_features,
                rows.ncols()
            );
        }
        Ok(())
    }

    /// `[samples, classes]` raw scores
    pub fn raw_scores(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_width(&rows)?;
        let mut scores = Array2::zeros((rows.nrows(), self.num_class));
        for (i, row) in rows.outer_iter().enumerate() {
            for (k, base) in self.base_score.iter().enumerate() {
                scores[[i, k]] = *base;
            }
            for tree in &self.trees {
                scores[[i, tree.class_index]] += tree.predict(row);
            }
        }
        Ok(scores)
    }
}

impl Classifier for TreeEnsemble {
    fn num_classes(&self) -> usize {
        self.num_class
    }

    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(rows)?;
        Ok(proba.outer_iter().map(|p| argmax(p.iter().copied())).collect())
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let mut scores = self.raw_scores(rows)?;
        for mut row in scores.outer_iter_mut() {
            let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            row.mapv_inplace(|s| (s - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|e| e / sum);
        }
        Ok(scores)
    }
}

/// Index of the largest value; the first one wins ties
pub fn argmax(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(class_index: usize, feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
        Tree {
            class_index,
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                    cover: 100.0,
                },
                Node::Leaf {
                    value: left,
                    cover: 75.0,
                },
                Node::Leaf {
                    value: right,
                    cover: 25.0,
                },
            ],
        }
    }

    fn two_class_model() -> TreeEnsemble {
        TreeEnsemble::from_artifact(
            "classifier",
            EnsembleArtifact {
                feature_names: vec!["a".to_string(), "b".to_string()],
                num_class: 2,
                base_score: vec![0.0, 0.5],
                trees: vec![stump(0, 0, 1.0, 2.0, -1.0), stump(1, 1, 0.0, -1.0, 1.0)],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_tree_routing() {
        let tree = stump(0, 0, 1.0, 2.0, -1.0);
        assert_eq!(tree.predict(array![1.0, 0.0].view()), 2.0);
        assert_eq!(tree.predict(array![1.5, 0.0].view()), -1.0);
    }

    #[test]
    fn test_expected_value_weighted_by_cover() {
        let tree = stump(0, 0, 1.0, 2.0, -2.0);
        assert!((tree.expected_value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_raw_scores_include_base_score() {
        let model = two_class_model();
        let scores = model.raw_scores(array![[0.0, 1.0]].view()).unwrap();
        assert_eq!(scores, array![[2.0, 1.5]]);
    }

    #[test]
    fn test_probabilities_are_softmax() {
        let model = two_class_model();
        let proba = model.predict_proba(array![[0.0, 1.0], [2.0, -1.0]].view()).unwrap();
        for row in proba.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
            assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        }
        let expected = 1.0 / (1.0 + (-0.5f64).exp());
        assert!((proba[[0, 0]] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_predict_is_argmax() {
        let model = two_class_model();
        let labels = model.predict(array![[0.0, 1.0], [2.0, 1.0]].view()).unwrap();
        assert_eq!(labels, vec![0, 1]);
    }

    #[test]
    fn test_extreme_scores_stay_finite() {
        let model = TreeEnsemble::from_artifact(
            "classifier",
            EnsembleArtifact {
                feature_names: vec!["a".to_string()],
                num_class: 2,
                base_score: vec![800.0, -800.0],
                trees: vec![],
            },
        )
        .unwrap();
        let proba = model.predict_proba(array![[0.0]].view()).unwrap();
        assert!(proba.iter().all(|p| p.is_finite()));
        assert!((proba[[0, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_argmax_prefers_first_on_tie() {
        assert_eq!(argmax([0.2, 0.4, 0.4].into_iter()), 1);
    }

    #[test]
    fn test_cyclic_tree_rejected() {
        let mut tree = stump(0, 0, 1.0, 2.0, -1.0);
        if let Node::Split { left, .. } = &mut tree.nodes[0] {
            *left = 0;
        }
        let err = TreeEnsemble::from_artifact(
            "classifier",
            EnsembleArtifact {
                feature_names: vec!["a".to_string()],
                num_class: 1,
                base_score: vec![0.0],
                trees: vec![tree],
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid child"));
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let err = TreeEnsemble::from_artifact(
            "classifier",
            EnsembleArtifact {
                feature_names: vec!["a".to_string()],
                num_class: 1,
                base_score: vec![0.0],
                trees: vec![stump(0, 3, 1.0, 2.0, -1.0)],
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown feature"));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let model = two_class_model();
        assert!(model.predict_proba(array![[0.0, 1.0, 2.0]].view()).is_err());
    }
}
