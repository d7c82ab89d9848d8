//! Demo artifact set for tests and local runs
//!
//! A small hand-built ensemble of one stump per rule over the standardized
//! features. It reproduces the qualitative behaviour of the trained model on
//! the demo scenarios: nominal readings score Normal with high confidence,
//! a hot oil sump leans toward lubrication degradation without certainty,
//! and low boost pressure with hot exhaust and heavy vibration is a clear
//! turbocharger fault.

use crate::artifacts::{
    compute_checksum, Artifacts, ClassifierArtifact, EnsembleArtifact, Manifest, Node,
    OutputLayout, StandardScaler, StandardScalerArtifact, Tree, TreeEnsemble, TreeExplainer,
    TreeExplainerArtifact, CLASSIFIER_FILE, EXPLAINER_FILE, MANIFEST_FILE, PREPROCESSOR_FILE,
};
use crate::schema::{FEATURE_NAMES, NUM_CLASSES};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const MEAN: [f64; 18] = [
    950.0, 70.0, 120.0, 2.5, 25.0, 75.0, 3.5, 0.05, 0.05, 0.05, 145.0, 420.0, 145.0, 420.0, 145.0,
    420.0, 145.0, 420.0,
];

const SCALE: [f64; 18] = [
    50.0, 10.0, 10.0, 0.3, 5.0, 8.0, 0.4, 0.03, 0.03, 0.03, 8.0, 25.0, 8.0, 25.0, 8.0, 25.0, 8.0,
    25.0,
];

/// (class, feature, threshold, value at or below, value above)
const STUMPS: [(usize, usize, f64, f64, f64); 10] = [
    (0, 5, 1.5, 3.0, -1.0),
    (0, 7, 2.0, 1.0, -3.0),
    (1, 2, 3.0, -2.0, 2.0),
    (2, 4, 3.0, -2.0, 2.0),
    (3, 3, -1.5, 4.0, -2.0),
    (3, 11, 1.5, -0.5, 1.5),
    (4, 8, 10.0, -2.0, 2.0),
    (5, 5, 1.5, -2.0, 1.0),
    (6, 3, -4.0, 2.0, -2.0),
    (7, 7, 2.0, -2.0, 2.0),
];

fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

fn stump(class_index: usize, feature: usize, threshold: f64, left: f64, right: f64) -> Tree {
    Tree {
        class_index,
        nodes: vec![
            Node::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
                cover: 1000.0,
            },
            Node::Leaf {
                value: left,
                cover: 900.0,
            },
            Node::Leaf {
                value: right,
                cover: 100.0,
            },
        ],
    }
}

pub fn scaler_artifact() -> StandardScalerArtifact {
    StandardScalerArtifact {
        kind: StandardScaler::KIND.to_string(),
        feature_names: feature_names(),
        mean: MEAN.to_vec(),
        scale: SCALE.to_vec(),
    }
}

pub fn ensemble_artifact() -> EnsembleArtifact {
    EnsembleArtifact {
        feature_names: feature_names(),
        num_class: NUM_CLASSES,
        base_score: vec![0.0; NUM_CLASSES],
        trees: STUMPS
            .iter()
            .map(|&(class, feature, threshold, left, right)| {
                stump(class, feature, threshold, left, right)
            })
            .collect(),
    }
}

pub fn classifier_artifact() -> ClassifierArtifact {
    ClassifierArtifact {
        kind: TreeEnsemble::KIND.to_string(),
        model: ensemble_artifact(),
    }
}

pub fn explainer_artifact(layout: OutputLayout) -> TreeExplainerArtifact {
    TreeExplainerArtifact {
        kind: TreeExplainer::KIND.to_string(),
        feature_names: feature_names(),
        output_layout: layout,
        model: ensemble_artifact(),
    }
}

/// In-memory demo artifacts
pub fn demo_artifacts(layout: OutputLayout) -> Result<Artifacts> {
    let scaler = StandardScaler::from_artifact(scaler_artifact())?;
    let classifier = TreeEnsemble::from_artifact("classifier", ensemble_artifact())?;
    let explainer = TreeExplainer::from_artifact(explainer_artifact(layout))?;
    Ok(Artifacts::new(scaler, classifier, explainer))
}

/// Write the demo artifact files and their manifest into `dir`
pub fn write_demo_artifacts(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let files = [
        (PREPROCESSOR_FILE, serde_json::to_vec_pretty(&scaler_artifact())?),
        (CLASSIFIER_FILE, serde_json::to_vec_pretty(&classifier_artifact())?),
        (
            EXPLAINER_FILE,
            serde_json::to_vec_pretty(&explainer_artifact(OutputLayout::PerClass))?,
        ),
    ];

    let mut manifest = Manifest::default();
    for (name, bytes) in &files {
        let path = dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        manifest
            .files
            .insert(name.to_string(), compute_checksum(bytes));
    }
    fs::write(
        dir.join(MANIFEST_FILE),
        serde_json::to_vec_pretty(&manifest)?,
    )?;
    Ok(())
}
