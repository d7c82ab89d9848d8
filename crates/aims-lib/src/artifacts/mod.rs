//! Artifact loading
//!
//! The offline export step writes three JSON artifacts (scaler, classifier,
//! explainer) into one directory, optionally with a `manifest.json` holding
//! their SHA-256 checksums. They are loaded once at startup; any failure
//! leaves the whole set unavailable.

mod ensemble;
mod explainer;
mod scaler;
mod treeshap;

pub use ensemble::{argmax, ClassifierArtifact, EnsembleArtifact, Node, Tree, TreeEnsemble};
pub use explainer::{OutputLayout, TreeExplainer, TreeExplainerArtifact};
pub use scaler::{StandardScaler, StandardScalerArtifact};
pub use treeshap::tree_shap;

use crate::error::ArtifactError;
use crate::predictor::{Classifier, Explainer, Scaler};
use crate::schema::{feature_order_mismatch, NUM_CLASSES};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const EXPLAINER_FILE: &str = "shap_explainer.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Checksums of the artifact files, keyed by file name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
}

/// The loaded scaler, classifier and explainer
pub struct Artifacts {
    pub scaler: Box<dyn Scaler>,
    pub classifier: Box<dyn Classifier>,
    pub explainer: Box<dyn Explainer>,
}

impl Artifacts {
    pub fn new(
        scaler: impl Scaler + 'static,
        classifier: impl Classifier + 'static,
        explainer: impl Explainer + 'static,
    ) -> Self {
        Self {
            scaler: Box::new(scaler),
            classifier: Box::new(classifier),
            explainer: Box::new(explainer),
        }
    }
}

impl std::fmt::Debug for Artifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifacts")
            .field("num_classes", &self.classifier.num_classes())
            .finish_non_exhaustive()
    }
}

/// Process-wide artifact state, fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub enum ArtifactState {
    Loaded(Arc<Artifacts>),
    Unavailable { reason: String },
}

impl ArtifactState {
    /// Load from `dir`, degrading to `Unavailable` on any failure
    pub fn load(dir: &Path) -> Self {
        match load_artifacts(dir) {
            Ok(artifacts) => {
                debug!(dir = %dir.display(), "Artifact directory loaded");
                Self::Loaded(Arc::new(artifacts))
            }
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "Artifact directory rejected");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn artifacts(&self) -> Option<&Arc<Artifacts>> {
        match self {
            Self::Loaded(artifacts) => Some(artifacts),
            Self::Unavailable { .. } => None,
        }
    }
}

impl From<Artifacts> for ArtifactState {
    fn from(artifacts: Artifacts) -> Self {
        Self::Loaded(Arc::new(artifacts))
    }
}

/// Load and validate all three artifacts from `dir`
pub fn load_artifacts(dir: &Path) -> Result<Artifacts, ArtifactError> {
    let manifest = read_manifest(dir)?;

    let scaler: StandardScalerArtifact = read_artifact(dir, PREPROCESSOR_FILE, &manifest)?;
    check_schema("preprocessor", &scaler.feature_names)?;
    let scaler = StandardScaler::from_artifact(scaler)?;

    let classifier: ClassifierArtifact = read_artifact(dir, CLASSIFIER_FILE, &manifest)?;
    if classifier.kind != TreeEnsemble::KIND {
        return Err(ArtifactError::invalid(
            "classifier",
            format!("unsupported kind {:?}", classifier.kind),
        ));
    }
    check_schema("classifier", &classifier.model.feature_names)?;
    check_classes("classifier", classifier.model.num_class)?;
    let classifier = TreeEnsemble::from_artifact("classifier", classifier.model)?;

    let explainer: TreeExplainerArtifact = read_artifact(dir, EXPLAINER_FILE, &manifest)?;
    check_schema("shap_explainer", &explainer.feature_names)?;
    check_classes("shap_explainer", explainer.model.num_class)?;
    let explainer = TreeExplainer::from_artifact(explainer)?;

    debug!(
        trees = classifier.trees().len(),
        layout = ?explainer.layout(),
        "Artifact set validated"
    );
    Ok(Artifacts::new(scaler, classifier, explainer))
}

/// Compute the SHA-256 checksum of data as lowercase hex
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn read_file(path: PathBuf) -> Result<Vec<u8>, ArtifactError> {
    fs::read(&path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ArtifactError::NotFound(path)
        } else {
            ArtifactError::Io { path, source }
        }
    })
}

fn read_manifest(dir: &Path) -> Result<Option<Manifest>, ArtifactError> {
    let path = dir.join(MANIFEST_FILE);
    match read_file(path.clone()) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ArtifactError::Parse { path, source }),
        Err(ArtifactError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn read_artifact<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
    manifest: &Option<Manifest>,
) -> Result<T, ArtifactError> {
    let path = dir.join(file);
    let bytes = read_file(path.clone())?;

    if let Some(expected) = manifest.as_ref().and_then(|m| m.files.get(file)) {
        let actual = compute_checksum(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ArtifactError::ChecksumMismatch {
                file: file.to_string(),
                expected: expected.clone(),
                actual,
            });
        }
    }

    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse { path, source })
}

fn check_schema(artifact: &str, names: &[String]) -> Result<(), ArtifactError> {
    match feature_order_mismatch(names) {
        Some(position) => Err(ArtifactError::SchemaMismatch {
            artifact: artifact.to_string(),
            position,
        }),
        None => Ok(()),
    }
}

fn check_classes(artifact: &str, num_class: usize) -> Result<(), ArtifactError> {
    if num_class != NUM_CLASSES {
        return Err(ArtifactError::invalid(
            artifact,
            format!("model scores {} classes, expected {}", num_class, NUM_CLASSES),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use serde_json::Value;
    use tempfile::TempDir;

    fn demo_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fixtures::write_demo_artifacts(dir.path()).unwrap();
        dir
    }

    fn edit_json(path: &Path, edit: impl FnOnce(&mut Value)) {
        let mut value: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        edit(&mut value);
        fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_load_demo_artifacts() {
        let dir = demo_dir();
        let artifacts = load_artifacts(dir.path()).unwrap();
        assert_eq!(artifacts.classifier.num_classes(), NUM_CLASSES);
        assert!(ArtifactState::load(dir.path()).is_loaded());
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = load_artifacts(&missing).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));

        let state = ArtifactState::load(&missing);
        assert!(!state.is_loaded());
        assert!(state.artifacts().is_none());
    }

    #[test]
    fn test_missing_single_file_is_unavailable() {
        let dir = demo_dir();
        fs::remove_file(dir.path().join(EXPLAINER_FILE)).unwrap();
        match load_artifacts(dir.path()).unwrap_err() {
            ArtifactError::NotFound(path) => assert!(path.ends_with(EXPLAINER_FILE)),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_reordered_features_rejected() {
        let dir = demo_dir();
        fs::remove_file(dir.path().join(MANIFEST_FILE)).unwrap();
        edit_json(&dir.path().join(PREPROCESSOR_FILE), |v| {
            v["feature_names"].as_array_mut().unwrap().swap(0, 1);
        });
        match load_artifacts(dir.path()).unwrap_err() {
            ArtifactError::SchemaMismatch { artifact, position } => {
                assert_eq!(artifact, "preprocessor");
                assert_eq!(position, 0);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_wrong_class_count_rejected() {
        let dir = demo_dir();
        fs::remove_file(dir.path().join(MANIFEST_FILE)).unwrap();
        edit_json(&dir.path().join(CLASSIFIER_FILE), |v| {
            v["num_class"] = 7.into();
            v["base_score"].as_array_mut().unwrap().pop();
            v["trees"]
                .as_array_mut()
                .unwrap()
                .retain(|t| t["class_index"].as_u64() != Some(7));
        });
        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(err.to_string().contains("7 classes"));
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let dir = demo_dir();
        edit_json(&dir.path().join(CLASSIFIER_FILE), |v| {
            v["base_score"][0] = 0.5.into();
        });
        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::ChecksumMismatch { ref file, .. } if file == CLASSIFIER_FILE));
    }

    #[test]
    fn test_manifest_is_optional() {
        let dir = demo_dir();
        fs::remove_file(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(load_artifacts(dir.path()).is_ok());
    }

    #[test]
    fn test_malformed_json_rejected() {
        let dir = demo_dir();
        fs::remove_file(dir.path().join(MANIFEST_FILE)).unwrap();
        fs::write(dir.path().join(PREPROCESSOR_FILE), b"{not json").unwrap();
        assert!(matches!(
            load_artifacts(dir.path()).unwrap_err(),
            ArtifactError::Parse { .. }
        ));
    }

    #[test]
    fn test_compute_checksum() {
        assert_eq!(
            compute_checksum(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
