//! Error types for validation, artifact loading and prediction

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Message returned for every request while artifacts are unavailable
pub const ARTIFACTS_UNAVAILABLE_MESSAGE: &str =
    "Model artifacts not loaded. Please ensure notebooks have been run to generate model files.";

/// Why a single input field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Missing,
    NotANumber,
    InvalidBody,
}

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::Missing,
            message: "Field required".to_string(),
        }
    }

    pub fn not_a_number(field: &str, found: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: FieldErrorKind::NotANumber,
            message: format!("Input should be a valid number, got {}", found),
        }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self {
            field: "body".to_string(),
            kind: FieldErrorKind::InvalidBody,
            message: message.into(),
        }
    }
}

/// All field errors found in one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.errors.len())?;
        for (i, e) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{} ({})", sep, e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Failure to load the artifact set
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact}: feature columns differ from the service schema at position {position}")]
    SchemaMismatch { artifact: String, position: usize },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("{artifact}: {reason}")]
    Invalid { artifact: String, reason: String },
}

impl ArtifactError {
    pub fn invalid(artifact: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            artifact: artifact.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure of a prediction request after validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    #[error("{}", ARTIFACTS_UNAVAILABLE_MESSAGE)]
    ArtifactsUnavailable,

    #[error("Prediction failed: {0}")]
    Inference(String),
}

impl PredictError {
    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::ArtifactsUnavailable => "artifacts_unavailable",
            PredictError::Inference(_) => "inference",
        }
    }
}
