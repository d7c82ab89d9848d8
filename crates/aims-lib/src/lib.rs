//! Core library for marine engine fault diagnosis
//!
//! This crate provides:
//! - The sensor reading schema and fault categories
//! - Payload validation
//! - Artifact loading (scaler, tree ensemble classifier, Tree SHAP explainer)
//! - The inference adapter and response formatting
//! - Health checks and observability

pub mod artifacts;
pub mod error;
pub mod fault;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod scenarios;
pub mod schema;
pub mod validation;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use artifacts::{load_artifacts, ArtifactState, Artifacts};
pub use error::{ArtifactError, FieldError, FieldErrorKind, PredictError, ValidationErrors};
pub use fault::{fault_catalog, FaultCategory, MaintenanceAdvice, Priority};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, LivenessResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use predictor::FaultPredictor;
pub use scenarios::DemoScenario;
pub use validation::{validate_body, validate_payload};
