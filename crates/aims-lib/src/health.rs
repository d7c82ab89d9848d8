//! Component health tracking for liveness and readiness probes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Operational with reduced capability
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Healthy => "healthy",
            ComponentStatus::Degraded => "degraded",
            ComponentStatus::Unhealthy => "unhealthy",
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Unhealthy, Some(message.into()))
    }

    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Liveness body; independent of artifact state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

impl LivenessResponse {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            message: "AIMS API is running".to_string(),
            version: version.into(),
            status: "healthy".to_string(),
        }
    }
}

/// Readiness body with per-component detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub components: BTreeMap<String, ComponentHealth>,
}

/// Overall status: the worst of the component statuses
pub fn overall_status(components: &BTreeMap<String, ComponentHealth>) -> ComponentStatus {
    let mut has_degraded = false;
    for health in components.values() {
        match health.status {
            ComponentStatus::Unhealthy => return ComponentStatus::Unhealthy,
            ComponentStatus::Degraded => has_degraded = true,
            ComponentStatus::Healthy => {}
        }
    }
    if has_degraded {
        ComponentStatus::Degraded
    } else {
        ComponentStatus::Healthy
    }
}

/// Component names for health tracking
pub mod components {
    pub const ARTIFACTS: &str = "artifacts";
    pub const PREDICTOR: &str = "predictor";
}

/// Shared registry of component health
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<BTreeMap<String, ComponentHealth>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        let mut components = self.components.write().await;
        components.insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    pub async fn status(&self, name: &str) -> Option<ComponentStatus> {
        self.components.read().await.get(name).map(|h| h.status)
    }

    /// Ready once a component is registered and none is unhealthy
    pub async fn readiness(&self) -> ReadinessResponse {
        let components = self.components.read().await.clone();
        let status = overall_status(&components);

        let reason = if components.is_empty() {
            Some("No components registered".to_string())
        } else if status == ComponentStatus::Unhealthy {
            components
                .iter()
                .find(|(_, h)| h.status == ComponentStatus::Unhealthy)
                .map(|(name, h)| match &h.message {
                    Some(message) => format!("{}: {}", name, message),
                    None => format!("{} unhealthy", name),
                })
        } else {
            None
        };

        ReadinessResponse {
            ready: !components.is_empty() && status.is_operational(),
            status,
            reason,
            components,
        }
    }
}
