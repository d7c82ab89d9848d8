//! Fault categories and maintenance advice

use crate::schema::NUM_CLASSES;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fault category assigned by the classifier, in class index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaultCategory {
    Normal,
    FuelInjectionFault,
    CoolingSystemFault,
    TurbochargerFault,
    BearingWear,
    LubricationOilDegradation,
    AirIntakeRestriction,
    VibrationAnomaly,
}

/// All categories indexed by class
pub const FAULT_CATEGORIES: [FaultCategory; NUM_CLASSES] = [
    FaultCategory::Normal,
    FaultCategory::FuelInjectionFault,
    FaultCategory::CoolingSystemFault,
    FaultCategory::TurbochargerFault,
    FaultCategory::BearingWear,
    FaultCategory::LubricationOilDegradation,
    FaultCategory::AirIntakeRestriction,
    FaultCategory::VibrationAnomaly,
];

impl FaultCategory {
    /// Map a classifier output index to a category
    pub fn from_index(index: usize) -> Option<Self> {
        FAULT_CATEGORIES.get(index).copied()
    }

    /// Look a category up by its human-readable label
    pub fn from_label(label: &str) -> Option<Self> {
        FAULT_CATEGORIES.iter().copied().find(|c| c.label() == label)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn label(&self) -> &'static str {
        match self {
            FaultCategory::Normal => "Normal",
            FaultCategory::FuelInjectionFault => "Fuel Injection Fault",
            FaultCategory::CoolingSystemFault => "Cooling System Fault",
            FaultCategory::TurbochargerFault => "Turbocharger Fault",
            FaultCategory::BearingWear => "Bearing Wear",
            FaultCategory::LubricationOilDegradation => "Lubrication Oil Degradation",
            FaultCategory::AirIntakeRestriction => "Air Intake Restriction",
            FaultCategory::VibrationAnomaly => "Vibration Anomaly",
        }
    }

    /// Maintenance advice for an engine in this state
    pub fn advice(&self) -> MaintenanceAdvice {
        let (priority, title, actions): (Priority, &str, &[&str]) = match self {
            FaultCategory::Normal => (
                Priority::Low,
                "System Operating Normally",
                &[
                    "Continue routine maintenance schedule",
                    "Monitor sensor readings during operation",
                    "Document current operating parameters",
                ][..],
            ),
            FaultCategory::FuelInjectionFault => (
                Priority::Medium,
                "Fuel System Attention Required",
                &[
                    "Inspect fuel injectors for proper spray pattern",
                    "Check fuel filter condition",
                    "Verify fuel pressure and flow rate",
                    "Test fuel quality for contamination",
                ][..],
            ),
            FaultCategory::CoolingSystemFault => (
                Priority::Medium,
                "Cooling System Attention Required",
                &[
                    "Check coolant level and quality",
                    "Inspect heat exchangers for fouling",
                    "Verify cooling pump operation",
                    "Check thermostat operation",
                ][..],
            ),
            FaultCategory::TurbochargerFault => (
                Priority::Critical,
                "Critical: Turbocharger System Issue",
                &[
                    "IMMEDIATE: Inspect turbocharger for damage",
                    "Check exhaust system for restrictions",
                    "Verify air intake system integrity",
                    "Inspect turbine and compressor wheels for damage",
                ][..],
            ),
            FaultCategory::BearingWear => (
                Priority::Critical,
                "Critical: Bearing Inspection Required",
                &[
                    "IMMEDIATE: Reduce engine load and schedule inspection",
                    "Check bearing clearances and wear patterns",
                    "Inspect lubrication system for proper oil delivery",
                    "Prepare for potential bearing replacement",
                ][..],
            ),
            FaultCategory::LubricationOilDegradation => (
                Priority::Medium,
                "Oil System Attention Required",
                &[
                    "Schedule oil analysis and quality testing",
                    "Check oil filter condition and replace if needed",
                    "Inspect oil cooler for proper operation",
                    "Verify oil pressure meets specifications",
                ][..],
            ),
            FaultCategory::AirIntakeRestriction => (
                Priority::Medium,
                "Air Intake System Attention Required",
                &[
                    "Inspect and clean air filters",
                    "Check intake ducting for obstructions",
                    "Verify turbocharger compressor operation",
                    "Inspect intercooler for blockages",
                ][..],
            ),
            FaultCategory::VibrationAnomaly => (
                Priority::Critical,
                "Critical: Excessive Vibration Detected",
                &[
                    "IMMEDIATE: Reduce speed and inspect engine mounts",
                    "Check for loose or damaged components",
                    "Verify shaft alignment and balance",
                    "Inspect coupling and propeller shaft",
                ][..],
            ),
        };

        MaintenanceAdvice {
            category: self.label().to_string(),
            priority,
            title: title.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency of the recommended maintenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::Critical => "critical",
        }
    }
}

/// Recommended actions for one fault category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceAdvice {
    pub category: String,
    pub priority: Priority,
    pub title: String,
    pub actions: Vec<String>,
}

/// Advice for every category, in class index order
pub fn fault_catalog() -> Vec<MaintenanceAdvice> {
    FAULT_CATEGORIES.iter().map(|c| c.advice()).collect()
}
