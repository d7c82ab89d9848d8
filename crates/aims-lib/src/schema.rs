//! Model input schema
//!
//! The column order below is the order the offline scaler and classifier
//! were fitted on. Every artifact embeds the same list and is rejected at
//! load time if it differs, so a reordering here is caught before any
//! prediction is served.

use serde::Serialize;

/// Number of sensor features in a model input row
pub const NUM_FEATURES: usize = 18;

/// Number of fault categories produced by the classifier
pub const NUM_CLASSES: usize = 8;

/// Feature names in model column order
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "Shaft_RPM",
    "Engine_Load",
    "Fuel_Flow",
    "Air_Pressure",
    "Ambient_Temp",
    "Oil_Temp",
    "Oil_Pressure",
    "Vibration_X",
    "Vibration_Y",
    "Vibration_Z",
    "Cylinder1_Pressure",
    "Cylinder1_Exhaust_Temp",
    "Cylinder2_Pressure",
    "Cylinder2_Exhaust_Temp",
    "Cylinder3_Pressure",
    "Cylinder3_Exhaust_Temp",
    "Cylinder4_Pressure",
    "Cylinder4_Exhaust_Temp",
];

/// Description of a single sensor feature
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureInfo {
    pub name: &'static str,
    pub unit: &'static str,
    pub description: &'static str,
}

/// Unit and description for every feature, in column order
pub const FEATURES: [FeatureInfo; NUM_FEATURES] = [
    FeatureInfo { name: "Shaft_RPM", unit: "rev/min", description: "Shaft rotational speed" },
    FeatureInfo { name: "Engine_Load", unit: "%", description: "Engine load percentage" },
    FeatureInfo { name: "Fuel_Flow", unit: "L/h", description: "Fuel flow rate" },
    FeatureInfo { name: "Air_Pressure", unit: "bar", description: "Air intake pressure" },
    FeatureInfo { name: "Ambient_Temp", unit: "°C", description: "Ambient temperature" },
    FeatureInfo { name: "Oil_Temp", unit: "°C", description: "Lubrication oil temperature" },
    FeatureInfo { name: "Oil_Pressure", unit: "bar", description: "Lubrication oil pressure" },
    FeatureInfo { name: "Vibration_X", unit: "mm/s", description: "Vibration on the X axis" },
    FeatureInfo { name: "Vibration_Y", unit: "mm/s", description: "Vibration on the Y axis" },
    FeatureInfo { name: "Vibration_Z", unit: "mm/s", description: "Vibration on the Z axis" },
    FeatureInfo { name: "Cylinder1_Pressure", unit: "bar", description: "Cylinder 1 combustion pressure" },
    FeatureInfo { name: "Cylinder1_Exhaust_Temp", unit: "°C", description: "Cylinder 1 exhaust gas temperature" },
    FeatureInfo { name: "Cylinder2_Pressure", unit: "bar", description: "Cylinder 2 combustion pressure" },
    FeatureInfo { name: "Cylinder2_Exhaust_Temp", unit: "°C", description: "Cylinder 2 exhaust gas temperature" },
    FeatureInfo { name: "Cylinder3_Pressure", unit: "bar", description: "Cylinder 3 combustion pressure" },
    FeatureInfo { name: "Cylinder3_Exhaust_Temp", unit: "°C", description: "Cylinder 3 exhaust gas temperature" },
    FeatureInfo { name: "Cylinder4_Pressure", unit: "bar", description: "Cylinder 4 combustion pressure" },
    FeatureInfo { name: "Cylinder4_Exhaust_Temp", unit: "°C", description: "Cylinder 4 exhaust gas temperature" },
];

/// Check an artifact's embedded feature list against the canonical order.
///
/// Returns the first position where the lists disagree.
pub fn feature_order_mismatch<S: AsRef<str>>(names: &[S]) -> Option<usize> {
    if names.len() != NUM_FEATURES {
        return Some(names.len().min(NUM_FEATURES));
    }
    names
        .iter()
        .zip(FEATURE_NAMES.iter())
        .position(|(found, expected)| found.as_ref() != *expected)
}
