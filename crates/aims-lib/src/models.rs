//! Core data models for the diagnosis service

use crate::schema::NUM_FEATURES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One set of engine sensor readings
///
/// Field names are the wire names used by the model's training data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct SensorReading {
    pub Shaft_RPM: f64,
    pub Engine_Load: f64,
    pub Fuel_Flow: f64,
    pub Air_Pressure: f64,
    pub Ambient_Temp: f64,
    pub Oil_Temp: f64,
    pub Oil_Pressure: f64,
    pub Vibration_X: f64,
    pub Vibration_Y: f64,
    pub Vibration_Z: f64,
    pub Cylinder1_Pressure: f64,
    pub Cylinder1_Exhaust_Temp: f64,
    pub Cylinder2_Pressure: f64,
    pub Cylinder2_Exhaust_Temp: f64,
    pub Cylinder3_Pressure: f64,
    pub Cylinder3_Exhaust_Temp: f64,
    pub Cylinder4_Pressure: f64,
    pub Cylinder4_Exhaust_Temp: f64,
}

impl SensorReading {
    /// Build a reading from values in model column order
    pub fn from_values(v: [f64; NUM_FEATURES]) -> Self {
        Self {
            Shaft_RPM: v[0],
            Engine_Load: v[1],
            Fuel_Flow: v[2],
            Air_Pressure: v[3],
            Ambient_Temp: v[4],
            Oil_Temp: v[5],
            Oil_Pressure: v[6],
            Vibration_X: v[7],
            Vibration_Y: v[8],
            Vibration_Z: v[9],
            Cylinder1_Pressure: v[10],
            Cylinder1_Exhaust_Temp: v[11],
            Cylinder2_Pressure: v[12],
            Cylinder2_Exhaust_Temp: v[13],
            Cylinder3_Pressure: v[14],
            Cylinder3_Exhaust_Temp: v[15],
            Cylinder4_Pressure: v[16],
            Cylinder4_Exhaust_Temp: v[17],
        }
    }

    /// Values in model column order (see [`crate::schema::FEATURE_NAMES`])
    pub fn to_values(&self) -> [f64; NUM_FEATURES] {
        [
            self.Shaft_RPM,
            self.Engine_Load,
            self.Fuel_Flow,
            self.Air_Pressure,
            self.Ambient_Temp,
            self.Oil_Temp,
            self.Oil_Pressure,
            self.Vibration_X,
            self.Vibration_Y,
            self.Vibration_Z,
            self.Cylinder1_Pressure,
            self.Cylinder1_Exhaust_Temp,
            self.Cylinder2_Pressure,
            self.Cylinder2_Exhaust_Temp,
            self.Cylinder3_Pressure,
            self.Cylinder3_Exhaust_Temp,
            self.Cylinder4_Pressure,
            self.Cylinder4_Exhaust_Temp,
        ]
    }
}

/// Prediction output returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Human-readable fault label
    pub prediction_label: String,
    /// Probability for each of the fault categories, keyed by label
    pub probabilities: BTreeMap<String, f64>,
    /// Attribution toward the predicted class, keyed by feature name
    pub shap_values: BTreeMap<String, f64>,
}

impl PredictionResponse {
    /// Probability of the predicted label
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .get(&self.prediction_label)
            .copied()
            .unwrap_or(0.0)
    }

    /// Labels sorted by descending probability
    pub fn ranked_probabilities(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .probabilities
            .iter()
            .map(|(label, p)| (label.as_str(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// The `n` features with the largest attribution magnitude
    pub fn top_features(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .shap_values
            .iter()
            .map(|(name, v)| (name.as_str(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_NAMES;

    fn distinct_reading() -> SensorReading {
        let mut values = [0.0; NUM_FEATURES];
        for (i, v) in values.iter_mut().enumerate() {
            *v = (i as f64 + 1.0) * 10.0;
        }
        SensorReading::from_values(values)
    }

    #[test]
    fn test_values_follow_feature_name_order() {
        let reading = distinct_reading();
        let json = serde_json::to_value(reading).unwrap();
        let values = reading.to_values();

        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            assert_eq!(json[name].as_f64(), Some(values[i]), "column {} ({})", i, name);
        }
    }

    #[test]
    fn test_from_values_round_trip() {
        let reading = distinct_reading();
        assert_eq!(SensorReading::from_values(reading.to_values()), reading);
    }

    #[test]
    fn test_ranked_outputs() {
        let response = PredictionResponse {
            prediction_label: "Normal".to_string(),
            probabilities: [("Normal".to_string(), 0.7), ("Bearing Wear".to_string(), 0.3)]
                .into_iter()
                .collect(),
            shap_values: [
                ("Oil_Temp".to_string(), -0.4),
                ("Shaft_RPM".to_string(), 0.1),
                ("Fuel_Flow".to_string(), 0.2),
            ]
            .into_iter()
            .collect(),
        };

        assert!((response.confidence() - 0.7).abs() < 1e-12);
        assert_eq!(response.ranked_probabilities()[0].0, "Normal");

        let top = response.top_features(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "Oil_Temp");
        assert_eq!(top[1].0, "Fuel_Flow");
    }
}
