//! Prediction output formatting
//!
//! Pure reshaping of model outputs into the response: class index to label,
//! probability vector to a label-keyed map, attribution vector to a
//! feature-keyed map. Values are passed through unchanged.

use crate::fault::{FaultCategory, FAULT_CATEGORIES};
use crate::models::PredictionResponse;
use crate::schema::{FEATURE_NAMES, NUM_CLASSES, NUM_FEATURES};
use anyhow::{anyhow, bail, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Build the response for one sample
    ///
    /// # Arguments
    /// * `class_index` - predicted class
    /// * `probabilities` - one probability per class, in class order
    /// * `attributions` - one attribution per feature toward `class_index`, in column order
    pub fn format(
        &self,
        class_index: usize,
        probabilities: &[f64],
        attributions: &[f64],
    ) -> Result<PredictionResponse> {
        let label = FaultCategory::from_index(class_index)
            .ok_or_else(|| anyhow!("classifier returned unknown class index {}", class_index))?;
        if probabilities.len() != NUM_CLASSES {
            bail!(
                "classifier returned {} probabilities, expected {}",
                probabilities.len(),
                NUM_CLASSES
            );
        }
        if attributions.len() != NUM_FEATURES {
            bail!(
                "explainer returned {} attributions, expected {}",
                attributions.len(),
                NUM_FEATURES
            );
        }

        Ok(PredictionResponse {
            prediction_label: label.label().to_string(),
            probabilities: FAULT_CATEGORIES
                .iter()
                .zip(probabilities)
                .map(|(category, p)| (category.label().to_string(), *p))
                .collect(),
            shap_values: FEATURE_NAMES
                .iter()
                .zip(attributions)
                .map(|(name, v)| (name.to_string(), *v))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_maps_labels_and_features() {
        let probabilities = [0.1, 0.0, 0.0, 0.0, 0.0, 0.9, 0.0, 0.0];
        let attributions: Vec<f64> = (0..NUM_FEATURES).map(|i| i as f64 - 9.0).collect();

        let response = OutputFormatter::new()
            .format(5, &probabilities, &attributions)
            .unwrap();

        assert_eq!(response.prediction_label, "Lubrication Oil Degradation");
        assert_eq!(response.probabilities.len(), NUM_CLASSES);
        assert_eq!(response.probabilities["Normal"], 0.1);
        assert_eq!(response.probabilities["Lubrication Oil Degradation"], 0.9);
        assert_eq!(response.shap_values.len(), NUM_FEATURES);
        assert_eq!(response.shap_values["Shaft_RPM"], -9.0);
        assert_eq!(response.shap_values["Cylinder4_Exhaust_Temp"], 8.0);
    }

    #[test]
    fn test_unknown_class_rejected() {
        let err = OutputFormatter::new()
            .format(8, &[0.125; 8], &[0.0; NUM_FEATURES])
            .unwrap_err();
        assert!(err.to_string().contains("unknown class index 8"));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let formatter = OutputFormatter::new();
        assert!(formatter.format(0, &[1.0; 7], &[0.0; NUM_FEATURES]).is_err());
        assert!(formatter.format(0, &[0.125; 8], &[0.0; 17]).is_err());
    }
}
