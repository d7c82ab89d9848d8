//! Fault prediction command

use aims_lib::{schema::FEATURES, DemoScenario, FaultCategory, PredictionResponse};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use crate::client::{ApiClient, ApiError};
use crate::output::{
    color_label, color_priority, color_probability, format_attribution, format_probability,
    print_error, print_json, probability_bar, OutputFormat,
};

/// Where the sensor reading comes from
#[derive(Debug, Clone)]
pub enum ReadingSource {
    /// JSON file with the 18 sensor fields
    File(PathBuf),
    Scenario(DemoScenario),
}

#[derive(Tabled)]
struct ProbabilityRow {
    #[tabled(rename = "Fault Category")]
    category: String,
    #[tabled(rename = "Probability")]
    probability: String,
    #[tabled(rename = "")]
    bar: String,
}

#[derive(Tabled)]
struct AttributionRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Attribution")]
    attribution: String,
}

fn read_payload(source: &ReadingSource) -> Result<Value> {
    match source {
        ReadingSource::File(path) => read_file(path),
        ReadingSource::Scenario(scenario) => Ok(serde_json::to_value(scenario.reading())?),
    }
}

fn read_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Submit a reading and print the diagnosis
pub async fn predict(
    client: &ApiClient,
    source: ReadingSource,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let payload = read_payload(&source)?;

    let response = match client.predict(&payload).await {
        Ok(response) => response,
        Err(err) => {
            if let Some(ApiError::Validation(fields)) = err.downcast_ref::<ApiError>() {
                for field in fields {
                    print_error(&format!("{}: {}", field.field.bold(), field.message));
                }
            }
            return Err(err);
        }
    };

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            if let ReadingSource::Scenario(scenario) = &source {
                println!("Scenario:     {}", scenario.description().cyan());
            }
            print_diagnosis(&response, top)?
        }
    }
    Ok(())
}

fn print_diagnosis(response: &PredictionResponse, top: usize) -> Result<()> {
    let Some(category) = FaultCategory::from_label(&response.prediction_label) else {
        bail!("API returned unknown label {:?}", response.prediction_label);
    };

    println!("{}", "Engine Diagnosis".bold());
    println!("{}", "=".repeat(50));
    println!("Prediction:   {}", color_label(&response.prediction_label));
    println!("Confidence:   {}", color_probability(response.confidence()));
    println!();

    let probabilities: Vec<ProbabilityRow> = response
        .ranked_probabilities()
        .into_iter()
        .take(top)
        .map(|(label, p)| ProbabilityRow {
            category: label.to_string(),
            probability: format_probability(p),
            bar: probability_bar(p, 20),
        })
        .collect();
    println!("{}", "Fault Probabilities".bold());
    println!("{}", Table::new(probabilities).with(Style::rounded()));
    println!();

    let attributions: Vec<AttributionRow> = response
        .top_features(top)
        .into_iter()
        .map(|(name, v)| AttributionRow {
            feature: name.to_string(),
            unit: FEATURES
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.unit.to_string())
                .unwrap_or_default(),
            attribution: format_attribution(v),
        })
        .collect();
    println!("{}", "Top Contributing Sensors".bold());
    println!("{}", Table::new(attributions).with(Style::rounded()));
    println!();

    let advice = category.advice();
    println!(
        "{} [{}]",
        advice.title.bold(),
        color_priority(advice.priority)
    );
    for action in &advice.actions {
        println!("  • {}", action);
    }
    Ok(())
}
