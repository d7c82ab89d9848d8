//! End-to-end checks of the demo scenarios against a running API

use aims_lib::{
    scenarios::CRITICAL_FAULT_FEATURES, schema::NUM_FEATURES, DemoScenario, PredictionResponse,
};
use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::client::ApiClient;
use crate::output::{color_status, print_json, print_success, OutputFormat};

/// Outcome of one expectation on one scenario
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CheckResult {
    #[tabled(rename = "Scenario")]
    pub scenario: String,
    #[tabled(rename = "Expectation")]
    pub expectation: String,
    #[tabled(rename = "Observed")]
    pub observed: String,
    #[tabled(skip)]
    pub passed: bool,
}

impl CheckResult {
    fn new(
        scenario: DemoScenario,
        expectation: &str,
        observed: String,
        passed: bool,
    ) -> Self {
        Self {
            scenario: scenario.name().to_string(),
            expectation: expectation.to_string(),
            observed,
            passed,
        }
    }
}

fn max_probability(response: &PredictionResponse) -> f64 {
    response
        .probabilities
        .values()
        .copied()
        .fold(0.0, f64::max)
}

/// Check a response against what the scenario should produce
pub fn evaluate(scenario: DemoScenario, response: &PredictionResponse) -> Vec<CheckResult> {
    let total: f64 = response.probabilities.values().sum();
    let mut checks = vec![CheckResult::new(
        scenario,
        "well-formed response",
        format!(
            "{} probabilities (sum {:.6}), {} attributions",
            response.probabilities.len(),
            total,
            response.shap_values.len()
        ),
        response.probabilities.len() == 8
            && (total - 1.0).abs() < 1e-6
            && response.shap_values.len() == NUM_FEATURES,
    )];

    let label = response.prediction_label.as_str();
    let confidence = response.confidence();
    match scenario {
        DemoScenario::Normal => {
            checks.push(CheckResult::new(
                scenario,
                "label is Normal with p > 0.95",
                format!("{} ({:.4})", label, confidence),
                label == "Normal" && confidence > 0.95,
            ));
        }
        DemoScenario::MinorFault => {
            let max = max_probability(response);
            checks.push(CheckResult::new(
                scenario,
                "no class above 0.90",
                format!("max {:.4}", max),
                max < 0.90,
            ));
            let oil = response.shap_values.get("Oil_Temp").copied().unwrap_or(0.0);
            checks.push(CheckResult::new(
                scenario,
                "|Oil_Temp attribution| > 0.1",
                format!("{:+.4}", oil),
                oil.abs() > 0.1,
            ));
        }
        DemoScenario::CriticalFault => {
            checks.push(CheckResult::new(
                scenario,
                "non-Normal label with p > 0.90",
                format!("{} ({:.4})", label, confidence),
                label != "Normal" && confidence > 0.90,
            ));
            let (feature, value) = CRITICAL_FAULT_FEATURES
                .iter()
                .map(|f| (*f, response.shap_values.get(*f).copied().unwrap_or(0.0)))
                .fold(("none", 0.0), |best, item| {
                    if item.1.abs() > f64::abs(best.1) {
                        item
                    } else {
                        best
                    }
                });
            checks.push(CheckResult::new(
                scenario,
                "|vibration or exhaust attribution| > 0.1",
                format!("{} {:+.4}", feature, value),
                value.abs() > 0.1,
            ));
        }
    }
    checks
}

/// Run every demo scenario; fails if any check fails
pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let mut results = Vec::new();
    for scenario in DemoScenario::ALL {
        match client.predict(&scenario.reading()).await {
            Ok(response) => results.extend(evaluate(scenario, &response)),
            Err(err) => results.push(CheckResult::new(
                scenario,
                "prediction succeeds",
                format!("{:#}", err),
                false,
            )),
        }
    }

    let failed = results.iter().filter(|r| !r.passed).count();

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Table => {
            println!("{}", "Demo Scenario Checks".bold());
            let rows: Vec<ScenarioRow> = results.iter().map(ScenarioRow::from).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            if failed == 0 {
                print_success(&format!("All {} checks passed", results.len()));
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} scenario checks failed", failed, results.len());
    }
    Ok(())
}

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(inline)]
    check: CheckResult,
}

impl From<&CheckResult> for ScenarioRow {
    fn from(check: &CheckResult) -> Self {
        let result = if check.passed { "pass" } else { "fail" };
        Self {
            result: color_status(result),
            check: check.clone(),
        }
    }
}
