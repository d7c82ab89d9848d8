//! AIMS CLI
//!
//! Submit sensor readings to the fault diagnosis API, inspect service
//! health and the fault catalogue, and run the demo scenario checks.

mod client;
mod commands;
mod config;
mod output;

use aims_lib::DemoScenario;
use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use commands::{predict, scenarios, status};
use std::path::PathBuf;

/// AIMS marine engine fault diagnosis CLI
#[derive(Parser)]
#[command(name = "aims")]
#[command(author, version, about = "CLI for the AIMS marine engine fault diagnosis API", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via AIMS_API_URL env var)
    #[arg(long, env = "AIMS_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diagnose a sensor reading
    #[command(group(ArgGroup::new("source").required(true).args(["file", "scenario"])))]
    Predict {
        /// JSON file holding the 18 sensor fields
        #[arg(long, short = 'i')]
        file: Option<PathBuf>,

        /// Built-in scenario (normal, minor-fault, critical-fault)
        #[arg(long, short, value_parser = parse_scenario)]
        scenario: Option<DemoScenario>,

        /// Number of top feature attributions to show
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Show API liveness and readiness
    Health,

    /// List fault categories and maintenance advice
    Faults,

    /// Run the demo scenarios and check the diagnoses
    Scenarios,
}

fn parse_scenario(name: &str) -> Result<DemoScenario, String> {
    DemoScenario::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = DemoScenario::ALL.iter().map(|s| s.name()).collect();
        format!("unknown scenario '{}' (expected one of: {})", name, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load()?;
    let api_url = config::resolve_api_url(cli.api_url, &config);
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Predict {
            file,
            scenario,
            top,
        } => {
            let source = match (file, scenario) {
                (Some(path), _) => predict::ReadingSource::File(path),
                (None, Some(scenario)) => predict::ReadingSource::Scenario(scenario),
                (None, None) => anyhow::bail!("either --file or --scenario is required"),
            };
            predict::predict(&client, source, top, cli.format).await?;
        }
        Commands::Health => {
            status::health(&client, cli.format).await?;
        }
        Commands::Faults => {
            status::faults(&client, cli.format).await?;
        }
        Commands::Scenarios => {
            scenarios::run(&client, cli.format).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_requires_one_source() {
        assert!(Cli::try_parse_from(["aims", "predict"]).is_err());
        assert!(Cli::try_parse_from([
            "aims", "predict", "--file", "r.json", "--scenario", "normal"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["aims", "predict", "--scenario", "normal"]).is_ok());
    }

    #[test]
    fn test_parse_scenario() {
        assert_eq!(parse_scenario("minor-fault"), Ok(DemoScenario::MinorFault));
        let err = parse_scenario("meltdown").unwrap_err();
        assert!(err.contains("critical-fault"));
    }
}
