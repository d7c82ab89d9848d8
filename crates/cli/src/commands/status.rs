//! Service health and fault catalogue commands

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

use crate::client::ApiClient;
use crate::output::{color_priority, color_status, print_json, print_warning, OutputFormat};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Show liveness and readiness of the API
pub async fn health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let liveness = client.liveness().await?;
    let readiness = client.readiness().await?;

    match format {
        OutputFormat::Json => print_json(&json!({
            "liveness": liveness,
            "readiness": readiness,
        }))?,
        OutputFormat::Table => {
            println!("{}", "AIMS API Health".bold());
            println!("{}", "=".repeat(50));
            println!("Endpoint:     {}", client.base_url().as_str().cyan());
            println!("Version:      {}", liveness.version);
            println!("Liveness:     {}", color_status(&liveness.status));
            let ready = if readiness.ready { "ready" } else { "not ready" };
            println!("Readiness:    {}", color_status(ready));
            println!("Status:       {}", color_status(readiness.status.as_str()));
            println!();
            if let Some(reason) = &readiness.reason {
                print_warning(reason);
            }

            let rows: Vec<ComponentRow> = readiness
                .components
                .iter()
                .map(|(name, health)| ComponentRow {
                    name: name.clone(),
                    status: color_status(health.status.as_str()),
                    message: health.message.clone().unwrap_or_default(),
                })
                .collect();
            if !rows.is_empty() {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
    }
    Ok(())
}

/// List fault categories with their maintenance advice
pub async fn faults(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let catalog = client.faults().await?;

    match format {
        OutputFormat::Json => print_json(&catalog)?,
        OutputFormat::Table => {
            for (index, advice) in catalog.iter().enumerate() {
                println!(
                    "{} {} [{}]",
                    format!("{}.", index).dimmed(),
                    advice.category.bold(),
                    color_priority(advice.priority)
                );
                println!("   {}", advice.title);
                for action in &advice.actions {
                    println!("   • {}", action);
                }
                println!();
            }
        }
    }
    Ok(())
}
