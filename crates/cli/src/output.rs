//! Output formatting utilities

use aims_lib::Priority;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format probability as percentage
pub fn format_probability(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}

/// Format a signed attribution with explicit sign
pub fn format_attribution(v: f64) -> String {
    format!("{:+.4}", v)
}

/// Color a probability by how decisive it is
pub fn color_probability(p: f64) -> String {
    let formatted = format_probability(p);
    if p >= 0.9 {
        formatted.green().to_string()
    } else if p >= 0.6 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

/// Color a fault label: Normal is green, anything else red
pub fn color_label(label: &str) -> String {
    if label == "Normal" {
        label.green().bold().to_string()
    } else {
        label.red().bold().to_string()
    }
}

pub fn color_priority(priority: Priority) -> String {
    match priority {
        Priority::Low => priority.as_str().green().to_string(),
        Priority::Medium => priority.as_str().yellow().to_string(),
        Priority::Critical => priority.as_str().red().bold().to_string(),
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ready" | "pass" => status.green().to_string(),
        "degraded" | "warning" => status.yellow().to_string(),
        "unhealthy" | "not ready" | "fail" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Text bar proportional to a probability
pub fn probability_bar(p: f64, width: usize) -> String {
    let filled = (p.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_probability() {
        assert_eq!(format_probability(0.9834), "98.3%");
        assert_eq!(format_probability(0.0), "0.0%");
    }

    #[test]
    fn test_format_attribution_keeps_sign() {
        assert_eq!(format_attribution(2.7), "+2.7000");
        assert_eq!(format_attribution(-0.05), "-0.0500");
    }

    #[test]
    fn test_probability_bar() {
        assert_eq!(probability_bar(0.5, 10).chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(probability_bar(1.5, 4), "████");
        assert_eq!(probability_bar(0.0, 3), "░░░");
    }
}
