//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// CLI configuration stored in `~/.config/aims/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("aims").join("config.json"))
    }
}

/// Resolve the API URL: flag or `AIMS_API_URL`, then config file, then default
pub fn resolve_api_url(flag: Option<String>, config: &Config) -> String {
    flag.or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_api_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_url": "http://ship-07:8000"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://ship-07:8000"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "api_url = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_resolution_order() {
        let config = Config {
            api_url: Some("http://from-file:8000".to_string()),
        };
        assert_eq!(
            resolve_api_url(Some("http://flag:9000".to_string()), &config),
            "http://flag:9000"
        );
        assert_eq!(resolve_api_url(None, &config), "http://from-file:8000");
        assert_eq!(resolve_api_url(None, &Config::default()), DEFAULT_API_URL);
    }
}
