//! Server configuration
//!
//! Read from an optional `aims.toml` in the working directory, then from
//! `AIMS_`-prefixed environment variables, e.g. `AIMS_PORT=9000` or
//! `AIMS_CORS_ORIGINS=http://a.example,http://b.example`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the exported model artifacts
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Origins allowed to call the API from a browser
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            artifacts_dir: default_artifacts_dir(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `aims.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(config::File::with_name("aims").required(false))
    }

    fn load_from(file: config::File<config::FileSourceFile, config::FileFormat>) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("AIMS")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
