//! Configuration management for tabletalk.
//!
//! Handles loading configuration from TOML files and environment variables,
//! covering the LLM provider settings and the dataset location.

use crate::error::{Result, TabletalkError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the single table every generated query runs against.
pub const DATA_TABLE: &str = "data_table";

/// Main configuration structure for tabletalk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Dataset configuration.
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "openai", "ollama", or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (e.g., "gpt-4o-mini", "llama3.2:3b").
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
        }
    }
}

/// Dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatasetConfig {
    /// Path to the CSV file to load.
    pub path: Option<PathBuf>,

    /// Path for the SQLite database file. In-memory when unset.
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Returns the default configuration if the file does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            TabletalkError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            TabletalkError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Applies environment variable overrides.
    ///
    /// `TABLETALK_PROVIDER` and `TABLETALK_MODEL` take precedence over the
    /// config file. API keys are read by the provider clients themselves.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("TABLETALK_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("TABLETALK_MODEL") {
            self.llm.model = model;
        }
    }
}
