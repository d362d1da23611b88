//! Configuration structures for the ingestion pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{FapiaoError, Result};

/// Main configuration for the fapiao pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FapiaoConfig {
    /// Extraction service configuration.
    pub gemini: GeminiConfig,

    /// Record store configuration.
    pub store: StoreConfig,
}

/// Configuration for the Gemini extraction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Model identifier.
    pub model: String,

    /// API key. Empty means: read from the `GEMINI_API_KEY` environment
    /// variable at client construction.
    pub api_key: String,

    /// API endpoint base URL.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key: String::new(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

impl GeminiConfig {
    /// Resolve the API key, falling back to the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON file backing the CLI store.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("invoices.json"),
        }
    }
}

impl FapiaoConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FapiaoError::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FapiaoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
