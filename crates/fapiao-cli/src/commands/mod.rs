//! CLI subcommands.

pub mod ingest;
pub mod list;
pub mod serve;
pub mod status;

use std::path::PathBuf;

use fapiao_core::models::FapiaoConfig;

/// Load configuration from an explicit path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FapiaoConfig> {
    match config_path {
        Some(path) => Ok(FapiaoConfig::from_file(std::path::Path::new(path))?),
        None => Ok(FapiaoConfig::default()),
    }
}

/// Store file path: CLI override wins over the configured path.
pub fn store_path(config: &FapiaoConfig, override_path: Option<&PathBuf>) -> PathBuf {
    override_path
        .cloned()
        .unwrap_or_else(|| config.store.path.clone())
}
