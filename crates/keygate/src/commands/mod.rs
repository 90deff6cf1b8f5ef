//! CLI command implementations

pub mod config;
pub mod resolve;
pub mod secrets;
pub mod version;

use crate::cli::GlobalOptions;
use anyhow::{Context, Result};
use keygate_core::{HierarchicalConfigLoader, KeygateConfig};
use keygate_secrets::FileSecretStore;
use std::sync::Arc;

/// Load configuration and apply command-line overrides
pub fn load_config(global: &GlobalOptions) -> Result<KeygateConfig> {
    let loader = HierarchicalConfigLoader::new().context("Failed to locate config directory")?;
    let mut config = loader
        .load(global.config_path())
        .context("Failed to load configuration")?;

    if let Some(path) = &global.secrets_path {
        config.secrets.path = path.clone();
    }

    Ok(config)
}

/// Open the configured secrets directory
///
/// Starts periodic refresh when the configuration asks for it.
pub async fn open_store(config: &KeygateConfig) -> Arc<FileSecretStore> {
    let store = Arc::new(FileSecretStore::new(config.secrets.path.as_std_path()));

    if let Some(interval) = config.secrets.refresh_interval() {
        store.spawn_periodic_refresh(interval).await;
    }

    store
}
