//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Config file (~/.keygate/config.yaml, or an explicit path)
//! 3. Environment variables (KEYGATE_* prefix)
//! 4. CLI flags (handled by caller)

use crate::config::settings::{KeygateConfig, KeygateConfigFile};
use crate::error::{Error, Result};
use crate::utils::default_config_dir;
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::debug;

/// Default config file name inside the config directory
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory
    /// (`$KEYGATE_CONFIG_DIR` or ~/.keygate)
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_dir: default_config_dir()?,
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Load configuration with hierarchical precedence
    ///
    /// An explicit `path` must exist. Without one, the default config file
    /// is used only when present.
    pub fn load(&self, path: Option<&Utf8Path>) -> Result<KeygateConfig> {
        let mut config = KeygateConfig::defaults(&self.config_dir);

        let file_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config_not_found(p.as_str()));
                }
                Some(p.to_owned())
            }
            None => {
                let default_path = self.config_dir.join(CONFIG_FILE_NAME);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(file_path) = file_path {
            debug!("Loading configuration from {}", file_path);
            let file_config = self.load_yaml_file(&file_path)?;
            config = config.merge(file_config);
        }

        self.apply_env_overrides(config)
    }

    fn load_yaml_file(&self, path: &Utf8Path) -> Result<KeygateConfigFile> {
        let content = fs::read_to_string(path)?;
        let config: KeygateConfigFile = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    fn apply_env_overrides(&self, mut config: KeygateConfig) -> Result<KeygateConfig> {
        if let Ok(val) = env::var("KEYGATE_SECRETS_PATH") {
            if val.trim().is_empty() {
                return Err(Error::invalid_config("KEYGATE_SECRETS_PATH must not be empty"));
            }
            config.secrets.path = Utf8PathBuf::from(val);
        }

        if let Ok(val) = env::var("KEYGATE_REFRESH_INTERVAL_SECS") {
            let secs: u64 = val.parse().map_err(|_| {
                Error::invalid_config("KEYGATE_REFRESH_INTERVAL_SECS must be a valid number")
            })?;
            config.secrets.refresh_interval_secs = Some(secs);
        }

        if let Ok(val) = env::var("KEYGATE_KEY_NAME_FILTER") {
            config.auth.key_name_filter = Some(val).filter(|v| !v.is_empty());
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
