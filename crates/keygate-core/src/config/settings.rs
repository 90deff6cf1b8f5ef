//! Configuration types
//!
//! `KeygateConfig` is the fully resolved configuration handed to the rest of
//! the workspace. `KeygateConfigFile` mirrors the YAML file, where every
//! field is optional and only overrides what it names.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resolved Keygate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeygateConfig {
    pub secrets: SecretsConfig,
    pub auth: AuthConfig,
}

/// Where secrets documents live and how often they are reloaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecretsConfig {
    /// Directory holding `host.json` and per-function documents
    pub path: Utf8PathBuf,

    /// Periodic snapshot refresh; `None` means refresh only on demand
    pub refresh_interval_secs: Option<u64>,
}

/// Authorization resolution settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthConfig {
    /// Restrict system/function key matches to keys with this name
    pub key_name_filter: Option<String>,
}

impl KeygateConfig {
    /// Built-in defaults rooted at the given config directory
    pub fn defaults(config_dir: &Utf8Path) -> Self {
        Self {
            secrets: SecretsConfig {
                path: config_dir.join("secrets"),
                refresh_interval_secs: None,
            },
            auth: AuthConfig::default(),
        }
    }

    /// Apply a parsed config file on top of this configuration
    pub fn merge(mut self, overlay: KeygateConfigFile) -> Self {
        if let Some(path) = overlay.secrets.path {
            self.secrets.path = path;
        }
        if overlay.secrets.refresh_interval_secs.is_some() {
            self.secrets.refresh_interval_secs = overlay.secrets.refresh_interval_secs;
        }
        if overlay.auth.key_name_filter.is_some() {
            self.auth.key_name_filter = overlay.auth.key_name_filter;
        }
        self
    }
}

impl SecretsConfig {
    /// Refresh interval as a duration, ignoring a zero interval
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// On-disk configuration file (`config.yaml`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeygateConfigFile {
    #[serde(default)]
    pub secrets: SecretsSection,

    #[serde(default)]
    pub auth: AuthSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecretsSection {
    pub path: Option<Utf8PathBuf>,
    pub refresh_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthSection {
    pub key_name_filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeygateConfig::defaults(Utf8Path::new("/home/svc/.keygate"));
        assert_eq!(
            config.secrets.path,
            Utf8PathBuf::from("/home/svc/.keygate/secrets")
        );
        assert_eq!(config.secrets.refresh_interval(), None);
        assert_eq!(config.auth.key_name_filter, None);
    }

    #[test]
    fn test_merge_only_overrides_present_fields() {
        let base = KeygateConfig::defaults(Utf8Path::new("/etc/keygate"));
        let overlay: KeygateConfigFile = serde_yaml_ng::from_str(
            r#"
secrets:
  refresh-interval-secs: 30
"#,
        )
        .unwrap();

        let merged = base.merge(overlay);
        assert_eq!(merged.secrets.path, Utf8PathBuf::from("/etc/keygate/secrets"));
        assert_eq!(
            merged.secrets.refresh_interval(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_zero_refresh_interval_disables_refresh() {
        let mut config = KeygateConfig::defaults(Utf8Path::new("/tmp"));
        config.secrets.refresh_interval_secs = Some(0);
        assert_eq!(config.secrets.refresh_interval(), None);
    }
}
