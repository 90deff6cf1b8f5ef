//! Version information for the keygate CLI

use keygate_secrets::SecretFormat;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    /// Format version every write produces
    pub secrets_format: u32,
    /// Format versions that can be read
    pub readable_formats: Vec<u32>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            secrets_format: SecretFormat::CURRENT.version(),
            readable_formats: SecretFormat::ALL.iter().map(|f| f.version()).collect(),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "keygate {} (secrets format v{})",
            self.version, self.secrets_format
        )
    }
}
