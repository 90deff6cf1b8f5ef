//! Error types for keygate-core

use thiserror::Error;

/// Result type alias using keygate-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Keygate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value or format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown authorization level name
    #[error("Unknown authorization level: {level}. Valid levels: anonymous, function, system, admin")]
    InvalidAuthorizationLevel { level: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid authorization level error
    pub fn invalid_authorization_level(level: impl Into<String>) -> Self {
        Self::InvalidAuthorizationLevel {
            level: level.into(),
        }
    }
}
