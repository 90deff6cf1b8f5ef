//! Error types for secret documents and stores

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SecretsError>;

#[derive(Error, Debug)]
pub enum SecretsError {
    /// Document is not valid JSON or has the wrong shape for its version
    #[error("Malformed secrets document: {message}")]
    Format { message: String },

    /// Document carries a version marker no serializer handles
    #[error("Unsupported secrets format version: {version}")]
    UnsupportedVersion { version: i64 },

    /// Model cannot be expressed in the target format version
    #[error("Cannot represent secrets in format version {version}: {message}")]
    Unrepresentable { version: u32, message: String },

    /// Function name cannot be mapped to a secrets document
    #[error("Invalid function name: '{name}'")]
    InvalidFunctionName { name: String },

    /// Backing storage could not produce a snapshot
    #[error("Secret store unavailable at {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SecretsError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn unrepresentable(version: u32, message: impl Into<String>) -> Self {
        Self::Unrepresentable {
            version,
            message: message.into(),
        }
    }

    pub fn store_unavailable(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::StoreUnavailable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Attach the offending document path to a format error
    pub fn in_document(self, path: &Path) -> Self {
        match self {
            Self::Format { message } => Self::Format {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        }
    }

    /// True for errors caused by document content rather than storage
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::UnsupportedVersion { .. })
    }
}

/// I/O sources are rebuilt from their kind and message
impl Clone for SecretsError {
    fn clone(&self) -> Self {
        match self {
            Self::Format { message } => Self::format(message.clone()),
            Self::UnsupportedVersion { version } => Self::UnsupportedVersion { version: *version },
            Self::Unrepresentable { version, message } => {
                Self::unrepresentable(*version, message.clone())
            }
            Self::InvalidFunctionName { name } => Self::InvalidFunctionName { name: name.clone() },
            Self::StoreUnavailable { path, source } => Self::StoreUnavailable {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
        }
    }
}

impl From<serde_json::Error> for SecretsError {
    fn from(err: serde_json::Error) -> Self {
        Self::format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_format() {
        let err: SecretsError = serde_json::from_str::<serde_json::Value>("{ nope")
            .unwrap_err()
            .into();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_in_document_prefixes_path() {
        let err = SecretsError::format("masterKey must be a string")
            .in_document(Path::new("/secrets/host.json"));
        assert_eq!(
            err.to_string(),
            "Malformed secrets document: /secrets/host.json: masterKey must be a string"
        );
    }

    #[test]
    fn test_clone_keeps_variant_and_message() {
        let err = SecretsError::store_unavailable(
            "/secrets/echo.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let cloned = err.clone();
        assert_eq!(cloned.to_string(), err.to_string());
        match cloned {
            SecretsError::StoreUnavailable { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied)
            }
            other => panic!("unexpected variant: {:?}", other),
        }

        let version = SecretsError::UnsupportedVersion { version: 7 }.clone();
        assert!(matches!(version, SecretsError::UnsupportedVersion { version: 7 }));
    }

    #[test]
    fn test_store_unavailable_is_not_format_error() {
        let err = SecretsError::store_unavailable(
            "/secrets",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_format_error());
        assert!(err.to_string().contains("/secrets"));
    }
}
