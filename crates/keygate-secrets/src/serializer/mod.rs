//! Versioned secret document serializers
//!
//! Secrets documents have been persisted in several JSON layouts over time.
//! Each layout has one serializer implementing [`SecretSerializer`], and
//! [`SecretFormat`] tags which one a document uses:
//!
//! - **Version 0**: flat legacy layout, no version marker
//!   (`{"key": ...}`, `{"masterKey": ..., "functionKey": ...}`)
//! - **Version 1**: named key arrays with encryption metadata and an explicit
//!   `"version": 1` marker
//!
//! Reading dispatches on the marker and falls back to version 0 when it is
//! absent. Writing always uses [`SecretFormat::CURRENT`].

pub mod v0;
pub mod v1;

pub use v0::SerializerV0;
pub use v1::SerializerV1;

use crate::error::{Result, SecretsError};
use keygate_core::{HostSecrets, Key};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Name of the version marker field
pub const VERSION_FIELD: &str = "version";

/// Contract shared by every format version
pub trait SecretSerializer: Send + Sync {
    /// The version this serializer writes and accepts as canonical
    fn supported_format_version(&self) -> u32;

    fn deserialize_function_secrets(&self, doc: &Value) -> Result<Vec<Key>>;

    fn serialize_function_secrets(&self, keys: &[Key]) -> Result<String>;

    fn deserialize_host_secrets(&self, doc: &Value) -> Result<HostSecrets>;

    fn serialize_host_secrets(&self, secrets: &HostSecrets) -> Result<String>;
}

/// Known secrets document layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SecretFormat {
    V0,
    V1,
}

impl SecretFormat {
    /// The layout every write produces
    pub const CURRENT: SecretFormat = SecretFormat::V1;

    pub const ALL: [SecretFormat; 2] = [SecretFormat::V0, SecretFormat::V1];

    pub fn version(self) -> u32 {
        match self {
            SecretFormat::V0 => 0,
            SecretFormat::V1 => 1,
        }
    }

    pub fn from_version(version: i64) -> Result<Self> {
        SecretFormat::ALL
            .into_iter()
            .find(|format| i64::from(format.version()) == version)
            .ok_or(SecretsError::UnsupportedVersion { version })
    }

    pub fn is_current(self) -> bool {
        self == SecretFormat::CURRENT
    }

    pub fn serializer(self) -> &'static dyn SecretSerializer {
        match self {
            SecretFormat::V0 => &SerializerV0,
            SecretFormat::V1 => &SerializerV1,
        }
    }

    /// Detect the layout of a parsed document from its version marker
    pub fn detect(doc: &Value) -> Result<Self> {
        let obj = doc
            .as_object()
            .ok_or_else(|| SecretsError::format("secrets document must be a JSON object"))?;

        match obj.get(VERSION_FIELD) {
            None | Some(Value::Null) => Ok(SecretFormat::V0),
            Some(Value::Number(n)) => {
                let version = n.as_i64().ok_or_else(|| {
                    SecretsError::format(format!("`{}` must be an integer, found {}", VERSION_FIELD, n))
                })?;
                SecretFormat::from_version(version)
            }
            Some(other) => Err(SecretsError::format(format!(
                "`{}` must be an integer, found {}",
                VERSION_FIELD,
                json_type_name(other)
            ))),
        }
    }
}

impl fmt::Display for SecretFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version())
    }
}

/// Parse document text, rejecting anything that is not a JSON object
pub fn parse_document(text: &str) -> Result<Value> {
    let doc: Value = serde_json::from_str(text)?;
    if !doc.is_object() {
        return Err(SecretsError::format("secrets document must be a JSON object"));
    }
    Ok(doc)
}

/// Read a host secrets document of any supported version
pub fn read_host_secrets(text: &str) -> Result<(HostSecrets, SecretFormat)> {
    let doc = parse_document(text)?;
    let format = SecretFormat::detect(&doc)?;
    debug!("Reading host secrets document as {}", format);
    let secrets = format.serializer().deserialize_host_secrets(&doc)?;
    Ok((secrets, format))
}

/// Read a function secrets document of any supported version
pub fn read_function_secrets(text: &str) -> Result<(Vec<Key>, SecretFormat)> {
    let doc = parse_document(text)?;
    let format = SecretFormat::detect(&doc)?;
    debug!("Reading function secrets document as {}", format);
    let keys = format.serializer().deserialize_function_secrets(&doc)?;
    Ok((keys, format))
}

/// Serialize host secrets in the current layout
pub fn write_host_secrets(secrets: &HostSecrets) -> Result<String> {
    SecretFormat::CURRENT
        .serializer()
        .serialize_host_secrets(secrets)
}

/// Serialize function secrets in the current layout
pub fn write_function_secrets(keys: &[Key]) -> Result<String> {
    SecretFormat::CURRENT
        .serializer()
        .serialize_function_secrets(keys)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
