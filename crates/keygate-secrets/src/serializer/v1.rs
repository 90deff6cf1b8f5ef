//! Version 1: named key arrays with encryption metadata
//!
//! ```text
//! Function secrets: { "version": 1, "keys": [ Key... ] }
//! Host secrets:     { "version": 1, "master": Key | null,
//!                     "functionKeys": [ Key... ], "systemKeys": [ Key... ] }
//! Key:              { "name": "...", "value": "...",
//!                     "encrypted": false, "encryptionKeyId": "..." }
//! ```

use super::SecretSerializer;
use crate::error::{Result, SecretsError};
use keygate_core::{HostSecrets, Key};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default)]
pub struct SerializerV1;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyDocument {
    #[serde(default)]
    name: String,
    value: String,
    #[serde(default)]
    encrypted: bool,
    #[serde(default)]
    encryption_key_id: Option<String>,
}

impl From<KeyDocument> for Key {
    fn from(doc: KeyDocument) -> Self {
        Key {
            name: doc.name,
            value: doc.value,
            is_encrypted: doc.encrypted,
            encryption_key_id: doc.encryption_key_id,
        }
    }
}

/// Borrowing view used for output so values are not copied
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyRef<'a> {
    name: &'a str,
    value: &'a str,
    encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    encryption_key_id: Option<&'a str>,
}

impl<'a> From<&'a Key> for KeyRef<'a> {
    fn from(key: &'a Key) -> Self {
        KeyRef {
            name: &key.name,
            value: &key.value,
            encrypted: key.is_encrypted,
            encryption_key_id: key.encryption_key_id.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct FunctionDocument {
    version: u32,
    #[serde(default)]
    keys: Vec<KeyDocument>,
}

#[derive(Serialize)]
struct FunctionDocumentRef<'a> {
    version: u32,
    keys: Vec<KeyRef<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostDocument {
    version: u32,
    #[serde(default)]
    master: Option<KeyDocument>,
    #[serde(default)]
    function_keys: Vec<KeyDocument>,
    #[serde(default)]
    system_keys: Vec<KeyDocument>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostDocumentRef<'a> {
    version: u32,
    master: Option<KeyRef<'a>>,
    function_keys: Vec<KeyRef<'a>>,
    system_keys: Vec<KeyRef<'a>>,
}

fn check_version(found: u32) -> Result<()> {
    if found != VERSION {
        return Err(SecretsError::format(format!(
            "expected `version` {}, found {}",
            VERSION, found
        )));
    }
    Ok(())
}

impl SecretSerializer for SerializerV1 {
    fn supported_format_version(&self) -> u32 {
        VERSION
    }

    fn deserialize_function_secrets(&self, doc: &Value) -> Result<Vec<Key>> {
        let doc = FunctionDocument::deserialize(doc)?;
        check_version(doc.version)?;

        Ok(doc.keys.into_iter().map(Key::from).collect())
    }

    fn serialize_function_secrets(&self, keys: &[Key]) -> Result<String> {
        let doc = FunctionDocumentRef {
            version: VERSION,
            keys: keys.iter().map(KeyRef::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn deserialize_host_secrets(&self, doc: &Value) -> Result<HostSecrets> {
        let doc = HostDocument::deserialize(doc)?;
        check_version(doc.version)?;

        Ok(HostSecrets {
            master_key: doc.master.map(Key::from),
            function_keys: doc.function_keys.into_iter().map(Key::from).collect(),
            system_keys: doc.system_keys.into_iter().map(Key::from).collect(),
        })
    }

    fn serialize_host_secrets(&self, secrets: &HostSecrets) -> Result<String> {
        let doc = HostDocumentRef {
            version: VERSION,
            master: secrets.master_key.as_ref().map(KeyRef::from),
            function_keys: secrets.function_keys.iter().map(KeyRef::from).collect(),
            system_keys: secrets.system_keys.iter().map(KeyRef::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}
