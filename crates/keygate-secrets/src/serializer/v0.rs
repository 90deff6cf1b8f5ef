//! Version 0: the legacy flat layout
//!
//! ```text
//! Function secrets: { "key": "<value>" }
//! Host secrets:     { "masterKey": "<value>", "functionKey": "<value>" }
//! ```
//!
//! Keys are unnamed and carry no encryption metadata. A document holds at
//! most one function key and has no system keys.

use super::{json_type_name, SecretSerializer};
use crate::error::{Result, SecretsError};
use keygate_core::{HostSecrets, Key};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

const VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SerializerV0;

#[derive(Serialize)]
struct FunctionDocument<'a> {
    key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    master_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_key: Option<&'a str>,
}

fn as_object(doc: &Value) -> Result<&Map<String, Value>> {
    doc.as_object()
        .ok_or_else(|| SecretsError::format("secrets document must be a JSON object"))
}

/// Absent and null fields are `None`; anything but a string is an error
fn optional_string(obj: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(SecretsError::format(format!(
            "`{}` must be a string, found {}",
            field,
            json_type_name(other)
        ))),
    }
}

/// The value written for a key; encrypted values cannot be flagged here
fn plain_value(key: &Key) -> Result<&str> {
    if key.is_encrypted {
        return Err(SecretsError::unrepresentable(
            VERSION,
            "encrypted keys require a newer format version",
        ));
    }
    Ok(&key.value)
}

impl SecretSerializer for SerializerV0 {
    fn supported_format_version(&self) -> u32 {
        VERSION
    }

    fn deserialize_function_secrets(&self, doc: &Value) -> Result<Vec<Key>> {
        let obj = as_object(doc)?;
        let value = optional_string(obj, "key")?
            .ok_or_else(|| SecretsError::format("missing required field `key`"))?;

        Ok(vec![Key::unnamed(value)])
    }

    fn serialize_function_secrets(&self, keys: &[Key]) -> Result<String> {
        let first = keys.first().ok_or_else(|| {
            SecretsError::unrepresentable(VERSION, "a function secrets document needs one key")
        })?;

        if keys.len() > 1 {
            warn!(
                dropped = keys.len() - 1,
                "Format version 0 holds a single function key; extra keys are not written"
            );
        }

        let doc = FunctionDocument {
            key: plain_value(first)?,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn deserialize_host_secrets(&self, doc: &Value) -> Result<HostSecrets> {
        let obj = as_object(doc)?;

        let master_key = optional_string(obj, "masterKey")?.map(Key::unnamed);
        let function_keys = optional_string(obj, "functionKey")?
            .map(Key::unnamed)
            .into_iter()
            .collect();

        Ok(HostSecrets {
            master_key,
            function_keys,
            system_keys: Vec::new(),
        })
    }

    fn serialize_host_secrets(&self, secrets: &HostSecrets) -> Result<String> {
        if secrets.function_keys.len() > 1 || !secrets.system_keys.is_empty() {
            warn!(
                function_keys = secrets.function_keys.len(),
                system_keys = secrets.system_keys.len(),
                "Format version 0 holds one function key and no system keys; extra keys are not written"
            );
        }

        let doc = HostDocument {
            master_key: secrets.master_key.as_ref().map(plain_value).transpose()?,
            function_key: secrets.function_keys.first().map(plain_value).transpose()?,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_key_collections_equal(expected: &[Key], actual: &[Key]) {
        assert_eq!(expected.len(), actual.len());
        for (e, a) in expected.iter().zip(actual) {
            assert_eq!(e, a);
        }
    }

    #[test]
    fn test_serialize_function_secrets_writes_first_key() {
        let secrets = vec![
            Key::unnamed("Value1").with_encryption_key_id(Some("KeyId1".to_string())),
            Key::new("Key2", "Value2").with_encryption("KeyId2"),
        ];

        let serialized = SerializerV0.serialize_function_secrets(&secrets).unwrap();

        let doc: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(doc["key"], "Value1");
        assert_eq!(doc.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_deserialize_function_secrets() {
        let doc = json!({ "key": "TestValue" });

        let expected = vec![Key::unnamed("TestValue")];
        let actual = SerializerV0.deserialize_function_secrets(&doc).unwrap();

        assert_key_collections_equal(&expected, &actual);
        assert!(!actual[0].is_encrypted);
        assert_eq!(actual[0].encryption_key_id, None);
    }

    #[test]
    fn test_deserialize_host_secrets() {
        let doc = json!({ "masterKey": "master", "functionKey": "master" });

        let expected = HostSecrets::new()
            .with_master_key(Key::unnamed("master"))
            .with_function_key(Key::unnamed("master"));

        let actual = SerializerV0.deserialize_host_secrets(&doc).unwrap();

        assert_eq!(expected.master_key, actual.master_key);
        assert_key_collections_equal(&expected.function_keys, &actual.function_keys);
        assert!(actual.system_keys.is_empty());
    }

    #[test]
    fn test_serialize_host_secrets() {
        let secrets = HostSecrets::new()
            .with_master_key(Key::new("master", "mastervalue"))
            .with_function_key(
                Key::unnamed("functionKeyValue").with_encryption_key_id(Some("KeyId1".into())),
            );

        let serialized = SerializerV0.serialize_host_secrets(&secrets).unwrap();

        let doc: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(doc["masterKey"], "mastervalue");
        assert_eq!(doc["functionKey"], "functionKeyValue");
        assert!(doc.get("name").is_none());
        assert!(doc.get("version").is_none());
    }

    #[test]
    fn test_host_round_trip() {
        let secrets = HostSecrets::new()
            .with_master_key(Key::unnamed("m"))
            .with_function_key(Key::unnamed("f"));

        let text = SerializerV0.serialize_host_secrets(&secrets).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        let reread = SerializerV0.deserialize_host_secrets(&doc).unwrap();

        assert_eq!(reread, secrets);
    }

    #[test]
    fn test_absent_master_key_is_valid() {
        let actual = SerializerV0
            .deserialize_host_secrets(&json!({ "functionKey": "f" }))
            .unwrap();
        assert_eq!(actual.master_key, None);
        assert_eq!(actual.function_keys.len(), 1);

        let empty = SerializerV0.deserialize_host_secrets(&json!({})).unwrap();
        assert!(empty.is_empty());

        let text = SerializerV0.serialize_host_secrets(&empty).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!({}));
    }

    #[test]
    fn test_wrong_field_type_is_format_error() {
        let err = SerializerV0
            .deserialize_host_secrets(&json!({ "masterKey": 42 }))
            .unwrap_err();
        assert!(matches!(err, SecretsError::Format { .. }));
        assert!(err.to_string().contains("masterKey"));

        let err = SerializerV0
            .deserialize_function_secrets(&json!({ "key": ["a"] }))
            .unwrap_err();
        assert!(matches!(err, SecretsError::Format { .. }));
    }

    #[test]
    fn test_missing_function_key_is_format_error() {
        let err = SerializerV0
            .deserialize_function_secrets(&json!({ "value": "x" }))
            .unwrap_err();
        assert!(err.to_string().contains("`key`"));
    }

    #[test]
    fn test_empty_function_keys_unrepresentable() {
        let err = SerializerV0.serialize_function_secrets(&[]).unwrap_err();
        assert!(matches!(err, SecretsError::Unrepresentable { version: 0, .. }));
    }

    #[test]
    fn test_encrypted_key_unrepresentable() {
        let secrets = HostSecrets::new().with_master_key(Key::new("master", "x").with_encryption("kid"));
        let err = SerializerV0.serialize_host_secrets(&secrets).unwrap_err();
        assert!(matches!(err, SecretsError::Unrepresentable { .. }));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any single key survives a write and read, without its name
            #[test]
            fn function_key_round_trips(name in "[a-z_]{0,16}", value in ".{1,64}") {
                let text = SerializerV0
                    .serialize_function_secrets(&[Key::new(name, value.clone())])
                    .unwrap();
                let doc: Value = serde_json::from_str(&text).unwrap();
                let keys = SerializerV0.deserialize_function_secrets(&doc).unwrap();

                prop_assert_eq!(keys, vec![Key::unnamed(value)]);
            }

            #[test]
            fn host_secrets_round_trip(
                master in proptest::option::of(".{1,64}"),
                function in proptest::option::of(".{1,64}"),
            ) {
                let mut secrets = HostSecrets::new();
                if let Some(master) = master {
                    secrets = secrets.with_master_key(Key::unnamed(master));
                }
                if let Some(function) = function {
                    secrets = secrets.with_function_key(Key::unnamed(function));
                }

                let text = SerializerV0.serialize_host_secrets(&secrets).unwrap();
                let doc: Value = serde_json::from_str(&text).unwrap();
                prop_assert_eq!(SerializerV0.deserialize_host_secrets(&doc).unwrap(), secrets);
            }
        }
    }
}
