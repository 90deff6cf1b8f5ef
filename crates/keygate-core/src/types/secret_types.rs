//! In-memory secret document model
//!
//! These types are format-agnostic: every on-disk layout version is read
//! into them and written back out of them by the serializers in
//! `keygate-secrets`.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A single secret key
///
/// `name` is empty for keys read from legacy single-key documents. The
/// value is zeroed when the key is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    pub name: String,
    pub value: String,
    #[zeroize(skip)]
    pub is_encrypted: bool,
    #[zeroize(skip)]
    pub encryption_key_id: Option<String>,
}

impl Key {
    /// Create a named, unencrypted key
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_encrypted: false,
            encryption_key_id: None,
        }
    }

    /// Create an unnamed key, as found in legacy documents
    pub fn unnamed(value: impl Into<String>) -> Self {
        Self::new(String::new(), value)
    }

    /// Mark the value as encrypted by the given external key
    pub fn with_encryption(mut self, key_id: impl Into<String>) -> Self {
        self.is_encrypted = true;
        self.encryption_key_id = Some(key_id.into());
        self
    }

    /// Set the encryption key id without changing the encrypted flag
    pub fn with_encryption_key_id(mut self, key_id: Option<String>) -> Self {
        self.encryption_key_id = key_id;
        self
    }

    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("value", &format_args!("[REDACTED {} bytes]", self.value.len()))
            .field("is_encrypted", &self.is_encrypted)
            .field("encryption_key_id", &self.encryption_key_id)
            .finish()
    }
}

/// Host-level secrets
///
/// A host has at most one master key. The function and system key
/// collections may be empty but are always present once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSecrets {
    pub master_key: Option<Key>,
    pub function_keys: Vec<Key>,
    pub system_keys: Vec<Key>,
}

impl HostSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_master_key(mut self, key: Key) -> Self {
        self.master_key = Some(key);
        self
    }

    pub fn with_function_key(mut self, key: Key) -> Self {
        self.function_keys.push(key);
        self
    }

    pub fn with_system_key(mut self, key: Key) -> Self {
        self.system_keys.push(key);
        self
    }

    /// The configured master key value, if one is set and non-empty
    pub fn master_key_value(&self) -> Option<&str> {
        self.master_key
            .as_ref()
            .map(|k| k.value.as_str())
            .filter(|v| !v.is_empty())
    }

    /// True when no key of any tier is configured
    pub fn is_empty(&self) -> bool {
        self.master_key.is_none() && self.function_keys.is_empty() && self.system_keys.is_empty()
    }

    /// Total number of configured keys across all tiers
    pub fn key_count(&self) -> usize {
        usize::from(self.master_key.is_some()) + self.function_keys.len() + self.system_keys.len()
    }
}

/// Secrets owned by a single function, keyed by secret name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSecrets {
    keys: Vec<Key>,
}

impl FunctionSecrets {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<Key> {
        self.keys
    }

    /// Look up a secret value by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|k| k.name.eq_ignore_ascii_case(name))
            .map(|k| k.value.as_str())
    }

    /// Iterate over all secret values
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|k| k.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Vec<Key>> for FunctionSecrets {
    fn from(keys: Vec<Key>) -> Self {
        Self::new(keys)
    }
}

impl<'a> IntoIterator for &'a FunctionSecrets {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}
