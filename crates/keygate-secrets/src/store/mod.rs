//! Secret stores and snapshots

pub mod file;
pub mod memory;

pub use file::{DocumentInfo, DocumentKind, DocumentSummary, FileSecretStore, KeySummary, UpgradeReport};
pub use memory::InMemorySecretStore;

use crate::error::{Result, SecretsError};
use async_trait::async_trait;
use keygate_core::{FunctionSecrets, HostSecrets};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Source of host and per-function secrets
///
/// Returned values come from an immutable snapshot; a refresh replaces the
/// snapshot, it never changes secrets already handed out.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Host-level secrets. An unconfigured store returns empty secrets.
    async fn host_secrets(&self) -> Result<Arc<HostSecrets>>;

    /// Secrets of one function, `None` if it has none
    async fn function_secrets(&self, function_name: &str)
        -> Result<Option<Arc<FunctionSecrets>>>;

    /// Store name for log messages
    fn name(&self) -> &'static str;
}

/// Point-in-time view of every secret in a store
///
/// A function document that failed to load keeps its error, which is
/// returned only by lookups of that function.
#[derive(Debug, Clone, Default)]
pub struct SecretsSnapshot {
    host: Arc<HostSecrets>,
    functions: BTreeMap<String, Result<Arc<FunctionSecrets>>>,
}

impl SecretsSnapshot {
    pub fn new(host: HostSecrets) -> Self {
        Self {
            host: Arc::new(host),
            functions: BTreeMap::new(),
        }
    }

    /// Add a function's secrets; the name is normalized to lowercase
    pub fn with_function(mut self, name: &str, secrets: impl Into<FunctionSecrets>) -> Self {
        self.insert_function(name, Ok(secrets.into()));
        self
    }

    /// Returns true if an entry for the name was replaced
    pub(crate) fn insert_function(&mut self, name: &str, secrets: Result<FunctionSecrets>) -> bool {
        self.functions
            .insert(name.to_lowercase(), secrets.map(Arc::new))
            .is_some()
    }

    pub fn host(&self) -> Arc<HostSecrets> {
        Arc::clone(&self.host)
    }

    /// Look up a function's secrets (case-insensitive)
    ///
    /// Fails with the recorded error if the function's document could not
    /// be loaded.
    pub fn function(&self, name: &str) -> Result<Option<Arc<FunctionSecrets>>> {
        match self.functions.get(&name.to_lowercase()) {
            Some(Ok(secrets)) => Ok(Some(Arc::clone(secrets))),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(None),
        }
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Functions whose documents failed to load
    pub fn failed_functions(&self) -> impl Iterator<Item = (&str, &SecretsError)> {
        self.functions
            .iter()
            .filter_map(|(name, entry)| entry.as_ref().err().map(|e| (name.as_str(), e)))
    }

    /// True when neither host nor function secrets are configured
    pub fn is_empty(&self) -> bool {
        self.host.is_empty() && self.functions.is_empty()
    }
}
