//! In-memory secret store

use super::{SecretStore, SecretsSnapshot};
use crate::error::Result;
use async_trait::async_trait;
use keygate_core::{FunctionSecrets, HostSecrets};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Store serving a snapshot held in memory
///
/// Used when secrets are provisioned by the embedding application, and in
/// tests. [`replace`](Self::replace) swaps the whole snapshot.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    snapshot: RwLock<Arc<SecretsSnapshot>>,
}

impl InMemorySecretStore {
    pub fn new(snapshot: SecretsSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Store holding only host secrets
    pub fn with_host_secrets(host: HostSecrets) -> Self {
        Self::new(SecretsSnapshot::new(host))
    }

    pub async fn snapshot(&self) -> Arc<SecretsSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Swap in a new snapshot
    pub async fn replace(&self, snapshot: SecretsSnapshot) {
        debug!("Replacing in-memory secrets snapshot");
        *self.snapshot.write().await = Arc::new(snapshot);
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn host_secrets(&self) -> Result<Arc<HostSecrets>> {
        Ok(self.snapshot.read().await.host())
    }

    async fn function_secrets(
        &self,
        function_name: &str,
    ) -> Result<Option<Arc<FunctionSecrets>>> {
        self.snapshot.read().await.function(function_name)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
