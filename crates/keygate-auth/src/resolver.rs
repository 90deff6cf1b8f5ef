//! Authorization level resolution

use crate::audit::ResolutionAudit;
use crate::authentication::{AuthLevelClaim, AuthenticationOutcome};
use crate::request::{extract_candidate, CandidateKey, KeySource};
use http::Request;
use keygate_core::{AuthorizationLevel, Key};
use keygate_secrets::{secret_value_equals, KeyMatch, Result, SecretStore};
use std::future::Future;
use std::sync::Arc;

/// Function targeted by a request
///
/// Insert into the request extensions so per-function secrets take part in
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionContext {
    name: String,
}

impl FunctionContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Resolve a candidate key against a store
///
/// An empty candidate is `Anonymous` without touching the store. Store
/// failures are returned, never mapped to `Anonymous`.
pub async fn resolve(
    candidate: &str,
    store: &dyn SecretStore,
    function: Option<&str>,
) -> Result<AuthorizationLevel> {
    resolve_filtered(candidate, store, function, None).await
}

async fn resolve_filtered(
    candidate: &str,
    store: &dyn SecretStore,
    function: Option<&str>,
    key_name: Option<&str>,
) -> Result<AuthorizationLevel> {
    if candidate.is_empty() {
        return Ok(AuthorizationLevel::Anonymous);
    }

    let host = store.host_secrets().await?;

    if let Some(master) = host.master_key_value() {
        if secret_value_equals(candidate, master) {
            return Ok(AuthorizationLevel::Admin);
        }
    }

    if has_matching_key(&host.system_keys, candidate, key_name) {
        return Ok(AuthorizationLevel::System);
    }

    if has_matching_key(&host.function_keys, candidate, key_name) {
        return Ok(AuthorizationLevel::Function);
    }

    if let Some(function) = function {
        if let Some(secrets) = store.function_secrets(function).await? {
            if has_matching_key(secrets.iter(), candidate, key_name) {
                return Ok(AuthorizationLevel::Function);
            }
        }
    }

    Ok(AuthorizationLevel::Anonymous)
}

fn has_matching_key<'a>(
    keys: impl IntoIterator<Item = &'a Key>,
    candidate: &str,
    key_name: Option<&str>,
) -> bool {
    keys.into_iter().any(|key| {
        key.matches(candidate) && key_name.map_or(true, |name| key.name.eq_ignore_ascii_case(name))
    })
}

/// Resolves requests against a shared secret store
///
/// Every resolution emits one [`ResolutionAudit`] record.
#[derive(Clone)]
pub struct AuthorizationLevelResolver {
    store: Arc<dyn SecretStore>,
    key_name: Option<String>,
}

impl AuthorizationLevelResolver {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            key_name: None,
        }
    }

    /// Only accept system and function keys with this name
    ///
    /// The master key is never filtered.
    pub fn with_key_name(mut self, name: impl Into<String>) -> Self {
        self.key_name = Some(name.into());
        self
    }

    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    pub fn store(&self) -> &Arc<dyn SecretStore> {
        &self.store
    }

    /// Resolve a key passed directly
    pub async fn resolve_key(
        &self,
        candidate: &str,
        function: Option<&str>,
    ) -> Result<AuthorizationLevel> {
        let candidate = CandidateKey::new(candidate, KeySource::Explicit);
        self.resolve_candidate(Some(&candidate), function).await
    }

    /// Resolve an already extracted candidate, `None` when no key was presented
    pub async fn resolve_candidate(
        &self,
        candidate: Option<&CandidateKey>,
        function: Option<&str>,
    ) -> Result<AuthorizationLevel> {
        let source = candidate.map_or(KeySource::Absent, CandidateKey::source);
        let audit = ResolutionAudit::new(source, function, self.store.name());

        let result = match candidate {
            Some(candidate) => {
                resolve_filtered(
                    candidate.value(),
                    self.store.as_ref(),
                    function,
                    self.key_name.as_deref(),
                )
                .await
            }
            None => Ok(AuthorizationLevel::Anonymous),
        };

        match &result {
            Ok(level) => audit.with_level(*level).log(),
            Err(e) => audit.with_error(e.to_string()).log(),
        }
        result
    }

    /// Resolve the key carried by a request
    ///
    /// The target function is read from a [`FunctionContext`] extension.
    /// The returned future does not borrow the request.
    pub fn resolve_request<B>(
        &self,
        request: &Request<B>,
    ) -> impl Future<Output = Result<AuthorizationLevel>> + Send + '_ {
        let candidate = extract_candidate(request.headers(), request.uri());
        let function = request
            .extensions()
            .get::<FunctionContext>()
            .map(|ctx| ctx.name().to_string());

        async move {
            self.resolve_candidate(candidate.as_ref(), function.as_deref())
                .await
        }
    }

    /// Authenticate a request: a claim for any level above `Anonymous`
    pub fn authenticate<B>(
        &self,
        request: &Request<B>,
    ) -> impl Future<Output = Result<AuthenticationOutcome>> + Send + '_ {
        let level = self.resolve_request(request);
        async move { Ok(AuthenticationOutcome::from_level(level.await?)) }
    }

    /// Authenticate and attach the claim to the request extensions
    pub async fn authenticate_and_attach<B>(
        &self,
        request: &mut Request<B>,
    ) -> Result<AuthenticationOutcome> {
        let outcome = self.authenticate(request).await?;
        if let AuthenticationOutcome::Success(claim) = outcome {
            request.extensions_mut().insert::<AuthLevelClaim>(claim);
        }
        Ok(outcome)
    }
}
