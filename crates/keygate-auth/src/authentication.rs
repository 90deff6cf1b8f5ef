//! Authentication outcome for request pipelines
//!
//! A resolved level other than `Anonymous` authenticates the request with a
//! single claim carrying the level name. `Anonymous` produces no result so
//! that other schemes may still authenticate the request.

use http::Request;
use keygate_core::AuthorizationLevel;

/// Name of the authentication scheme
pub const AUTH_LEVEL_SCHEME: &str = "AuthLevel";

/// Claim type under which the level is exposed
pub const AUTH_LEVEL_CLAIM_TYPE: &str = "http://schemas.microsoft.com/2017/07/functions/claims/authlevel";

/// The single claim of an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthLevelClaim {
    level: AuthorizationLevel,
}

impl AuthLevelClaim {
    pub fn new(level: AuthorizationLevel) -> Self {
        Self { level }
    }

    pub fn scheme(&self) -> &'static str {
        AUTH_LEVEL_SCHEME
    }

    pub fn claim_type(&self) -> &'static str {
        AUTH_LEVEL_CLAIM_TYPE
    }

    pub fn level(&self) -> AuthorizationLevel {
        self.level
    }

    /// Claim value: the level name
    pub fn value(&self) -> &'static str {
        self.level.as_str()
    }

    /// Claim attached to a request by an earlier authentication
    pub fn from_request<B>(request: &Request<B>) -> Option<&AuthLevelClaim> {
        request.extensions().get::<AuthLevelClaim>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    Success(AuthLevelClaim),
    NoResult,
}

impl AuthenticationOutcome {
    pub fn from_level(level: AuthorizationLevel) -> Self {
        if level.is_anonymous() {
            AuthenticationOutcome::NoResult
        } else {
            AuthenticationOutcome::Success(AuthLevelClaim::new(level))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthenticationOutcome::Success(_))
    }

    pub fn claim(&self) -> Option<&AuthLevelClaim> {
        match self {
            AuthenticationOutcome::Success(claim) => Some(claim),
            AuthenticationOutcome::NoResult => None,
        }
    }

    /// Level granted, `Anonymous` when there is no result
    pub fn level(&self) -> AuthorizationLevel {
        self.claim()
            .map_or(AuthorizationLevel::Anonymous, AuthLevelClaim::level)
    }
}

/// Whether an authenticated request holds at least `required`
pub fn is_authorized<B>(request: &Request<B>, required: AuthorizationLevel) -> bool {
    let granted = AuthLevelClaim::from_request(request)
        .map_or(AuthorizationLevel::Anonymous, AuthLevelClaim::level);
    granted.satisfies(required)
}
