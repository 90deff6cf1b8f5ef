//! Authorization level resolution for Keygate
//!
//! Given a request (or a raw candidate key) and a [`SecretStore`], decide
//! which [`AuthorizationLevel`] the caller holds:
//!
//! 1. Candidate key from the `x-functions-key` header, else the `code` query
//!    parameter
//! 2. Master key → `Admin`
//! 3. System keys → `System`
//! 4. Host function keys → `Function`
//! 5. Secrets of the targeted function → `Function`
//! 6. Otherwise `Anonymous`
//!
//! [`SecretStore`]: keygate_secrets::SecretStore
//! [`AuthorizationLevel`]: keygate_core::AuthorizationLevel

pub mod audit;
pub mod authentication;
pub mod request;
pub mod resolver;

pub use audit::ResolutionAudit;
pub use authentication::{
    is_authorized, AuthLevelClaim, AuthenticationOutcome, AUTH_LEVEL_CLAIM_TYPE,
    AUTH_LEVEL_SCHEME,
};
pub use request::{
    extract_candidate, CandidateKey, KeySource, CODE_QUERY_PARAM, FUNCTIONS_KEY_HEADER,
};
pub use resolver::{resolve, AuthorizationLevelResolver, FunctionContext};
