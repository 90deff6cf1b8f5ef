//! Secrets management for Keygate
//!
//! This crate provides:
//! - **Constant-time key comparison** used by every key match
//! - **Versioned serializers**: every historical document layout can be read,
//!   only the current one is written
//! - **Snapshot stores**: host and per-function secrets loaded into an
//!   immutable snapshot that is swapped, never mutated, on refresh

pub mod compare;
pub mod error;
pub mod serializer;
pub mod store;

pub use compare::{secret_value_equals, KeyMatch};
pub use error::{Result, SecretsError};
pub use serializer::{
    read_function_secrets, read_host_secrets, write_function_secrets, write_host_secrets,
    SecretFormat, SecretSerializer,
};
pub use store::{
    DocumentInfo, DocumentKind, DocumentSummary, FileSecretStore, InMemorySecretStore,
    KeySummary, SecretStore, SecretsSnapshot, UpgradeReport,
};
