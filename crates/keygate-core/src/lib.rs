//! # keygate-core
//!
//! Core library for Keygate providing:
//! - The secret document model (keys, host secrets, function secrets)
//! - Authorization levels granted to callers of the function host
//! - Configuration loading with layered precedence

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::{HierarchicalConfigLoader, KeygateConfig};
pub use error::{Error, Result};
pub use types::{AuthorizationLevel, FunctionSecrets, HostSecrets, Key};
pub use utils::{default_config_dir, home_dir};
