//! Configuration loading and management

mod hierarchical_loader;
mod settings;

pub use hierarchical_loader::HierarchicalConfigLoader;
pub use settings::{
    AuthConfig, AuthSection, KeygateConfig, KeygateConfigFile, SecretsConfig, SecretsSection,
};
