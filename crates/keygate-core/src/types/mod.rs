//! Type definitions for secrets and authorization levels

mod auth_types;
mod secret_types;

pub use auth_types::*;
pub use secret_types::*;
