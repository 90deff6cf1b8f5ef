//! Authorization levels granted to callers of the function host

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access tier granted to a request
///
/// Variants are ordered by capability: `Anonymous < Function < System < Admin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum AuthorizationLevel {
    /// No key, or a key matching nothing
    #[default]
    Anonymous,
    /// Host-level or per-function function key
    Function,
    /// System key, for host-internal operations below admin
    System,
    /// Master key
    Admin,
}

impl AuthorizationLevel {
    pub const ALL: [AuthorizationLevel; 4] = [
        AuthorizationLevel::Anonymous,
        AuthorizationLevel::Function,
        AuthorizationLevel::System,
        AuthorizationLevel::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationLevel::Anonymous => "Anonymous",
            AuthorizationLevel::Function => "Function",
            AuthorizationLevel::System => "System",
            AuthorizationLevel::Admin => "Admin",
        }
    }

    /// Whether this level grants everything `required` grants
    pub fn satisfies(&self, required: AuthorizationLevel) -> bool {
        *self >= required
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, AuthorizationLevel::Anonymous)
    }
}

impl fmt::Display for AuthorizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorizationLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuthorizationLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_authorization_level(s))
    }
}
