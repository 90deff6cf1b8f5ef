//! Constant-time secret comparison
//!
//! Every key match in the workspace goes through [`secret_value_equals`] so
//! that the time taken does not depend on where a candidate first differs
//! from the stored value.

use keygate_core::Key;
use subtle::ConstantTimeEq;

/// Compare a candidate against a stored secret value
///
/// An empty stored value never matches, whatever the candidate. Lengths are
/// compared up front; only the content comparison is constant-time.
pub fn secret_value_equals(candidate: &str, stored: &str) -> bool {
    if stored.is_empty() {
        return false;
    }

    bool::from(candidate.as_bytes().ct_eq(stored.as_bytes()))
}

/// Value matching for keys
pub trait KeyMatch {
    fn matches(&self, candidate: &str) -> bool;
}

impl KeyMatch for Key {
    fn matches(&self, candidate: &str) -> bool {
        secret_value_equals(candidate, &self.value)
    }
}
