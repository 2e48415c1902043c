//! Allow/deny lists with deny precedence.

use std::collections::HashSet;

use crate::provider::is_local;

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyResult {
    /// The provider may proceed to the next admission check.
    Allowed,
    /// The provider is blocked, with a human-readable reason.
    Blocked {
        /// Why the provider was blocked.
        reason: String,
    },
}

impl PolicyResult {
    /// Whether this result allows the call to proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Provider allow/deny lists.
///
/// Immutable after construction — reads never synchronize. Resolution
/// order: `ollama` always allowed; deny-set membership blocks; a non-empty
/// allow-set that omits the provider blocks; otherwise allowed. Deny beats
/// allow when a provider appears in both sets.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    allowlist: HashSet<String>,
    denylist: HashSet<String>,
}

impl Policy {
    /// Build a policy from explicit allow/deny sets.
    #[must_use]
    pub fn new(allowlist: HashSet<String>, denylist: HashSet<String>) -> Self {
        Self {
            allowlist,
            denylist,
        }
    }

    /// Check whether `provider` may proceed.
    #[must_use]
    pub fn check(&self, provider: &str) -> PolicyResult {
        if is_local(provider) {
            return PolicyResult::Allowed;
        }
        if self.denylist.contains(provider) {
            return PolicyResult::Blocked {
                reason: format!("provider \"{provider}\" is in the denylist"),
            };
        }
        if !self.allowlist.is_empty() && !self.allowlist.contains(provider) {
            return PolicyResult::Blocked {
                reason: format!("provider \"{provider}\" is not in the allowlist"),
            };
        }
        PolicyResult::Allowed
    }
}
