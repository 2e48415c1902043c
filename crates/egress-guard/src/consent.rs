//! Per-provider user consent, plus a local-only mode that blocks every
//! cloud provider regardless of individual consent flags.

use std::collections::HashMap;

use crate::env::provider_env_key;
use crate::provider::is_local;

/// Outcome of a consent check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentResult {
    /// The provider has consent to proceed.
    Consented,
    /// Consent is missing or withheld, with a human-readable reason.
    Denied {
        /// Why consent was denied.
        reason: String,
    },
}

impl ConsentResult {
    /// Whether this result allows the call to proceed.
    #[must_use]
    pub fn is_consented(&self) -> bool {
        matches!(self, Self::Consented)
    }
}

/// Per-provider consent flags plus the local-only override.
///
/// Immutable after construction — reads never synchronize.
#[derive(Debug, Clone, Default)]
pub struct Consent {
    local_only: bool,
    consent: HashMap<String, bool>,
}

impl Consent {
    /// Build consent state from a local-only flag and a provider->consented map.
    #[must_use]
    pub fn new(local_only: bool, consent: HashMap<String, bool>) -> Self {
        Self {
            local_only,
            consent,
        }
    }

    /// Check whether `provider` has consent to proceed.
    #[must_use]
    pub fn check(&self, provider: &str) -> ConsentResult {
        if is_local(provider) {
            return ConsentResult::Consented;
        }
        if self.local_only {
            return ConsentResult::Denied {
                reason:
                    "local-only mode is active — all cloud providers blocked (set LOCAL_ONLY=false to allow)"
                        .to_string(),
            };
        }
        match self.consent.get(provider) {
            Some(true) => ConsentResult::Consented,
            _ => ConsentResult::Denied {
                reason: format!(
                    "provider \"{provider}\" requires user consent — set CONSENT_{}=true",
                    provider_env_key(provider)
                ),
            },
        }
    }
}
