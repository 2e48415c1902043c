//! Process-wide admission configuration, loaded once at startup.
//!
//! Every field has a safe default; a malformed environment variable falls
//! back to that default rather than aborting startup (see [`crate::env`]).
//! Per-provider knobs that can't be enumerated ahead of time — consent,
//! rate limits, capability overrides — are read lazily by the components
//! that own them rather than being pre-loaded here.

use crate::env::{bool_var, f64_var, set_var, usize_var};

/// Top-level admission configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Global egress kill switch. `false` blocks every non-local provider.
    pub egress_enabled: bool,
    /// When active, every cloud provider is blocked regardless of policy.
    pub local_only: bool,
    /// Providers explicitly allowed. Empty means "no allowlist restriction".
    pub allowlist: std::collections::HashSet<String>,
    /// Providers explicitly denied. Deny beats allow.
    pub denylist: std::collections::HashSet<String>,
    /// Whether audit records are emitted at all.
    pub audit_enabled: bool,
    /// Whether `egress_before` audit records include the content fingerprint.
    pub audit_hash_content: bool,
    /// Whether the minimizer runs at all.
    pub minimization_enabled: bool,
    /// Estimated-token threshold below which minimization is skipped.
    pub min_context_tokens: usize,
    /// Process-wide cost ceiling in US cents. `0.0` means unlimited.
    pub cost_limit_cents: f64,
}

impl Config {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            egress_enabled: bool_var("EGRESS_ENABLED", true),
            local_only: bool_var("LOCAL_ONLY", false),
            allowlist: set_var("EGRESS_ALLOWLIST"),
            denylist: set_var("EGRESS_DENYLIST"),
            audit_enabled: bool_var("AUDIT_ENABLED", true),
            audit_hash_content: bool_var("AUDIT_HASH_CONTENT", true),
            minimization_enabled: bool_var("MINIMIZATION_ENABLED", true),
            min_context_tokens: usize_var("MIN_CONTEXT_TOKENS", 500),
            cost_limit_cents: f64_var("COST_LIMIT_CENTS", 0.0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            egress_enabled: true,
            local_only: false,
            allowlist: std::collections::HashSet::new(),
            denylist: std::collections::HashSet::new(),
            audit_enabled: true,
            audit_hash_content: true,
            minimization_enabled: true,
            min_context_tokens: 500,
            cost_limit_cents: 0.0,
        }
    }
}
