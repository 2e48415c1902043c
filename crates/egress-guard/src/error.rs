//! Stable sentinel errors for the admission pipeline and client construction.
//!
//! Callers test identity (`matches!(err, GuardError::RateLimited { .. })`)
//! rather than parsing the human-readable reason string.

use thiserror::Error;

use egress_core::SecretError;
use egress_llm::LlmError;

/// The name of the admission check that produced a block.
///
/// A closed set of seven — one per check in the pipeline that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    /// [`crate::control_plane::ControlPlane`] reported the provider disabled.
    KillSwitch,
    /// [`crate::policy::Policy`] denied the provider.
    Policy,
    /// [`crate::consent::Consent`] withheld consent.
    Consent,
    /// [`crate::classifier::Classifier`] returned a non-transmissible label.
    SensitiveData,
    /// [`crate::rate_limiter::RateLimiter`] denied admission.
    RateLimit,
    /// [`crate::token_budget::TokenBudget`] had insufficient remaining tokens.
    Budget,
    /// [`crate::cost_estimator::CostEstimator`] would exceed the cost ceiling.
    Cost,
}

impl Blocker {
    /// The stable string stamped on [`crate::decision::EgressDecision::blocked_by`]
    /// and used as the `blocked_by` metric/audit label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KillSwitch => "kill_switch",
            Self::Policy => "policy",
            Self::Consent => "consent",
            Self::SensitiveData => "sensitive_data",
            Self::RateLimit => "rate_limit",
            Self::Budget => "budget",
            Self::Cost => "cost",
        }
    }
}

impl std::fmt::Display for Blocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors returned by the egress guard.
///
/// The first seven variants are the admission-failure taxonomy, one per
/// [`Blocker`]; [`GuardError::SecretNotFound`] is surfaced by the secret
/// backend during client construction, not by the admission pipeline, and
/// [`GuardError::NullRequest`] rejects a missing request before the
/// pipeline even starts.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Blocked by the global or per-provider kill switch.
    #[error("{reason}")]
    ProviderDisabled {
        /// Human-readable block reason.
        reason: String,
    },
    /// Blocked by the allow/deny list policy.
    #[error("{reason}")]
    ProviderDenied {
        /// Human-readable block reason.
        reason: String,
    },
    /// Blocked for lack of user consent.
    #[error("{reason}")]
    NoConsent {
        /// Human-readable block reason.
        reason: String,
    },
    /// Blocked because the payload classified above `confidential`.
    #[error("{reason}")]
    SensitiveData {
        /// Human-readable block reason.
        reason: String,
    },
    /// Blocked by the per-session or per-role token budget.
    #[error("{reason}")]
    TokenBudgetExhausted {
        /// Human-readable block reason.
        reason: String,
    },
    /// Blocked by the process-wide cost ceiling.
    #[error("{reason}")]
    CostLimitReached {
        /// Human-readable block reason.
        reason: String,
    },
    /// Blocked by the per-provider sliding-window rate limit.
    #[error("{reason}")]
    RateLimited {
        /// Human-readable block reason.
        reason: String,
    },
    /// A secret (e.g. an API key) could not be resolved during client
    /// construction. Not an admission outcome.
    #[error(transparent)]
    SecretNotFound(#[from] SecretError),
    /// The caller passed a null/absent request.
    #[error("request must not be null")]
    NullRequest,
    /// The inner client itself failed. Carried verbatim, not reclassified
    /// as an admission outcome — the caller sees the provider's own
    /// diagnostic.
    #[error(transparent)]
    Inner(#[from] LlmError),
}

impl GuardError {
    /// Build the sentinel error for a given blocker and reason, per the
    /// blocker-to-sentinel mapping in the admission pipeline design.
    ///
    /// Total and single-valued: every [`Blocker`] maps to exactly one
    /// variant. There is no "unknown blocker" case because `Blocker` is a
    /// closed enum — the match is exhaustive at compile time.
    #[must_use]
    pub fn from_blocker(blocker: Blocker, reason: String) -> Self {
        match blocker {
            Blocker::KillSwitch => Self::ProviderDisabled { reason },
            Blocker::Policy => Self::ProviderDenied { reason },
            Blocker::Consent => Self::NoConsent { reason },
            Blocker::SensitiveData => Self::SensitiveData { reason },
            Blocker::RateLimit => Self::RateLimited { reason },
            Blocker::Budget => Self::TokenBudgetExhausted { reason },
            Blocker::Cost => Self::CostLimitReached { reason },
        }
    }
}

/// Result type for admission and guard operations.
pub type GuardResult<T> = Result<T, GuardError>;
