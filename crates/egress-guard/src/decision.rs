//! The per-request audit record produced by every admission outcome.

use std::time::Duration;

use egress_core::{RequestId, SessionId};

use crate::error::Blocker;
use crate::sensitivity::Sensitivity;

/// Per-request audit record.
///
/// Exactly one is produced for every call through the admission pipeline —
/// whether admitted or blocked — and it never carries raw request content,
/// only the content fingerprint.
#[derive(Debug, Clone)]
pub struct EgressDecision {
    /// Fresh identifier for this call.
    pub request_id: RequestId,
    /// The session this call belongs to.
    pub session_id: SessionId,
    /// Provider name.
    pub provider: String,
    /// Model name.
    pub model: String,
    /// Sensitivity verdict, set once the classifier runs.
    pub sensitivity: Option<Sensitivity>,
    /// SHA-256 hex fingerprint of the serialized request. Empty for an
    /// empty serialization.
    pub fingerprint: String,
    /// Whether the call was admitted.
    pub allowed: bool,
    /// Which check blocked the call, if any.
    pub blocked_by: Option<Blocker>,
    /// Human-readable block reason, if any.
    pub block_reason: Option<String>,
    /// Estimated total tokens at admission time.
    pub estimated_tokens: usize,
    /// Estimated cost in cents at admission time.
    pub estimated_cost_cents: f64,
    /// Creation timestamp, ms since the Unix epoch, UTC.
    pub created_at_ms: i64,
    /// How long the admission pipeline took to decide.
    pub pipeline_duration: Duration,
}

impl EgressDecision {
    /// Start a fresh, not-yet-decided scaffold for a new call.
    #[must_use]
    pub fn scaffold(session_id: SessionId, provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            session_id,
            provider: provider.into(),
            model: model.into(),
            sensitivity: None,
            fingerprint: String::new(),
            allowed: false,
            blocked_by: None,
            block_reason: None,
            estimated_tokens: 0,
            estimated_cost_cents: 0.0,
            created_at_ms: egress_core::now_ms(),
            pipeline_duration: Duration::ZERO,
        }
    }

    /// Stamp this decision as blocked.
    pub fn block(&mut self, blocker: Blocker, reason: impl Into<String>) {
        self.allowed = false;
        self.blocked_by = Some(blocker);
        self.block_reason = Some(reason.into());
    }

    /// Stamp this decision as admitted.
    pub fn admit(&mut self) {
        self.allowed = true;
        self.blocked_by = None;
        self.block_reason = None;
    }
}
