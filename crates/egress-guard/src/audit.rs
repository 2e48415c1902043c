//! Structured audit trail for the admission pipeline.
//!
//! Audit records are `tracing` events rather than a bespoke log writer, so
//! a downstream subscriber failure can never affect the call itself. Four
//! event kinds are emitted: `egress_before` on admission, `egress_blocked`
//! on a denied call, `egress_minimization` when minimization made a
//! non-trivial change, and `egress_after` once the inner call returns.

use std::time::Duration;

use crate::decision::EgressDecision;
use crate::minimizer::MinimizationStats;

/// Trace correlation carried alongside an audit record.
///
/// Lookup is total: an absent tracing span yields [`TraceContext::none`],
/// which simply omits the fields from the emitted event rather than
/// failing the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    /// Trace identifier, if one was active.
    pub trace_id: Option<String>,
    /// Span identifier, if one was active.
    pub span_id: Option<String>,
}

impl TraceContext {
    /// No active trace context.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Derive a trace context from the current `tracing` span, if any is
    /// entered. There is no ambient trace-ID source without an OpenTelemetry
    /// layer installed, so only the span ID is populated.
    #[must_use]
    pub fn current() -> Self {
        let span_id = tracing::Span::current()
            .id()
            .map(|id| format!("{:x}", id.into_u64()));
        Self {
            trace_id: None,
            span_id,
        }
    }
}

/// Emits the four audit events the admission pipeline produces.
#[derive(Debug, Clone, Copy)]
pub struct Auditor {
    enabled: bool,
    hash_content: bool,
}

impl Auditor {
    /// Build an auditor. `hash_content` controls whether `egress_before`
    /// includes the content fingerprint.
    #[must_use]
    pub fn new(enabled: bool, hash_content: bool) -> Self {
        Self {
            enabled,
            hash_content,
        }
    }

    /// Emit `egress_before` for an admitted call.
    pub fn before(&self, decision: &EgressDecision, trace: &TraceContext) {
        if !self.enabled {
            return;
        }
        let fingerprint = if self.hash_content {
            decision.fingerprint.as_str()
        } else {
            ""
        };
        tracing::info!(
            event = "egress_before",
            request_id = %decision.request_id,
            session_id = %decision.session_id,
            provider = %decision.provider,
            model = %decision.model,
            sensitivity = decision.sensitivity.map(crate::sensitivity::Sensitivity::as_str).unwrap_or_default(),
            fingerprint,
            estimated_tokens = decision.estimated_tokens,
            estimated_cost_cents = decision.estimated_cost_cents,
            timestamp_ms = decision.created_at_ms,
            trace_id = trace.trace_id.as_deref().unwrap_or_default(),
            span_id = trace.span_id.as_deref().unwrap_or_default(),
            "egress admitted"
        );
    }

    /// Emit `egress_blocked` for a denied call.
    pub fn blocked(&self, decision: &EgressDecision, duration: Duration, trace: &TraceContext) {
        if !self.enabled {
            return;
        }
        tracing::info!(
            event = "egress_blocked",
            request_id = %decision.request_id,
            session_id = %decision.session_id,
            provider = %decision.provider,
            model = %decision.model,
            sensitivity = decision.sensitivity.map(crate::sensitivity::Sensitivity::as_str).unwrap_or_default(),
            blocked_by = decision.blocked_by.map(crate::error::Blocker::as_str).unwrap_or_default(),
            reason = decision.block_reason.as_deref().unwrap_or_default(),
            duration_ms = duration.as_millis() as u64,
            timestamp_ms = decision.created_at_ms,
            trace_id = trace.trace_id.as_deref().unwrap_or_default(),
            span_id = trace.span_id.as_deref().unwrap_or_default(),
            "egress blocked"
        );
    }

    /// Emit `egress_minimization` when the minimizer made a non-trivial
    /// change. Callers should skip this call entirely when
    /// [`MinimizationStats::is_non_trivial`] is false.
    pub fn minimization(&self, decision: &EgressDecision, stats: &MinimizationStats, trace: &TraceContext) {
        if !self.enabled {
            return;
        }
        tracing::info!(
            event = "egress_minimization",
            request_id = %decision.request_id,
            original_tokens = stats.original_tokens,
            minimized_tokens = stats.minimized_tokens,
            prompt_delta = stats.prompt_delta,
            tool_defs_delta = stats.tool_defs_delta,
            messages_delta = stats.messages_delta,
            truncated_results = stats.truncated_results,
            dropped_messages = stats.dropped_messages,
            reduction_pct = stats.reduction_pct(),
            trace_id = trace.trace_id.as_deref().unwrap_or_default(),
            span_id = trace.span_id.as_deref().unwrap_or_default(),
            "egress minimized"
        );
    }

    /// Emit `egress_after` once the inner call returns, whether it
    /// succeeded or failed.
    #[allow(clippy::too_many_arguments)]
    pub fn after(
        &self,
        decision: &EgressDecision,
        status: &str,
        input_tokens: usize,
        output_tokens: usize,
        duration: Duration,
        cost_cents: f64,
        error: Option<&str>,
        trace: &TraceContext,
    ) {
        if !self.enabled {
            return;
        }
        tracing::info!(
            event = "egress_after",
            request_id = %decision.request_id,
            session_id = %decision.session_id,
            provider = %decision.provider,
            model = %decision.model,
            status,
            input_tokens,
            output_tokens,
            duration_ms = duration.as_millis() as u64,
            cost_cents,
            error = error.unwrap_or_default(),
            trace_id = trace.trace_id.as_deref().unwrap_or_default(),
            span_id = trace.span_id.as_deref().unwrap_or_default(),
            "egress completed"
        );
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egress_core::SessionId;

    #[test]
    fn no_active_span_yields_empty_trace_context() {
        let trace = TraceContext::none();
        assert!(trace.trace_id.is_none());
        assert!(trace.span_id.is_none());
    }

    #[test]
    fn disabled_auditor_emits_nothing_and_never_panics() {
        let auditor = Auditor::new(false, true);
        let decision = EgressDecision::scaffold(SessionId::new(), "anthropic", "claude-sonnet");
        let trace = TraceContext::none();
        auditor.before(&decision, &trace);
        auditor.blocked(&decision, Duration::from_millis(1), &trace);
        auditor.after(&decision, "success", 1, 1, Duration::ZERO, 0.0, None, &trace);
    }

    #[test]
    fn enabled_auditor_handles_every_event_kind_without_panicking() {
        let auditor = Auditor::new(true, true);
        let mut decision = EgressDecision::scaffold(SessionId::new(), "anthropic", "claude-sonnet");
        decision.admit();
        let trace = TraceContext::none();
        auditor.before(&decision, &trace);
        let stats = MinimizationStats {
            original_tokens: 100,
            minimized_tokens: 50,
            ..MinimizationStats::default()
        };
        auditor.minimization(&decision, &stats, &trace);
        auditor.after(&decision, "success", 10, 5, Duration::from_millis(5), 1.2, None, &trace);

        decision.block(crate::error::Blocker::Policy, "denied");
        auditor.blocked(&decision, Duration::from_millis(1), &trace);
    }
}
