//! Prometheus-shaped metrics via the `metrics` facade crate.
//!
//! All label values come from closed sets — provider identity (small and
//! known for any deployment), the seven [`crate::error::Blocker`] strings,
//! and the five [`crate::sensitivity::Sensitivity`] strings — so label
//! cardinality never grows with request volume. No recorder is installed
//! by this crate; an embedder wires one up (Prometheus exporter, statsd,
//! or nothing at all, in which case these calls are no-ops).

use std::time::Duration;

use metrics::{counter, histogram};

use crate::error::Blocker;
use crate::sensitivity::Sensitivity;

/// The six named metrics the admission pipeline emits.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuardMetrics;

impl GuardMetrics {
    /// Build a metrics recorder facade. Stateless — it only forwards to
    /// whatever `metrics::Recorder` the embedding process installed.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// `calls_total{provider,status}` — one increment per completed or
    /// blocked call. `status` is one of `"success"`, `"error"`, `"blocked"`.
    pub fn record_call(&self, provider: &str, status: &str) {
        counter!(
            "calls_total",
            "provider" => provider.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
    }

    /// `tokens_total{provider,direction}` — `direction` is `"input"` or
    /// `"output"`. A zero amount is not recorded.
    pub fn record_tokens(&self, provider: &str, direction: &str, amount: usize) {
        if amount == 0 {
            return;
        }
        counter!(
            "tokens_total",
            "provider" => provider.to_string(),
            "direction" => direction.to_string()
        )
        .increment(amount as u64);
    }

    /// `blocked_total{provider,blocked_by}`.
    pub fn record_blocked(&self, provider: &str, blocked_by: Blocker) {
        counter!(
            "blocked_total",
            "provider" => provider.to_string(),
            "blocked_by" => blocked_by.as_str()
        )
        .increment(1);
    }

    /// `latency_seconds{provider}` — wall-clock duration of the inner call.
    pub fn record_latency(&self, provider: &str, duration: Duration) {
        histogram!("latency_seconds", "provider" => provider.to_string()).record(duration.as_secs_f64());
    }

    /// `cost_cents_total{provider}` — approximate; [`crate::cost_estimator::CostEstimator`]
    /// holds the exact cumulative total for budget enforcement. This metric
    /// rounds to whole cents for the counter's integer domain.
    pub fn record_cost(&self, provider: &str, cents: f64) {
        if cents <= 0.0 {
            return;
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let rounded = cents.round() as u64;
        if rounded == 0 {
            return;
        }
        counter!("cost_cents_total", "provider" => provider.to_string()).increment(rounded);
    }

    /// `sensitivity_total{provider,sensitivity}`.
    pub fn record_sensitivity(&self, provider: &str, sensitivity: Sensitivity) {
        counter!(
            "sensitivity_total",
            "provider" => provider.to_string(),
            "sensitivity" => sensitivity.as_str()
        )
        .increment(1);
    }
}
