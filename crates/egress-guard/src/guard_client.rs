//! The decorators enforcing admission, minimization, auditing, and metrics
//! around an inner LLM client: [`GuardClient`] wraps a [`CompletionClient`],
//! [`ChatGuardClient`] wraps a [`ChatClient`]. Both drive the same
//! seven-check [`AdmissionPipeline`] so the checks are defined exactly once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use egress_core::SessionId;
use egress_llm::{ChatClient, CompletionClient, CompletionRequest, CompletionResponse};

use crate::audit::{Auditor, TraceContext};
use crate::capabilities::CapabilitiesRegistry;
use crate::classifier::Classifier;
use crate::consent::{Consent, ConsentResult};
use crate::control_plane::ControlPlane;
use crate::cost_estimator::CostEstimator;
use crate::decision::EgressDecision;
use crate::error::{Blocker, GuardError, GuardResult};
use crate::metrics::GuardMetrics;
use crate::minimizer::estimate::estimate_text_tokens;
use crate::minimizer::DataMinimizer;
use crate::policy::{Policy, PolicyResult};
use crate::provider::is_local;
use crate::rate_limiter::{RateLimitResult, RateLimiter};
use crate::token_budget::TokenBudget;

/// Serialize a completion request into the bytes the classifier and
/// fingerprint operate on: the system prompt, then each message's content,
/// each terminated by a newline. Empty segments are skipped, so an empty
/// system prompt and no messages serialize to an empty (not newline-only)
/// byte vector.
#[must_use]
pub fn serialize_request(request: &CompletionRequest) -> Vec<u8> {
    let mut buf = String::new();
    if !request.system.is_empty() {
        buf.push_str(&request.system);
        buf.push('\n');
    }
    for message in &request.messages {
        if !message.content.is_empty() {
            buf.push_str(&message.content);
            buf.push('\n');
        }
    }
    buf.into_bytes()
}

/// Serialize a chat prompt the same way a completion request's messages are.
#[must_use]
pub fn serialize_prompt(prompt: &str) -> Vec<u8> {
    if prompt.is_empty() {
        return Vec::new();
    }
    format!("{prompt}\n").into_bytes()
}

/// SHA-256 hex fingerprint of `serialized`. Empty input fingerprints to the
/// empty string rather than the hash of zero bytes, so an empty request is
/// visibly distinguishable in an audit trail from one that merely collides.
#[must_use]
pub fn fingerprint(serialized: &[u8]) -> String {
    if serialized.is_empty() {
        return String::new();
    }
    let mut hasher = Sha256::new();
    hasher.update(serialized);
    hex::encode(hasher.finalize())
}

/// The seven-check admission pipeline, shared by [`GuardClient`] and
/// [`ChatGuardClient`].
///
/// Holding this as one struct (rather than duplicating the fields on both
/// decorators) keeps the check order, audit emission, and metrics recording
/// defined exactly once.
pub struct AdmissionPipeline {
    session_id: SessionId,
    control_plane: Arc<ControlPlane>,
    policy: Arc<Policy>,
    consent: Arc<Consent>,
    classifier: Arc<dyn Classifier>,
    rate_limiter: Arc<RateLimiter>,
    token_budget: Option<Arc<TokenBudget>>,
    cost_estimator: Arc<CostEstimator>,
    auditor: Arc<Auditor>,
    metrics: Arc<GuardMetrics>,
}

impl AdmissionPipeline {
    /// Assemble a pipeline for one guarded client. `token_budget` is `None`
    /// when the client was built without a per-role budget.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        control_plane: Arc<ControlPlane>,
        policy: Arc<Policy>,
        consent: Arc<Consent>,
        classifier: Arc<dyn Classifier>,
        rate_limiter: Arc<RateLimiter>,
        token_budget: Option<Arc<TokenBudget>>,
        cost_estimator: Arc<CostEstimator>,
        auditor: Arc<Auditor>,
        metrics: Arc<GuardMetrics>,
    ) -> Self {
        Self {
            session_id,
            control_plane,
            policy,
            consent,
            classifier,
            rate_limiter,
            token_budget,
            cost_estimator,
            auditor,
            metrics,
        }
    }

    pub(crate) fn auditor(&self) -> &Auditor {
        &self.auditor
    }

    pub(crate) fn metrics(&self) -> &GuardMetrics {
        &self.metrics
    }

    /// Run the seven admission checks in order against a serialized payload
    /// and its estimated token cost. Returns the scaffolded decision (always
    /// populated, admitted or not) and the admission outcome.
    pub(crate) fn admit(
        &self,
        provider: &str,
        model: &str,
        serialized: &[u8],
        estimated_input_tokens: usize,
        estimated_output_tokens: usize,
    ) -> (EgressDecision, Result<(), GuardError>) {
        let mut decision = EgressDecision::scaffold(self.session_id, provider, model);

        let (enabled, reason) = self.control_plane.is_enabled(provider);
        if !enabled {
            let reason = reason.unwrap_or_else(|| "provider disabled".to_string());
            decision.block(Blocker::KillSwitch, reason.clone());
            return (decision, Err(GuardError::from_blocker(Blocker::KillSwitch, reason)));
        }

        if let PolicyResult::Blocked { reason } = self.policy.check(provider) {
            decision.block(Blocker::Policy, reason.clone());
            return (decision, Err(GuardError::from_blocker(Blocker::Policy, reason)));
        }

        if let ConsentResult::Denied { reason } = self.consent.check(provider) {
            decision.block(Blocker::Consent, reason.clone());
            return (decision, Err(GuardError::from_blocker(Blocker::Consent, reason)));
        }

        let sensitivity = self.classifier.classify(serialized);
        decision.sensitivity = Some(sensitivity);
        self.metrics.record_sensitivity(provider, sensitivity);
        if !sensitivity.permits_external_transmission() {
            let reason = format!(
                "data classified as {sensitivity} — cannot send to external provider \"{provider}\""
            );
            decision.block(Blocker::SensitiveData, reason.clone());
            return (decision, Err(GuardError::from_blocker(Blocker::SensitiveData, reason)));
        }

        decision.fingerprint = fingerprint(serialized);

        #[allow(clippy::cast_sign_loss)]
        let now_ms = egress_core::now_ms().max(0) as u64;
        if let RateLimitResult::Denied { retry_after } = self.rate_limiter.check(provider, now_ms) {
            let reason = format!(
                "rate limit exceeded for \"{provider}\" — retry after {}ms",
                retry_after.as_millis()
            );
            decision.block(Blocker::RateLimit, reason.clone());
            return (decision, Err(GuardError::from_blocker(Blocker::RateLimit, reason)));
        }

        decision.estimated_tokens = estimated_input_tokens + estimated_output_tokens;

        if let Some(budget) = &self.token_budget {
            let (ok, remaining) = budget.can_spend(decision.estimated_tokens);
            if !ok {
                let reason = format!(
                    "token budget exhausted — {remaining} tokens remaining, need {}",
                    decision.estimated_tokens
                );
                decision.block(Blocker::Budget, reason.clone());
                return (decision, Err(GuardError::from_blocker(Blocker::Budget, reason)));
            }
        }

        let estimated_cost_cents =
            self.cost_estimator
                .estimate_cents(model, estimated_input_tokens, estimated_output_tokens);
        decision.estimated_cost_cents = estimated_cost_cents;
        if !self
            .cost_estimator
            .can_afford(model, estimated_input_tokens, estimated_output_tokens)
        {
            let reason = format!("cost limit would be exceeded — estimated {estimated_cost_cents:.2} cents");
            decision.block(Blocker::Cost, reason.clone());
            return (decision, Err(GuardError::from_blocker(Blocker::Cost, reason)));
        }

        decision.admit();
        (decision, Ok(()))
    }

    /// Record actual post-call accounting: cost and (when set) the
    /// per-role token budget. Returns the call's own cost in cents.
    pub(crate) fn record_after(&self, model: &str, input_tokens: usize, output_tokens: usize) -> f64 {
        let cost = self.cost_estimator.record(model, input_tokens, output_tokens);
        if let Some(budget) = &self.token_budget {
            budget.record(input_tokens + output_tokens);
        }
        cost
    }

    /// Emit the audit and metrics side effects for a blocked call.
    pub(crate) fn audit_block(&self, provider: &str, decision: &EgressDecision, duration: Duration, trace: &TraceContext) {
        self.auditor.blocked(decision, duration, trace);
        self.metrics.record_call(provider, "blocked");
        if let Some(blocker) = decision.blocked_by {
            self.metrics.record_blocked(provider, blocker);
        }
    }
}

/// Decorates a [`CompletionClient`] with the admission pipeline and the
/// four-stage data minimizer.
pub struct GuardClient<C: CompletionClient> {
    inner: C,
    capabilities: Arc<CapabilitiesRegistry>,
    minimizer: Arc<DataMinimizer>,
    pipeline: AdmissionPipeline,
}

impl<C: CompletionClient> GuardClient<C> {
    /// Wrap `inner` with a pre-assembled admission pipeline, capability
    /// registry, and minimizer. Built by [`crate::factory::GuardFactory`].
    #[must_use]
    pub fn new(
        inner: C,
        pipeline: AdmissionPipeline,
        capabilities: Arc<CapabilitiesRegistry>,
        minimizer: Arc<DataMinimizer>,
    ) -> Self {
        Self {
            inner,
            capabilities,
            minimizer,
            pipeline,
        }
    }

    /// Provider identifier of the wrapped client.
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Model identifier of the wrapped client.
    #[must_use]
    pub fn model(&self) -> &str {
        self.inner.model()
    }

    /// Run `request` through admission, minimization, and the inner client.
    ///
    /// `ollama` bypasses the pipeline entirely: no admission check runs, no
    /// audit record is emitted, no metric is incremented, and the inner
    /// response is returned verbatim.
    pub async fn complete(
        &self,
        request: Option<CompletionRequest>,
        cancel: CancellationToken,
    ) -> GuardResult<CompletionResponse> {
        let request = request.ok_or(GuardError::NullRequest)?;
        let provider = self.inner.name().to_string();
        let model = self.inner.model().to_string();

        if is_local(&provider) {
            return self.inner.complete(request, cancel).await.map_err(GuardError::from);
        }

        let span = tracing::info_span!("egress_guard.complete", provider = %provider, model = %model);
        let _enter = span.enter();
        let trace = TraceContext::current();

        let pipeline_started = Instant::now();
        let serialized = serialize_request(&request);
        let estimated_input_tokens = crate::minimizer::estimate::estimate_request_tokens(&request);
        let estimated_output_tokens = request
            .params
            .max_tokens
            .map(|tokens| tokens as usize)
            .unwrap_or(estimated_input_tokens);

        let (mut decision, outcome) = self.pipeline.admit(
            &provider,
            &model,
            &serialized,
            estimated_input_tokens,
            estimated_output_tokens,
        );
        decision.pipeline_duration = pipeline_started.elapsed();

        if let Err(err) = outcome {
            self.pipeline
                .audit_block(&provider, &decision, decision.pipeline_duration, &trace);
            return Err(err);
        }

        self.pipeline.auditor().before(&decision, &trace);

        let capabilities = self.capabilities.get(&provider);
        let minimized = self.minimizer.minimize(&request, &provider, &capabilities);
        if minimized.stats.is_non_trivial() {
            self.pipeline.auditor().minimization(&decision, &minimized.stats, &trace);
        }

        let call_started = Instant::now();
        let result = self.inner.complete(minimized.request, cancel).await;
        let duration = call_started.elapsed();

        let (status, input_tokens, output_tokens, error_string) = match &result {
            Ok(response) => ("success", response.input_tokens, response.output_tokens, None),
            Err(err) => ("error", 0, 0, Some(err.to_string())),
        };
        let cost_cents = self.pipeline.record_after(&model, input_tokens, output_tokens);

        self.pipeline.metrics().record_call(&provider, status);
        self.pipeline.metrics().record_tokens(&provider, "input", input_tokens);
        self.pipeline.metrics().record_tokens(&provider, "output", output_tokens);
        self.pipeline.metrics().record_latency(&provider, duration);
        self.pipeline.metrics().record_cost(&provider, cost_cents);

        self.pipeline.auditor().after(
            &decision,
            status,
            input_tokens,
            output_tokens,
            duration,
            cost_cents,
            error_string.as_deref(),
            &trace,
        );

        result.map_err(GuardError::from)
    }
}

/// Decorates a [`ChatClient`] with the admission pipeline. The lighter
/// chat contract carries no messages/tools structure to minimize, so this
/// decorator drives admission only — input/output token accounting for the
/// `egress_after` record uses the 4-chars-per-token estimate against the
/// prompt and response text, since raw chat responses report no usage.
pub struct ChatGuardClient<C: ChatClient> {
    inner: C,
    pipeline: AdmissionPipeline,
}

impl<C: ChatClient> ChatGuardClient<C> {
    /// Wrap `inner` with a pre-assembled admission pipeline.
    #[must_use]
    pub fn new(inner: C, pipeline: AdmissionPipeline) -> Self {
        Self { inner, pipeline }
    }

    /// Provider identifier of the wrapped client.
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Model identifier of the wrapped client.
    #[must_use]
    pub fn model(&self) -> &str {
        self.inner.model()
    }

    /// Run `prompt` through admission and the inner client.
    ///
    /// `ollama` bypasses the pipeline entirely, identically to
    /// [`GuardClient::complete`].
    pub async fn chat(&self, prompt: Option<&str>, cancel: CancellationToken) -> GuardResult<String> {
        let prompt = prompt.ok_or(GuardError::NullRequest)?;
        let provider = self.inner.name().to_string();
        let model = self.inner.model().to_string();

        if is_local(&provider) {
            return self.inner.chat(prompt, cancel).await.map_err(GuardError::from);
        }

        let span = tracing::info_span!("egress_guard.chat", provider = %provider, model = %model);
        let _enter = span.enter();
        let trace = TraceContext::current();

        let pipeline_started = Instant::now();
        let serialized = serialize_prompt(prompt);
        let estimated_tokens = estimate_text_tokens(prompt);

        let (mut decision, outcome) =
            self.pipeline
                .admit(&provider, &model, &serialized, estimated_tokens, estimated_tokens);
        decision.pipeline_duration = pipeline_started.elapsed();

        if let Err(err) = outcome {
            self.pipeline
                .audit_block(&provider, &decision, decision.pipeline_duration, &trace);
            return Err(err);
        }

        self.pipeline.auditor().before(&decision, &trace);

        let call_started = Instant::now();
        let result = self.inner.chat(prompt, cancel).await;
        let duration = call_started.elapsed();

        let (status, input_tokens, output_tokens, error_string) = match &result {
            Ok(response) => ("success", estimate_text_tokens(prompt), response.len() / 4, None),
            Err(err) => ("error", 0, 0, Some(err.to_string())),
        };
        let cost_cents = self.pipeline.record_after(&model, input_tokens, output_tokens);

        self.pipeline.metrics().record_call(&provider, status);
        self.pipeline.metrics().record_tokens(&provider, "input", input_tokens);
        self.pipeline.metrics().record_tokens(&provider, "output", output_tokens);
        self.pipeline.metrics().record_latency(&provider, duration);
        self.pipeline.metrics().record_cost(&provider, cost_cents);

        self.pipeline.auditor().after(
            &decision,
            status,
            input_tokens,
            output_tokens,
            duration,
            cost_cents,
            error_string.as_deref(),
            &trace,
        );

        result.map_err(GuardError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egress_llm::Message;

    #[test]
    fn serialize_request_is_empty_for_empty_input() {
        let request = CompletionRequest::new("", vec![]);
        assert!(serialize_request(&request).is_empty());
    }

    #[test]
    fn serialize_request_concatenates_system_and_message_content() {
        let request = CompletionRequest::new("sys", vec![Message::user("hi")]);
        let serialized = serialize_request(&request);
        assert_eq!(String::from_utf8(serialized).unwrap(), "sys\nhi\n");
    }

    #[test]
    fn fingerprint_of_empty_input_is_empty_string() {
        assert_eq!(fingerprint(&[]), "");
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint(b"hello");
        let b = fingerprint(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, fingerprint(b"world"));
    }

    #[test]
    fn serialize_prompt_empty_is_empty() {
        assert!(serialize_prompt("").is_empty());
    }
}
