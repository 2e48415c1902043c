//! End-to-end admission scenarios, driving [`GuardClient`]/[`ChatGuardClient`]
//! against a stub inner client rather than a real provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use egress_core::{Role, SessionId};
use egress_guard::classifier::{Classifier, NoopClassifier};
use egress_guard::control_plane::ControlPlane;
use egress_guard::cost_estimator::{CostEstimator, PricingTable};
use egress_guard::factory::GuardFactory;
use egress_guard::minimizer::DataMinimizer;
use egress_guard::sensitivity::Sensitivity;
use egress_guard::{CapabilitiesRegistry, Consent, GuardError, Policy, RateLimiter};
use egress_llm::{ChatClient, CompletionClient, CompletionRequest, CompletionResponse, LlmResult, Message, StopReason};

/// A stub inner client that records how many times it was actually called,
/// so a blocked admission can be distinguished from one that reached the
/// provider.
struct StubClient {
    provider: String,
    model: String,
    calls: Arc<AtomicUsize>,
}

impl StubClient {
    fn new(provider: &str, calls: Arc<AtomicUsize>) -> Self {
        Self {
            provider: provider.to_string(),
            model: "stub-model".to_string(),
            calls,
        }
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    fn name(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, _request: CompletionRequest, _cancel: CancellationToken) -> LlmResult<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CompletionResponse {
            content: "stub response".to_string(),
            stop_reason: StopReason::EndTurn,
            input_tokens: 10,
            output_tokens: 5,
            duration: std::time::Duration::from_millis(1),
            model: self.model.clone(),
            trace_step: None,
        })
    }
}

#[async_trait]
impl ChatClient for StubClient {
    fn name(&self) -> &str {
        &self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, _prompt: &str, _cancel: CancellationToken) -> LlmResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("stub response".to_string())
    }
}

/// A classifier that always reports a fixed sensitivity, for scenario D.
struct FixedClassifier(Sensitivity);

impl Classifier for FixedClassifier {
    fn classify(&self, _payload: &[u8]) -> Sensitivity {
        self.0
    }
}

fn bare_factory() -> GuardFactory {
    GuardFactory::new(
        Arc::new(ControlPlane::new(true)),
        Arc::new(Policy::default()),
        Arc::new(Consent::new(false, HashMap::from([("anthropic".to_string(), true)]))),
        Arc::new(NoopClassifier),
        Arc::new(RateLimiter::new(HashMap::new())),
        Arc::new(CostEstimator::new(PricingTable::builtin(), 0.0)),
        Arc::new(CapabilitiesRegistry::new(HashMap::new())),
        Arc::new(DataMinimizer::new(true, 0)),
        Arc::new(egress_guard::Auditor::new(true, true)),
        HashMap::new(),
    )
}

#[tokio::test]
async fn scenario_a_kill_switch_blocks_before_the_inner_client_is_called() {
    let factory = bare_factory();
    factory.control_plane().set_global_enabled(false);

    let calls = Arc::new(AtomicUsize::new(0));
    let client = factory.guard_completion(StubClient::new("anthropic", Arc::clone(&calls)), SessionId::new(), Role::Main);

    let request = CompletionRequest::new("system prompt", vec![Message::user("hello")]);
    let result = client.complete(Some(request), CancellationToken::new()).await;

    assert!(matches!(result, Err(GuardError::ProviderDisabled { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn scenario_b_admitted_cloud_call_reaches_the_inner_client() {
    let factory = bare_factory();
    let calls = Arc::new(AtomicUsize::new(0));
    let client = factory.guard_completion(StubClient::new("anthropic", Arc::clone(&calls)), SessionId::new(), Role::Main);

    let request = CompletionRequest::new("system prompt", vec![Message::user("hello")]);
    let result = client.complete(Some(request), CancellationToken::new()).await;

    let response = result.expect("admitted call should succeed");
    assert_eq!(response.content, "stub response");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_c_local_provider_bypasses_admission_entirely() {
    let factory = bare_factory();
    // ollama has no consent entry and the global switch will be off, yet the
    // call must still go through: locality bypasses every check.
    factory.control_plane().set_global_enabled(false);

    let calls = Arc::new(AtomicUsize::new(0));
    let client = factory.guard_completion(StubClient::new("ollama", Arc::clone(&calls)), SessionId::new(), Role::Main);

    let request = CompletionRequest::new("system prompt", vec![Message::user("hello")]);
    let result = client.complete(Some(request), CancellationToken::new()).await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_d_sensitive_data_is_blocked_before_the_inner_client_is_called() {
    let factory = bare_factory().with_classifier(Arc::new(FixedClassifier(Sensitivity::Pii)));

    let calls = Arc::new(AtomicUsize::new(0));
    let client = factory.guard_completion(StubClient::new("anthropic", Arc::clone(&calls)), SessionId::new(), Role::Main);

    let request = CompletionRequest::new("ssn: 123-45-6789", vec![Message::user("hello")]);
    let result = client.complete(Some(request), CancellationToken::new()).await;

    assert!(matches!(result, Err(GuardError::SensitiveData { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_e_long_history_is_compressed_under_a_tight_context_window() {
    let minimizer = DataMinimizer::new(true, 0);
    let messages: Vec<Message> = (0..40).map(|i| Message::user("x".repeat(400 * (i + 1)))).collect();
    let request = CompletionRequest::new("", messages);

    let tight_caps = egress_guard::ProviderCapabilities {
        max_context_tokens: 1_500,
        can_receive_fs_info: false,
        max_tool_result_tokens: 0,
        history_window: 40,
    };

    let outcome = minimizer.minimize(&request, "anthropic", &tight_caps);

    assert!(outcome.request.messages.len() < 40);
    assert!(outcome.stats.dropped_messages > 0);
    assert!(outcome.stats.minimized_tokens <= outcome.stats.original_tokens);
}

#[tokio::test]
async fn scenario_f_cost_ceiling_blocks_once_exhausted_by_prior_calls() {
    let factory = GuardFactory::new(
        Arc::new(ControlPlane::new(true)),
        Arc::new(Policy::default()),
        Arc::new(Consent::new(false, HashMap::from([("anthropic".to_string(), true)]))),
        Arc::new(NoopClassifier),
        Arc::new(RateLimiter::new(HashMap::new())),
        // A ceiling just above one call's estimated cost: the first call is
        // admitted against an empty ledger, but its recorded actual cost
        // pushes the cumulative total past the ceiling for the second.
        Arc::new(CostEstimator::new(PricingTable::builtin(), 0.02)),
        Arc::new(CapabilitiesRegistry::new(HashMap::new())),
        Arc::new(DataMinimizer::new(true, 0)),
        Arc::new(egress_guard::Auditor::new(true, true)),
        HashMap::new(),
    );

    let calls = Arc::new(AtomicUsize::new(0));
    let client = factory.guard_completion(
        StubClient::new("anthropic", Arc::clone(&calls)),
        SessionId::new(),
        Role::Main,
    );

    let request = || CompletionRequest::new("system prompt", vec![Message::user("hello there")]);

    let first = client.complete(Some(request()), CancellationToken::new()).await;
    assert!(first.is_ok(), "first call should be admitted against an empty ledger");

    let second = client.complete(Some(request()), CancellationToken::new()).await;
    assert!(matches!(second, Err(GuardError::CostLimitReached { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "the blocked call must never reach the inner client");
}
