//! The four-stage lossy request transformer: system-prompt filtering,
//! tool-definition filtering, per-message minimization, and context-window
//! fit, run in that order against a fresh copy of the request.
//!
//! Minimization is skipped entirely — the original request is returned
//! untouched — when it is disabled, the provider is the local one, or the
//! request's estimated size falls below the configured threshold.

pub mod context_window;
pub mod estimate;
pub mod messages;
pub mod stats;
pub mod system_prompt;
pub mod tools;

use egress_llm::CompletionRequest;

pub use stats::MinimizationStats;

use crate::capabilities::ProviderCapabilities;
use crate::provider::is_local;
use estimate::{estimate_request_tokens, estimate_text_tokens, estimate_tool_definition_tokens};

/// A minimized request plus the statistics describing the transformation.
#[derive(Debug, Clone)]
pub struct MinimizationOutcome {
    /// The transformed request. Always a fresh copy; the input is never
    /// mutated.
    pub request: CompletionRequest,
    /// Per-stage and aggregate token statistics.
    pub stats: MinimizationStats,
}

/// The four-stage request transformer.
#[derive(Debug, Clone)]
pub struct DataMinimizer {
    enabled: bool,
    skip_threshold_tokens: usize,
}

impl DataMinimizer {
    /// Build a minimizer. `enabled` is the process-wide
    /// `MINIMIZATION_ENABLED` flag; `skip_threshold_tokens` is
    /// `MIN_CONTEXT_TOKENS` — requests estimated below it pass through
    /// unchanged.
    #[must_use]
    pub fn new(enabled: bool, skip_threshold_tokens: usize) -> Self {
        Self {
            enabled,
            skip_threshold_tokens,
        }
    }

    /// Run the pipeline against `request` for `provider`, given its
    /// resolved capability profile.
    #[must_use]
    pub fn minimize(
        &self,
        request: &CompletionRequest,
        provider: &str,
        capabilities: &ProviderCapabilities,
    ) -> MinimizationOutcome {
        let original_tokens = estimate_request_tokens(request);

        if !self.enabled || is_local(provider) || original_tokens < self.skip_threshold_tokens {
            return MinimizationOutcome {
                request: request.clone(),
                stats: MinimizationStats {
                    original_tokens,
                    minimized_tokens: original_tokens,
                    ..MinimizationStats::default()
                },
            };
        }

        let mut out = request.clone();

        let prompt_tokens_before = estimate_text_tokens(&out.system);
        out.system = system_prompt::filter_system_prompt(&out.system, system_prompt::ROUTING_REGISTRY);
        let prompt_tokens_after = estimate_text_tokens(&out.system);
        let prompt_delta = prompt_tokens_before.saturating_sub(prompt_tokens_after);

        let tools_tokens_before: usize = out.tools.iter().map(estimate_tool_definition_tokens).sum();
        out.tools = tools::filter_tools(&out.tools, out.tool_choice.as_ref());
        let tools_tokens_after: usize = out.tools.iter().map(estimate_tool_definition_tokens).sum();
        let tool_defs_delta = tools_tokens_before.saturating_sub(tools_tokens_after);

        let messages_tokens_before = estimate::estimate_messages_tokens(&out.messages);
        let (minimized_messages, truncated_results) = messages::minimize_messages(
            &out.messages,
            capabilities.history_window,
            capabilities.max_tool_result_tokens,
            capabilities.can_receive_fs_info,
        );
        out.messages = minimized_messages;

        let fixed_tokens = prompt_tokens_after + tools_tokens_after;
        let (fitted_messages, dropped_messages) = context_window::fit_to_context_window(
            &out.messages,
            fixed_tokens,
            capabilities.max_context_tokens,
        );
        out.messages = fitted_messages;

        let messages_tokens_after = estimate::estimate_messages_tokens(&out.messages);
        let messages_delta = messages_tokens_before.saturating_sub(messages_tokens_after);

        let minimized_tokens = fixed_tokens + messages_tokens_after;

        MinimizationOutcome {
            request: out,
            stats: MinimizationStats {
                original_tokens,
                minimized_tokens,
                prompt_delta,
                tool_defs_delta,
                messages_delta,
                truncated_results,
                dropped_messages,
            },
        }
    }
}
