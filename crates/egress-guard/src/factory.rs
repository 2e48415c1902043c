//! Wires the individual admission components into ready-to-use guarded
//! clients.
//!
//! Every component here is built once and shared: [`ControlPlane`],
//! [`Policy`], [`Consent`], the [`Classifier`], [`RateLimiter`], [`Auditor`],
//! [`CostEstimator`], and the [`DataMinimizer`] are all immutable after
//! construction (bar the control plane's runtime kill-switch flips), so one
//! [`GuardFactory`] is meant to live for the lifetime of the process and
//! wrap every inner client it is handed.

use std::collections::HashMap;
use std::sync::Arc;

use egress_core::{Role, SessionId};
use egress_llm::{ChatClient, CompletionClient};

use crate::audit::Auditor;
use crate::capabilities::CapabilitiesRegistry;
use crate::classifier::{Classifier, NoopClassifier};
use crate::config::Config;
use crate::consent::Consent;
use crate::control_plane::ControlPlane;
use crate::cost_estimator::{CostEstimator, PricingTable};
use crate::env::{provider_env_key, u32_var};
use crate::guard_client::{AdmissionPipeline, ChatGuardClient, GuardClient};
use crate::metrics::GuardMetrics;
use crate::minimizer::DataMinimizer;
use crate::policy::Policy;
use crate::rate_limiter::RateLimiter;
use crate::token_budget::TokenBudget;

/// Build a provider -> consented map from `CONSENT_<PROVIDER>` environment
/// variables, for the given explicit provider list.
///
/// [`Consent`] is immutable after construction, so — unlike
/// [`CapabilitiesRegistry`], which can resolve an unknown provider to a
/// conservative default on the fly — it needs every provider's consent flag
/// read up front. Callers must supply the full set of providers they intend
/// to guard.
#[must_use]
pub fn consent_map_from_env(providers: &[&str]) -> HashMap<String, bool> {
    providers
        .iter()
        .map(|provider| {
            let key = format!("CONSENT_{}", provider_env_key(provider));
            (
                (*provider).to_string(),
                crate::env::bool_var(&key, false),
            )
        })
        .collect()
}

/// Default cloud rate limit, in requests per minute, applied when
/// `RATE_<PROVIDER>_PER_MIN` is unset.
pub const DEFAULT_RATE_LIMIT_PER_MIN: u32 = 60;

/// Build a provider -> requests-per-minute map from `RATE_<PROVIDER>_PER_MIN`
/// environment variables, for the given explicit provider list. Unset falls
/// back to [`DEFAULT_RATE_LIMIT_PER_MIN`].
#[must_use]
pub fn rate_limits_from_env(providers: &[&str]) -> HashMap<String, u32> {
    providers
        .iter()
        .map(|provider| {
            let key = format!("RATE_{}_PER_MIN", provider_env_key(provider));
            ((*provider).to_string(), u32_var(&key, DEFAULT_RATE_LIMIT_PER_MIN))
        })
        .collect()
}

/// Assembles and shares every admission component, and wraps inner clients
/// in [`GuardClient`]/[`ChatGuardClient`].
pub struct GuardFactory {
    control_plane: Arc<ControlPlane>,
    policy: Arc<Policy>,
    consent: Arc<Consent>,
    classifier: Arc<dyn Classifier>,
    rate_limiter: Arc<RateLimiter>,
    cost_estimator: Arc<CostEstimator>,
    capabilities: Arc<CapabilitiesRegistry>,
    minimizer: Arc<DataMinimizer>,
    auditor: Arc<Auditor>,
    metrics: Arc<GuardMetrics>,
    token_budgets: HashMap<Role, Arc<TokenBudget>>,
}

impl GuardFactory {
    /// Build a factory from explicit, already-constructed components. Used
    /// by embedders with their own configuration loader and by tests that
    /// need fine control over one component.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        control_plane: Arc<ControlPlane>,
        policy: Arc<Policy>,
        consent: Arc<Consent>,
        classifier: Arc<dyn Classifier>,
        rate_limiter: Arc<RateLimiter>,
        cost_estimator: Arc<CostEstimator>,
        capabilities: Arc<CapabilitiesRegistry>,
        minimizer: Arc<DataMinimizer>,
        auditor: Arc<Auditor>,
        token_budgets: HashMap<Role, Arc<TokenBudget>>,
    ) -> Self {
        Self {
            control_plane,
            policy,
            consent,
            classifier,
            rate_limiter,
            cost_estimator,
            capabilities,
            minimizer,
            auditor,
            metrics: Arc::new(GuardMetrics::new()),
            token_budgets,
        }
    }

    /// Build a factory entirely from the process environment.
    ///
    /// `providers` is the full set of provider names this process will ever
    /// guard — [`Consent`] and [`RateLimiter`] read their per-provider state
    /// up front rather than lazily, so a provider missing from this list is
    /// silently treated as having no consent and no configured rate limit
    /// (which, for rate limiting, means unlimited — see
    /// [`RateLimiter::check`](crate::rate_limiter::RateLimiter::check)).
    ///
    /// The classifier defaults to [`NoopClassifier`] — always
    /// `Sensitivity::Public` — until overridden with [`Self::with_classifier`].
    #[must_use]
    pub fn from_env(providers: &[&str]) -> Self {
        let config = Config::from_env();

        let token_budgets = [Role::Main, Role::Router, Role::ParamExtractor]
            .into_iter()
            .map(|role| {
                let limit = crate::env::usize_var(&format!("BUDGET_{}_TOKENS", role.env_suffix()), 0);
                (role, Arc::new(TokenBudget::new(limit)))
            })
            .collect();

        Self::new(
            Arc::new(ControlPlane::new(config.egress_enabled)),
            Arc::new(Policy::new(config.allowlist.clone(), config.denylist.clone())),
            Arc::new(Consent::new(config.local_only, consent_map_from_env(providers))),
            Arc::new(NoopClassifier),
            Arc::new(RateLimiter::new(rate_limits_from_env(providers))),
            Arc::new(CostEstimator::new(PricingTable::builtin(), config.cost_limit_cents)),
            Arc::new(CapabilitiesRegistry::from_env()),
            Arc::new(DataMinimizer::new(config.minimization_enabled, config.min_context_tokens)),
            Arc::new(Auditor::new(config.audit_enabled, config.audit_hash_content)),
            token_budgets,
        )
    }

    /// Replace the classifier. Consumes and returns `self` for chaining onto
    /// [`Self::from_env`].
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// The shared control plane, for toggling the kill switch at runtime.
    #[must_use]
    pub fn control_plane(&self) -> &Arc<ControlPlane> {
        &self.control_plane
    }

    /// The shared cost estimator, e.g. to inspect
    /// [`CostEstimator::total_cost_cents`](crate::cost_estimator::CostEstimator::total_cost_cents).
    #[must_use]
    pub fn cost_estimator(&self) -> &Arc<CostEstimator> {
        &self.cost_estimator
    }

    /// The token budget for `role`, if one was configured. Every role built
    /// by [`Self::from_env`] always has one (possibly unlimited, `limit ==
    /// 0`); a factory built via [`Self::new`] with a sparse map may not.
    #[must_use]
    pub fn token_budget_for(&self, role: Role) -> Option<Arc<TokenBudget>> {
        self.token_budgets.get(&role).cloned()
    }

    fn pipeline(&self, session_id: SessionId, role: Role) -> AdmissionPipeline {
        AdmissionPipeline::new(
            session_id,
            Arc::clone(&self.control_plane),
            Arc::clone(&self.policy),
            Arc::clone(&self.consent),
            Arc::clone(&self.classifier),
            Arc::clone(&self.rate_limiter),
            self.token_budget_for(role),
            Arc::clone(&self.cost_estimator),
            Arc::clone(&self.auditor),
            Arc::clone(&self.metrics),
        )
    }

    /// Wrap `inner` as a guarded completion client for `session_id`, using
    /// `role`'s token budget.
    #[must_use]
    pub fn guard_completion<C: CompletionClient>(
        &self,
        inner: C,
        session_id: SessionId,
        role: Role,
    ) -> GuardClient<C> {
        let pipeline = self.pipeline(session_id, role);
        GuardClient::new(inner, pipeline, Arc::clone(&self.capabilities), Arc::clone(&self.minimizer))
    }

    /// Wrap `inner` as a guarded chat client for `session_id`, using
    /// `role`'s token budget.
    #[must_use]
    pub fn guard_chat<C: ChatClient>(&self, inner: C, session_id: SessionId, role: Role) -> ChatGuardClient<C> {
        let pipeline = self.pipeline(session_id, role);
        ChatGuardClient::new(inner, pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_map_reads_only_listed_providers() {
        unsafe {
            std::env::set_var("CONSENT_ANTHROPIC", "true");
        }
        let map = consent_map_from_env(&["anthropic", "openai"]);
        assert_eq!(map.get("anthropic"), Some(&true));
        assert_eq!(map.get("openai"), Some(&false));
        unsafe {
            std::env::remove_var("CONSENT_ANTHROPIC");
        }
    }

    #[test]
    fn rate_limits_default_to_sixty_per_minute() {
        let map = rate_limits_from_env(&["anthropic"]);
        assert_eq!(map.get("anthropic"), Some(&DEFAULT_RATE_LIMIT_PER_MIN));
    }

    #[test]
    fn factory_from_env_builds_a_usable_pipeline() {
        let factory = GuardFactory::from_env(&["anthropic"]);
        assert!(factory.token_budget_for(Role::Main).is_some());
        assert_eq!(factory.cost_estimator().total_cost_cents(), 0.0);
    }
}
