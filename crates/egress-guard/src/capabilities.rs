//! Per-provider capability limits: context window, filesystem-info leakage,
//! tool-result size, and history window — the knobs the [`crate::minimizer`]
//! reads when shaping a request for a specific provider.

use std::collections::HashMap;

use crate::env::{bool_var, usize_var};

/// Conservative defaults applied to a provider with no known profile.
const UNKNOWN_MAX_CONTEXT_TOKENS: usize = 128_000;
const UNKNOWN_MAX_TOOL_RESULT_TOKENS: usize = 4_000;
const UNKNOWN_HISTORY_WINDOW: usize = 20;

/// Limits and allowances for a single (provider, model) pair.
///
/// The model dimension is currently unused for lookup — every model of a
/// given provider shares one profile — but is kept on the type so a future
/// per-model override doesn't change the call signature of
/// [`CapabilitiesRegistry::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Maximum context window, in estimated tokens.
    pub max_context_tokens: usize,
    /// Whether absolute filesystem paths may be sent to this provider.
    pub can_receive_fs_info: bool,
    /// Maximum tokens for a single tool result. `0` means unlimited.
    pub max_tool_result_tokens: usize,
    /// Number of most-recent turns preserved verbatim.
    pub history_window: usize,
}

impl ProviderCapabilities {
    /// The conservative profile used for providers with no known defaults.
    #[must_use]
    pub fn unknown_default() -> Self {
        Self {
            max_context_tokens: UNKNOWN_MAX_CONTEXT_TOKENS,
            can_receive_fs_info: false,
            max_tool_result_tokens: UNKNOWN_MAX_TOOL_RESULT_TOKENS,
            history_window: UNKNOWN_HISTORY_WINDOW,
        }
    }
}

/// Built-in per-provider defaults, overridable by environment variables of
/// the form `PROVIDER_CAPABILITIES_<PROVIDER>_{MAX_CONTEXT_TOKENS,
/// CAN_RECEIVE_FS_INFO,MAX_TOOL_RESULT_TOKENS,HISTORY_WINDOW}`.
fn builtin_defaults() -> HashMap<&'static str, ProviderCapabilities> {
    let mut map = HashMap::new();
    map.insert(
        "anthropic",
        ProviderCapabilities {
            max_context_tokens: 200_000,
            can_receive_fs_info: false,
            max_tool_result_tokens: 8_000,
            history_window: 30,
        },
    );
    map.insert(
        "openai",
        ProviderCapabilities {
            max_context_tokens: 128_000,
            can_receive_fs_info: false,
            max_tool_result_tokens: 4_000,
            history_window: 20,
        },
    );
    map.insert(
        "ollama",
        ProviderCapabilities {
            max_context_tokens: 32_000,
            can_receive_fs_info: true,
            max_tool_result_tokens: 0,
            history_window: 100,
        },
    );
    map
}

/// Resolves [`ProviderCapabilities`] for a provider name, applying
/// environment overrides on top of the built-in defaults.
///
/// Built once at startup; the underlying map is never mutated afterward, so
/// concurrent reads need no synchronization.
#[derive(Debug, Clone)]
pub struct CapabilitiesRegistry {
    profiles: HashMap<String, ProviderCapabilities>,
}

impl CapabilitiesRegistry {
    /// Build the registry from built-in defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut profiles: HashMap<String, ProviderCapabilities> = builtin_defaults()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        for (provider, caps) in &mut profiles {
            apply_env_overrides(provider, caps);
        }

        Self { profiles }
    }

    /// Build a registry from an explicit set of profiles, bypassing the
    /// environment. Useful for tests and embedders with their own config
    /// loader.
    #[must_use]
    pub fn new(profiles: HashMap<String, ProviderCapabilities>) -> Self {
        Self { profiles }
    }

    /// Resolve capabilities for `provider`, falling back to the unknown
    /// default (itself still subject to environment override) when the
    /// provider has no built-in profile.
    #[must_use]
    pub fn get(&self, provider: &str) -> ProviderCapabilities {
        if let Some(caps) = self.profiles.get(provider) {
            return *caps;
        }
        let mut caps = ProviderCapabilities::unknown_default();
        apply_env_overrides(provider, &mut caps);
        caps
    }
}

fn env_prefix(provider: &str) -> String {
    format!(
        "PROVIDER_CAPABILITIES_{}",
        provider.to_ascii_uppercase().replace(['-', ' '], "_")
    )
}

fn apply_env_overrides(provider: &str, caps: &mut ProviderCapabilities) {
    let prefix = env_prefix(provider);
    caps.max_context_tokens = usize_var(
        &format!("{prefix}_MAX_CONTEXT_TOKENS"),
        caps.max_context_tokens,
    );
    caps.can_receive_fs_info = bool_var(
        &format!("{prefix}_CAN_RECEIVE_FS_INFO"),
        caps.can_receive_fs_info,
    );
    caps.max_tool_result_tokens = usize_var(
        &format!("{prefix}_MAX_TOOL_RESULT_TOKENS"),
        caps.max_tool_result_tokens,
    );
    caps.history_window = usize_var(&format!("{prefix}_HISTORY_WINDOW"), caps.history_window);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_gets_conservative_default() {
        let registry = CapabilitiesRegistry::new(HashMap::new());
        let caps = registry.get("some-new-provider");
        assert_eq!(caps.max_context_tokens, UNKNOWN_MAX_CONTEXT_TOKENS);
        assert_eq!(caps.max_tool_result_tokens, UNKNOWN_MAX_TOOL_RESULT_TOKENS);
        assert_eq!(caps.history_window, UNKNOWN_HISTORY_WINDOW);
        assert!(!caps.can_receive_fs_info);
    }

    #[test]
    fn known_provider_uses_builtin_profile() {
        let registry = CapabilitiesRegistry::from_env();
        let caps = registry.get("anthropic");
        assert_eq!(caps.max_context_tokens, 200_000);
        assert_eq!(caps.history_window, 30);
    }

    #[test]
    fn env_override_wins_over_builtin() {
        unsafe {
            std::env::set_var("PROVIDER_CAPABILITIES_ANTHROPIC_MAX_CONTEXT_TOKENS", "1000");
        }
        let registry = CapabilitiesRegistry::from_env();
        assert_eq!(registry.get("anthropic").max_context_tokens, 1_000);
        unsafe {
            std::env::remove_var("PROVIDER_CAPABILITIES_ANTHROPIC_MAX_CONTEXT_TOKENS");
        }
    }

    #[test]
    fn env_prefix_normalizes_provider_name() {
        assert_eq!(env_prefix("my-provider"), "PROVIDER_CAPABILITIES_MY_PROVIDER");
    }
}
