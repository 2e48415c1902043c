//! Global and per-provider kill switches.
//!
//! `ollama` always reports enabled. Otherwise the global switch is
//! consulted first (with its disable timestamp folded into the reason),
//! then a per-provider override map — absence from the map means enabled.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::provider::is_local;

#[derive(Debug, Clone)]
struct GlobalState {
    enabled: bool,
    disabled_at: Option<String>,
}

/// Runtime-mutable enable/disable state for egress, global and per-provider.
///
/// Readers take a single read-lock per field access, so a concurrent flip
/// of the global switch is observed atomically with respect to its
/// disable timestamp — a reader never sees "disabled" paired with a stale
/// or absent timestamp from a previous flip.
#[derive(Debug)]
pub struct ControlPlane {
    global: RwLock<GlobalState>,
    overrides: RwLock<HashMap<String, bool>>,
}

impl ControlPlane {
    /// Create a control plane with the global switch set to `enabled`.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            global: RwLock::new(GlobalState {
                enabled,
                disabled_at: None,
            }),
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Whether egress is currently enabled for `provider`, and a
    /// human-readable reason when it is not.
    #[must_use]
    pub fn is_enabled(&self, provider: &str) -> (bool, Option<String>) {
        if is_local(provider) {
            return (true, None);
        }

        let global = self
            .global
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !global.enabled {
            let at = global.disabled_at.clone().unwrap_or_default();
            return (
                false,
                Some(format!("global egress kill switch was disabled at {at}")),
            );
        }
        drop(global);

        let overrides = self
            .overrides
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match overrides.get(provider) {
            Some(false) => (
                false,
                Some(format!("provider \"{provider}\" kill switch is disabled")),
            ),
            _ => (true, None),
        }
    }

    /// Flip the global kill switch. Disabling stamps the current UTC time
    /// into the reason returned by subsequent [`Self::is_enabled`] calls.
    pub fn set_global_enabled(&self, enabled: bool) {
        let mut global = self
            .global
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        global.enabled = enabled;
        global.disabled_at = if enabled {
            None
        } else {
            Some(Utc::now().to_rfc3339())
        };
    }

    /// Set or clear a per-provider override. `None` removes the override
    /// (falls back to "enabled").
    pub fn set_provider_enabled(&self, provider: &str, enabled: Option<bool>) {
        let mut overrides = self
            .overrides
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match enabled {
            Some(value) => {
                overrides.insert(provider.to_string(), value);
            },
            None => {
                overrides.remove(provider);
            },
        }
    }
}

impl Default for ControlPlane {
    fn default() -> Self {
        Self::new(true)
    }
}
