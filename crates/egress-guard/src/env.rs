//! Environment-variable parsing shared by every guard component.
//!
//! A malformed value must never prevent startup: every parse here falls
//! back silently to the caller-supplied default rather than erroring.

/// Parse a boolean environment variable, falling back to `default` on
/// anything unrecognized. Accepts `true`/`false`/`1`/`0`/`yes`/`no`
/// case-insensitively.
#[must_use]
pub fn bool_var(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Parse an unsigned integer environment variable, falling back to
/// `default` when unset or non-numeric.
#[must_use]
pub fn usize_var(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// Parse a `u32` environment variable, falling back to `default` when unset
/// or non-numeric.
#[must_use]
pub fn u32_var(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

/// Parse a floating-point environment variable, falling back to `default`
/// when unset or non-numeric.
#[must_use]
pub fn f64_var(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

/// Parse a comma-separated set, trimming whitespace around each element and
/// dropping empty elements. An unset variable yields an empty set.
#[must_use]
pub fn set_var(key: &str) -> std::collections::HashSet<String> {
    std::env::var(key)
        .ok()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Upper-case a provider name for interpolation into an environment
/// variable, e.g. `"anthropic"` -> `"ANTHROPIC"`.
#[must_use]
pub fn provider_env_key(provider: &str) -> String {
    provider.to_ascii_uppercase().replace(['-', ' '], "_")
}
