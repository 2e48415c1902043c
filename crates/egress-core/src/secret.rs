//! Secret lookup with an optional TTL cache in front of the environment.
//!
//! The guard factory uses this during client construction to resolve API
//! keys and other operator-supplied secrets. It is not part of the
//! admission pipeline; failures here surface as [`SecretError::NotFound`],
//! which the guard's error taxonomy reports as `SecretNotFound`.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from secret resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    /// No value was found for the given key.
    #[error("secret not found: {0}")]
    NotFound(String),
}

/// Result type for secret operations.
pub type SecretResult<T> = Result<T, SecretError>;

/// Where a secret's bytes actually come from.
pub trait SecretSource: Send + Sync {
    /// Fetch the current value for `key`, or `None` if unset.
    fn fetch(&self, key: &str) -> Option<String>;
}

/// The canonical secret source: the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretSource;

impl SecretSource for EnvSecretSource {
    fn fetch(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

struct CacheEntry {
    value: Option<String>,
    expires_at: Instant,
}

/// A secret backend with an optional TTL cache.
///
/// A cached *empty* string counts as a fresh hit: if an operator sets
/// `FOO=` explicitly, repeated lookups within the TTL return that empty
/// value rather than treating it as "missing" and re-reading the
/// environment on every call. Only an entry that has never been fetched,
/// or one that has aged out, triggers a re-fetch.
pub struct SecretBackend<S: SecretSource = EnvSecretSource> {
    source: S,
    ttl: Option<Duration>,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl SecretBackend<EnvSecretSource> {
    /// Create a backend reading directly from the environment, uncached.
    #[must_use]
    pub fn env() -> Self {
        Self::new(EnvSecretSource, None)
    }

    /// Create a backend reading from the environment with a TTL cache.
    #[must_use]
    pub fn env_cached(ttl: Duration) -> Self {
        Self::new(EnvSecretSource, Some(ttl))
    }
}

impl<S: SecretSource> SecretBackend<S> {
    /// Create a backend over an arbitrary [`SecretSource`].
    #[must_use]
    pub fn new(source: S, ttl: Option<Duration>) -> Self {
        Self {
            source,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a secret, returning [`SecretError::NotFound`] if unset.
    pub fn get(&self, key: &str) -> SecretResult<String> {
        self.get_optional(key)
            .ok_or_else(|| SecretError::NotFound(key.to_string()))
    }

    /// Resolve a secret, returning `None` if unset instead of erroring.
    pub fn get_optional(&self, key: &str) -> Option<String> {
        let Some(ttl) = self.ttl else {
            return self.source.fetch(key);
        };

        if let Some(value) = self.cached_value(key) {
            return value;
        }

        let fetched = self.source.fetch(key);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(
                key.to_string(),
                CacheEntry {
                    value: fetched.clone(),
                    expires_at: Instant::now() + ttl,
                },
            );
        }
        fetched
    }

    fn cached_value(&self, key: &str) -> Option<Option<String>> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(key)?;
        if entry.expires_at > Instant::now() {
            Some(entry.value.clone())
        } else {
            None
        }
    }
}
