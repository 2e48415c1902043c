//! Per-provider sliding-window admission.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::provider::is_local;

/// The sliding window width used by every provider's rate limit.
pub const WINDOW_MS: u64 = 60_000;

/// Outcome of a rate-limit admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// The call is admitted.
    Admitted,
    /// The call is denied; retry after the given duration.
    Denied {
        /// How long until the oldest in-window timestamp ages out.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    /// Whether this result admits the call.
    #[must_use]
    pub fn is_admitted(self) -> bool {
        matches!(self, Self::Admitted)
    }
}

struct Window {
    timestamps: VecDeque<u64>,
    limit: u32,
}

impl Window {
    fn new(limit: u32) -> Self {
        Self {
            timestamps: VecDeque::new(),
            limit,
        }
    }

    /// Drop timestamps outside the window, then admit `now` if there is
    /// room, otherwise report when the oldest surviving entry ages out.
    fn admit(&mut self, now: u64) -> RateLimitResult {
        let window_start = now.saturating_sub(WINDOW_MS);
        while let Some(&front) = self.timestamps.front() {
            if front <= window_start {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.limit as usize {
            let oldest = *self.timestamps.front().unwrap_or(&now);
            let retry_after_ms = (oldest + WINDOW_MS).saturating_sub(now);
            return RateLimitResult::Denied {
                retry_after: Duration::from_millis(retry_after_ms),
            };
        }

        self.timestamps.push_back(now);
        RateLimitResult::Admitted
    }
}

/// Per-provider sliding-window rate limiter.
///
/// A single mutex guards the whole per-provider map; admission is pure
/// in-memory bookkeeping, so the critical section is always short and
/// never awaits.
pub struct RateLimiter {
    limits: HashMap<String, u32>,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// Build a rate limiter from a provider -> requests-per-minute map.
    /// A provider absent from `limits` always admits.
    #[must_use]
    pub fn new(limits: HashMap<String, u32>) -> Self {
        Self {
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or deny a call for `provider` at timestamp `now_ms` (ms since
    /// the Unix epoch). `ollama` and providers with no configured limit
    /// always admit.
    pub fn check(&self, provider: &str, now_ms: u64) -> RateLimitResult {
        if is_local(provider) {
            return RateLimitResult::Admitted;
        }
        let Some(&limit) = self.limits.get(provider) else {
            return RateLimitResult::Admitted;
        };
        if limit == 0 {
            return RateLimitResult::Admitted;
        }

        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let window = windows
            .entry(provider.to_string())
            .or_insert_with(|| Window::new(limit));
        window.admit(now_ms)
    }
}
