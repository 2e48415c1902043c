//! Minimization statistics recorded alongside every transformed request.

/// Per-stage and aggregate statistics from one minimization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinimizationStats {
    /// Estimated tokens before minimization.
    pub original_tokens: usize,
    /// Estimated tokens after minimization.
    pub minimized_tokens: usize,
    /// Tokens removed from the system prompt by stage 1.
    pub prompt_delta: usize,
    /// Tokens removed from tool definitions by stage 2.
    pub tool_defs_delta: usize,
    /// Tokens removed from messages by stage 3 and stage 4.
    pub messages_delta: usize,
    /// Number of tool results truncated for exceeding the per-result cap.
    pub truncated_results: usize,
    /// Number of messages dropped entirely by stage 4's context-window fit.
    pub dropped_messages: usize,
}

impl MinimizationStats {
    /// Percentage reduction in estimated tokens. `0` when `original_tokens`
    /// is `0` (nothing to reduce, rather than a division by zero).
    #[must_use]
    pub fn reduction_pct(&self) -> f64 {
        if self.original_tokens == 0 {
            return 0.0;
        }
        100.0 * (self.original_tokens as f64 - self.minimized_tokens as f64)
            / self.original_tokens as f64
    }

    /// Whether minimization made a non-trivial change worth auditing —
    /// any token delta, truncation, or dropped message.
    #[must_use]
    pub fn is_non_trivial(&self) -> bool {
        self.original_tokens != self.minimized_tokens
            || self.truncated_results > 0
            || self.dropped_messages > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_pct_is_zero_when_original_is_zero() {
        let stats = MinimizationStats::default();
        assert_eq!(stats.reduction_pct(), 0.0);
    }

    #[test]
    fn reduction_pct_computes_percentage_drop() {
        let stats = MinimizationStats {
            original_tokens: 200,
            minimized_tokens: 50,
            ..Default::default()
        };
        assert!((stats.reduction_pct() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn no_change_is_not_non_trivial() {
        let stats = MinimizationStats {
            original_tokens: 100,
            minimized_tokens: 100,
            ..Default::default()
        };
        assert!(!stats.is_non_trivial());
    }

    #[test]
    fn truncation_alone_counts_as_non_trivial() {
        let stats = MinimizationStats {
            original_tokens: 100,
            minimized_tokens: 100,
            truncated_results: 1,
            ..Default::default()
        };
        assert!(stats.is_non_trivial());
    }
}
