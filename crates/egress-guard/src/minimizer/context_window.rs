//! Stage 4 — context-window fit.
//!
//! The last-resort stage: if the request still doesn't fit the provider's
//! context window after stages 1-3, drop whole messages from the front
//! (oldest first) until it does, or until a single message remains.

use egress_llm::Message;

use super::estimate::estimate_messages_tokens;

/// Fraction of the context window reserved for the model's own response,
/// never consumed by the request itself.
const RESPONSE_RESERVE_FRACTION: f64 = 0.15;

/// Drop the oldest messages in `messages` until `fixed_tokens` (system
/// prompt plus tool definitions, already minimized by stages 1-2) plus the
/// remaining messages fit within `max_context_tokens` minus the response
/// reserve. Returns the fitted messages and how many were dropped.
///
/// If `fixed_tokens` alone already exceeds the budget, nothing is dropped —
/// there is nothing left to trim — and the outsized request is logged for
/// visibility.
#[must_use]
pub fn fit_to_context_window(
    messages: &[Message],
    fixed_tokens: usize,
    max_context_tokens: usize,
) -> (Vec<Message>, usize) {
    let messages_tokens = estimate_messages_tokens(messages);
    if fixed_tokens + messages_tokens <= max_context_tokens {
        return (messages.to_vec(), 0);
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let reserved = (max_context_tokens as f64 * RESPONSE_RESERVE_FRACTION) as usize;
    let budget = max_context_tokens.saturating_sub(reserved);

    if fixed_tokens >= budget {
        tracing::warn!(
            fixed_tokens,
            max_context_tokens,
            "system prompt and tool definitions alone exceed the context window budget"
        );
        return (messages.to_vec(), 0);
    }
    let residual_budget = budget - fixed_tokens;

    let mut out = messages.to_vec();
    let mut dropped = 0usize;
    while out.len() > 1 && estimate_messages_tokens(&out) > residual_budget {
        out.remove(0);
        dropped += 1;
    }

    (out, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_already_fitting_is_untouched() {
        let messages = vec![Message::user("hi")];
        let (out, dropped) = fit_to_context_window(&messages, 10, 100_000);
        assert_eq!(out, messages);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn drops_oldest_messages_first() {
        let messages: Vec<Message> = (0..10)
            .map(|i| Message::user("x".repeat(400 * (i + 1))))
            .collect();
        let (out, dropped) = fit_to_context_window(&messages, 0, 1_000);
        assert!(dropped > 0);
        assert!(out.len() < messages.len());
        // whatever remains is a contiguous suffix of the original
        assert_eq!(out.last(), messages.last());
    }

    #[test]
    fn never_drops_the_last_remaining_message() {
        let messages = vec![Message::user("x".repeat(1_000_000))];
        let (out, dropped) = fit_to_context_window(&messages, 0, 100);
        assert_eq!(out.len(), 1);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn oversized_fixed_cost_alone_is_left_untouched() {
        let messages = vec![Message::user("hi"), Message::user("there")];
        let (out, dropped) = fit_to_context_window(&messages, 1_000, 100);
        assert_eq!(out, messages);
        assert_eq!(dropped, 0);
    }
}
