//! Token estimation: a 4-chars-per-token approximation.
//!
//! Tokenizer exactness is explicitly out of scope for this subsystem; this
//! estimate only needs to be close enough to drive minimization decisions.

use egress_llm::{CompletionRequest, Message, ToolDefinition};

/// Flat per-parameter token cost used by [`estimate_tool_definition_tokens`].
const TOKENS_PER_PARAMETER: usize = 20;

/// Estimate the tokens in a string: one per four characters, minimum one
/// for any non-empty string.
#[must_use]
pub fn estimate_text_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.len() / 4).max(1)
}

/// Estimate the tokens a single tool definition costs: its name and
/// description, plus a flat cost per declared parameter.
#[must_use]
pub fn estimate_tool_definition_tokens(tool: &ToolDefinition) -> usize {
    estimate_text_tokens(&tool.name)
        + estimate_text_tokens(&tool.description)
        + tool.parameter_count() * TOKENS_PER_PARAMETER
}

/// Estimate the tokens a single message costs: its text content plus any
/// tool-call/tool-result payloads it carries.
#[must_use]
pub fn estimate_message_tokens(message: &Message) -> usize {
    let mut total = estimate_text_tokens(&message.content);
    for call in &message.tool_calls {
        total += estimate_text_tokens(&call.name);
        total += estimate_text_tokens(&call.arguments.to_string());
    }
    for result in &message.tool_results {
        total += estimate_text_tokens(&result.content);
    }
    total
}

/// Estimate the tokens a single tool result's content costs.
#[must_use]
pub fn estimate_tool_result_tokens(content: &str) -> usize {
    estimate_text_tokens(content)
}

/// Estimate the total token footprint of a request: system prompt, tool
/// definitions, and messages.
#[must_use]
pub fn estimate_request_tokens(request: &CompletionRequest) -> usize {
    estimate_system_and_tools_tokens(request) + estimate_messages_tokens(&request.messages)
}

/// Estimate the fixed cost of a request's system prompt plus tool
/// definitions — the portion [`crate::minimizer::context_window`] cannot
/// reduce by dropping messages.
#[must_use]
pub fn estimate_system_and_tools_tokens(request: &CompletionRequest) -> usize {
    let prompt_tokens = estimate_text_tokens(&request.system);
    let tools_tokens: usize = request.tools.iter().map(estimate_tool_definition_tokens).sum();
    prompt_tokens + tools_tokens
}

/// Estimate the tokens across a slice of messages.
#[must_use]
pub fn estimate_messages_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egress_llm::{Message, ToolDefinition};

    #[test]
    fn empty_string_is_zero_tokens() {
        assert_eq!(estimate_text_tokens(""), 0);
    }

    #[test]
    fn any_nonempty_string_is_at_least_one_token() {
        assert_eq!(estimate_text_tokens("a"), 1);
        assert_eq!(estimate_text_tokens("abc"), 1);
    }

    #[test]
    fn four_chars_per_token() {
        assert_eq!(estimate_text_tokens("a".repeat(40).as_str()), 10);
    }

    #[test]
    fn tool_definition_counts_parameters() {
        let tool = ToolDefinition {
            name: "search".to_string(),
            description: "find things".to_string(),
            parameters: serde_json::json!({"type": "object", "properties": {"q": {}, "n": {}}}),
        };
        let expected =
            estimate_text_tokens("search") + estimate_text_tokens("find things") + 2 * TOKENS_PER_PARAMETER;
        assert_eq!(estimate_tool_definition_tokens(&tool), expected);
    }

    #[test]
    fn message_tokens_include_tool_results() {
        let message = Message::tool_results(vec![egress_llm::ToolResult::success(
            "call-1",
            "x".repeat(100),
        )]);
        assert_eq!(estimate_message_tokens(&message), 25);
    }
}
