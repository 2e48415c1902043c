//! Abstract completion request/response types.
//!
//! These are provider-agnostic: a concrete client (Claude, OpenAI-compatible,
//! a local Ollama binding) is responsible for translating to and from its own
//! wire format. The guard only ever sees this shape, which keeps the
//! admission pipeline and minimizer independent of any specific API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Role of a single message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// System instructions. Never compressed by the minimizer.
    System,
    /// User turn.
    User,
    /// Assistant turn.
    Assistant,
    /// Tool-result turn.
    Tool,
}

/// A tool-call invocation emitted by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID, referenced by a later [`ToolResult::call_id`].
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Arguments, as the tool's own JSON schema expects.
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call with empty arguments.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the arguments payload.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// The result of a previously issued tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The [`ToolCall::id`] this result answers.
    pub call_id: String,
    /// Result content, as text.
    pub content: String,
    /// Whether the tool invocation failed.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result.
    pub fn error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// A single conversation turn.
///
/// `tool_calls` and `tool_results` are independent of `role`: an assistant
/// message may carry tool calls alongside (or instead of) text, and a tool
/// message carries results. Modeling them as plain vectors (rather than an
/// enum over content shape) keeps the minimizer's per-message transforms
/// uniform regardless of which combination is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who spoke this turn.
    pub role: MessageRole,
    /// Textual content. May be empty when the turn is pure tool calls/results.
    #[serde(default)]
    pub content: String,
    /// Tool calls issued on this turn (normally only on `Assistant` turns).
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Tool results delivered on this turn (normally only on `Tool` turns).
    #[serde(default)]
    pub tool_results: Vec<ToolResult>,
}

impl Message {
    /// Create a plain-text user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    /// Create a plain-text assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }

    /// Create an assistant turn that only issues tool calls.
    #[must_use]
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            tool_calls,
            tool_results: Vec::new(),
        }
    }

    /// Create a tool turn carrying results.
    #[must_use]
    pub fn tool_results(tool_results: Vec<ToolResult>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: String::new(),
            tool_calls: Vec::new(),
            tool_results,
        }
    }

    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
        }
    }
}

/// A tool definition offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, as referenced by [`ToolChoice::Tool`] and [`ToolCall::name`].
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// JSON schema for the tool's parameters.
    #[serde(default)]
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition with an empty object schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    /// Number of top-level parameters declared under `properties`.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters
            .get("properties")
            .and_then(Value::as_object)
            .map_or(0, serde_json::Map::len)
    }
}

/// Directive controlling which tools the model may invoke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides whether and which tool to call.
    Auto,
    /// The model must call some tool.
    Any,
    /// The model must call exactly the named tool.
    Tool(String),
    /// The model may not call any tool.
    None,
}

/// Numeric generation parameters.
///
/// `temperature` follows the uniform convention adopted across provider
/// adaptors in this crate: negative means "use the provider's default and
/// omit the field from the outbound payload"; `0.0` means "most
/// deterministic" and is sent explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Maximum tokens to generate. `None` defers to the provider default.
    pub max_tokens: Option<u32>,
    /// Sampling temperature. Negative omits the field (provider default).
    pub temperature: f64,
    /// Sequences that stop generation when produced.
    #[serde(default)]
    pub stop_sequences: Vec<String>,
}

impl GenerationParams {
    /// Whether `temperature` should be included in an outbound payload.
    #[must_use]
    pub fn has_explicit_temperature(&self) -> bool {
        self.temperature >= 0.0
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: -1.0,
            stop_sequences: Vec::new(),
        }
    }
}

/// A provider-agnostic completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt.
    #[serde(default)]
    pub system: String,
    /// Ordered conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Tool definitions offered to the model.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
    /// Tool-choice directive, if any.
    #[serde(default)]
    pub tool_choice: Option<ToolChoice>,
    /// Generation parameters.
    #[serde(default)]
    pub params: GenerationParams,
}

impl CompletionRequest {
    /// Create a request with only a system prompt and messages.
    #[must_use]
    pub fn new(system: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system: system.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            params: GenerationParams::default(),
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response.
    EndTurn,
    /// Hit the configured max-tokens ceiling.
    MaxTokens,
    /// The model requested a tool call.
    ToolUse,
    /// A configured stop sequence was produced.
    StopSequence,
}

/// Optional per-step trace metadata echoed back by the inner client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Trace identifier, if a trace context was active.
    pub trace_id: Option<String>,
    /// Span identifier, if a trace context was active.
    pub span_id: Option<String>,
}

/// A provider-agnostic completion response.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated content.
    pub content: String,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Input tokens actually consumed, per the provider's own accounting.
    pub input_tokens: usize,
    /// Output tokens actually produced.
    pub output_tokens: usize,
    /// Wall-clock duration of the call.
    pub duration: Duration,
    /// Model identifier echoed back by the provider.
    pub model: String,
    /// Optional trace-step metadata.
    pub trace_step: Option<TraceStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_convention_is_uniform() {
        let mut params = GenerationParams::default();
        assert!(!params.has_explicit_temperature());
        params.temperature = 0.0;
        assert!(params.has_explicit_temperature());
        params.temperature = 0.7;
        assert!(params.has_explicit_temperature());
        params.temperature = -0.1;
        assert!(!params.has_explicit_temperature());
    }

    #[test]
    fn tool_definition_parameter_count() {
        let tool = ToolDefinition {
            name: "search".into(),
            description: String::new(),
            parameters: serde_json::json!({"type": "object", "properties": {"q": {}, "n": {}}}),
        };
        assert_eq!(tool.parameter_count(), 2);
    }

    #[test]
    fn request_equality_is_deep() {
        let a = CompletionRequest::new("sys", vec![Message::user("hi")]);
        let b = CompletionRequest::new("sys", vec![Message::user("hi")]);
        assert_eq!(a, b);
        let c = CompletionRequest::new("sys", vec![Message::user("bye")]);
        assert_ne!(a, c);
    }
}
