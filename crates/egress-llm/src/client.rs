//! The inner-client contract the guard wraps.
//!
//! `CompletionClient` is the full-featured contract (tool calls, tool
//! definitions, structured usage). `ChatClient` is the lighter variant used
//! by callers that only need a single string in, string out round trip —
//! `GuardClient`'s sibling `ChatGuardClient` wraps this one instead.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::LlmResult;
use crate::types::{CompletionRequest, CompletionResponse};

/// A client capable of full completion calls: tool definitions, tool
/// calls/results, and structured usage accounting.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Provider identifier, e.g. `"anthropic"`, `"ollama"`.
    fn name(&self) -> &str;

    /// Model identifier this client is bound to.
    fn model(&self) -> &str;

    /// Issue a completion call.
    ///
    /// `cancel` is polled cooperatively; a client that cannot honor it mid-
    /// flight should at minimum check it before issuing the underlying I/O.
    async fn complete(
        &self,
        request: CompletionRequest,
        cancel: CancellationToken,
    ) -> LlmResult<CompletionResponse>;
}

/// A lighter client for single string in, single string out interactions.
///
/// Used by callers that don't need tool calls. Since raw chat responses
/// carry no usage block, token accounting for this variant is approximated
/// from response length (see `egress-guard`'s chat decorator).
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Provider identifier.
    fn name(&self) -> &str;

    /// Model identifier this client is bound to.
    fn model(&self) -> &str;

    /// Issue a chat call, returning the response text.
    async fn chat(&self, prompt: &str, cancel: CancellationToken) -> LlmResult<String>;
}
