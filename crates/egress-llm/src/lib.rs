//! The inner-client contract the egress guard decorates.
//!
//! This crate defines the provider-agnostic request/response shapes and the
//! `CompletionClient`/`ChatClient` traits any concrete provider adaptor
//! (Claude, an OpenAI-compatible endpoint, a local Ollama binding) must
//! implement. It carries no HTTP transport and no guard policy — those live
//! in concrete adaptors (outside this repository's scope) and in
//! `egress-guard`, respectively.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

pub mod client;
pub mod error;
pub mod prelude;
pub mod types;

pub use client::{ChatClient, CompletionClient};
pub use error::{LlmError, LlmResult};
pub use types::{
    CompletionRequest, CompletionResponse, GenerationParams, Message, MessageRole, StopReason,
    ToolCall, ToolChoice, ToolDefinition, ToolResult, TraceStep,
};
