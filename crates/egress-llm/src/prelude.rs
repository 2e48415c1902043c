//! Commonly used types for convenient import.
//!
//! `use egress_llm::prelude::*;`

pub use crate::client::{ChatClient, CompletionClient};
pub use crate::error::{LlmError, LlmResult};
pub use crate::types::{
    CompletionRequest, CompletionResponse, GenerationParams, Message, MessageRole, StopReason,
    ToolCall, ToolChoice, ToolDefinition, ToolResult, TraceStep,
};
