//! Errors an inner completion/chat client may return.
//!
//! These are distinct from the guard's admission-failure taxonomy
//! (`egress-guard::GuardError`): they describe the inner provider call
//! itself failing, not the guard refusing to make it. The guard propagates
//! them verbatim — it never re-classifies or wraps an inner error.

use thiserror::Error;

/// Errors from an inner LLM client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured for the provider.
    #[error("API key not configured for provider {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// The underlying HTTP/RPC call failed.
    #[error("request to provider failed: {0}")]
    RequestFailed(String),

    /// The provider returned a response this client could not parse.
    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    /// The requested model is not supported by this client.
    #[error("model not supported: {model}")]
    ModelNotSupported {
        /// Model name.
        model: String,
    },

    /// The request was cancelled via the caller's cancellation token.
    #[error("request cancelled")]
    Cancelled,
}

/// Result type for inner-client operations.
pub type LlmResult<T> = Result<T, LlmError>;
