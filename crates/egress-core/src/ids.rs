//! Session, request, and role identifiers shared across the guard.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies a conversation instance. Stable for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Mint a fresh session identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a single completion call through the admission pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Mint a fresh request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conversation role, each with its own token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The primary conversational agent.
    Main,
    /// The routing/orchestration model.
    Router,
    /// The parameter-extraction model.
    ParamExtractor,
}

impl Role {
    /// The environment variable suffix used to look up this role's token budget.
    #[must_use]
    pub fn env_suffix(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::Router => "ROUTER",
            Self::ParamExtractor => "PARAM",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Router => write!(f, "router"),
            Self::ParamExtractor => write!(f, "param_extractor"),
        }
    }
}

/// Milliseconds since the Unix epoch, UTC. Used for audit timestamps.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn role_env_suffix_is_exhaustive() {
        assert_eq!(Role::Main.env_suffix(), "MAIN");
        assert_eq!(Role::Router.env_suffix(), "ROUTER");
        assert_eq!(Role::ParamExtractor.env_suffix(), "PARAM");
    }

    #[test]
    fn now_ms_is_positive() {
        assert!(now_ms() > 0);
    }
}
