//! Commonly used types for convenient import.
//!
//! `use egress_core::prelude::*;`

pub use crate::ids::{Role, RequestId, SessionId, now_ms};
pub use crate::secret::{EnvSecretSource, SecretBackend, SecretError, SecretResult, SecretSource};
