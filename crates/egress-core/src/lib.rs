//! Foundation types shared by the egress guard: identifiers, the
//! secret-manager subsystem, and a telemetry bootstrap helper.
//!
//! This crate carries no guard policy — it is infrastructure the guard
//! (and its factory) build on top of.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]

pub mod ids;
pub mod prelude;
pub mod secret;

#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use ids::{Role, RequestId, SessionId, now_ms};
pub use secret::{EnvSecretSource, SecretBackend, SecretError, SecretResult, SecretSource};
