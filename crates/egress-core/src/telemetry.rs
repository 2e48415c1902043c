//! Minimal tracing-subscriber bootstrap for hosts embedding the guard.
//!
//! The guard itself never installs a subscriber — it only emits events and
//! spans. This helper exists for binaries and integration tests that want a
//! one-line way to see those events, mirroring (in trimmed form) the
//! teacher's `astrid-telemetry::setup_logging`. File rotation and
//! multi-layer sinks are out of scope here; a host that needs those should
//! configure `tracing-subscriber` itself.

#![cfg(feature = "telemetry")]

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

/// Errors initializing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Output format for the default subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, ANSI-colored (default).
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Install a process-wide tracing subscriber.
///
/// `directive` is an `EnvFilter` directive string, e.g. `"info"` or
/// `"egress_guard=debug,warn"`. Invalid directives fall back to `"info"`.
pub fn install_subscriber(directive: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(TelemetryError::AlreadyInstalled)
}
