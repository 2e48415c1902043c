//! Sensitivity labels attached to outbound payloads by the [`crate::classifier`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// How sensitive a payload is, ordered from least to most restrictive.
///
/// Only [`Sensitivity::Public`] and [`Sensitivity::Confidential`] permit
/// transmission to an external provider; the remaining three block the
/// call outright. Ordering matters for callers that want to reason about
/// "at least as sensitive as" without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    /// No restriction on transmission.
    Public,
    /// Business-confidential but not personal or regulated data.
    Confidential,
    /// Personally identifiable information.
    Pii,
    /// Protected health information.
    Phi,
    /// Anything the classifier could not confidently place elsewhere.
    Secret,
}

impl Sensitivity {
    /// Whether this label permits sending the payload to an external provider.
    #[must_use]
    pub fn permits_external_transmission(self) -> bool {
        matches!(self, Self::Public | Self::Confidential)
    }

    /// Decode a classifier's raw label string.
    ///
    /// Unrecognized strings decode to [`Sensitivity::Secret`] — fail-safe: an
    /// injected classifier that returns a string this crate doesn't know
    /// about must never be treated as "safe to send".
    #[must_use]
    pub fn decode(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "public" => Self::Public,
            "confidential" => Self::Confidential,
            "pii" => Self::Pii,
            "phi" => Self::Phi,
            _ => Self::Secret,
        }
    }

    /// The canonical label string, used for metric and audit labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Confidential => "confidential",
            Self::Pii => "pii",
            Self::Phi => "phi",
            Self::Secret => "secret",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_and_confidential_permit_transmission() {
        assert!(Sensitivity::Public.permits_external_transmission());
        assert!(Sensitivity::Confidential.permits_external_transmission());
        assert!(!Sensitivity::Pii.permits_external_transmission());
        assert!(!Sensitivity::Phi.permits_external_transmission());
        assert!(!Sensitivity::Secret.permits_external_transmission());
    }

    #[test]
    fn unknown_label_decodes_fail_safe() {
        assert_eq!(Sensitivity::decode("nonsense"), Sensitivity::Secret);
        assert_eq!(Sensitivity::decode(""), Sensitivity::Secret);
    }

    #[test]
    fn known_labels_round_trip() {
        for label in ["public", "confidential", "pii", "phi", "secret"] {
            assert_eq!(Sensitivity::decode(label).as_str(), label);
        }
    }

    #[test]
    fn decode_is_case_and_whitespace_insensitive() {
        assert_eq!(Sensitivity::decode("  PII "), Sensitivity::Pii);
    }

    #[test]
    fn ordering_runs_public_to_secret() {
        assert!(Sensitivity::Public < Sensitivity::Confidential);
        assert!(Sensitivity::Confidential < Sensitivity::Pii);
        assert!(Sensitivity::Pii < Sensitivity::Phi);
        assert!(Sensitivity::Phi < Sensitivity::Secret);
    }
}
