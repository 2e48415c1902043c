//! Sensitivity classification of serialized outbound payloads.
//!
//! Implementing a regex/pattern engine is explicitly out of scope for this
//! subsystem — it is an injected capability via [`SensitivityMatcher`]. This
//! module only owns the total translation from a matcher's raw label string
//! to [`Sensitivity`], and the fail-safe no-op fallback used when no engine
//! is configured.

use crate::sensitivity::Sensitivity;

/// An injected pattern-matching capability that inspects raw bytes and
/// returns a raw classification label, or `None` if nothing matched.
///
/// Implementations are expected to live outside this crate (e.g. backed by
/// `regex` or a vendored detection ruleset); this trait is the seam.
pub trait SensitivityMatcher: Send + Sync {
    /// Inspect `payload` and return a raw label, or `None` for "no match".
    fn matches(&self, payload: &[u8]) -> Option<String>;
}

/// Classifies a serialized payload's sensitivity.
pub trait Classifier: Send + Sync {
    /// Classify `payload`. Empty input always yields [`Sensitivity::Public`].
    fn classify(&self, payload: &[u8]) -> Sensitivity;
}

/// Fail-safe fallback classifier: always reports [`Sensitivity::Public`].
///
/// Used when no pattern engine has been configured. Since the guard's
/// default posture (`Config::egress_enabled == true`, deny lists empty)
/// otherwise allows cloud egress, a silent no-op classifier intentionally
/// does *not* fail closed — callers who need sensitivity gating must wire
/// a real [`SensitivityMatcher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopClassifier;

impl Classifier for NoopClassifier {
    fn classify(&self, _payload: &[u8]) -> Sensitivity {
        Sensitivity::Public
    }
}

/// Adapts an injected [`SensitivityMatcher`] into a [`Classifier`].
pub struct PatternClassifier<M: SensitivityMatcher> {
    matcher: M,
}

impl<M: SensitivityMatcher> PatternClassifier<M> {
    /// Wrap a matcher capability as a classifier.
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }
}

impl<M: SensitivityMatcher> Classifier for PatternClassifier<M> {
    fn classify(&self, payload: &[u8]) -> Sensitivity {
        if payload.is_empty() {
            return Sensitivity::Public;
        }
        match self.matcher.matches(payload) {
            Some(label) => Sensitivity::decode(&label),
            None => Sensitivity::Public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubMatcher(Option<&'static str>);

    impl SensitivityMatcher for StubMatcher {
        fn matches(&self, _payload: &[u8]) -> Option<String> {
            self.0.map(ToString::to_string)
        }
    }

    #[test]
    fn noop_classifier_always_public() {
        let classifier = NoopClassifier;
        assert_eq!(classifier.classify(b"anything"), Sensitivity::Public);
        assert_eq!(classifier.classify(b""), Sensitivity::Public);
    }

    #[test]
    fn pattern_classifier_empty_input_is_public() {
        let classifier = PatternClassifier::new(StubMatcher(Some("secret")));
        assert_eq!(classifier.classify(b""), Sensitivity::Public);
    }

    #[test]
    fn pattern_classifier_no_match_is_public() {
        let classifier = PatternClassifier::new(StubMatcher(None));
        assert_eq!(classifier.classify(b"hello"), Sensitivity::Public);
    }

    #[test]
    fn pattern_classifier_decodes_known_labels() {
        let classifier = PatternClassifier::new(StubMatcher(Some("pii")));
        assert_eq!(classifier.classify(b"ssn: 123-45-6789"), Sensitivity::Pii);
    }

    #[test]
    fn pattern_classifier_unknown_label_is_fail_safe() {
        let classifier = PatternClassifier::new(StubMatcher(Some("unrecognized")));
        assert_eq!(classifier.classify(b"data"), Sensitivity::Secret);
    }
}
