//! Commonly used types for convenient import.
//!
//! `use egress_guard::prelude::*;`

pub use crate::classifier::{Classifier, NoopClassifier, PatternClassifier, SensitivityMatcher};
pub use crate::error::{Blocker, GuardError, GuardResult};
pub use crate::factory::GuardFactory;
pub use crate::guard_client::{ChatGuardClient, GuardClient};
pub use crate::sensitivity::Sensitivity;
