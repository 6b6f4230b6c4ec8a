//! Process-wide model configuration
//!
//! Two switches control what `build()` and the JSON entry points check:
//!
//! - `validation`: run the per-type `validate()` step after construction.
//!   Required fields are always enforced because the built types cannot
//!   represent their absence.
//! - `check_reference_types`: verify that references point at one of the
//!   resource types permitted for the element.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

static VALIDATION: AtomicBool = AtomicBool::new(true);
static CHECK_REFERENCE_TYPES: AtomicBool = AtomicBool::new(true);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_true")]
    pub validation: bool,
    #[serde(default = "default_true")]
    pub check_reference_types: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            validation: true,
            check_reference_types: true,
        }
    }
}

impl ModelConfig {
    /// Snapshot of the active configuration.
    pub fn current() -> Self {
        Self {
            validation: validation_enabled(),
            check_reference_types: check_reference_types(),
        }
    }

    /// Make this configuration the active one for the whole process.
    pub fn install(self) {
        VALIDATION.store(self.validation, Ordering::Relaxed);
        CHECK_REFERENCE_TYPES.store(self.check_reference_types, Ordering::Relaxed);
        tracing::debug!(
            validation = self.validation,
            check_reference_types = self.check_reference_types,
            "model configuration installed"
        );
    }

    pub fn set_validation(enabled: bool) {
        VALIDATION.store(enabled, Ordering::Relaxed);
        tracing::debug!(enabled, "model validation switched");
    }

    pub fn set_check_reference_types(enabled: bool) {
        CHECK_REFERENCE_TYPES.store(enabled, Ordering::Relaxed);
        tracing::debug!(enabled, "reference type checking switched");
    }
}

pub fn validation_enabled() -> bool {
    VALIDATION.load(Ordering::Relaxed)
}

pub fn check_reference_types() -> bool {
    CHECK_REFERENCE_TYPES.load(Ordering::Relaxed)
}

/// Resolve a builder's `validating` override against the global switch.
pub(crate) fn should_validate(builder_override: Option<bool>) -> bool {
    builder_override.unwrap_or_else(validation_enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_override_wins() {
        assert!(should_validate(Some(true)));
        assert!(!should_validate(Some(false)));
    }

    #[test]
    fn test_deserialize_defaults() {
        let cfg: ModelConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ModelConfig::default());

        let cfg: ModelConfig = serde_json::from_str(r#"{"check_reference_types": false}"#).unwrap();
        assert!(cfg.validation);
        assert!(!cfg.check_reference_types);
    }
}
