use crate::{BestPracticeMode, InvariantKey, InvariantsConfig, InvariantsMode, ValidatorConfig};

/// Compiled validation plan - list of steps to execute
#[derive(Debug, Clone)]
pub struct ValidationPlan {
    pub steps: Vec<Step>,
    pub fail_fast: bool,
    pub max_issues: usize,
    pub include_warnings: bool,
    pub include_information: bool,
}

#[derive(Debug, Clone)]
pub enum Step {
    Structure(StructurePlan),
    Invariants(InvariantsPlan),
}

// ============================================================================
// Step Plans
// ============================================================================

#[derive(Debug, Clone)]
pub struct StructurePlan {
    /// Report references to resource types the element does not allow
    pub check_reference_types: bool,
}

impl From<&ValidatorConfig> for StructurePlan {
    fn from(cfg: &ValidatorConfig) -> Self {
        Self {
            check_reference_types: cfg.model.check_reference_types,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvariantsPlan {
    pub mode: InvariantsMode,
    pub best_practice: BestPracticeMode,
    pub suppress: Vec<InvariantKey>,
}

impl InvariantsPlan {
    pub fn is_suppressed(&self, key: &str) -> bool {
        self.suppress.iter().any(|k| k.0 == key)
    }
}

impl From<&InvariantsConfig> for InvariantsPlan {
    fn from(cfg: &InvariantsConfig) -> Self {
        Self {
            mode: cfg.mode,
            best_practice: cfg.best_practice,
            suppress: cfg.suppress.clone(),
        }
    }
}
