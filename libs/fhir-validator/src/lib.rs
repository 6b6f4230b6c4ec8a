//! Lattice Validator - configurable validation of lattice FHIR models
//!
//! # Architecture
//!
//! Configuration, planning and execution are kept apart:
//!
//! ```text
//! ValidatorConfig (declarative) → ValidationPlan (executable) → Validator (reusable)
//! ```
//!
//! ## Phase 1: Declarative Configuration
//!
//! [`ValidatorConfig`] says what to check:
//! - The model switches to install for the process ([`ModelConfig`])
//! - Whether the structural checks of every element run
//! - Which declared invariants are evaluated, and how guidelines are reported
//! - Serializable as YAML
//!
//! ## Phase 2: Compiled Validation Plan
//!
//! [`ValidatorConfig::compile`] checks the configuration and produces a
//! [`ValidationPlan`], an ordered list of steps with nothing left to decide.
//!
//! ## Phase 3: Reusable Validator
//!
//! [`Validator`] owns the plan. Each `validate()` call creates a short-lived
//! run that walks the resource with a [`lattice_models::Visitor`] and returns
//! a [`ValidationOutcome`].
//!
//! ```
//! use lattice_validator::{ValidatorConfig, Validator};
//! use serde_json::json;
//!
//! let validator = Validator::from_config(&ValidatorConfig::default()).unwrap();
//! let outcome = validator.validate_json(&json!({
//!     "resourceType": "SpecimenDefinition",
//!     "typeTested": [{"preference": "preferred"}]
//! }));
//! assert!(outcome.valid);
//! ```

use lattice_models::ModelConfig;
use serde::{Deserialize, Serialize};

mod error;
pub mod invariants;
mod plan;
mod steps;
mod validator;

pub use error::ConfigError;
pub use invariants::{Invariant, InvariantSeverity, INVARIANTS};
pub use plan::{InvariantsPlan, Step, StructurePlan, ValidationPlan};
pub use validator::{IssueCode, IssueSeverity, ValidationIssue, ValidationOutcome, Validator};

// ============================================================================
// Core Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub structure: StructureConfig,
    #[serde(default)]
    pub invariants: InvariantsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Structure only, as when accepting data from a trusted producer
    Ingestion,
    /// Everything, with guidelines reported as warnings
    Authoring,
    /// Structure and rules, guidelines ignored
    Server,
}

// ============================================================================
// Execution Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

fn default_max_issues() -> usize {
    1000
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_issues: 1000,
        }
    }
}

// ============================================================================
// Report Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_include_warnings")]
    pub include_warnings: bool,
    #[serde(default)]
    pub include_information: bool,
}

fn default_include_warnings() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_warnings: true,
            include_information: false,
        }
    }
}

// ============================================================================
// Structure Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    #[serde(default = "default_structure_mode")]
    pub mode: StructureMode,
}

fn default_structure_mode() -> StructureMode {
    StructureMode::On
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureMode {
    Off,
    On,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            mode: StructureMode::On,
        }
    }
}

// ============================================================================
// Invariants Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvariantsConfig {
    #[serde(default)]
    pub mode: InvariantsMode,
    #[serde(default)]
    pub best_practice: BestPracticeMode,
    /// Invariant keys that are never reported, e.g. `dom-6`
    #[serde(default)]
    pub suppress: Vec<InvariantKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InvariantsMode {
    Off,
    /// Rules only; guidelines are skipped regardless of `best_practice`
    RulesOnly,
    #[default]
    Full,
}

/// How guideline invariants (`severity = warning` in FHIR) are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BestPracticeMode {
    Ignore,
    #[default]
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvariantKey(pub String);

impl From<&str> for InvariantKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl Default for InvariantsConfig {
    fn default() -> Self {
        Self {
            mode: InvariantsMode::Full,
            best_practice: BestPracticeMode::Warn,
            suppress: vec![],
        }
    }
}

// ============================================================================
// ValidatorConfig Implementation
// ============================================================================

impl ValidatorConfig {
    pub fn preset(p: Preset) -> Self {
        let mut cfg = Self::defaults();
        cfg.preset = Some(p);

        match p {
            Preset::Ingestion => {
                cfg.structure.mode = StructureMode::On;
                cfg.invariants.mode = InvariantsMode::Off;
            }
            Preset::Authoring => {
                cfg.structure.mode = StructureMode::On;
                cfg.invariants.mode = InvariantsMode::Full;
                cfg.invariants.best_practice = BestPracticeMode::Warn;
                cfg.report.include_information = true;
            }
            Preset::Server => {
                cfg.structure.mode = StructureMode::On;
                cfg.invariants.mode = InvariantsMode::RulesOnly;
                cfg.invariants.best_practice = BestPracticeMode::Ignore;
            }
        }

        cfg
    }

    pub fn defaults() -> Self {
        Self {
            preset: None,
            model: ModelConfig::default(),
            report: ReportConfig::default(),
            exec: ExecConfig::default(),
            structure: StructureConfig::default(),
            invariants: InvariantsConfig::default(),
        }
    }

    pub fn compile(&self) -> Result<ValidationPlan, ConfigError> {
        if self.exec.max_issues == 0 {
            return Err(ConfigError::InvalidConfig(
                "exec.max_issues must be at least 1".to_string(),
            ));
        }
        if let Some(unknown) = self
            .invariants
            .suppress
            .iter()
            .find(|key| invariants::find(&key.0).is_none())
        {
            return Err(ConfigError::UnknownInvariant(unknown.0.clone()));
        }

        let mut steps = Vec::new();

        if self.structure.mode == StructureMode::On {
            steps.push(Step::Structure(StructurePlan::from(self)));
        }
        if self.invariants.mode != InvariantsMode::Off {
            steps.push(Step::Invariants(InvariantsPlan::from(&self.invariants)));
        }

        tracing::debug!(steps = steps.len(), preset = ?self.preset, "validation plan compiled");

        Ok(ValidationPlan {
            steps,
            fail_fast: self.exec.fail_fast,
            max_issues: self.exec.max_issues,
            include_warnings: self.report.include_warnings,
            include_information: self.report.include_information,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

// ============================================================================
// Builder Pattern
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct ValidatorConfigBuilder {
    cfg: Option<ValidatorConfig>,
}

impl ValidatorConfigBuilder {
    pub fn preset(mut self, p: Preset) -> Self {
        self.cfg = Some(ValidatorConfig::preset(p));
        self
    }

    pub fn model(mut self, model: ModelConfig) -> Self {
        self.cfg().model = model;
        self
    }

    pub fn structure_mode(mut self, mode: StructureMode) -> Self {
        self.cfg().structure.mode = mode;
        self
    }

    pub fn invariants_mode(mut self, mode: InvariantsMode) -> Self {
        self.cfg().invariants.mode = mode;
        self
    }

    pub fn best_practice(mut self, mode: BestPracticeMode) -> Self {
        self.cfg().invariants.best_practice = mode;
        self
    }

    pub fn suppress(mut self, key: impl Into<String>) -> Self {
        self.cfg().invariants.suppress.push(InvariantKey(key.into()));
        self
    }

    pub fn include_warnings(mut self, include: bool) -> Self {
        self.cfg().report.include_warnings = include;
        self
    }

    pub fn include_information(mut self, include: bool) -> Self {
        self.cfg().report.include_information = include;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.cfg().exec.fail_fast = fail_fast;
        self
    }

    pub fn max_issues(mut self, max: usize) -> Self {
        self.cfg().exec.max_issues = max;
        self
    }

    pub fn build(self) -> ValidatorConfig {
        self.cfg.unwrap_or_default()
    }

    fn cfg(&mut self) -> &mut ValidatorConfig {
        self.cfg.get_or_insert_with(ValidatorConfig::defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_ingestion() {
        let cfg = ValidatorConfig::preset(Preset::Ingestion);
        assert_eq!(cfg.structure.mode, StructureMode::On);
        assert_eq!(cfg.invariants.mode, InvariantsMode::Off);

        let plan = cfg.compile().unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert!(matches!(plan.steps[0], Step::Structure(_)));
    }

    #[test]
    fn test_builder() {
        let cfg = ValidatorConfig::builder()
            .preset(Preset::Server)
            .best_practice(BestPracticeMode::Error)
            .suppress("tst-0")
            .fail_fast(true)
            .build();

        assert_eq!(cfg.preset, Some(Preset::Server));
        assert_eq!(cfg.invariants.mode, InvariantsMode::RulesOnly);
        assert_eq!(cfg.invariants.best_practice, BestPracticeMode::Error);
        assert_eq!(cfg.invariants.suppress, vec![InvariantKey::from("tst-0")]);
        assert!(cfg.exec.fail_fast);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let cfg = ValidatorConfig::builder()
            .preset(Preset::Authoring)
            .suppress("dom-6")
            .model(ModelConfig {
                validation: true,
                check_reference_types: false,
            })
            .build();
        let yaml = cfg.to_yaml().unwrap();
        let parsed = ValidatorConfig::from_yaml(&yaml).unwrap();
        assert_eq!(cfg.preset, parsed.preset);
        assert_eq!(cfg.structure.mode, parsed.structure.mode);
        assert_eq!(cfg.invariants.suppress, parsed.invariants.suppress);
        assert_eq!(cfg.model, parsed.model);
    }

    #[test]
    fn test_yaml_sections_default() {
        let cfg = ValidatorConfig::from_yaml("exec:\n  fail_fast: true\n").unwrap();
        assert!(cfg.exec.fail_fast);
        assert_eq!(cfg.exec.max_issues, 1000);
        assert_eq!(cfg.invariants.mode, InvariantsMode::Full);
        assert_eq!(cfg.model, ModelConfig::default());

        let cfg = ValidatorConfig::from_yaml(
            "invariants:\n  mode: RulesOnly\n  suppress: [tst-3]\nstructure:\n  mode: Off\n",
        )
        .unwrap();
        assert_eq!(cfg.invariants.mode, InvariantsMode::RulesOnly);
        assert_eq!(cfg.structure.mode, StructureMode::Off);
        assert_eq!(cfg.invariants.suppress, vec![InvariantKey::from("tst-3")]);
    }

    #[test]
    fn test_compile_validation() {
        let cfg = ValidatorConfig::builder().max_issues(0).build();
        assert!(matches!(cfg.compile(), Err(ConfigError::InvalidConfig(_))));

        let cfg = ValidatorConfig::builder().suppress("tst-99").build();
        assert!(matches!(
            cfg.compile(),
            Err(ConfigError::UnknownInvariant(ref key)) if key == "tst-99"
        ));
    }

    #[test]
    fn test_compile_skips_disabled_steps() {
        let plan = ValidatorConfig::builder()
            .structure_mode(StructureMode::Off)
            .invariants_mode(InvariantsMode::Off)
            .build()
            .compile()
            .unwrap();
        assert!(plan.steps.is_empty());
    }
}
