use crate::{ConfigError, Step, ValidationPlan, ValidatorConfig};
use lattice_models::{Error, Resource};
use serde_json::Value;

/// Reusable validator - owns the compiled plan
#[derive(Debug, Clone)]
pub struct Validator {
    plan: ValidationPlan,
}

impl Validator {
    pub fn new(plan: ValidationPlan) -> Self {
        Self { plan }
    }

    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        let plan = config.compile()?;
        Ok(Self::new(plan))
    }

    pub fn validate(&self, resource: &Resource) -> ValidationOutcome {
        if self.plan.steps.is_empty() {
            return ValidationOutcome::success(Some(resource.resource_type().to_string()));
        }
        ValidationRun::new(&self.plan, resource).execute()
    }

    /// Parse and validate a JSON resource.
    ///
    /// The document is parsed without the model's own validation so that
    /// every problem is reported by the plan. A document that cannot be
    /// parsed yields a single fatal `structure` issue.
    pub fn validate_json(&self, value: &Value) -> ValidationOutcome {
        match Resource::from_value_unchecked(value.clone()) {
            Ok(resource) => self.validate(&resource),
            Err(err) => {
                let resource_type = value
                    .get("resourceType")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                tracing::debug!(error = %err, "resource could not be parsed");
                ValidationOutcome {
                    resource_type,
                    valid: false,
                    issues: vec![ValidationIssue::for_model_error(&err)],
                }
            }
        }
    }

    pub fn validate_batch(&self, resources: &[Resource]) -> Vec<ValidationOutcome> {
        resources.iter().map(|r| self.validate(r)).collect()
    }

    pub fn plan(&self) -> &ValidationPlan {
        &self.plan
    }
}

/// Short-lived validation execution
struct ValidationRun<'a> {
    plan: &'a ValidationPlan,
    resource: &'a Resource,
    issues: Vec<ValidationIssue>,
}

impl<'a> ValidationRun<'a> {
    fn new(plan: &'a ValidationPlan, resource: &'a Resource) -> Self {
        Self {
            plan,
            resource,
            issues: Vec::new(),
        }
    }

    fn execute(mut self) -> ValidationOutcome {
        for step in &self.plan.steps {
            if self.plan.fail_fast && self.has_errors() {
                break;
            }

            if self.issues.len() >= self.plan.max_issues {
                break;
            }

            let found = self.execute_step(step);
            self.record(found);
        }

        let outcome = ValidationOutcome {
            resource_type: Some(self.resource.resource_type().to_string()),
            valid: !self.has_errors(),
            issues: self.issues,
        };
        tracing::debug!(
            resource_type = self.resource.resource_type(),
            valid = outcome.valid,
            issues = outcome.issues.len(),
            "validation finished"
        );
        outcome
    }

    fn execute_step(&self, step: &Step) -> Vec<ValidationIssue> {
        let mut found = Vec::new();
        match step {
            Step::Structure(plan) => {
                crate::steps::structure::validate_structure(self.resource, plan, &mut found)
            }
            Step::Invariants(plan) => {
                crate::steps::invariants::validate_invariants(self.resource, plan, &mut found)
            }
        }
        found
    }

    fn record(&mut self, found: Vec<ValidationIssue>) {
        let plan = self.plan;
        let remaining = plan.max_issues.saturating_sub(self.issues.len());
        self.issues.extend(
            found
                .into_iter()
                .filter(|i| match i.severity {
                    IssueSeverity::Warning => plan.include_warnings,
                    IssueSeverity::Information => plan.include_information,
                    IssueSeverity::Fatal | IssueSeverity::Error => true,
                })
                .take(remaining),
        );
    }

    fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Error || i.severity == IssueSeverity::Fatal)
    }
}

/// Validation result for a single resource
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub resource_type: Option<String>,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn success(resource_type: Option<String>) -> Self {
        Self {
            resource_type,
            valid: true,
            issues: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error || i.severity == IssueSeverity::Fatal)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn to_operation_outcome(&self) -> Value {
        serde_json::json!({
            "resourceType": "OperationOutcome",
            "issue": self.issues.iter().map(|i| i.to_json()).collect::<Vec<_>>()
        })
    }
}

/// Individual validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub diagnostics: String,
    pub location: Option<String>,
    pub expression: Option<Vec<String>>,
}

impl ValidationIssue {
    pub fn new(severity: IssueSeverity, code: IssueCode, diagnostics: String) -> Self {
        Self {
            severity,
            code,
            diagnostics,
            location: None,
            expression: None,
        }
    }

    pub fn error(code: IssueCode, diagnostics: String) -> Self {
        Self::new(IssueSeverity::Error, code, diagnostics)
    }

    pub fn warning(code: IssueCode, diagnostics: String) -> Self {
        Self::new(IssueSeverity::Warning, code, diagnostics)
    }

    pub fn information(code: IssueCode, diagnostics: String) -> Self {
        Self::new(IssueSeverity::Information, code, diagnostics)
    }

    /// Issue describing a model error. Parse failures are fatal.
    pub fn for_model_error(err: &Error) -> Self {
        let root = err.root();
        let (severity, code) = match root {
            Error::MissingRequiredElement(_) | Error::EmptyList(_) => {
                (IssueSeverity::Error, IssueCode::Required)
            }
            Error::InvalidReferenceType { .. }
            | Error::ReferenceTypeMismatch { .. }
            | Error::InvalidPrimitive { .. } => (IssueSeverity::Error, IssueCode::Value),
            Error::MissingValueOrChildren(_) | Error::Invariant { .. } => {
                (IssueSeverity::Error, IssueCode::Invariant)
            }
            Error::UnknownCode { .. } => (IssueSeverity::Error, IssueCode::CodeInvalid),
            Error::InvalidResource(_) | Error::SerializationError(_) | Error::Element { .. } => {
                (IssueSeverity::Fatal, IssueCode::Structure)
            }
        };
        let issue = Self::new(severity, code, root.to_string());
        match err.location() {
            Some(location) => issue.with_location(location.to_string()),
            None => issue,
        }
    }

    pub fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_expression(mut self, expression: Vec<String>) -> Self {
        self.expression = Some(expression);
        self
    }

    fn to_json(&self) -> Value {
        let mut issue = serde_json::json!({
            "severity": self.severity.to_string().to_lowercase(),
            "code": self.code.to_string(),
            "diagnostics": self.diagnostics,
        });

        if let Some(ref loc) = self.location {
            issue["location"] = serde_json::json!([loc]);
        }

        if let Some(ref expr) = self.expression {
            issue["expression"] = serde_json::json!(expr);
        }

        issue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal => write!(f, "Fatal"),
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
            Self::Information => write!(f, "Information"),
        }
    }
}

/// The subset of the FHIR `issue-type` codes this validator reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    Structure,
    Required,
    Value,
    Invariant,
    CodeInvalid,
    Suppressed,
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Structure => "structure",
            Self::Required => "required",
            Self::Value => "value",
            Self::Invariant => "invariant",
            Self::CodeInvalid => "code-invalid",
            Self::Suppressed => "suppressed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_outcome_operations() {
        let outcome = ValidationOutcome {
            resource_type: Some("TestScript".to_string()),
            valid: false,
            issues: vec![
                ValidationIssue::error(IssueCode::Required, "Missing required field".to_string()),
                ValidationIssue::warning(IssueCode::Invariant, "tst-0: name".to_string()),
            ],
        };

        assert!(!outcome.valid);
        assert!(outcome.has_errors());
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.warning_count(), 1);
    }

    #[test]
    fn test_operation_outcome_conversion() {
        let outcome = ValidationOutcome {
            resource_type: Some("TestScript".to_string()),
            valid: false,
            issues: vec![ValidationIssue::error(
                IssueCode::Required,
                "name is required".to_string(),
            )
            .with_location("TestScript.name".to_string())
            .with_expression(vec!["TestScript.name".to_string()])],
        };

        let op_outcome = outcome.to_operation_outcome();
        assert_eq!(op_outcome["resourceType"], "OperationOutcome");
        assert_eq!(op_outcome["issue"][0]["severity"], "error");
        assert_eq!(op_outcome["issue"][0]["code"], "required");
        assert_eq!(op_outcome["issue"][0]["location"], json!(["TestScript.name"]));
    }

    #[test]
    fn test_model_error_mapping() {
        let err = Error::EmptyList("action".to_string()).at("TestScript.setup");
        let issue = ValidationIssue::for_model_error(&err);
        assert_eq!(issue.severity, IssueSeverity::Error);
        assert_eq!(issue.code, IssueCode::Required);
        assert_eq!(issue.location.as_deref(), Some("TestScript.setup"));

        let err = Error::InvalidResource("missing resourceType".to_string());
        let issue = ValidationIssue::for_model_error(&err);
        assert_eq!(issue.severity, IssueSeverity::Fatal);
        assert_eq!(issue.code, IssueCode::Structure);
    }

    #[test]
    fn test_unparseable_json_is_fatal() {
        let validator = Validator::from_config(&ValidatorConfig::default()).unwrap();
        let outcome = validator.validate_json(&json!({
            "resourceType": "TestScript",
            "name": "NoUrl",
            "status": "draft"
        }));
        assert!(!outcome.valid);
        assert_eq!(outcome.resource_type.as_deref(), Some("TestScript"));
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].severity, IssueSeverity::Fatal);
        assert!(outcome.issues[0].diagnostics.contains("url"));
    }

    #[test]
    fn test_max_issues_truncates() {
        let plan = ValidatorConfig::builder().max_issues(1).build().compile().unwrap();
        let validator = Validator::new(plan);
        let outcome = validator.validate_json(&json!({
            "resourceType": "TestScript",
            "url": "http://example.org/ts",
            "name": "Broken",
            "status": "draft",
            "setup": {"action": []},
            "teardown": {"action": []}
        }));
        assert_eq!(outcome.issues.len(), 1);
        assert!(!outcome.valid);
    }

    #[test]
    fn test_empty_plan_succeeds() {
        let config = ValidatorConfig::builder()
            .structure_mode(crate::StructureMode::Off)
            .invariants_mode(crate::InvariantsMode::Off)
            .build();
        let outcome = Validator::from_config(&config).unwrap().validate_json(&json!({
            "resourceType": "TestScript",
            "url": "http://example.org/ts",
            "name": "broken name",
            "status": "draft",
            "setup": {"action": []}
        }));
        assert!(outcome.valid);
        assert!(outcome.issues.is_empty());
        assert_eq!(outcome.resource_type.as_deref(), Some("TestScript"));
    }

    #[test]
    fn test_report_filters_warnings() {
        let plan = ValidatorConfig::builder()
            .include_warnings(false)
            .build()
            .compile()
            .unwrap();
        let outcome = Validator::new(plan).validate_json(&json!({
            "resourceType": "SpecimenDefinition",
            "id": "no-text"
        }));
        assert!(outcome.valid);
        assert!(outcome.issues.is_empty());
    }
}
