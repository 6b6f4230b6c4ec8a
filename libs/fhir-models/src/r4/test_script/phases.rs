//! Setup, test and teardown phases of a TestScript

use super::operation::{Assert, Operation};
use crate::common::error::Result;
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{
    accept_composite, accept_list, accept_optional, Validate, Visitable, Visitor,
};
use crate::r4::element::{impl_backbone_element, BackboneBase};
use serde::{Deserialize, Serialize};
use std::any::Any;

// ============================================================================
// Setup
// ============================================================================

/// A series of required setup operations before tests are executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    #[serde(flatten)]
    base: BackboneBase,

    /// A setup operation or assert to perform
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    action: Vec<SetupAction>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Setup { base, action });

impl Setup {
    pub fn builder() -> SetupBuilder {
        SetupBuilder::default()
    }

    pub fn to_builder(&self) -> SetupBuilder {
        SetupBuilder::from(self.clone())
    }

    pub fn action(&self) -> &[SetupAction] {
        &self.action
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetupBuilder {
    base: BackboneBase,
    action: Vec<SetupAction>,
    validating: Option<bool>,
}

impl From<Setup> for SetupBuilder {
    fn from(value: Setup) -> Self {
        Self {
            base: value.base,
            action: value.action,
            validating: None,
        }
    }
}

impl SetupBuilder {
    pub fn add_action(mut self, action: SetupAction) -> Self {
        self.action.push(action);
        self
    }

    pub fn action(mut self, action: impl IntoIterator<Item = SetupAction>) -> Self {
        self.action = action.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Setup> {
        validation::finish(
            Setup {
                base: self.base,
                action: self.action,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Setup, SetupBuilder);

impl Validate for Setup {
    fn validate(&self) -> Result<()> {
        validation::require_non_empty(&self.action, "action")
    }
}

impl Visitable for Setup {
    fn type_name(&self) -> &'static str {
        "TestScript.Setup"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_list(&self.action, "action", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A setup operation or assert to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupAction {
    #[serde(flatten)]
    base: BackboneBase,

    /// The setup operation to perform
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<Operation>,

    /// The assertion to perform
    #[serde(skip_serializing_if = "Option::is_none")]
    assert: Option<Assert>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(SetupAction { base, operation, assert });

impl SetupAction {
    pub fn builder() -> SetupActionBuilder {
        SetupActionBuilder::default()
    }

    pub fn to_builder(&self) -> SetupActionBuilder {
        SetupActionBuilder::from(self.clone())
    }

    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    pub fn assert(&self) -> Option<&Assert> {
        self.assert.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SetupActionBuilder {
    base: BackboneBase,
    operation: Option<Operation>,
    assert: Option<Assert>,
    validating: Option<bool>,
}

impl From<SetupAction> for SetupActionBuilder {
    fn from(value: SetupAction) -> Self {
        Self {
            base: value.base,
            operation: value.operation,
            assert: value.assert,
            validating: None,
        }
    }
}

impl SetupActionBuilder {
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn assert(mut self, assert: Assert) -> Self {
        self.assert = Some(assert);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<SetupAction> {
        validation::finish(
            SetupAction {
                base: self.base,
                operation: self.operation,
                assert: self.assert,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(SetupAction, SetupActionBuilder);

impl Validate for SetupAction {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children() || self.operation.is_some() || self.assert.is_some(),
            "TestScript.Setup.Action",
        )
    }
}

impl Visitable for SetupAction {
    fn type_name(&self) -> &'static str {
        "TestScript.Setup.Action"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.operation, "operation", v);
            accept_optional(&self.assert, "assert", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Test
// ============================================================================

/// A test in this script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    #[serde(flatten)]
    base: BackboneBase,

    /// Tracking/logging name of this test
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Tracking/reporting short description of the test
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// A test operation or assert to perform
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    action: Vec<TestAction>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Test { base, name, description, action });

impl Test {
    pub fn builder() -> TestBuilder {
        TestBuilder::default()
    }

    pub fn to_builder(&self) -> TestBuilder {
        TestBuilder::from(self.clone())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn action(&self) -> &[TestAction] {
        &self.action
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestBuilder {
    base: BackboneBase,
    name: Option<String>,
    description: Option<String>,
    action: Vec<TestAction>,
    validating: Option<bool>,
}

impl From<Test> for TestBuilder {
    fn from(value: Test) -> Self {
        Self {
            base: value.base,
            name: value.name,
            description: value.description,
            action: value.action,
            validating: None,
        }
    }
}

impl TestBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_action(mut self, action: TestAction) -> Self {
        self.action.push(action);
        self
    }

    pub fn action(mut self, action: impl IntoIterator<Item = TestAction>) -> Self {
        self.action = action.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Test> {
        validation::finish(
            Test {
                base: self.base,
                name: self.name,
                description: self.description,
                action: self.action,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Test, TestBuilder);

impl Validate for Test {
    fn validate(&self) -> Result<()> {
        validation::require_non_empty(&self.action, "action")
    }
}

impl Visitable for Test {
    fn type_name(&self) -> &'static str {
        "TestScript.Test"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.name, "name", v);
            accept_optional(&self.description, "description", v);
            accept_list(&self.action, "action", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A test operation or assert to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestAction {
    #[serde(flatten)]
    base: BackboneBase,

    /// The setup operation to perform
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<Operation>,

    /// The setup assertion to perform
    #[serde(skip_serializing_if = "Option::is_none")]
    assert: Option<Assert>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(TestAction { base, operation, assert });

impl TestAction {
    pub fn builder() -> TestActionBuilder {
        TestActionBuilder::default()
    }

    pub fn to_builder(&self) -> TestActionBuilder {
        TestActionBuilder::from(self.clone())
    }

    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    pub fn assert(&self) -> Option<&Assert> {
        self.assert.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestActionBuilder {
    base: BackboneBase,
    operation: Option<Operation>,
    assert: Option<Assert>,
    validating: Option<bool>,
}

impl From<TestAction> for TestActionBuilder {
    fn from(value: TestAction) -> Self {
        Self {
            base: value.base,
            operation: value.operation,
            assert: value.assert,
            validating: None,
        }
    }
}

impl TestActionBuilder {
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn assert(mut self, assert: Assert) -> Self {
        self.assert = Some(assert);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<TestAction> {
        validation::finish(
            TestAction {
                base: self.base,
                operation: self.operation,
                assert: self.assert,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(TestAction, TestActionBuilder);

impl Validate for TestAction {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children() || self.operation.is_some() || self.assert.is_some(),
            "TestScript.Test.Action",
        )
    }
}

impl Visitable for TestAction {
    fn type_name(&self) -> &'static str {
        "TestScript.Test.Action"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.operation, "operation", v);
            accept_optional(&self.assert, "assert", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Teardown
// ============================================================================

/// A series of required clean up steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teardown {
    #[serde(flatten)]
    base: BackboneBase,

    /// One or more teardown operations to perform
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    action: Vec<TeardownAction>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Teardown { base, action });

impl Teardown {
    pub fn builder() -> TeardownBuilder {
        TeardownBuilder::default()
    }

    pub fn to_builder(&self) -> TeardownBuilder {
        TeardownBuilder::from(self.clone())
    }

    pub fn action(&self) -> &[TeardownAction] {
        &self.action
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeardownBuilder {
    base: BackboneBase,
    action: Vec<TeardownAction>,
    validating: Option<bool>,
}

impl From<Teardown> for TeardownBuilder {
    fn from(value: Teardown) -> Self {
        Self {
            base: value.base,
            action: value.action,
            validating: None,
        }
    }
}

impl TeardownBuilder {
    pub fn add_action(mut self, action: TeardownAction) -> Self {
        self.action.push(action);
        self
    }

    pub fn action(mut self, action: impl IntoIterator<Item = TeardownAction>) -> Self {
        self.action = action.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Teardown> {
        validation::finish(
            Teardown {
                base: self.base,
                action: self.action,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Teardown, TeardownBuilder);

impl Validate for Teardown {
    fn validate(&self) -> Result<()> {
        validation::require_non_empty(&self.action, "action")
    }
}

impl Visitable for Teardown {
    fn type_name(&self) -> &'static str {
        "TestScript.Teardown"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_list(&self.action, "action", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One or more teardown operations to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownAction {
    #[serde(flatten)]
    base: BackboneBase,

    /// The teardown operation to perform
    operation: Operation,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(TeardownAction { base, operation });

impl TeardownAction {
    pub fn builder() -> TeardownActionBuilder {
        TeardownActionBuilder::default()
    }

    pub fn to_builder(&self) -> TeardownActionBuilder {
        TeardownActionBuilder::from(self.clone())
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeardownActionBuilder {
    base: BackboneBase,
    operation: Option<Operation>,
    validating: Option<bool>,
}

impl From<TeardownAction> for TeardownActionBuilder {
    fn from(value: TeardownAction) -> Self {
        Self {
            base: value.base,
            operation: Some(value.operation),
            validating: None,
        }
    }
}

impl TeardownActionBuilder {
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<TeardownAction> {
        validation::finish(
            TeardownAction {
                base: self.base,
                operation: validation::require(self.operation, "operation")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(TeardownAction, TeardownActionBuilder);

impl Validate for TeardownAction {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Visitable for TeardownAction {
    fn type_name(&self) -> &'static str {
        "TestScript.Teardown.Action"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            Visitable::accept(&self.operation, "operation", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::r4::codes::TestScriptRequestMethodCode;

    fn delete_operation() -> Operation {
        Operation::builder()
            .resource("Patient")
            .method(TestScriptRequestMethodCode::Delete)
            .encode_request_url(true)
            .target_id("fixture-patient-create")
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_phases_are_rejected() {
        let err = Setup::builder().build().unwrap_err();
        assert!(matches!(err, Error::EmptyList(ref e) if e == "action"));

        let err = Test::builder().name("empty").build().unwrap_err();
        assert!(matches!(err, Error::EmptyList(_)));

        let err = Teardown::builder().build().unwrap_err();
        assert!(matches!(err, Error::EmptyList(_)));
    }

    #[test]
    fn test_empty_phase_allowed_when_not_validating() {
        let setup = Setup::builder().validating(false).build().unwrap();
        assert!(setup.action().is_empty());
    }

    #[test]
    fn test_teardown_action_requires_operation() {
        let err = TeardownAction::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "operation"));
    }

    #[test]
    fn test_empty_actions_are_rejected() {
        let err = SetupAction::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingValueOrChildren(ref t) if t == "TestScript.Setup.Action"));

        let err = TestAction::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingValueOrChildren(ref t) if t == "TestScript.Test.Action"));

        assert!(SetupAction::builder().validating(false).build().is_ok());
    }

    #[test]
    fn test_teardown_action_visits_its_operation() {
        #[derive(Default)]
        struct Names(Vec<String>);

        impl Visitor for Names {
            fn visit_start(&mut self, name: &str, _index: Option<usize>, element: &dyn Visitable) {
                if element.as_primitive().is_none() {
                    self.0.push(name.to_string());
                }
            }
        }

        let action = TeardownAction::builder()
            .operation(delete_operation())
            .build()
            .unwrap();
        let mut names = Names::default();
        action.accept("action", Some(0), &mut names);
        assert_eq!(names.0[..2], ["action".to_string(), "operation".to_string()]);
    }

    #[test]
    fn test_add_and_replace_actions() {
        let action = TeardownAction::builder()
            .operation(delete_operation())
            .build()
            .unwrap();

        let teardown = Teardown::builder()
            .add_action(action.clone())
            .add_action(action.clone())
            .build()
            .unwrap();
        assert_eq!(teardown.action().len(), 2);

        let replaced = teardown.to_builder().action([action]).build().unwrap();
        assert_eq!(replaced.action().len(), 1);
        assert_ne!(teardown, replaced);
    }

    #[test]
    fn test_action_may_hold_both_operation_and_assert() {
        let action = TestAction::builder()
            .operation(delete_operation())
            .assert(
                Assert::builder()
                    .response_code("204")
                    .warning_only(false)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert!(action.operation().is_some());
        assert!(action.assert().is_some());
    }
}
