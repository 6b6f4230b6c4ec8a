//! Coding and CodeableConcept

use crate::common::error::Result;
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{
    accept_composite, accept_list, accept_optional, Validate, Visitable, Visitor,
};
use crate::r4::element::{impl_element, ElementBase};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// A reference to a code defined by a terminology system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(flatten)]
    base: ElementBase,

    /// Identity of the terminology system
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Version of the system - if relevant
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,

    /// Symbol in syntax defined by the system
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,

    /// Representation defined by the system
    #[serde(skip_serializing_if = "Option::is_none")]
    display: Option<String>,

    /// If this coding was chosen directly by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    user_selected: Option<bool>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Coding { base, system, version, code, display, user_selected });

impl Coding {
    pub fn builder() -> CodingBuilder {
        CodingBuilder::default()
    }

    /// Shorthand for the common `system` + `code` pair.
    pub fn of(system: impl Into<String>, code: impl Into<String>) -> Result<Self> {
        Self::builder().system(system).code(code).build()
    }

    pub fn to_builder(&self) -> CodingBuilder {
        CodingBuilder::from(self.clone())
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn user_selected(&self) -> Option<bool> {
        self.user_selected
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodingBuilder {
    base: ElementBase,
    system: Option<String>,
    version: Option<String>,
    code: Option<String>,
    display: Option<String>,
    user_selected: Option<bool>,
    validating: Option<bool>,
}

impl From<Coding> for CodingBuilder {
    fn from(value: Coding) -> Self {
        Self {
            base: value.base,
            system: value.system,
            version: value.version,
            code: value.code,
            display: value.display,
            user_selected: value.user_selected,
            validating: None,
        }
    }
}

impl CodingBuilder {
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn user_selected(mut self, user_selected: bool) -> Self {
        self.user_selected = Some(user_selected);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Coding> {
        validation::finish(
            Coding {
                base: self.base,
                system: self.system,
                version: self.version,
                code: self.code,
                display: self.display,
                user_selected: self.user_selected,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Coding, CodingBuilder);

impl Validate for Coding {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.system.is_some()
                || self.version.is_some()
                || self.code.is_some()
                || self.display.is_some()
                || self.user_selected.is_some(),
            "Coding",
        )?;
        validation::check_uri(self.system.as_deref(), "system")?;
        validation::check_code(self.code.as_deref(), "code")?;
        Ok(())
    }
}

impl Visitable for Coding {
    fn type_name(&self) -> &'static str {
        "Coding"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.system, "system", v);
            accept_optional(&self.version, "version", v);
            accept_optional(&self.code, "code", v);
            accept_optional(&self.display, "display", v);
            accept_optional(&self.user_selected, "userSelected", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Concept - reference to a terminology or just text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(flatten)]
    base: ElementBase,

    /// Code defined by a terminology system
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    coding: Vec<Coding>,

    /// Plain text representation of the concept
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(CodeableConcept { base, coding, text });

impl CodeableConcept {
    pub fn builder() -> CodeableConceptBuilder {
        CodeableConceptBuilder::default()
    }

    /// Concept carrying only its text.
    pub fn text_only(text: impl Into<String>) -> Result<Self> {
        Self::builder().text(text).build()
    }

    pub fn to_builder(&self) -> CodeableConceptBuilder {
        CodeableConceptBuilder::from(self.clone())
    }

    pub fn coding(&self) -> &[Coding] {
        &self.coding
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl From<Coding> for CodeableConcept {
    fn from(coding: Coding) -> Self {
        Self {
            base: ElementBase::default(),
            coding: vec![coding],
            text: None,
            hash_cache: HashCache::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeableConceptBuilder {
    base: ElementBase,
    coding: Vec<Coding>,
    text: Option<String>,
    validating: Option<bool>,
}

impl From<CodeableConcept> for CodeableConceptBuilder {
    fn from(value: CodeableConcept) -> Self {
        Self {
            base: value.base,
            coding: value.coding,
            text: value.text,
            validating: None,
        }
    }
}

impl CodeableConceptBuilder {
    pub fn add_coding(mut self, coding: Coding) -> Self {
        self.coding.push(coding);
        self
    }

    pub fn coding(mut self, coding: impl IntoIterator<Item = Coding>) -> Self {
        self.coding = coding.into_iter().collect();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<CodeableConcept> {
        validation::finish(
            CodeableConcept {
                base: self.base,
                coding: self.coding,
                text: self.text,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(CodeableConcept, CodeableConceptBuilder);

impl Validate for CodeableConcept {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children() || !self.coding.is_empty() || self.text.is_some(),
            "CodeableConcept",
        )
    }
}

impl Visitable for CodeableConcept {
    fn type_name(&self) -> &'static str {
        "CodeableConcept"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_list(&self.coding, "coding", v);
            accept_optional(&self.text, "text", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
