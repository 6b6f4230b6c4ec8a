//! Reference, Identifier and Period

use super::CodeableConcept;
use crate::common::error::Result;
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{accept_composite, accept_optional, Validate, Visitable, Visitor};
use crate::r4::codes::IdentifierUse;
use crate::r4::element::{impl_element, ElementBase};
use serde::{Deserialize, Serialize};
use std::any::Any;

// ============================================================================
// Reference
// ============================================================================

/// A reference from one resource to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(flatten)]
    base: ElementBase,

    /// Literal reference, relative, internal or absolute URL
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,

    /// Type the reference refers to (e.g. "Patient")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_: Option<String>,

    /// Logical reference, when literal reference is not known
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<Identifier>,

    /// Text alternative for the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    display: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Reference { base, reference, type_, identifier, display });

impl Reference {
    pub fn builder() -> ReferenceBuilder {
        ReferenceBuilder::default()
    }

    /// Shorthand for a literal reference such as `Substance/glucose`.
    pub fn to(reference: impl Into<String>) -> Result<Self> {
        Self::builder().reference(reference).build()
    }

    pub fn to_builder(&self) -> ReferenceBuilder {
        ReferenceBuilder::from(self.clone())
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn type_(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceBuilder {
    base: ElementBase,
    reference: Option<String>,
    type_: Option<String>,
    identifier: Option<Identifier>,
    display: Option<String>,
    validating: Option<bool>,
}

impl From<Reference> for ReferenceBuilder {
    fn from(value: Reference) -> Self {
        Self {
            base: value.base,
            reference: value.reference,
            type_: value.type_,
            identifier: value.identifier,
            display: value.display,
            validating: None,
        }
    }
}

impl ReferenceBuilder {
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn type_(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Reference> {
        validation::finish(
            Reference {
                base: self.base,
                reference: self.reference,
                type_: self.type_,
                identifier: self.identifier,
                display: self.display,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Reference, ReferenceBuilder);

impl Validate for Reference {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.reference.is_some()
                || self.type_.is_some()
                || self.identifier.is_some()
                || self.display.is_some(),
            "Reference",
        )?;
        validation::check_uri(self.type_.as_deref(), "type")?;
        Ok(())
    }
}

impl Visitable for Reference {
    fn type_name(&self) -> &'static str {
        "Reference"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.reference, "reference", v);
            accept_optional(&self.type_, "type", v);
            accept_optional(&self.identifier, "identifier", v);
            accept_optional(&self.display, "display", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Identifier
// ============================================================================

/// An identifier intended for computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(flatten)]
    base: ElementBase,

    /// usual | official | temp | secondary | old
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    use_: Option<IdentifierUse>,

    /// Description of identifier
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_: Option<CodeableConcept>,

    /// The namespace for the identifier value
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// The value that is unique
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,

    /// Time period when id is/was valid for use
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<Period>,

    /// Organization that issued id (may be just text)
    #[serde(skip_serializing_if = "Option::is_none")]
    assigner: Option<Box<Reference>>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Identifier { base, use_, type_, system, value, period, assigner });

impl Identifier {
    pub fn builder() -> IdentifierBuilder {
        IdentifierBuilder::default()
    }

    pub fn to_builder(&self) -> IdentifierBuilder {
        IdentifierBuilder::from(self.clone())
    }

    pub fn use_(&self) -> Option<IdentifierUse> {
        self.use_
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }

    pub fn assigner(&self) -> Option<&Reference> {
        self.assigner.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdentifierBuilder {
    base: ElementBase,
    use_: Option<IdentifierUse>,
    type_: Option<CodeableConcept>,
    system: Option<String>,
    value: Option<String>,
    period: Option<Period>,
    assigner: Option<Box<Reference>>,
    validating: Option<bool>,
}

impl From<Identifier> for IdentifierBuilder {
    fn from(value: Identifier) -> Self {
        Self {
            base: value.base,
            use_: value.use_,
            type_: value.type_,
            system: value.system,
            value: value.value,
            period: value.period,
            assigner: value.assigner,
            validating: None,
        }
    }
}

impl IdentifierBuilder {
    pub fn use_(mut self, use_: IdentifierUse) -> Self {
        self.use_ = Some(use_);
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn assigner(mut self, assigner: Reference) -> Self {
        self.assigner = Some(Box::new(assigner));
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Identifier> {
        validation::finish(
            Identifier {
                base: self.base,
                use_: self.use_,
                type_: self.type_,
                system: self.system,
                value: self.value,
                period: self.period,
                assigner: self.assigner,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Identifier, IdentifierBuilder);

impl Validate for Identifier {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.use_.is_some()
                || self.type_.is_some()
                || self.system.is_some()
                || self.value.is_some()
                || self.period.is_some()
                || self.assigner.is_some(),
            "Identifier",
        )?;
        validation::check_uri(self.system.as_deref(), "system")?;
        validation::check_reference_type(self.assigner.as_deref(), "assigner", &["Organization"])?;
        Ok(())
    }
}

impl Visitable for Identifier {
    fn type_name(&self) -> &'static str {
        "Identifier"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.use_, "use", v);
            accept_optional(&self.type_, "type", v);
            accept_optional(&self.system, "system", v);
            accept_optional(&self.value, "value", v);
            accept_optional(&self.period, "period", v);
            if let Some(assigner) = &self.assigner {
                assigner.accept("assigner", None, v);
            }
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Period
// ============================================================================

/// Time range defined by start and end date/time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(flatten)]
    base: ElementBase,

    /// Starting time with inclusive boundary
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<String>,

    /// End time with inclusive boundary, if not ongoing
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Period { base, start, end });

impl Period {
    pub fn builder() -> PeriodBuilder {
        PeriodBuilder::default()
    }

    pub fn to_builder(&self) -> PeriodBuilder {
        PeriodBuilder::from(self.clone())
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PeriodBuilder {
    base: ElementBase,
    start: Option<String>,
    end: Option<String>,
    validating: Option<bool>,
}

impl From<Period> for PeriodBuilder {
    fn from(value: Period) -> Self {
        Self {
            base: value.base,
            start: value.start,
            end: value.end,
            validating: None,
        }
    }
}

impl PeriodBuilder {
    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Period> {
        validation::finish(
            Period {
                base: self.base,
                start: self.start,
                end: self.end,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Period, PeriodBuilder);

impl Validate for Period {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children() || self.start.is_some() || self.end.is_some(),
            "Period",
        )?;
        validation::check_date_time(self.start.as_deref(), "start")?;
        validation::check_date_time(self.end.as_deref(), "end")
    }
}

impl Visitable for Period {
    fn type_name(&self) -> &'static str {
        "Period"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.start, "start", v);
            accept_optional(&self.end, "end", v);
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

    #[test]
    fn test_reference_serializes_type_keyword() {
        let reference = Reference::builder()
            .reference("Organization/hl7")
            .type_("Organization")
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&reference).unwrap(),
            serde_json::json!({"reference": "Organization/hl7", "type": "Organization"})
        );
    }

    #[test]
    fn test_empty_reference_fails_ele1() {
        let err = Reference::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingValueOrChildren(ref t) if t == "Reference"));
        assert!(Reference::builder().validating(false).build().is_ok());
    }

    #[test]
    fn test_identifier_assigner_must_be_organization() {
        let err = Identifier::builder()
            .value("123")
            .assigner(Reference::to("Patient/1").unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidReferenceType { ref element, ref found, .. }
                if element == "assigner" && found == "Patient"
        ));

        let ok = Identifier::builder()
            .value("123")
            .assigner(Reference::to("Organization/acme").unwrap())
            .build()
            .unwrap();
        assert_eq!(ok.assigner().and_then(Reference::reference), Some("Organization/acme"));
    }

    #[test]
    fn test_identifier_json() {
        let identifier: Identifier = serde_json::from_value(serde_json::json!({
            "use": "official",
            "system": "urn:ietf:rfc:3986",
            "value": "urn:oid:1.3.6.1.4.1.21367.2005.3.7.9878"
        }))
        .unwrap();
        assert_eq!(identifier.use_(), Some(IdentifierUse::Official));
        assert_eq!(identifier.value(), Some("urn:oid:1.3.6.1.4.1.21367.2005.3.7.9878"));
    }

    #[test]
    fn test_period_round_trip() {
        let period = Period::builder().start("2024-01-01").end("2024-12-31").build().unwrap();
        assert_eq!(period.to_builder().build().unwrap(), period);
    }
}
