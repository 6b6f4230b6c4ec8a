//! Resource metadata and conformance-resource datatypes

use super::{CodeableConcept, Coding, Period, Quantity, Range, Reference};
use crate::common::choice::{self, impl_choice};
use crate::common::error::{Error, Result};
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{
    accept_composite, accept_list, accept_optional, Validate, Visitable, Visitor,
};
use crate::r4::codes::{ContactPointSystem, ContactPointUse, NarrativeStatus};
use crate::r4::element::{impl_element, ElementBase};
use serde::{Deserialize, Serialize};
use std::any::Any;

// ============================================================================
// Meta
// ============================================================================

/// Metadata about a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(flatten)]
    base: ElementBase,

    /// Version specific identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    version_id: Option<String>,

    /// When the resource version last changed
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated: Option<String>,

    /// Identifies where the resource comes from
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,

    /// Profiles this resource claims to conform to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    profile: Vec<String>,

    /// Security Labels applied to this resource
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    security: Vec<Coding>,

    /// Tags applied to this resource
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tag: Vec<Coding>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Meta { base, version_id, last_updated, source, profile, security, tag });

impl Meta {
    pub fn builder() -> MetaBuilder {
        MetaBuilder::default()
    }

    pub fn to_builder(&self) -> MetaBuilder {
        MetaBuilder::from(self.clone())
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version_id.as_deref()
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn profile(&self) -> &[String] {
        &self.profile
    }

    pub fn security(&self) -> &[Coding] {
        &self.security
    }

    pub fn tag(&self) -> &[Coding] {
        &self.tag
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetaBuilder {
    base: ElementBase,
    version_id: Option<String>,
    last_updated: Option<String>,
    source: Option<String>,
    profile: Vec<String>,
    security: Vec<Coding>,
    tag: Vec<Coding>,
    validating: Option<bool>,
}

impl From<Meta> for MetaBuilder {
    fn from(value: Meta) -> Self {
        Self {
            base: value.base,
            version_id: value.version_id,
            last_updated: value.last_updated,
            source: value.source,
            profile: value.profile,
            security: value.security,
            tag: value.tag,
            validating: None,
        }
    }
}

impl MetaBuilder {
    pub fn version_id(mut self, version_id: impl Into<String>) -> Self {
        self.version_id = Some(version_id.into());
        self
    }

    pub fn last_updated(mut self, last_updated: impl Into<String>) -> Self {
        self.last_updated = Some(last_updated.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn add_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile.push(profile.into());
        self
    }

    pub fn profile<S: Into<String>>(mut self, profile: impl IntoIterator<Item = S>) -> Self {
        self.profile = profile.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_security(mut self, security: Coding) -> Self {
        self.security.push(security);
        self
    }

    pub fn security(mut self, security: impl IntoIterator<Item = Coding>) -> Self {
        self.security = security.into_iter().collect();
        self
    }

    pub fn add_tag(mut self, tag: Coding) -> Self {
        self.tag.push(tag);
        self
    }

    pub fn tag(mut self, tag: impl IntoIterator<Item = Coding>) -> Self {
        self.tag = tag.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Meta> {
        validation::finish(
            Meta {
                base: self.base,
                version_id: self.version_id,
                last_updated: self.last_updated,
                source: self.source,
                profile: self.profile,
                security: self.security,
                tag: self.tag,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Meta, MetaBuilder);

impl Validate for Meta {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.version_id.is_some()
                || self.last_updated.is_some()
                || self.source.is_some()
                || !self.profile.is_empty()
                || !self.security.is_empty()
                || !self.tag.is_empty(),
            "Meta",
        )?;
        validation::check_id(self.version_id.as_deref(), "versionId")?;
        validation::check_instant(self.last_updated.as_deref(), "lastUpdated")?;
        validation::check_uri(self.source.as_deref(), "source")?;
        for profile in &self.profile {
            validation::check_uri(Some(profile.as_str()), "profile")?;
        }
        Ok(())
    }
}

impl Visitable for Meta {
    fn type_name(&self) -> &'static str {
        "Meta"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.version_id, "versionId", v);
            accept_optional(&self.last_updated, "lastUpdated", v);
            accept_optional(&self.source, "source", v);
            accept_list(&self.profile, "profile", v);
            accept_list(&self.security, "security", v);
            accept_list(&self.tag, "tag", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Narrative
// ============================================================================

/// Human-readable summary of the resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    #[serde(flatten)]
    base: ElementBase,

    /// generated | extensions | additional | empty
    status: NarrativeStatus,

    /// Limited xhtml content
    div: String,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Narrative { base, status, div });

impl Narrative {
    pub fn builder() -> NarrativeBuilder {
        NarrativeBuilder::default()
    }

    pub fn to_builder(&self) -> NarrativeBuilder {
        NarrativeBuilder::from(self.clone())
    }

    pub fn status(&self) -> NarrativeStatus {
        self.status
    }

    pub fn div(&self) -> &str {
        &self.div
    }
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeBuilder {
    base: ElementBase,
    status: Option<NarrativeStatus>,
    div: Option<String>,
    validating: Option<bool>,
}

impl From<Narrative> for NarrativeBuilder {
    fn from(value: Narrative) -> Self {
        Self {
            base: value.base,
            status: Some(value.status),
            div: Some(value.div),
            validating: None,
        }
    }
}

impl NarrativeBuilder {
    pub fn status(mut self, status: NarrativeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn div(mut self, div: impl Into<String>) -> Self {
        self.div = Some(div.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Narrative> {
        validation::finish(
            Narrative {
                base: self.base,
                status: validation::require(self.status, "status")?,
                div: validation::require(self.div, "div")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Narrative, NarrativeBuilder);

impl Validate for Narrative {
    fn validate(&self) -> Result<()> {
        if !self.div.trim_start().starts_with("<div") {
            return Err(Error::InvalidPrimitive {
                element: "div".to_string(),
                kind: "xhtml",
                value: self.div.clone(),
                reason: "must be a single xhtml div element",
            });
        }
        Ok(())
    }
}

impl Visitable for Narrative {
    fn type_name(&self) -> &'static str {
        "Narrative"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.status.accept("status", None, v);
            self.div.accept("div", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// ContactPoint
// ============================================================================

/// Details of a technology mediated contact point (phone, fax, email, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    #[serde(flatten)]
    base: ElementBase,

    /// phone | fax | email | pager | url | sms | other
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<ContactPointSystem>,

    /// The actual contact point details
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,

    /// home | work | temp | old | mobile - purpose of this contact point
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    use_: Option<ContactPointUse>,

    /// Specify preferred order of use (1 = highest)
    #[serde(skip_serializing_if = "Option::is_none")]
    rank: Option<u32>,

    /// Time period when the contact point was/is in use
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<Period>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(ContactPoint { base, system, value, use_, rank, period });

impl ContactPoint {
    pub fn builder() -> ContactPointBuilder {
        ContactPointBuilder::default()
    }

    pub fn to_builder(&self) -> ContactPointBuilder {
        ContactPointBuilder::from(self.clone())
    }

    pub fn system(&self) -> Option<ContactPointSystem> {
        self.system
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn use_(&self) -> Option<ContactPointUse> {
        self.use_
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    pub fn period(&self) -> Option<&Period> {
        self.period.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactPointBuilder {
    base: ElementBase,
    system: Option<ContactPointSystem>,
    value: Option<String>,
    use_: Option<ContactPointUse>,
    rank: Option<u32>,
    period: Option<Period>,
    validating: Option<bool>,
}

impl From<ContactPoint> for ContactPointBuilder {
    fn from(value: ContactPoint) -> Self {
        Self {
            base: value.base,
            system: value.system,
            value: value.value,
            use_: value.use_,
            rank: value.rank,
            period: value.period,
            validating: None,
        }
    }
}

impl ContactPointBuilder {
    pub fn system(mut self, system: ContactPointSystem) -> Self {
        self.system = Some(system);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn use_(mut self, use_: ContactPointUse) -> Self {
        self.use_ = Some(use_);
        self
    }

    pub fn rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<ContactPoint> {
        validation::finish(
            ContactPoint {
                base: self.base,
                system: self.system,
                value: self.value,
                use_: self.use_,
                rank: self.rank,
                period: self.period,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(ContactPoint, ContactPointBuilder);

impl Validate for ContactPoint {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.system.is_some()
                || self.value.is_some()
                || self.use_.is_some()
                || self.rank.is_some()
                || self.period.is_some(),
            "ContactPoint",
        )?;
        if self.rank == Some(0) {
            return Err(Error::InvalidPrimitive {
                element: "rank".to_string(),
                kind: "positiveInt",
                value: "0".to_string(),
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

impl Visitable for ContactPoint {
    fn type_name(&self) -> &'static str {
        "ContactPoint"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.system, "system", v);
            accept_optional(&self.value, "value", v);
            accept_optional(&self.use_, "use", v);
            accept_optional(&self.rank, "rank", v);
            accept_optional(&self.period, "period", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// ContactDetail
// ============================================================================

/// Contact information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetail {
    #[serde(flatten)]
    base: ElementBase,

    /// Name of an individual to contact
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Contact details for individual or organization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    telecom: Vec<ContactPoint>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(ContactDetail { base, name, telecom });

impl ContactDetail {
    pub fn builder() -> ContactDetailBuilder {
        ContactDetailBuilder::default()
    }

    pub fn to_builder(&self) -> ContactDetailBuilder {
        ContactDetailBuilder::from(self.clone())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn telecom(&self) -> &[ContactPoint] {
        &self.telecom
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactDetailBuilder {
    base: ElementBase,
    name: Option<String>,
    telecom: Vec<ContactPoint>,
    validating: Option<bool>,
}

impl From<ContactDetail> for ContactDetailBuilder {
    fn from(value: ContactDetail) -> Self {
        Self {
            base: value.base,
            name: value.name,
            telecom: value.telecom,
            validating: None,
        }
    }
}

impl ContactDetailBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn add_telecom(mut self, telecom: ContactPoint) -> Self {
        self.telecom.push(telecom);
        self
    }

    pub fn telecom(mut self, telecom: impl IntoIterator<Item = ContactPoint>) -> Self {
        self.telecom = telecom.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<ContactDetail> {
        validation::finish(
            ContactDetail {
                base: self.base,
                name: self.name,
                telecom: self.telecom,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(ContactDetail, ContactDetailBuilder);

impl Validate for ContactDetail {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children() || self.name.is_some() || !self.telecom.is_empty(),
            "ContactDetail",
        )
    }
}

impl Visitable for ContactDetail {
    fn type_name(&self) -> &'static str {
        "ContactDetail"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.name, "name", v);
            accept_list(&self.telecom, "telecom", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// UsageContext
// ============================================================================

/// Describes the context of use for a conformance or knowledge resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageContext {
    #[serde(flatten)]
    base: ElementBase,

    /// Type of context being specified
    code: Coding,

    /// Value that defines the context
    #[serde(flatten, deserialize_with = "choice::required")]
    value: UsageContextValue,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(UsageContext { base, code, value });

/// `UsageContext.value[x]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageContextValue {
    #[serde(rename = "valueCodeableConcept")]
    CodeableConcept(CodeableConcept),
    #[serde(rename = "valueQuantity")]
    Quantity(Quantity),
    #[serde(rename = "valueRange")]
    Range(Range),
    #[serde(rename = "valueReference")]
    Reference(Reference),
}

impl_choice!(UsageContextValue, "value" {
    "valueCodeableConcept" => CodeableConcept,
    "valueQuantity" => Quantity,
    "valueRange" => Range,
    "valueReference" => Reference,
});

impl UsageContextValue {
    pub fn as_element(&self) -> &dyn Visitable {
        match self {
            UsageContextValue::CodeableConcept(v) => v,
            UsageContextValue::Quantity(v) => v,
            UsageContextValue::Range(v) => v,
            UsageContextValue::Reference(v) => v,
        }
    }
}

impl UsageContext {
    pub const VALUE_REFERENCE_TARGETS: &'static [&'static str] = &[
        "PlanDefinition",
        "ResearchStudy",
        "InsurancePlan",
        "HealthcareService",
        "Group",
        "Location",
        "Organization",
    ];

    pub fn builder() -> UsageContextBuilder {
        UsageContextBuilder::default()
    }

    pub fn to_builder(&self) -> UsageContextBuilder {
        UsageContextBuilder::from(self.clone())
    }

    pub fn code(&self) -> &Coding {
        &self.code
    }

    pub fn value(&self) -> &UsageContextValue {
        &self.value
    }
}

#[derive(Debug, Clone, Default)]
pub struct UsageContextBuilder {
    base: ElementBase,
    code: Option<Coding>,
    value: Option<UsageContextValue>,
    validating: Option<bool>,
}

impl From<UsageContext> for UsageContextBuilder {
    fn from(value: UsageContext) -> Self {
        Self {
            base: value.base,
            code: Some(value.code),
            value: Some(value.value),
            validating: None,
        }
    }
}

impl UsageContextBuilder {
    pub fn code(mut self, code: Coding) -> Self {
        self.code = Some(code);
        self
    }

    pub fn value(mut self, value: UsageContextValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn value_codeable_concept(self, value: CodeableConcept) -> Self {
        self.value(UsageContextValue::CodeableConcept(value))
    }

    pub fn value_quantity(self, value: Quantity) -> Self {
        self.value(UsageContextValue::Quantity(value))
    }

    pub fn value_range(self, value: Range) -> Self {
        self.value(UsageContextValue::Range(value))
    }

    pub fn value_reference(self, value: Reference) -> Self {
        self.value(UsageContextValue::Reference(value))
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<UsageContext> {
        validation::finish(
            UsageContext {
                base: self.base,
                code: validation::require(self.code, "code")?,
                value: validation::require(self.value, "value")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(UsageContext, UsageContextBuilder);

impl Validate for UsageContext {
    fn validate(&self) -> Result<()> {
        if let UsageContextValue::Reference(reference) = &self.value {
            validation::check_reference_type(
                Some(reference),
                "valueReference",
                Self::VALUE_REFERENCE_TARGETS,
            )?;
        }
        Ok(())
    }
}

impl Visitable for UsageContext {
    fn type_name(&self) -> &'static str {
        "UsageContext"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.code.accept("code", None, v);
            self.value.as_element().accept("value", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrative_required_fields() {
        let err = Narrative::builder().div("<div>x</div>").build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "status"));

        let err = Narrative::builder()
            .status(NarrativeStatus::Generated)
            .div("plain text")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPrimitive { kind: "xhtml", .. }));
    }

    #[test]
    fn test_usage_context_reference_targets() {
        let code = Coding::of("http://terminology.hl7.org/CodeSystem/usage-context-type", "venue")
            .unwrap();
        let ok = UsageContext::builder()
            .code(code.clone())
            .value_reference(Reference::to("Location/lab-1").unwrap())
            .build();
        assert!(ok.is_ok());

        let err = UsageContext::builder()
            .code(code)
            .value_reference(Reference::to("Patient/1").unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidReferenceType { ref element, .. } if element == "valueReference"));
    }

    #[test]
    fn test_usage_context_json() {
        let context: UsageContext = serde_json::from_value(serde_json::json!({
            "code": {"system": "http://terminology.hl7.org/CodeSystem/usage-context-type", "code": "focus"},
            "valueCodeableConcept": {"text": "hematology"}
        }))
        .unwrap();
        assert!(matches!(context.value(), UsageContextValue::CodeableConcept(c) if c.text() == Some("hematology")));
    }

    #[test]
    fn test_contact_point_rank_positive() {
        assert!(ContactPoint::builder().rank(0).build().is_err());
        let contact = ContactDetail::builder()
            .name("Lab support")
            .add_telecom(
                ContactPoint::builder()
                    .system(ContactPointSystem::Email)
                    .value("lab@example.org")
                    .rank(1)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(contact.telecom().len(), 1);
    }

    #[test]
    fn test_meta_profiles() {
        let meta = Meta::builder()
            .add_profile("http://example.org/a")
            .profile(["http://example.org/b"])
            .build()
            .unwrap();
        assert_eq!(meta.profile(), &["http://example.org/b".to_string()]);
    }
}
