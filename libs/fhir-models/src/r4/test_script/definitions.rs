//! Server descriptors, metadata, fixtures and variables of a TestScript

use crate::common::error::Result;
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{
    accept_composite, accept_list, accept_optional, Validate, Visitable, Visitor,
};
use crate::r4::datatypes::{Coding, Reference};
use crate::r4::element::{impl_backbone_element, BackboneBase};
use serde::{Deserialize, Serialize};
use std::any::Any;

// ============================================================================
// Origin / Destination
// ============================================================================

/// An abstract server representing a client or sender in a message exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    #[serde(flatten)]
    base: BackboneBase,

    /// The index of the abstract origin server starting at 1
    index: i32,

    /// FHIR-Client | FHIR-SDC-FormFiller
    profile: Coding,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Origin { base, index, profile });

impl Origin {
    pub fn builder() -> OriginBuilder {
        OriginBuilder::default()
    }

    pub fn to_builder(&self) -> OriginBuilder {
        OriginBuilder::from(self.clone())
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn profile(&self) -> &Coding {
        &self.profile
    }
}

#[derive(Debug, Clone, Default)]
pub struct OriginBuilder {
    base: BackboneBase,
    index: Option<i32>,
    profile: Option<Coding>,
    validating: Option<bool>,
}

impl From<Origin> for OriginBuilder {
    fn from(value: Origin) -> Self {
        Self {
            base: value.base,
            index: Some(value.index),
            profile: Some(value.profile),
            validating: None,
        }
    }
}

impl OriginBuilder {
    pub fn index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn profile(mut self, profile: Coding) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Origin> {
        validation::finish(
            Origin {
                base: self.base,
                index: validation::require(self.index, "index")?,
                profile: validation::require(self.profile, "profile")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Origin, OriginBuilder);

impl Validate for Origin {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Visitable for Origin {
    fn type_name(&self) -> &'static str {
        "TestScript.Origin"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.index.accept("index", None, v);
            self.profile.accept("profile", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An abstract server representing a destination or receiver in a message
/// exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(flatten)]
    base: BackboneBase,

    /// The index of the abstract destination server starting at 1
    index: i32,

    /// FHIR-Server | FHIR-SDC-FormManager | FHIR-SDC-FormReceiver | FHIR-SDC-FormProcessor
    profile: Coding,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Destination { base, index, profile });

impl Destination {
    pub fn builder() -> DestinationBuilder {
        DestinationBuilder::default()
    }

    pub fn to_builder(&self) -> DestinationBuilder {
        DestinationBuilder::from(self.clone())
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn profile(&self) -> &Coding {
        &self.profile
    }
}

#[derive(Debug, Clone, Default)]
pub struct DestinationBuilder {
    base: BackboneBase,
    index: Option<i32>,
    profile: Option<Coding>,
    validating: Option<bool>,
}

impl From<Destination> for DestinationBuilder {
    fn from(value: Destination) -> Self {
        Self {
            base: value.base,
            index: Some(value.index),
            profile: Some(value.profile),
            validating: None,
        }
    }
}

impl DestinationBuilder {
    pub fn index(mut self, index: i32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn profile(mut self, profile: Coding) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Destination> {
        validation::finish(
            Destination {
                base: self.base,
                index: validation::require(self.index, "index")?,
                profile: validation::require(self.profile, "profile")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Destination, DestinationBuilder);

impl Validate for Destination {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Visitable for Destination {
    fn type_name(&self) -> &'static str {
        "TestScript.Destination"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.index.accept("index", None, v);
            self.profile.accept("profile", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Required capability that is assumed to function correctly on the FHIR
/// server being tested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(flatten)]
    base: BackboneBase,

    /// Links to the FHIR specification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    link: Vec<Link>,

    /// Capabilities that are assumed to function correctly on the FHIR server
    /// being tested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    capability: Vec<Capability>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Metadata { base, link, capability });

impl Metadata {
    pub fn builder() -> MetadataBuilder {
        MetadataBuilder::default()
    }

    pub fn to_builder(&self) -> MetadataBuilder {
        MetadataBuilder::from(self.clone())
    }

    pub fn link(&self) -> &[Link] {
        &self.link
    }

    pub fn capability(&self) -> &[Capability] {
        &self.capability
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    base: BackboneBase,
    link: Vec<Link>,
    capability: Vec<Capability>,
    validating: Option<bool>,
}

impl From<Metadata> for MetadataBuilder {
    fn from(value: Metadata) -> Self {
        Self {
            base: value.base,
            link: value.link,
            capability: value.capability,
            validating: None,
        }
    }
}

impl MetadataBuilder {
    pub fn add_link(mut self, link: Link) -> Self {
        self.link.push(link);
        self
    }

    pub fn link(mut self, link: impl IntoIterator<Item = Link>) -> Self {
        self.link = link.into_iter().collect();
        self
    }

    pub fn add_capability(mut self, capability: Capability) -> Self {
        self.capability.push(capability);
        self
    }

    pub fn capability(mut self, capability: impl IntoIterator<Item = Capability>) -> Self {
        self.capability = capability.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Metadata> {
        validation::finish(
            Metadata {
                base: self.base,
                link: self.link,
                capability: self.capability,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Metadata, MetadataBuilder);

impl Validate for Metadata {
    fn validate(&self) -> Result<()> {
        validation::require_non_empty(&self.capability, "capability")
    }
}

impl Visitable for Metadata {
    fn type_name(&self) -> &'static str {
        "TestScript.Metadata"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_list(&self.link, "link", v);
            accept_list(&self.capability, "capability", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Link to the FHIR specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(flatten)]
    base: BackboneBase,

    /// URL to the specification
    url: String,

    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Link { base, url, description });

impl Link {
    pub fn builder() -> LinkBuilder {
        LinkBuilder::default()
    }

    pub fn to_builder(&self) -> LinkBuilder {
        LinkBuilder::from(self.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base: BackboneBase,
    url: Option<String>,
    description: Option<String>,
    validating: Option<bool>,
}

impl From<Link> for LinkBuilder {
    fn from(value: Link) -> Self {
        Self {
            base: value.base,
            url: Some(value.url),
            description: value.description,
            validating: None,
        }
    }
}

impl LinkBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Link> {
        validation::finish(
            Link {
                base: self.base,
                url: validation::require(self.url, "url")?,
                description: self.description,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Link, LinkBuilder);

impl Validate for Link {
    fn validate(&self) -> Result<()> {
        validation::check_uri(Some(self.url.as_str()), "url")
    }
}

impl Visitable for Link {
    fn type_name(&self) -> &'static str {
        "TestScript.Metadata.Link"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.url.accept("url", None, v);
            accept_optional(&self.description, "description", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Capabilities that are assumed to function correctly on the FHIR server
/// being tested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[serde(flatten)]
    base: BackboneBase,

    /// Are the capabilities required?
    required: bool,

    /// Are the capabilities validated?
    validated: bool,

    /// The expected capabilities of the server
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// Which origin server these requirements apply to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    origin: Vec<i32>,

    /// Which server these requirements apply to
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<i32>,

    /// Links to the FHIR specification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    link: Vec<String>,

    /// Required Capability Statement
    capabilities: String,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Capability {
    base,
    required,
    validated,
    description,
    origin,
    destination,
    link,
    capabilities,
});

impl Capability {
    pub fn builder() -> CapabilityBuilder {
        CapabilityBuilder::default()
    }

    pub fn to_builder(&self) -> CapabilityBuilder {
        CapabilityBuilder::from(self.clone())
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn validated(&self) -> bool {
        self.validated
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn origin(&self) -> &[i32] {
        &self.origin
    }

    pub fn destination(&self) -> Option<i32> {
        self.destination
    }

    pub fn link(&self) -> &[String] {
        &self.link
    }

    pub fn capabilities(&self) -> &str {
        &self.capabilities
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityBuilder {
    base: BackboneBase,
    required: Option<bool>,
    validated: Option<bool>,
    description: Option<String>,
    origin: Vec<i32>,
    destination: Option<i32>,
    link: Vec<String>,
    capabilities: Option<String>,
    validating: Option<bool>,
}

impl From<Capability> for CapabilityBuilder {
    fn from(value: Capability) -> Self {
        Self {
            base: value.base,
            required: Some(value.required),
            validated: Some(value.validated),
            description: value.description,
            origin: value.origin,
            destination: value.destination,
            link: value.link,
            capabilities: Some(value.capabilities),
            validating: None,
        }
    }
}

impl CapabilityBuilder {
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn validated(mut self, validated: bool) -> Self {
        self.validated = Some(validated);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_origin(mut self, origin: i32) -> Self {
        self.origin.push(origin);
        self
    }

    pub fn origin(mut self, origin: impl IntoIterator<Item = i32>) -> Self {
        self.origin = origin.into_iter().collect();
        self
    }

    pub fn destination(mut self, destination: i32) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn add_link(mut self, link: impl Into<String>) -> Self {
        self.link.push(link.into());
        self
    }

    pub fn link<S: Into<String>>(mut self, link: impl IntoIterator<Item = S>) -> Self {
        self.link = link.into_iter().map(Into::into).collect();
        self
    }

    pub fn capabilities(mut self, capabilities: impl Into<String>) -> Self {
        self.capabilities = Some(capabilities.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Capability> {
        validation::finish(
            Capability {
                base: self.base,
                required: validation::require(self.required, "required")?,
                validated: validation::require(self.validated, "validated")?,
                description: self.description,
                origin: self.origin,
                destination: self.destination,
                link: self.link,
                capabilities: validation::require(self.capabilities, "capabilities")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Capability, CapabilityBuilder);

impl Validate for Capability {
    fn validate(&self) -> Result<()> {
        for link in &self.link {
            validation::check_uri(Some(link.as_str()), "link")?;
        }
        validation::check_uri(Some(self.capabilities.as_str()), "capabilities")
    }
}

impl Visitable for Capability {
    fn type_name(&self) -> &'static str {
        "TestScript.Metadata.Capability"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.required.accept("required", None, v);
            self.validated.accept("validated", None, v);
            accept_optional(&self.description, "description", v);
            accept_list(&self.origin, "origin", v);
            accept_optional(&self.destination, "destination", v);
            accept_list(&self.link, "link", v);
            self.capabilities.accept("capabilities", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Fixture
// ============================================================================

/// Fixture in the test script, by reference (uri)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(flatten)]
    base: BackboneBase,

    /// Whether or not to implicitly create the fixture during setup
    autocreate: bool,

    /// Whether or not to implicitly delete the fixture during teardown
    autodelete: bool,

    /// Reference of the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<Reference>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Fixture { base, autocreate, autodelete, resource });

impl Fixture {
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::default()
    }

    pub fn to_builder(&self) -> FixtureBuilder {
        FixtureBuilder::from(self.clone())
    }

    pub fn autocreate(&self) -> bool {
        self.autocreate
    }

    pub fn autodelete(&self) -> bool {
        self.autodelete
    }

    pub fn resource(&self) -> Option<&Reference> {
        self.resource.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixtureBuilder {
    base: BackboneBase,
    autocreate: Option<bool>,
    autodelete: Option<bool>,
    resource: Option<Reference>,
    validating: Option<bool>,
}

impl From<Fixture> for FixtureBuilder {
    fn from(value: Fixture) -> Self {
        Self {
            base: value.base,
            autocreate: Some(value.autocreate),
            autodelete: Some(value.autodelete),
            resource: value.resource,
            validating: None,
        }
    }
}

impl FixtureBuilder {
    pub fn autocreate(mut self, autocreate: bool) -> Self {
        self.autocreate = Some(autocreate);
        self
    }

    pub fn autodelete(mut self, autodelete: bool) -> Self {
        self.autodelete = Some(autodelete);
        self
    }

    pub fn resource(mut self, resource: Reference) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Fixture> {
        validation::finish(
            Fixture {
                base: self.base,
                autocreate: validation::require(self.autocreate, "autocreate")?,
                autodelete: validation::require(self.autodelete, "autodelete")?,
                resource: self.resource,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Fixture, FixtureBuilder);

impl Validate for Fixture {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Visitable for Fixture {
    fn type_name(&self) -> &'static str {
        "TestScript.Fixture"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.autocreate.accept("autocreate", None, v);
            self.autodelete.accept("autodelete", None, v);
            accept_optional(&self.resource, "resource", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Variable
// ============================================================================

/// Placeholder for evaluated elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(flatten)]
    base: BackboneBase,

    /// Descriptive name for this variable
    name: String,

    /// Default, hard-coded, or user-defined value for this variable
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,

    /// Natural language description of the variable
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// The FHIRPath expression against the fixture body
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<String>,

    /// HTTP header field name for source
    #[serde(skip_serializing_if = "Option::is_none")]
    header_field: Option<String>,

    /// Hint help text for default value to enter
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,

    /// XPath or JSONPath against the fixture body
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,

    /// Fixture Id of source expression or headerField within this variable
    #[serde(skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Variable {
    base,
    name,
    default_value,
    description,
    expression,
    header_field,
    hint,
    path,
    source_id,
});

impl Variable {
    pub fn builder() -> VariableBuilder {
        VariableBuilder::default()
    }

    pub fn to_builder(&self) -> VariableBuilder {
        VariableBuilder::from(self.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn header_field(&self) -> Option<&str> {
        self.header_field.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariableBuilder {
    base: BackboneBase,
    name: Option<String>,
    default_value: Option<String>,
    description: Option<String>,
    expression: Option<String>,
    header_field: Option<String>,
    hint: Option<String>,
    path: Option<String>,
    source_id: Option<String>,
    validating: Option<bool>,
}

impl From<Variable> for VariableBuilder {
    fn from(value: Variable) -> Self {
        Self {
            base: value.base,
            name: Some(value.name),
            default_value: value.default_value,
            description: value.description,
            expression: value.expression,
            header_field: value.header_field,
            hint: value.hint,
            path: value.path,
            source_id: value.source_id,
            validating: None,
        }
    }
}

impl VariableBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn header_field(mut self, header_field: impl Into<String>) -> Self {
        self.header_field = Some(header_field.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Variable> {
        validation::finish(
            Variable {
                base: self.base,
                name: validation::require(self.name, "name")?,
                default_value: self.default_value,
                description: self.description,
                expression: self.expression,
                header_field: self.header_field,
                hint: self.hint,
                path: self.path,
                source_id: self.source_id,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Variable, VariableBuilder);

impl Validate for Variable {
    fn validate(&self) -> Result<()> {
        validation::check_id(self.source_id.as_deref(), "sourceId")
    }
}

impl Visitable for Variable {
    fn type_name(&self) -> &'static str {
        "TestScript.Variable"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.name.accept("name", None, v);
            accept_optional(&self.default_value, "defaultValue", v);
            accept_optional(&self.description, "description", v);
            accept_optional(&self.expression, "expression", v);
            accept_optional(&self.header_field, "headerField", v);
            accept_optional(&self.hint, "hint", v);
            accept_optional(&self.path, "path", v);
            accept_optional(&self.source_id, "sourceId", v);
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

    fn client_profile() -> Coding {
        Coding::of("http://terminology.hl7.org/CodeSystem/testscript-profile-origin-types", "FHIR-Client")
            .unwrap()
    }

    #[test]
    fn test_origin_requires_index_and_profile() {
        let err = Origin::builder().profile(client_profile()).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "index"));
        let err = Origin::builder().index(1).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "profile"));

        let origin = Origin::builder().index(1).profile(client_profile()).build().unwrap();
        assert_eq!(origin.index(), 1);
    }

    #[test]
    fn test_metadata_requires_capability() {
        let err = Metadata::builder().build().unwrap_err();
        assert!(matches!(err, Error::EmptyList(ref e) if e == "capability"));

        let unchecked = Metadata::builder().validating(false).build().unwrap();
        assert!(unchecked.capability().is_empty());
    }

    #[test]
    fn test_capability_json() {
        let capability: Capability = serde_json::from_value(serde_json::json!({
            "required": true,
            "validated": false,
            "origin": [1],
            "destination": 1,
            "link": ["http://hl7.org/fhir/patient.html#create"],
            "capabilities": "CapabilityStatement/example"
        }))
        .unwrap();
        assert!(capability.required());
        assert_eq!(capability.origin(), &[1]);
        assert_eq!(capability.destination(), Some(1));
        assert_eq!(capability.to_builder().build().unwrap(), capability);
    }

    #[test]
    fn test_fixture_requires_flags() {
        let err = Fixture::builder().autocreate(false).build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "autodelete"));
    }

    #[test]
    fn test_variable_source_id_pattern() {
        let err = Variable::builder()
            .name("createResourceId")
            .source_id("not valid!")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPrimitive { kind: "id", .. }));
    }
}
