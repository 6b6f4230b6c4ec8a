//! TestScript: a structured set of tests against a FHIR server or client
//! implementation

mod definitions;
mod operation;
mod phases;

pub use definitions::{
    Capability, CapabilityBuilder, Destination, DestinationBuilder, Fixture, FixtureBuilder,
    Link, LinkBuilder, Metadata, MetadataBuilder, Origin, OriginBuilder, Variable,
    VariableBuilder,
};
pub use operation::{
    Assert, AssertBuilder, Operation, OperationBuilder, RequestHeader, RequestHeaderBuilder,
};
pub use phases::{
    Setup, SetupAction, SetupActionBuilder, SetupBuilder, Teardown, TeardownAction,
    TeardownActionBuilder, TeardownBuilder, Test, TestAction, TestActionBuilder, TestBuilder,
};

use super::codes::PublicationStatus;
use super::datatypes::{CodeableConcept, ContactDetail, Identifier, Reference, UsageContext};
use super::element::{impl_domain_resource, DomainResourceBase};
use super::resource::{tagged_value, Resource};
use crate::common::error::{Error, Result};
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{
    accept_composite, accept_list, accept_optional, Validate, Visitable, Visitor,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;

/// Describes a set of tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestScript {
    #[serde(flatten)]
    base: DomainResourceBase,

    /// Canonical identifier for this test script, represented as a URI
    /// (globally unique)
    url: String,

    /// Additional identifier for the test script
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<Identifier>,

    /// Business version of the test script
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,

    /// Name for this test script (computer friendly)
    name: String,

    /// Name for this test script (human friendly)
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    /// draft | active | retired | unknown
    status: PublicationStatus,

    /// For testing purposes, not real usage
    #[serde(skip_serializing_if = "Option::is_none")]
    experimental: Option<bool>,

    /// Date last changed
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,

    /// Name of the publisher (organization or individual)
    #[serde(skip_serializing_if = "Option::is_none")]
    publisher: Option<String>,

    /// Contact details for the publisher
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    contact: Vec<ContactDetail>,

    /// Natural language description of the test script
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// The context that the content is intended to support
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    use_context: Vec<UsageContext>,

    /// Intended jurisdiction for test script (if applicable)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    jurisdiction: Vec<CodeableConcept>,

    /// Why this test script is defined
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,

    /// Use and/or publishing restrictions
    #[serde(skip_serializing_if = "Option::is_none")]
    copyright: Option<String>,

    /// An abstract server representing a client or sender in a message
    /// exchange
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    origin: Vec<Origin>,

    /// An abstract server representing a destination or receiver in a
    /// message exchange
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    destination: Vec<Destination>,

    /// Required capability that is assumed to function correctly on the FHIR
    /// server being tested
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,

    /// Fixture in the test script - by reference (uri)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fixture: Vec<Fixture>,

    /// Reference of the validation profile
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    profile: Vec<Reference>,

    /// Placeholder for evaluated elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    variable: Vec<Variable>,

    /// A series of required setup operations before tests are executed
    #[serde(skip_serializing_if = "Option::is_none")]
    setup: Option<Setup>,

    /// A test in this script
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    test: Vec<Test>,

    /// A series of required clean up steps
    #[serde(skip_serializing_if = "Option::is_none")]
    teardown: Option<Teardown>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(TestScript {
    base,
    url,
    identifier,
    version,
    name,
    title,
    status,
    experimental,
    date,
    publisher,
    contact,
    description,
    use_context,
    jurisdiction,
    purpose,
    copyright,
    origin,
    destination,
    metadata,
    fixture,
    profile,
    variable,
    setup,
    test,
    teardown,
});

impl TestScript {
    pub fn builder() -> TestScriptBuilder {
        TestScriptBuilder::default()
    }

    pub fn to_builder(&self) -> TestScriptBuilder {
        TestScriptBuilder::from(self.clone())
    }

    /// Parse from JSON; fails if `resourceType` names another resource.
    pub fn from_value(value: Value) -> Result<Self> {
        match Resource::from_value(value)? {
            Resource::TestScript(r) => Ok(r),
            other => Err(Error::InvalidResource(format!(
                "expected TestScript, found {}",
                other.resource_type()
            ))),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        tagged_value("TestScript", self)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn status(&self) -> PublicationStatus {
        self.status
    }

    pub fn experimental(&self) -> Option<bool> {
        self.experimental
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn publisher(&self) -> Option<&str> {
        self.publisher.as_deref()
    }

    pub fn contact(&self) -> &[ContactDetail] {
        &self.contact
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn use_context(&self) -> &[UsageContext] {
        &self.use_context
    }

    pub fn jurisdiction(&self) -> &[CodeableConcept] {
        &self.jurisdiction
    }

    pub fn purpose(&self) -> Option<&str> {
        self.purpose.as_deref()
    }

    pub fn copyright(&self) -> Option<&str> {
        self.copyright.as_deref()
    }

    pub fn origin(&self) -> &[Origin] {
        &self.origin
    }

    pub fn destination(&self) -> &[Destination] {
        &self.destination
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn fixture(&self) -> &[Fixture] {
        &self.fixture
    }

    pub fn profile(&self) -> &[Reference] {
        &self.profile
    }

    pub fn variable(&self) -> &[Variable] {
        &self.variable
    }

    pub fn setup(&self) -> Option<&Setup> {
        self.setup.as_ref()
    }

    pub fn test(&self) -> &[Test] {
        &self.test
    }

    pub fn teardown(&self) -> Option<&Teardown> {
        self.teardown.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestScriptBuilder {
    base: DomainResourceBase,
    url: Option<String>,
    identifier: Option<Identifier>,
    version: Option<String>,
    name: Option<String>,
    title: Option<String>,
    status: Option<PublicationStatus>,
    experimental: Option<bool>,
    date: Option<String>,
    publisher: Option<String>,
    contact: Vec<ContactDetail>,
    description: Option<String>,
    use_context: Vec<UsageContext>,
    jurisdiction: Vec<CodeableConcept>,
    purpose: Option<String>,
    copyright: Option<String>,
    origin: Vec<Origin>,
    destination: Vec<Destination>,
    metadata: Option<Metadata>,
    fixture: Vec<Fixture>,
    profile: Vec<Reference>,
    variable: Vec<Variable>,
    setup: Option<Setup>,
    test: Vec<Test>,
    teardown: Option<Teardown>,
    validating: Option<bool>,
}

impl From<TestScript> for TestScriptBuilder {
    fn from(value: TestScript) -> Self {
        Self {
            base: value.base,
            url: Some(value.url),
            identifier: value.identifier,
            version: value.version,
            name: Some(value.name),
            title: value.title,
            status: Some(value.status),
            experimental: value.experimental,
            date: value.date,
            publisher: value.publisher,
            contact: value.contact,
            description: value.description,
            use_context: value.use_context,
            jurisdiction: value.jurisdiction,
            purpose: value.purpose,
            copyright: value.copyright,
            origin: value.origin,
            destination: value.destination,
            metadata: value.metadata,
            fixture: value.fixture,
            profile: value.profile,
            variable: value.variable,
            setup: value.setup,
            test: value.test,
            teardown: value.teardown,
            validating: None,
        }
    }
}

impl TestScriptBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn status(mut self, status: PublicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn experimental(mut self, experimental: bool) -> Self {
        self.experimental = Some(experimental);
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn add_contact(mut self, contact: ContactDetail) -> Self {
        self.contact.push(contact);
        self
    }

    pub fn contact(mut self, contact: impl IntoIterator<Item = ContactDetail>) -> Self {
        self.contact = contact.into_iter().collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn add_use_context(mut self, use_context: UsageContext) -> Self {
        self.use_context.push(use_context);
        self
    }

    pub fn use_context(mut self, use_context: impl IntoIterator<Item = UsageContext>) -> Self {
        self.use_context = use_context.into_iter().collect();
        self
    }

    pub fn add_jurisdiction(mut self, jurisdiction: CodeableConcept) -> Self {
        self.jurisdiction.push(jurisdiction);
        self
    }

    pub fn jurisdiction(mut self, jurisdiction: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.jurisdiction = jurisdiction.into_iter().collect();
        self
    }

    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = Some(copyright.into());
        self
    }

    pub fn add_origin(mut self, origin: Origin) -> Self {
        self.origin.push(origin);
        self
    }

    pub fn origin(mut self, origin: impl IntoIterator<Item = Origin>) -> Self {
        self.origin = origin.into_iter().collect();
        self
    }

    pub fn add_destination(mut self, destination: Destination) -> Self {
        self.destination.push(destination);
        self
    }

    pub fn destination(mut self, destination: impl IntoIterator<Item = Destination>) -> Self {
        self.destination = destination.into_iter().collect();
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn add_fixture(mut self, fixture: Fixture) -> Self {
        self.fixture.push(fixture);
        self
    }

    pub fn fixture(mut self, fixture: impl IntoIterator<Item = Fixture>) -> Self {
        self.fixture = fixture.into_iter().collect();
        self
    }

    pub fn add_profile(mut self, profile: Reference) -> Self {
        self.profile.push(profile);
        self
    }

    pub fn profile(mut self, profile: impl IntoIterator<Item = Reference>) -> Self {
        self.profile = profile.into_iter().collect();
        self
    }

    pub fn add_variable(mut self, variable: Variable) -> Self {
        self.variable.push(variable);
        self
    }

    pub fn variable(mut self, variable: impl IntoIterator<Item = Variable>) -> Self {
        self.variable = variable.into_iter().collect();
        self
    }

    pub fn setup(mut self, setup: Setup) -> Self {
        self.setup = Some(setup);
        self
    }

    pub fn add_test(mut self, test: Test) -> Self {
        self.test.push(test);
        self
    }

    pub fn test(mut self, test: impl IntoIterator<Item = Test>) -> Self {
        self.test = test.into_iter().collect();
        self
    }

    pub fn teardown(mut self, teardown: Teardown) -> Self {
        self.teardown = Some(teardown);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<TestScript> {
        validation::finish(
            TestScript {
                base: self.base,
                url: validation::require(self.url, "url")?,
                identifier: self.identifier,
                version: self.version,
                name: validation::require(self.name, "name")?,
                title: self.title,
                status: validation::require(self.status, "status")?,
                experimental: self.experimental,
                date: self.date,
                publisher: self.publisher,
                contact: self.contact,
                description: self.description,
                use_context: self.use_context,
                jurisdiction: self.jurisdiction,
                purpose: self.purpose,
                copyright: self.copyright,
                origin: self.origin,
                destination: self.destination,
                metadata: self.metadata,
                fixture: self.fixture,
                profile: self.profile,
                variable: self.variable,
                setup: self.setup,
                test: self.test,
                teardown: self.teardown,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_domain_resource!(TestScript, TestScriptBuilder);

impl Validate for TestScript {
    fn validate(&self) -> Result<()> {
        self.base.validate()?;
        validation::check_uri(Some(self.url.as_str()), "url")?;
        validation::check_date_time(self.date.as_deref(), "date")
    }
}

impl Visitable for TestScript {
    fn type_name(&self) -> &'static str {
        "TestScript"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.url.accept("url", None, v);
            accept_optional(&self.identifier, "identifier", v);
            accept_optional(&self.version, "version", v);
            self.name.accept("name", None, v);
            accept_optional(&self.title, "title", v);
            self.status.accept("status", None, v);
            accept_optional(&self.experimental, "experimental", v);
            accept_optional(&self.date, "date", v);
            accept_optional(&self.publisher, "publisher", v);
            accept_list(&self.contact, "contact", v);
            accept_optional(&self.description, "description", v);
            accept_list(&self.use_context, "useContext", v);
            accept_list(&self.jurisdiction, "jurisdiction", v);
            accept_optional(&self.purpose, "purpose", v);
            accept_optional(&self.copyright, "copyright", v);
            accept_list(&self.origin, "origin", v);
            accept_list(&self.destination, "destination", v);
            accept_optional(&self.metadata, "metadata", v);
            accept_list(&self.fixture, "fixture", v);
            accept_list(&self.profile, "profile", v);
            accept_list(&self.variable, "variable", v);
            accept_optional(&self.setup, "setup", v);
            accept_list(&self.test, "test", v);
            accept_optional(&self.teardown, "teardown", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r4::element::{DomainResource, FhirResource, ResourceBuilder};

    fn minimal() -> TestScriptBuilder {
        TestScript::builder()
            .url("http://hl7.org/fhir/TestScript/testscript-example")
            .name("TestScriptExample")
            .status(PublicationStatus::Draft)
    }

    #[test]
    fn test_minimal_script_has_empty_optionals() {
        let script = minimal().build().unwrap();
        assert_eq!(script.name(), "TestScriptExample");
        assert_eq!(script.status(), PublicationStatus::Draft);
        assert!(script.identifier().is_none());
        assert!(script.metadata().is_none());
        assert!(script.setup().is_none());
        assert!(script.teardown().is_none());
        assert!(script.test().is_empty());
        assert!(script.fixture().is_empty());
        assert!(script.contained().is_empty());
        assert!(script.id().is_none());
    }

    #[test]
    fn test_required_fields() {
        let err = TestScript::builder()
            .name("x")
            .status(PublicationStatus::Active)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "url"));

        let err = TestScript::builder()
            .url("http://example.org/ts")
            .status(PublicationStatus::Active)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "name"));

        let err = TestScript::builder()
            .url("http://example.org/ts")
            .name("x")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "status"));
    }

    #[test]
    fn test_to_value_tags_resource_type() {
        let script = minimal().id("testscript-example").build().unwrap();
        let value = script.to_value().unwrap();
        assert_eq!(value["resourceType"], "TestScript");
        assert_eq!(value["id"], "testscript-example");
        assert_eq!(value["status"], "draft");

        let parsed = TestScript::from_value(value).unwrap();
        assert_eq!(parsed, script);
    }

    #[test]
    fn test_from_value_rejects_other_resource() {
        let err = TestScript::from_value(serde_json::json!({
            "resourceType": "SpecimenDefinition"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidResource(ref msg) if msg.contains("SpecimenDefinition")));
    }

    #[test]
    fn test_modification_through_builder() {
        let script = minimal().build().unwrap();
        let retired = script
            .to_builder()
            .status(PublicationStatus::Retired)
            .build()
            .unwrap();
        assert_eq!(script.status(), PublicationStatus::Draft);
        assert_eq!(retired.status(), PublicationStatus::Retired);
        assert_eq!(retired.url(), script.url());
        assert_ne!(retired, script);
    }
}
