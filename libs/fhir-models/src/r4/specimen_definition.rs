//! SpecimenDefinition: kind of specimen and its collection and testing
//! requirements

use super::codes::SpecimenContainedPreference;
use super::datatypes::{CodeableConcept, Duration, Identifier, Range, Reference, SimpleQuantity};
use super::element::{impl_backbone_element, impl_domain_resource, BackboneBase, DomainResourceBase};
use super::resource::{tagged_value, Resource};
use crate::common::choice::{self, impl_choice};
use crate::common::error::{Error, Result};
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{
    accept_composite, accept_list, accept_optional, Validate, Visitable, Visitor,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;

/// A kind of specimen with associated set of requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecimenDefinition {
    #[serde(flatten)]
    base: DomainResourceBase,

    /// Business identifier of a kind of specimen
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<Identifier>,

    /// Kind of material to collect
    #[serde(skip_serializing_if = "Option::is_none")]
    type_collected: Option<CodeableConcept>,

    /// Patient preparation for collection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    patient_preparation: Vec<CodeableConcept>,

    /// Time aspect for collection
    #[serde(skip_serializing_if = "Option::is_none")]
    time_aspect: Option<String>,

    /// Specimen collection procedure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    collection: Vec<CodeableConcept>,

    /// Specimen in container intended for testing by lab
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    type_tested: Vec<TypeTested>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(SpecimenDefinition {
    base,
    identifier,
    type_collected,
    patient_preparation,
    time_aspect,
    collection,
    type_tested,
});

impl SpecimenDefinition {
    pub fn builder() -> SpecimenDefinitionBuilder {
        SpecimenDefinitionBuilder::default()
    }

    pub fn to_builder(&self) -> SpecimenDefinitionBuilder {
        SpecimenDefinitionBuilder::from(self.clone())
    }

    /// Parse from JSON; fails if `resourceType` names another resource.
    pub fn from_value(value: Value) -> Result<Self> {
        match Resource::from_value(value)? {
            Resource::SpecimenDefinition(r) => Ok(r),
            other => Err(Error::InvalidResource(format!(
                "expected SpecimenDefinition, found {}",
                other.resource_type()
            ))),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        tagged_value("SpecimenDefinition", self)
    }

    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    pub fn type_collected(&self) -> Option<&CodeableConcept> {
        self.type_collected.as_ref()
    }

    pub fn patient_preparation(&self) -> &[CodeableConcept] {
        &self.patient_preparation
    }

    pub fn time_aspect(&self) -> Option<&str> {
        self.time_aspect.as_deref()
    }

    pub fn collection(&self) -> &[CodeableConcept] {
        &self.collection
    }

    pub fn type_tested(&self) -> &[TypeTested] {
        &self.type_tested
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpecimenDefinitionBuilder {
    base: DomainResourceBase,
    identifier: Option<Identifier>,
    type_collected: Option<CodeableConcept>,
    patient_preparation: Vec<CodeableConcept>,
    time_aspect: Option<String>,
    collection: Vec<CodeableConcept>,
    type_tested: Vec<TypeTested>,
    validating: Option<bool>,
}

impl From<SpecimenDefinition> for SpecimenDefinitionBuilder {
    fn from(value: SpecimenDefinition) -> Self {
        Self {
            base: value.base,
            identifier: value.identifier,
            type_collected: value.type_collected,
            patient_preparation: value.patient_preparation,
            time_aspect: value.time_aspect,
            collection: value.collection,
            type_tested: value.type_tested,
            validating: None,
        }
    }
}

impl SpecimenDefinitionBuilder {
    pub fn identifier(mut self, identifier: Identifier) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn type_collected(mut self, type_collected: CodeableConcept) -> Self {
        self.type_collected = Some(type_collected);
        self
    }

    pub fn add_patient_preparation(mut self, patient_preparation: CodeableConcept) -> Self {
        self.patient_preparation.push(patient_preparation);
        self
    }

    pub fn patient_preparation(
        mut self,
        patient_preparation: impl IntoIterator<Item = CodeableConcept>,
    ) -> Self {
        self.patient_preparation = patient_preparation.into_iter().collect();
        self
    }

    pub fn time_aspect(mut self, time_aspect: impl Into<String>) -> Self {
        self.time_aspect = Some(time_aspect.into());
        self
    }

    pub fn add_collection(mut self, collection: CodeableConcept) -> Self {
        self.collection.push(collection);
        self
    }

    pub fn collection(mut self, collection: impl IntoIterator<Item = CodeableConcept>) -> Self {
        self.collection = collection.into_iter().collect();
        self
    }

    pub fn add_type_tested(mut self, type_tested: TypeTested) -> Self {
        self.type_tested.push(type_tested);
        self
    }

    pub fn type_tested(mut self, type_tested: impl IntoIterator<Item = TypeTested>) -> Self {
        self.type_tested = type_tested.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<SpecimenDefinition> {
        validation::finish(
            SpecimenDefinition {
                base: self.base,
                identifier: self.identifier,
                type_collected: self.type_collected,
                patient_preparation: self.patient_preparation,
                time_aspect: self.time_aspect,
                collection: self.collection,
                type_tested: self.type_tested,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_domain_resource!(SpecimenDefinition, SpecimenDefinitionBuilder);

impl Validate for SpecimenDefinition {
    fn validate(&self) -> Result<()> {
        self.base.validate()
    }
}

impl Visitable for SpecimenDefinition {
    fn type_name(&self) -> &'static str {
        "SpecimenDefinition"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.identifier, "identifier", v);
            accept_optional(&self.type_collected, "typeCollected", v);
            accept_list(&self.patient_preparation, "patientPreparation", v);
            accept_optional(&self.time_aspect, "timeAspect", v);
            accept_list(&self.collection, "collection", v);
            accept_list(&self.type_tested, "typeTested", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// TypeTested
// ============================================================================

/// Specimen in container intended for testing by lab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeTested {
    #[serde(flatten)]
    base: BackboneBase,

    /// Primary or secondary specimen
    #[serde(skip_serializing_if = "Option::is_none")]
    is_derived: Option<bool>,

    /// Type of intended specimen
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_: Option<CodeableConcept>,

    /// preferred | alternate
    preference: SpecimenContainedPreference,

    /// The specimen's container
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<Container>,

    /// Specimen requirements
    #[serde(skip_serializing_if = "Option::is_none")]
    requirement: Option<String>,

    /// Specimen retention time
    #[serde(skip_serializing_if = "Option::is_none")]
    retention_time: Option<Duration>,

    /// Rejection criterion
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    rejection_criterion: Vec<CodeableConcept>,

    /// Specimen handling before testing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    handling: Vec<Handling>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(TypeTested {
    base,
    is_derived,
    type_,
    preference,
    container,
    requirement,
    retention_time,
    rejection_criterion,
    handling,
});

impl TypeTested {
    pub fn builder() -> TypeTestedBuilder {
        TypeTestedBuilder::default()
    }

    pub fn to_builder(&self) -> TypeTestedBuilder {
        TypeTestedBuilder::from(self.clone())
    }

    pub fn is_derived(&self) -> Option<bool> {
        self.is_derived
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn preference(&self) -> SpecimenContainedPreference {
        self.preference
    }

    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    pub fn requirement(&self) -> Option<&str> {
        self.requirement.as_deref()
    }

    pub fn retention_time(&self) -> Option<&Duration> {
        self.retention_time.as_ref()
    }

    pub fn rejection_criterion(&self) -> &[CodeableConcept] {
        &self.rejection_criterion
    }

    pub fn handling(&self) -> &[Handling] {
        &self.handling
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeTestedBuilder {
    base: BackboneBase,
    is_derived: Option<bool>,
    type_: Option<CodeableConcept>,
    preference: Option<SpecimenContainedPreference>,
    container: Option<Container>,
    requirement: Option<String>,
    retention_time: Option<Duration>,
    rejection_criterion: Vec<CodeableConcept>,
    handling: Vec<Handling>,
    validating: Option<bool>,
}

impl From<TypeTested> for TypeTestedBuilder {
    fn from(value: TypeTested) -> Self {
        Self {
            base: value.base,
            is_derived: value.is_derived,
            type_: value.type_,
            preference: Some(value.preference),
            container: value.container,
            requirement: value.requirement,
            retention_time: value.retention_time,
            rejection_criterion: value.rejection_criterion,
            handling: value.handling,
            validating: None,
        }
    }
}

impl TypeTestedBuilder {
    pub fn is_derived(mut self, is_derived: bool) -> Self {
        self.is_derived = Some(is_derived);
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn preference(mut self, preference: SpecimenContainedPreference) -> Self {
        self.preference = Some(preference);
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    pub fn requirement(mut self, requirement: impl Into<String>) -> Self {
        self.requirement = Some(requirement.into());
        self
    }

    pub fn retention_time(mut self, retention_time: Duration) -> Self {
        self.retention_time = Some(retention_time);
        self
    }

    pub fn add_rejection_criterion(mut self, rejection_criterion: CodeableConcept) -> Self {
        self.rejection_criterion.push(rejection_criterion);
        self
    }

    pub fn rejection_criterion(
        mut self,
        rejection_criterion: impl IntoIterator<Item = CodeableConcept>,
    ) -> Self {
        self.rejection_criterion = rejection_criterion.into_iter().collect();
        self
    }

    pub fn add_handling(mut self, handling: Handling) -> Self {
        self.handling.push(handling);
        self
    }

    pub fn handling(mut self, handling: impl IntoIterator<Item = Handling>) -> Self {
        self.handling = handling.into_iter().collect();
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<TypeTested> {
        validation::finish(
            TypeTested {
                base: self.base,
                is_derived: self.is_derived,
                type_: self.type_,
                preference: validation::require(self.preference, "preference")?,
                container: self.container,
                requirement: self.requirement,
                retention_time: self.retention_time,
                rejection_criterion: self.rejection_criterion,
                handling: self.handling,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(TypeTested, TypeTestedBuilder);

impl Validate for TypeTested {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Visitable for TypeTested {
    fn type_name(&self) -> &'static str {
        "SpecimenDefinition.TypeTested"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.is_derived, "isDerived", v);
            accept_optional(&self.type_, "type", v);
            self.preference.accept("preference", None, v);
            accept_optional(&self.container, "container", v);
            accept_optional(&self.requirement, "requirement", v);
            accept_optional(&self.retention_time, "retentionTime", v);
            accept_list(&self.rejection_criterion, "rejectionCriterion", v);
            accept_list(&self.handling, "handling", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Container
// ============================================================================

/// The specimen's container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(flatten)]
    base: BackboneBase,

    /// Container material
    #[serde(skip_serializing_if = "Option::is_none")]
    material: Option<CodeableConcept>,

    /// Kind of container associated with the kind of specimen
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_: Option<CodeableConcept>,

    /// Color of container cap
    #[serde(skip_serializing_if = "Option::is_none")]
    cap: Option<CodeableConcept>,

    /// Container description
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// Container capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<SimpleQuantity>,

    /// Minimum volume
    #[serde(flatten, deserialize_with = "choice::optional")]
    minimum_volume: Option<MinimumVolume>,

    /// Additive associated with container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    additive: Vec<Additive>,

    /// Specimen container preparation
    #[serde(skip_serializing_if = "Option::is_none")]
    preparation: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Container {
    base,
    material,
    type_,
    cap,
    description,
    capacity,
    minimum_volume,
    additive,
    preparation,
});

/// `Container.minimumVolume[x]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinimumVolume {
    #[serde(rename = "minimumVolumeQuantity")]
    Quantity(SimpleQuantity),
    #[serde(rename = "minimumVolumeString")]
    String(String),
}

impl_choice!(MinimumVolume, "minimumVolume" {
    "minimumVolumeQuantity" => Quantity,
    "minimumVolumeString" => String,
});

impl MinimumVolume {
    pub fn as_element(&self) -> &dyn Visitable {
        match self {
            MinimumVolume::Quantity(v) => v,
            MinimumVolume::String(v) => v,
        }
    }
}

impl Container {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    pub fn to_builder(&self) -> ContainerBuilder {
        ContainerBuilder::from(self.clone())
    }

    pub fn material(&self) -> Option<&CodeableConcept> {
        self.material.as_ref()
    }

    pub fn type_(&self) -> Option<&CodeableConcept> {
        self.type_.as_ref()
    }

    pub fn cap(&self) -> Option<&CodeableConcept> {
        self.cap.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn capacity(&self) -> Option<&SimpleQuantity> {
        self.capacity.as_ref()
    }

    pub fn minimum_volume(&self) -> Option<&MinimumVolume> {
        self.minimum_volume.as_ref()
    }

    pub fn additive(&self) -> &[Additive] {
        &self.additive
    }

    pub fn preparation(&self) -> Option<&str> {
        self.preparation.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    base: BackboneBase,
    material: Option<CodeableConcept>,
    type_: Option<CodeableConcept>,
    cap: Option<CodeableConcept>,
    description: Option<String>,
    capacity: Option<SimpleQuantity>,
    minimum_volume: Option<MinimumVolume>,
    additive: Vec<Additive>,
    preparation: Option<String>,
    validating: Option<bool>,
}

impl From<Container> for ContainerBuilder {
    fn from(value: Container) -> Self {
        Self {
            base: value.base,
            material: value.material,
            type_: value.type_,
            cap: value.cap,
            description: value.description,
            capacity: value.capacity,
            minimum_volume: value.minimum_volume,
            additive: value.additive,
            preparation: value.preparation,
            validating: None,
        }
    }
}

impl ContainerBuilder {
    pub fn material(mut self, material: CodeableConcept) -> Self {
        self.material = Some(material);
        self
    }

    pub fn type_(mut self, type_: CodeableConcept) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn cap(mut self, cap: CodeableConcept) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn capacity(mut self, capacity: SimpleQuantity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn minimum_volume(mut self, minimum_volume: MinimumVolume) -> Self {
        self.minimum_volume = Some(minimum_volume);
        self
    }

    pub fn minimum_volume_quantity(self, minimum_volume: SimpleQuantity) -> Self {
        self.minimum_volume(MinimumVolume::Quantity(minimum_volume))
    }

    pub fn minimum_volume_string(self, minimum_volume: impl Into<String>) -> Self {
        self.minimum_volume(MinimumVolume::String(minimum_volume.into()))
    }

    pub fn add_additive(mut self, additive: Additive) -> Self {
        self.additive.push(additive);
        self
    }

    pub fn additive(mut self, additive: impl IntoIterator<Item = Additive>) -> Self {
        self.additive = additive.into_iter().collect();
        self
    }

    pub fn preparation(mut self, preparation: impl Into<String>) -> Self {
        self.preparation = Some(preparation.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Container> {
        validation::finish(
            Container {
                base: self.base,
                material: self.material,
                type_: self.type_,
                cap: self.cap,
                description: self.description,
                capacity: self.capacity,
                minimum_volume: self.minimum_volume,
                additive: self.additive,
                preparation: self.preparation,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Container, ContainerBuilder);

impl Validate for Container {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.material.is_some()
                || self.type_.is_some()
                || self.cap.is_some()
                || self.description.is_some()
                || self.capacity.is_some()
                || self.minimum_volume.is_some()
                || !self.additive.is_empty()
                || self.preparation.is_some(),
            "SpecimenDefinition.TypeTested.Container",
        )
    }
}

impl Visitable for Container {
    fn type_name(&self) -> &'static str {
        "SpecimenDefinition.TypeTested.Container"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.material, "material", v);
            accept_optional(&self.type_, "type", v);
            accept_optional(&self.cap, "cap", v);
            accept_optional(&self.description, "description", v);
            accept_optional(&self.capacity, "capacity", v);
            if let Some(minimum_volume) = &self.minimum_volume {
                minimum_volume.as_element().accept("minimumVolume", None, v);
            }
            accept_list(&self.additive, "additive", v);
            accept_optional(&self.preparation, "preparation", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Additive
// ============================================================================

/// Additive associated with container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Additive {
    #[serde(flatten)]
    base: BackboneBase,

    /// Additive associated with container
    #[serde(flatten, deserialize_with = "choice::required")]
    additive: AdditiveValue,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Additive { base, additive });

/// `Additive.additive[x]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdditiveValue {
    #[serde(rename = "additiveCodeableConcept")]
    CodeableConcept(CodeableConcept),
    #[serde(rename = "additiveReference")]
    Reference(Reference),
}

impl_choice!(AdditiveValue, "additive" {
    "additiveCodeableConcept" => CodeableConcept,
    "additiveReference" => Reference,
});

impl AdditiveValue {
    pub fn as_element(&self) -> &dyn Visitable {
        match self {
            AdditiveValue::CodeableConcept(v) => v,
            AdditiveValue::Reference(v) => v,
        }
    }
}

impl Additive {
    pub fn builder() -> AdditiveBuilder {
        AdditiveBuilder::default()
    }

    pub fn to_builder(&self) -> AdditiveBuilder {
        AdditiveBuilder::from(self.clone())
    }

    pub fn additive(&self) -> &AdditiveValue {
        &self.additive
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdditiveBuilder {
    base: BackboneBase,
    additive: Option<AdditiveValue>,
    validating: Option<bool>,
}

impl From<Additive> for AdditiveBuilder {
    fn from(value: Additive) -> Self {
        Self {
            base: value.base,
            additive: Some(value.additive),
            validating: None,
        }
    }
}

impl AdditiveBuilder {
    /// Sets the choice; a later call replaces an earlier one.
    pub fn additive(mut self, additive: AdditiveValue) -> Self {
        self.additive = Some(additive);
        self
    }

    pub fn additive_codeable_concept(self, additive: CodeableConcept) -> Self {
        self.additive(AdditiveValue::CodeableConcept(additive))
    }

    pub fn additive_reference(self, additive: Reference) -> Self {
        self.additive(AdditiveValue::Reference(additive))
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Additive> {
        validation::finish(
            Additive {
                base: self.base,
                additive: validation::require(self.additive, "additive")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Additive, AdditiveBuilder);

impl Validate for Additive {
    fn validate(&self) -> Result<()> {
        if let AdditiveValue::Reference(reference) = &self.additive {
            validation::check_reference_type(Some(reference), "additive", &["Substance"])?;
        }
        Ok(())
    }
}

impl Visitable for Additive {
    fn type_name(&self) -> &'static str {
        "SpecimenDefinition.TypeTested.Container.Additive"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.additive.as_element().accept("additive", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Handling
// ============================================================================

/// Specimen handling before testing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handling {
    #[serde(flatten)]
    base: BackboneBase,

    /// Temperature qualifier
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature_qualifier: Option<CodeableConcept>,

    /// Temperature range
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature_range: Option<Range>,

    /// Maximum preservation time
    #[serde(skip_serializing_if = "Option::is_none")]
    max_duration: Option<Duration>,

    /// Preservation instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    instruction: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Handling {
    base,
    temperature_qualifier,
    temperature_range,
    max_duration,
    instruction,
});

impl Handling {
    pub fn builder() -> HandlingBuilder {
        HandlingBuilder::default()
    }

    pub fn to_builder(&self) -> HandlingBuilder {
        HandlingBuilder::from(self.clone())
    }

    pub fn temperature_qualifier(&self) -> Option<&CodeableConcept> {
        self.temperature_qualifier.as_ref()
    }

    pub fn temperature_range(&self) -> Option<&Range> {
        self.temperature_range.as_ref()
    }

    pub fn max_duration(&self) -> Option<&Duration> {
        self.max_duration.as_ref()
    }

    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HandlingBuilder {
    base: BackboneBase,
    temperature_qualifier: Option<CodeableConcept>,
    temperature_range: Option<Range>,
    max_duration: Option<Duration>,
    instruction: Option<String>,
    validating: Option<bool>,
}

impl From<Handling> for HandlingBuilder {
    fn from(value: Handling) -> Self {
        Self {
            base: value.base,
            temperature_qualifier: value.temperature_qualifier,
            temperature_range: value.temperature_range,
            max_duration: value.max_duration,
            instruction: value.instruction,
            validating: None,
        }
    }
}

impl HandlingBuilder {
    pub fn temperature_qualifier(mut self, temperature_qualifier: CodeableConcept) -> Self {
        self.temperature_qualifier = Some(temperature_qualifier);
        self
    }

    pub fn temperature_range(mut self, temperature_range: Range) -> Self {
        self.temperature_range = Some(temperature_range);
        self
    }

    pub fn max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Handling> {
        validation::finish(
            Handling {
                base: self.base,
                temperature_qualifier: self.temperature_qualifier,
                temperature_range: self.temperature_range,
                max_duration: self.max_duration,
                instruction: self.instruction,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Handling, HandlingBuilder);

impl Validate for Handling {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.temperature_qualifier.is_some()
                || self.temperature_range.is_some()
                || self.max_duration.is_some()
                || self.instruction.is_some(),
            "SpecimenDefinition.TypeTested.Handling",
        )
    }
}

impl Visitable for Handling {
    fn type_name(&self) -> &'static str {
        "SpecimenDefinition.TypeTested.Handling"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.temperature_qualifier, "temperatureQualifier", v);
            accept_optional(&self.temperature_range, "temperatureRange", v);
            accept_optional(&self.max_duration, "maxDuration", v);
            accept_optional(&self.instruction, "instruction", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::r4::datatypes::Coding;
    use crate::r4::element::{DomainResourceBuilder, ResourceBuilder};
    use serde_json::json;

    fn concept(code: &str) -> CodeableConcept {
        CodeableConcept::from(Coding::of("http://snomed.info/sct", code).unwrap())
    }

    #[test]
    fn test_type_tested_requires_preference() {
        let err = TypeTested::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "preference"));
    }

    #[test]
    fn test_additive_requires_value() {
        let err = Additive::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "additive"));
    }

    #[test]
    fn test_additive_reference_must_target_substance() {
        let err = Additive::builder()
            .additive_reference(Reference::to("Medication/heparin").unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidReferenceType { ref found, ref allowed, .. }
                if found == "Medication" && allowed == &["Substance".to_string()]
        ));

        let ok = Additive::builder()
            .additive_reference(Reference::to("Substance/heparin").unwrap())
            .build()
            .unwrap();
        assert!(matches!(ok.additive(), AdditiveValue::Reference(_)));
    }

    #[test]
    fn test_additive_last_choice_wins() {
        let additive = Additive::builder()
            .additive_reference(Reference::to("Substance/edta").unwrap())
            .additive_codeable_concept(concept("387083005"))
            .build()
            .unwrap();
        assert!(matches!(additive.additive(), AdditiveValue::CodeableConcept(_)));
    }

    #[test]
    fn test_minimum_volume_choice_json() {
        let container: Container = serde_json::from_value(json!({
            "minimumVolumeString": "2 drops",
            "description": "Green Gel tube"
        }))
        .unwrap();
        assert_eq!(
            container.minimum_volume(),
            Some(&MinimumVolume::String("2 drops".to_string()))
        );

        let container = Container::builder()
            .minimum_volume_quantity(SimpleQuantity::builder().value(2).unit("mL").build().unwrap())
            .build()
            .unwrap();
        let value = serde_json::to_value(&container).unwrap();
        assert_eq!(value["minimumVolumeQuantity"]["unit"], json!("mL"));
        assert!(value.get("minimumVolumeString").is_none());
    }

    #[test]
    fn test_to_value_tags_resource_type() {
        let definition = SpecimenDefinition::builder()
            .id("2364")
            .time_aspect("preferrably morning time")
            .add_collection(concept("20255002"))
            .build()
            .unwrap();
        let value = definition.to_value().unwrap();
        assert_eq!(value["resourceType"], json!("SpecimenDefinition"));
        assert_eq!(SpecimenDefinition::from_value(value).unwrap(), definition);
    }

    #[test]
    fn test_from_value_rejects_other_resource() {
        let err = SpecimenDefinition::from_value(json!({
            "resourceType": "TestScript",
            "url": "http://example.org/ts",
            "name": "TS",
            "status": "draft"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidResource(_)));
    }

    #[test]
    fn test_contained_resource() {
        let inner = SpecimenDefinition::builder().id("inner").build().unwrap();
        let outer = SpecimenDefinition::builder()
            .add_contained(inner.clone())
            .build()
            .unwrap();
        let value = outer.to_value().unwrap();
        assert_eq!(value["contained"][0]["resourceType"], json!("SpecimenDefinition"));
        assert_eq!(value["contained"][0]["id"], json!("inner"));
    }
}
