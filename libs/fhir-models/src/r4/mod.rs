//! FHIR R4 (4.0.1) resources and the datatypes they use

pub mod codes;
pub mod datatypes;
pub mod element;
pub mod resource;
pub mod specimen_definition;
pub mod test_script;

pub use element::{
    BackboneElement, BackboneElementBuilder, DomainResource, DomainResourceBuilder, Element,
    ElementBuilder, FhirResource, ResourceBuilder,
};
pub use resource::Resource;
pub use specimen_definition::{
    Additive, AdditiveBuilder, AdditiveValue, Container, ContainerBuilder, Handling,
    HandlingBuilder, MinimumVolume, SpecimenDefinition, SpecimenDefinitionBuilder, TypeTested,
    TypeTestedBuilder,
};
pub use test_script::TestScript;
