//! General-purpose FHIR R4 datatypes referenced by the resources

mod coding;
mod extension;
mod metadata;
mod quantity;
mod reference;

pub use coding::{CodeableConcept, CodeableConceptBuilder, Coding, CodingBuilder};
pub use extension::{Extension, ExtensionBuilder, ExtensionValue};
pub use metadata::{
    ContactDetail, ContactDetailBuilder, ContactPoint, ContactPointBuilder, Meta, MetaBuilder,
    Narrative, NarrativeBuilder, UsageContext, UsageContextBuilder, UsageContextValue,
};
pub use quantity::{
    Duration, DurationBuilder, Quantity, QuantityBuilder, Range, RangeBuilder, SimpleQuantity,
    SimpleQuantityBuilder,
};
pub use reference::{Identifier, IdentifierBuilder, Period, PeriodBuilder, Reference, ReferenceBuilder};
