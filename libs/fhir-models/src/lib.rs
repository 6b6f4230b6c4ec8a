//! FHIR R4 data models for SpecimenDefinition and TestScript
//!
//! Every model type is an immutable value with private fields and borrowing
//! getters. Values are created through builders, which check required
//! elements, cardinality, choice types and reference targets when `build()`
//! is called.
//!
//! # Module Organization
//!
//! - `common`: configuration, errors, validation helpers and the visitor
//!   machinery shared by every type
//! - `r4`: the resources, their backbone elements and the datatypes they use
//!
//! # Example
//!
//! ```rust
//! use lattice_models::prelude::*;
//!
//! let tested = TypeTested::builder()
//!     .preference(SpecimenContainedPreference::Preferred)
//!     .build()?;
//!
//! let definition = SpecimenDefinition::builder()
//!     .id("2364")
//!     .time_aspect("preferrably morning time")
//!     .add_type_tested(tested)
//!     .build()?;
//!
//! let json = definition.to_value()?;
//! assert_eq!(json["resourceType"], "SpecimenDefinition");
//! assert_eq!(json["typeTested"][0]["preference"], "preferred");
//!
//! let parsed = SpecimenDefinition::from_value(json)?;
//! assert_eq!(parsed, definition);
//! # Ok::<(), lattice_models::Error>(())
//! ```

pub mod common;
pub mod r4;

pub use common::config::{self, ModelConfig};
pub use common::error::{Error, Result};
pub use common::validation;
pub use common::visitor::{self, PathTracker, Primitive, Validate, Visitable, Visitor};
pub use r4::Resource;

/// Glob-importable set of the types needed to build and read resources.
pub mod prelude {
    pub use crate::common::config::ModelConfig;
    pub use crate::common::error::{Error, Result};
    pub use crate::common::visitor::{Primitive, Visitable, Visitor};
    pub use crate::r4::codes::*;
    pub use crate::r4::datatypes::*;
    pub use crate::r4::element::{
        BackboneElement, BackboneElementBuilder, DomainResource, DomainResourceBuilder, Element,
        ElementBuilder, FhirResource, ResourceBuilder,
    };
    pub use crate::r4::resource::Resource;
    pub use crate::r4::specimen_definition::*;
    pub use crate::r4::test_script::*;
}
