//! Base element and resource content
//!
//! FHIR's `Element` → `BackboneElement` and `Resource` → `DomainResource`
//! hierarchy is modelled by composition: each model type embeds one of the
//! `*Base` structs below, and the accessor / builder traits expose the
//! inherited fields.

use super::datatypes::{Extension, Meta, Narrative};
use super::resource::Resource;
use crate::common::error::Result;
use crate::common::validation;
use crate::common::visitor::{accept_list, accept_optional, Visitor};
use serde::{Deserialize, Serialize};

/// `id` and `extension`, carried by every datatype
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    /// Unique id for inter-element referencing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,

    /// Additional content defined by implementations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) extension: Vec<Extension>,
}

impl ElementBase {
    pub(crate) fn accept_children(&self, visitor: &mut dyn Visitor) {
        accept_optional(&self.id, "id", visitor);
        accept_list(&self.extension, "extension", visitor);
    }

    /// Whether the element has children other than `id` (ele-1).
    pub(crate) fn has_children(&self) -> bool {
        !self.extension.is_empty()
    }
}

/// Element content plus `modifierExtension`, carried by every backbone element
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackboneBase {
    #[serde(flatten)]
    pub(crate) element: ElementBase,

    /// Extensions that cannot be ignored even if unrecognized
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) modifier_extension: Vec<Extension>,
}

impl BackboneBase {
    pub(crate) fn accept_children(&self, visitor: &mut dyn Visitor) {
        self.element.accept_children(visitor);
        accept_list(&self.modifier_extension, "modifierExtension", visitor);
    }

    pub(crate) fn has_children(&self) -> bool {
        self.element.has_children() || !self.modifier_extension.is_empty()
    }
}

/// Content common to all resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBase {
    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,

    /// Metadata about the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) meta: Option<Meta>,

    /// A set of rules under which this content was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) implicit_rules: Option<String>,

    /// Language of the resource content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) language: Option<String>,
}

impl ResourceBase {
    pub(crate) fn accept_children(&self, visitor: &mut dyn Visitor) {
        accept_optional(&self.id, "id", visitor);
        accept_optional(&self.meta, "meta", visitor);
        accept_optional(&self.implicit_rules, "implicitRules", visitor);
        accept_optional(&self.language, "language", visitor);
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validation::check_id(self.id.as_deref(), "id")?;
        validation::check_uri(self.implicit_rules.as_deref(), "implicitRules")?;
        validation::check_code(self.language.as_deref(), "language")?;
        Ok(())
    }
}

/// Resource content plus narrative, contained resources and extensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResourceBase {
    #[serde(flatten)]
    pub(crate) resource: ResourceBase,

    /// Text summary of the resource, for human interpretation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<Narrative>,

    /// Contained, inline resources
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) contained: Vec<Resource>,

    /// Additional content defined by implementations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) extension: Vec<Extension>,

    /// Extensions that cannot be ignored
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) modifier_extension: Vec<Extension>,
}

impl DomainResourceBase {
    pub(crate) fn accept_children(&self, visitor: &mut dyn Visitor) {
        self.resource.accept_children(visitor);
        accept_optional(&self.text, "text", visitor);
        accept_list(&self.contained, "contained", visitor);
        accept_list(&self.extension, "extension", visitor);
        accept_list(&self.modifier_extension, "modifierExtension", visitor);
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.resource.validate()
    }
}

// ============================================================================
// Accessor traits
// ============================================================================

pub trait Element {
    fn element_base(&self) -> &ElementBase;

    fn id(&self) -> Option<&str> {
        self.element_base().id.as_deref()
    }

    fn extension(&self) -> &[Extension] {
        &self.element_base().extension
    }
}

pub trait BackboneElement: Element {
    fn backbone_base(&self) -> &BackboneBase;

    fn modifier_extension(&self) -> &[Extension] {
        &self.backbone_base().modifier_extension
    }
}

pub trait FhirResource {
    fn resource_base(&self) -> &ResourceBase;

    fn id(&self) -> Option<&str> {
        self.resource_base().id.as_deref()
    }

    fn meta(&self) -> Option<&Meta> {
        self.resource_base().meta.as_ref()
    }

    fn implicit_rules(&self) -> Option<&str> {
        self.resource_base().implicit_rules.as_deref()
    }

    fn language(&self) -> Option<&str> {
        self.resource_base().language.as_deref()
    }
}

pub trait DomainResource: FhirResource {
    fn domain_base(&self) -> &DomainResourceBase;

    fn text(&self) -> Option<&Narrative> {
        self.domain_base().text.as_ref()
    }

    fn contained(&self) -> &[Resource] {
        &self.domain_base().contained
    }

    fn extension(&self) -> &[Extension] {
        &self.domain_base().extension
    }

    fn modifier_extension(&self) -> &[Extension] {
        &self.domain_base().modifier_extension
    }
}

// ============================================================================
// Builder traits
// ============================================================================

pub trait ElementBuilder: Sized {
    #[doc(hidden)]
    fn element_base_mut(&mut self) -> &mut ElementBase;

    fn id(mut self, id: impl Into<String>) -> Self {
        self.element_base_mut().id = Some(id.into());
        self
    }

    /// Append one extension.
    fn add_extension(mut self, extension: Extension) -> Self {
        self.element_base_mut().extension.push(extension);
        self
    }

    /// Replace all extensions.
    fn extension(mut self, extensions: impl IntoIterator<Item = Extension>) -> Self {
        self.element_base_mut().extension = extensions.into_iter().collect();
        self
    }
}

pub trait BackboneElementBuilder: ElementBuilder {
    #[doc(hidden)]
    fn backbone_base_mut(&mut self) -> &mut BackboneBase;

    fn add_modifier_extension(mut self, extension: Extension) -> Self {
        self.backbone_base_mut().modifier_extension.push(extension);
        self
    }

    fn modifier_extension(mut self, extensions: impl IntoIterator<Item = Extension>) -> Self {
        self.backbone_base_mut().modifier_extension = extensions.into_iter().collect();
        self
    }
}

pub trait ResourceBuilder: Sized {
    #[doc(hidden)]
    fn resource_base_mut(&mut self) -> &mut ResourceBase;

    fn id(mut self, id: impl Into<String>) -> Self {
        self.resource_base_mut().id = Some(id.into());
        self
    }

    fn meta(mut self, meta: Meta) -> Self {
        self.resource_base_mut().meta = Some(meta);
        self
    }

    fn implicit_rules(mut self, implicit_rules: impl Into<String>) -> Self {
        self.resource_base_mut().implicit_rules = Some(implicit_rules.into());
        self
    }

    fn language(mut self, language: impl Into<String>) -> Self {
        self.resource_base_mut().language = Some(language.into());
        self
    }
}

pub trait DomainResourceBuilder: ResourceBuilder {
    #[doc(hidden)]
    fn domain_base_mut(&mut self) -> &mut DomainResourceBase;

    fn text(mut self, text: Narrative) -> Self {
        self.domain_base_mut().text = Some(text);
        self
    }

    fn add_contained(mut self, resource: impl Into<Resource>) -> Self {
        self.domain_base_mut().contained.push(resource.into());
        self
    }

    fn contained(mut self, resources: impl IntoIterator<Item = Resource>) -> Self {
        self.domain_base_mut().contained = resources.into_iter().collect();
        self
    }

    fn add_extension(mut self, extension: Extension) -> Self {
        self.domain_base_mut().extension.push(extension);
        self
    }

    fn extension(mut self, extensions: impl IntoIterator<Item = Extension>) -> Self {
        self.domain_base_mut().extension = extensions.into_iter().collect();
        self
    }

    fn add_modifier_extension(mut self, extension: Extension) -> Self {
        self.domain_base_mut().modifier_extension.push(extension);
        self
    }

    fn modifier_extension(mut self, extensions: impl IntoIterator<Item = Extension>) -> Self {
        self.domain_base_mut().modifier_extension = extensions.into_iter().collect();
        self
    }
}

/// Implement the datatype accessor and builder traits for a type whose
/// content lives in `base: ElementBase`.
macro_rules! impl_element {
    ($ty:ty, $builder:ty) => {
        impl $crate::r4::element::Element for $ty {
            fn element_base(&self) -> &$crate::r4::element::ElementBase {
                &self.base
            }
        }

        impl $crate::r4::element::ElementBuilder for $builder {
            fn element_base_mut(&mut self) -> &mut $crate::r4::element::ElementBase {
                &mut self.base
            }
        }
    };
}

/// Same as [`impl_element!`] for types whose content lives in
/// `base: BackboneBase`.
macro_rules! impl_backbone_element {
    ($ty:ty, $builder:ty) => {
        impl $crate::r4::element::Element for $ty {
            fn element_base(&self) -> &$crate::r4::element::ElementBase {
                &self.base.element
            }
        }

        impl $crate::r4::element::BackboneElement for $ty {
            fn backbone_base(&self) -> &$crate::r4::element::BackboneBase {
                &self.base
            }
        }

        impl $crate::r4::element::ElementBuilder for $builder {
            fn element_base_mut(&mut self) -> &mut $crate::r4::element::ElementBase {
                &mut self.base.element
            }
        }

        impl $crate::r4::element::BackboneElementBuilder for $builder {
            fn backbone_base_mut(&mut self) -> &mut $crate::r4::element::BackboneBase {
                &mut self.base
            }
        }
    };
}

/// Accessor and builder traits for a resource whose content lives in
/// `base: DomainResourceBase`.
macro_rules! impl_domain_resource {
    ($ty:ty, $builder:ty) => {
        impl $crate::r4::element::FhirResource for $ty {
            fn resource_base(&self) -> &$crate::r4::element::ResourceBase {
                &self.base.resource
            }
        }

        impl $crate::r4::element::DomainResource for $ty {
            fn domain_base(&self) -> &$crate::r4::element::DomainResourceBase {
                &self.base
            }
        }

        impl $crate::r4::element::ResourceBuilder for $builder {
            fn resource_base_mut(&mut self) -> &mut $crate::r4::element::ResourceBase {
                &mut self.base.resource
            }
        }

        impl $crate::r4::element::DomainResourceBuilder for $builder {
            fn domain_base_mut(&mut self) -> &mut $crate::r4::element::DomainResourceBase {
                &mut self.base
            }
        }
    };
}

pub(crate) use impl_backbone_element;
pub(crate) use impl_domain_resource;
pub(crate) use impl_element;
