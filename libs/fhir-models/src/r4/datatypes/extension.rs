//! Extension with its `value[x]` choice

use super::{CodeableConcept, Coding, Identifier, Period, Quantity, Range, Reference};
use crate::common::choice::{self, impl_choice};
use crate::common::error::Result;
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{accept_composite, Validate, Visitable, Visitor};
use crate::r4::element::{impl_element, ElementBase};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Optional extensions element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    #[serde(flatten)]
    base: ElementBase,

    /// Identifies the meaning of the extension
    url: String,

    /// Value of extension
    #[serde(flatten, deserialize_with = "choice::optional")]
    value: Option<ExtensionValue>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Extension { base, url, value });

/// `Extension.value[x]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtensionValue {
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueBoolean")]
    Boolean(bool),
    #[serde(rename = "valueInteger")]
    Integer(i32),
    #[serde(rename = "valueDecimal")]
    Decimal(Decimal),
    #[serde(rename = "valueCode")]
    Code(String),
    #[serde(rename = "valueUri")]
    Uri(String),
    #[serde(rename = "valueCanonical")]
    Canonical(String),
    #[serde(rename = "valueDateTime")]
    DateTime(String),
    #[serde(rename = "valueCoding")]
    Coding(Coding),
    #[serde(rename = "valueCodeableConcept")]
    CodeableConcept(CodeableConcept),
    #[serde(rename = "valueQuantity")]
    Quantity(Quantity),
    #[serde(rename = "valueReference")]
    Reference(Reference),
    #[serde(rename = "valueIdentifier")]
    Identifier(Identifier),
    #[serde(rename = "valuePeriod")]
    Period(Period),
    #[serde(rename = "valueRange")]
    Range(Range),
}

impl_choice!(ExtensionValue, "value" {
    "valueString" => String,
    "valueBoolean" => Boolean,
    "valueInteger" => Integer,
    "valueDecimal" => Decimal,
    "valueCode" => Code,
    "valueUri" => Uri,
    "valueCanonical" => Canonical,
    "valueDateTime" => DateTime,
    "valueCoding" => Coding,
    "valueCodeableConcept" => CodeableConcept,
    "valueQuantity" => Quantity,
    "valueReference" => Reference,
    "valueIdentifier" => Identifier,
    "valuePeriod" => Period,
    "valueRange" => Range,
});

impl ExtensionValue {
    /// The selected choice as a visitable element.
    pub fn as_element(&self) -> &dyn Visitable {
        match self {
            ExtensionValue::String(v)
            | ExtensionValue::Code(v)
            | ExtensionValue::Uri(v)
            | ExtensionValue::Canonical(v)
            | ExtensionValue::DateTime(v) => v,
            ExtensionValue::Boolean(v) => v,
            ExtensionValue::Integer(v) => v,
            ExtensionValue::Decimal(v) => v,
            ExtensionValue::Coding(v) => v,
            ExtensionValue::CodeableConcept(v) => v,
            ExtensionValue::Quantity(v) => v,
            ExtensionValue::Reference(v) => v,
            ExtensionValue::Identifier(v) => v,
            ExtensionValue::Period(v) => v,
            ExtensionValue::Range(v) => v,
        }
    }

    fn check(&self) -> Result<()> {
        match self {
            ExtensionValue::Code(v) => validation::check_code(Some(v.as_str()), "valueCode"),
            ExtensionValue::Uri(v) => validation::check_uri(Some(v.as_str()), "valueUri"),
            ExtensionValue::Canonical(v) => validation::check_uri(Some(v.as_str()), "valueCanonical"),
            _ => Ok(()),
        }
    }
}

impl Extension {
    pub fn builder() -> ExtensionBuilder {
        ExtensionBuilder::default()
    }

    pub fn to_builder(&self) -> ExtensionBuilder {
        ExtensionBuilder::from(self.clone())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn value(&self) -> Option<&ExtensionValue> {
        self.value.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionBuilder {
    base: ElementBase,
    url: Option<String>,
    value: Option<ExtensionValue>,
    validating: Option<bool>,
}

impl From<Extension> for ExtensionBuilder {
    fn from(value: Extension) -> Self {
        Self {
            base: value.base,
            url: Some(value.url),
            value: value.value,
            validating: None,
        }
    }
}

impl ExtensionBuilder {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn value(mut self, value: ExtensionValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Extension> {
        validation::finish(
            Extension {
                base: self.base,
                url: validation::require(self.url, "url")?,
                value: self.value,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Extension, ExtensionBuilder);

impl Validate for Extension {
    fn validate(&self) -> Result<()> {
        validation::check_uri(Some(self.url.as_str()), "url")?;
        if let Some(value) = &self.value {
            value.check()?;
        }
        Ok(())
    }
}

impl Visitable for Extension {
    fn type_name(&self) -> &'static str {
        "Extension"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.url.accept("url", None, v);
            if let Some(value) = &self.value {
                value.as_element().accept("value", None, v);
            }
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
    use crate::r4::element::{Element, ElementBuilder};

    #[test]
    fn test_value_choice_json() {
        let json = serde_json::json!({
            "url": "http://example.org/fhir/StructureDefinition/priority",
            "valueCode": "urgent"
        });
        let extension: Extension = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(extension.value(), Some(&ExtensionValue::Code("urgent".into())));
        assert_eq!(serde_json::to_value(&extension).unwrap(), json);
    }

    #[test]
    fn test_value_choice_conflicts_rejected() {
        let err = serde_json::from_value::<Extension>(serde_json::json!({
            "url": "http://example.org/fhir/StructureDefinition/priority",
            "valueCode": "urgent",
            "valueBoolean": true
        }))
        .unwrap_err();
        assert!(err.to_string().contains("more than one value"), "{err}");

        let err = serde_json::from_value::<Extension>(serde_json::json!({
            "url": "http://example.org/fhir/StructureDefinition/priority",
            "valueInteger": "three"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid type"), "{err}");

        let extension: Extension = serde_json::from_value(serde_json::json!({
            "url": "http://example.org/fhir/StructureDefinition/complex",
            "extension": [{"url": "detail", "valueInteger": 3}]
        }))
        .unwrap();
        assert!(extension.value().is_none());
    }

    #[test]
    fn test_url_required() {
        let err = Extension::builder()
            .value(ExtensionValue::Boolean(true))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "url"));
    }

    #[test]
    fn test_nested_extension() {
        let inner = Extension::builder()
            .url("detail")
            .value(ExtensionValue::Integer(3))
            .build()
            .unwrap();
        let outer = Extension::builder()
            .url("http://example.org/complex")
            .add_extension(inner.clone())
            .build()
            .unwrap();
        assert_eq!(outer.extension(), &[inner]);
        assert!(outer.value().is_none());
    }
}
