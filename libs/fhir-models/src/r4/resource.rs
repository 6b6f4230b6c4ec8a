//! The `Resource` choice and JSON entry points

use super::element::{DomainResource, DomainResourceBase, FhirResource, ResourceBase};
use super::specimen_definition::SpecimenDefinition;
use super::test_script::TestScript;
use crate::common::config;
use crate::common::error::{Error, Result};
use crate::common::validation;
use crate::common::visitor::{Validate, Visitable, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;

/// Any resource this crate models, tagged by `resourceType` in JSON
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    SpecimenDefinition(SpecimenDefinition),
    TestScript(TestScript),
}

impl Resource {
    pub const SUPPORTED_TYPES: &'static [&'static str] = &["SpecimenDefinition", "TestScript"];

    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::SpecimenDefinition(_) => "SpecimenDefinition",
            Resource::TestScript(_) => "TestScript",
        }
    }

    /// Parse a resource and, when validation is enabled, validate the whole
    /// tree.
    pub fn from_value(value: Value) -> Result<Self> {
        let resource = Self::from_value_unchecked(value)?;
        if config::validation_enabled() {
            validation::validate_tree(&resource)?;
        }
        Ok(resource)
    }

    /// Parse a resource without running any validation beyond the shape
    /// enforced by deserialization.
    pub fn from_value_unchecked(value: Value) -> Result<Self> {
        match value.get("resourceType").and_then(Value::as_str) {
            None => return Err(Error::InvalidResource("missing resourceType".to_string())),
            Some(t) if !Self::SUPPORTED_TYPES.contains(&t) => {
                return Err(Error::InvalidResource(format!("unsupported resourceType '{t}'")));
            }
            Some(_) => {}
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn as_specimen_definition(&self) -> Option<&SpecimenDefinition> {
        match self {
            Resource::SpecimenDefinition(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_test_script(&self) -> Option<&TestScript> {
        match self {
            Resource::TestScript(r) => Some(r),
            _ => None,
        }
    }

    /// The wrapped resource as a visitable element.
    pub fn as_element(&self) -> &dyn Visitable {
        match self {
            Resource::SpecimenDefinition(r) => r,
            Resource::TestScript(r) => r,
        }
    }
}

impl From<SpecimenDefinition> for Resource {
    fn from(value: SpecimenDefinition) -> Self {
        Resource::SpecimenDefinition(value)
    }
}

impl From<TestScript> for Resource {
    fn from(value: TestScript) -> Self {
        Resource::TestScript(value)
    }
}

impl FhirResource for Resource {
    fn resource_base(&self) -> &ResourceBase {
        match self {
            Resource::SpecimenDefinition(r) => r.resource_base(),
            Resource::TestScript(r) => r.resource_base(),
        }
    }
}

impl DomainResource for Resource {
    fn domain_base(&self) -> &DomainResourceBase {
        match self {
            Resource::SpecimenDefinition(r) => r.domain_base(),
            Resource::TestScript(r) => r.domain_base(),
        }
    }
}

impl Validate for Resource {
    fn validate(&self) -> Result<()> {
        self.as_element().validate()
    }
}

/// A `Resource` is transparent to visitors: they see the wrapped resource.
impl Visitable for Resource {
    fn type_name(&self) -> &'static str {
        self.resource_type()
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        self.as_element().accept(name, index, visitor);
    }

    fn as_any(&self) -> &dyn Any {
        self.as_element().as_any()
    }
}

/// Serialize a resource struct with `resourceType` as its first member.
pub(crate) fn tagged_value<T: Serialize>(resource_type: &str, resource: &T) -> Result<Value> {
    let Value::Object(fields) = serde_json::to_value(resource)? else {
        return Err(Error::InvalidResource(format!(
            "{resource_type} did not serialize to an object"
        )));
    };
    let mut tagged = serde_json::Map::with_capacity(fields.len() + 1);
    tagged.insert("resourceType".to_string(), Value::String(resource_type.to_string()));
    tagged.extend(fields);
    Ok(Value::Object(tagged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_resource_type() {
        let err = Resource::from_value(json!({"id": "x"})).unwrap_err();
        assert!(matches!(err, Error::InvalidResource(_)));
    }

    #[test]
    fn test_unsupported_resource_type() {
        let err = Resource::from_value(json!({"resourceType": "Patient"})).unwrap_err();
        assert!(matches!(err, Error::InvalidResource(ref msg) if msg.contains("Patient")));
    }

    #[test]
    fn test_round_trip_keeps_resource_type_first() {
        let resource = Resource::from_value(json!({
            "resourceType": "SpecimenDefinition",
            "id": "2364",
            "timeAspect": "preferrably morning time"
        }))
        .unwrap();
        assert_eq!(resource.resource_type(), "SpecimenDefinition");
        assert_eq!(resource.id(), Some("2364"));

        let json = resource.to_json().unwrap();
        assert!(json.starts_with(r#"{"resourceType":"SpecimenDefinition""#));
    }

    #[test]
    fn test_as_any_exposes_wrapped_resource() {
        let resource = Resource::from_value(json!({
            "resourceType": "SpecimenDefinition",
            "id": "a"
        }))
        .unwrap();
        let element: &dyn Visitable = &resource;
        assert!(element.is::<SpecimenDefinition>());
        assert_eq!(element.type_name(), "SpecimenDefinition");
    }
}
