//! Operations and assertions performed by setup, test and teardown actions

use crate::common::error::Result;
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{
    accept_composite, accept_list, accept_optional, Validate, Visitable, Visitor,
};
use crate::r4::codes::{
    AssertionDirectionType, AssertionOperatorType, AssertionResponseTypes,
    TestScriptRequestMethodCode,
};
use crate::r4::datatypes::Coding;
use crate::r4::element::{impl_backbone_element, BackboneBase};
use serde::{Deserialize, Serialize};
use std::any::Any;

// ============================================================================
// Operation
// ============================================================================

/// The setup operation to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(flatten)]
    base: BackboneBase,

    /// The operation code type that will be executed
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_: Option<Coding>,

    /// Resource type
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,

    /// Tracking/logging operation label
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,

    /// Tracking/reporting operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// Mime type to accept in the payload of the response, with charset etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    accept: Option<String>,

    /// Mime type of the request payload contents, with charset etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,

    /// Server responding to the request
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<i32>,

    /// Whether or not to send the request url in encoded format
    encode_request_url: bool,

    /// delete | get | options | patch | post | put | head
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<TestScriptRequestMethodCode>,

    /// Server initiating the request
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<i32>,

    /// Explicitly defined path parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<String>,

    /// Each operation can have one or more header elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    request_header: Vec<RequestHeader>,

    /// Fixture Id of mapped request
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,

    /// Fixture Id of mapped response
    #[serde(skip_serializing_if = "Option::is_none")]
    response_id: Option<String>,

    /// Fixture Id of body for PUT and POST requests
    #[serde(skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,

    /// Id of fixture used for extracting the [id],  [type], and [vid] for GET
    /// requests
    #[serde(skip_serializing_if = "Option::is_none")]
    target_id: Option<String>,

    /// Request URL
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Operation {
    base,
    type_,
    resource,
    label,
    description,
    accept,
    content_type,
    destination,
    encode_request_url,
    method,
    origin,
    params,
    request_header,
    request_id,
    response_id,
    source_id,
    target_id,
    url,
});

impl Operation {
    pub fn builder() -> OperationBuilder {
        OperationBuilder::default()
    }

    pub fn to_builder(&self) -> OperationBuilder {
        OperationBuilder::from(self.clone())
    }

    pub fn type_(&self) -> Option<&Coding> {
        self.type_.as_ref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn destination(&self) -> Option<i32> {
        self.destination
    }

    pub fn encode_request_url(&self) -> bool {
        self.encode_request_url
    }

    pub fn method(&self) -> Option<TestScriptRequestMethodCode> {
        self.method
    }

    pub fn origin(&self) -> Option<i32> {
        self.origin
    }

    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }

    pub fn request_header(&self) -> &[RequestHeader] {
        &self.request_header
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OperationBuilder {
    base: BackboneBase,
    type_: Option<Coding>,
    resource: Option<String>,
    label: Option<String>,
    description: Option<String>,
    accept: Option<String>,
    content_type: Option<String>,
    destination: Option<i32>,
    encode_request_url: Option<bool>,
    method: Option<TestScriptRequestMethodCode>,
    origin: Option<i32>,
    params: Option<String>,
    request_header: Vec<RequestHeader>,
    request_id: Option<String>,
    response_id: Option<String>,
    source_id: Option<String>,
    target_id: Option<String>,
    url: Option<String>,
    validating: Option<bool>,
}

impl From<Operation> for OperationBuilder {
    fn from(value: Operation) -> Self {
        Self {
            base: value.base,
            type_: value.type_,
            resource: value.resource,
            label: value.label,
            description: value.description,
            accept: value.accept,
            content_type: value.content_type,
            destination: value.destination,
            encode_request_url: Some(value.encode_request_url),
            method: value.method,
            origin: value.origin,
            params: value.params,
            request_header: value.request_header,
            request_id: value.request_id,
            response_id: value.response_id,
            source_id: value.source_id,
            target_id: value.target_id,
            url: value.url,
            validating: None,
        }
    }
}

impl OperationBuilder {
    pub fn type_(mut self, type_: Coding) -> Self {
        self.type_ = Some(type_);
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn destination(mut self, destination: i32) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn encode_request_url(mut self, encode_request_url: bool) -> Self {
        self.encode_request_url = Some(encode_request_url);
        self
    }

    pub fn method(mut self, method: TestScriptRequestMethodCode) -> Self {
        self.method = Some(method);
        self
    }

    pub fn origin(mut self, origin: i32) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn add_request_header(mut self, request_header: RequestHeader) -> Self {
        self.request_header.push(request_header);
        self
    }

    pub fn request_header(
        mut self,
        request_header: impl IntoIterator<Item = RequestHeader>,
    ) -> Self {
        self.request_header = request_header.into_iter().collect();
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn response_id(mut self, response_id: impl Into<String>) -> Self {
        self.response_id = Some(response_id.into());
        self
    }

    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn target_id(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Operation> {
        validation::finish(
            Operation {
                base: self.base,
                type_: self.type_,
                resource: self.resource,
                label: self.label,
                description: self.description,
                accept: self.accept,
                content_type: self.content_type,
                destination: self.destination,
                encode_request_url: validation::require(
                    self.encode_request_url,
                    "encodeRequestUrl",
                )?,
                method: self.method,
                origin: self.origin,
                params: self.params,
                request_header: self.request_header,
                request_id: self.request_id,
                response_id: self.response_id,
                source_id: self.source_id,
                target_id: self.target_id,
                url: self.url,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Operation, OperationBuilder);

impl Validate for Operation {
    fn validate(&self) -> Result<()> {
        validation::check_code(self.resource.as_deref(), "resource")?;
        validation::check_code(self.accept.as_deref(), "accept")?;
        validation::check_code(self.content_type.as_deref(), "contentType")?;
        validation::check_id(self.request_id.as_deref(), "requestId")?;
        validation::check_id(self.response_id.as_deref(), "responseId")?;
        validation::check_id(self.source_id.as_deref(), "sourceId")?;
        validation::check_id(self.target_id.as_deref(), "targetId")?;
        Ok(())
    }
}

impl Visitable for Operation {
    fn type_name(&self) -> &'static str {
        "TestScript.Setup.Action.Operation"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.type_, "type", v);
            accept_optional(&self.resource, "resource", v);
            accept_optional(&self.label, "label", v);
            accept_optional(&self.description, "description", v);
            accept_optional(&self.accept, "accept", v);
            accept_optional(&self.content_type, "contentType", v);
            accept_optional(&self.destination, "destination", v);
            self.encode_request_url.accept("encodeRequestUrl", None, v);
            accept_optional(&self.method, "method", v);
            accept_optional(&self.origin, "origin", v);
            accept_optional(&self.params, "params", v);
            accept_list(&self.request_header, "requestHeader", v);
            accept_optional(&self.request_id, "requestId", v);
            accept_optional(&self.response_id, "responseId", v);
            accept_optional(&self.source_id, "sourceId", v);
            accept_optional(&self.target_id, "targetId", v);
            accept_optional(&self.url, "url", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// RequestHeader
// ============================================================================

/// Each operation can have one or more header elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHeader {
    #[serde(flatten)]
    base: BackboneBase,

    /// HTTP header field name
    field: String,

    /// HTTP headerfield value
    value: String,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(RequestHeader { base, field, value });

impl RequestHeader {
    pub fn builder() -> RequestHeaderBuilder {
        RequestHeaderBuilder::default()
    }

    pub fn to_builder(&self) -> RequestHeaderBuilder {
        RequestHeaderBuilder::from(self.clone())
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestHeaderBuilder {
    base: BackboneBase,
    field: Option<String>,
    value: Option<String>,
    validating: Option<bool>,
}

impl From<RequestHeader> for RequestHeaderBuilder {
    fn from(value: RequestHeader) -> Self {
        Self {
            base: value.base,
            field: Some(value.field),
            value: Some(value.value),
            validating: None,
        }
    }
}

impl RequestHeaderBuilder {
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<RequestHeader> {
        validation::finish(
            RequestHeader {
                base: self.base,
                field: validation::require(self.field, "field")?,
                value: validation::require(self.value, "value")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(RequestHeader, RequestHeaderBuilder);

impl Validate for RequestHeader {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Visitable for RequestHeader {
    fn type_name(&self) -> &'static str {
        "TestScript.Setup.Action.Operation.RequestHeader"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            self.field.accept("field", None, v);
            self.value.accept("value", None, v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Assert
// ============================================================================

/// The assertion to perform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assert {
    #[serde(flatten)]
    base: BackboneBase,

    /// Tracking/logging assertion label
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,

    /// Tracking/reporting assertion description
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// response | request
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<AssertionDirectionType>,

    /// Id of the source fixture to be evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    compare_to_source_id: Option<String>,

    /// The FHIRPath expression to evaluate against the source fixture
    #[serde(skip_serializing_if = "Option::is_none")]
    compare_to_source_expression: Option<String>,

    /// XPath or JSONPath expression to evaluate against the source fixture
    #[serde(skip_serializing_if = "Option::is_none")]
    compare_to_source_path: Option<String>,

    /// Mime type to compare against the 'Content-Type' header
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,

    /// The FHIRPath expression to be evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    expression: Option<String>,

    /// HTTP header field name
    #[serde(skip_serializing_if = "Option::is_none")]
    header_field: Option<String>,

    /// Fixture Id of minimum content resource
    #[serde(skip_serializing_if = "Option::is_none")]
    minimum_id: Option<String>,

    /// Perform validation on navigation links?
    #[serde(skip_serializing_if = "Option::is_none")]
    navigation_links: Option<bool>,

    /// equals | notEquals | in | notIn | greaterThan | lessThan | empty |
    /// notEmpty | contains | notContains | eval
    #[serde(skip_serializing_if = "Option::is_none")]
    operator: Option<AssertionOperatorType>,

    /// XPath or JSONPath expression
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,

    /// delete | get | options | patch | post | put | head
    #[serde(skip_serializing_if = "Option::is_none")]
    request_method: Option<TestScriptRequestMethodCode>,

    /// Request URL comparison value
    #[serde(rename = "requestURL", skip_serializing_if = "Option::is_none")]
    request_url: Option<String>,

    /// Resource type
    #[serde(skip_serializing_if = "Option::is_none")]
    resource: Option<String>,

    /// okay | created | noContent | notModified | bad | forbidden | notFound |
    /// methodNotAllowed | conflict | gone | preconditionFailed | unprocessable
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<AssertionResponseTypes>,

    /// HTTP response code to test
    #[serde(skip_serializing_if = "Option::is_none")]
    response_code: Option<String>,

    /// Fixture Id of source expression or headerField
    #[serde(skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,

    /// Profile Id of validation profile reference
    #[serde(skip_serializing_if = "Option::is_none")]
    validate_profile_id: Option<String>,

    /// The value to compare to
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,

    /// Will this assert produce a warning only on error?
    warning_only: bool,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Assert {
    base,
    label,
    description,
    direction,
    compare_to_source_id,
    compare_to_source_expression,
    compare_to_source_path,
    content_type,
    expression,
    header_field,
    minimum_id,
    navigation_links,
    operator,
    path,
    request_method,
    request_url,
    resource,
    response,
    response_code,
    source_id,
    validate_profile_id,
    value,
    warning_only,
});

impl Assert {
    pub fn builder() -> AssertBuilder {
        AssertBuilder::default()
    }

    pub fn to_builder(&self) -> AssertBuilder {
        AssertBuilder::from(self.clone())
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn direction(&self) -> Option<AssertionDirectionType> {
        self.direction
    }

    pub fn compare_to_source_id(&self) -> Option<&str> {
        self.compare_to_source_id.as_deref()
    }

    pub fn compare_to_source_expression(&self) -> Option<&str> {
        self.compare_to_source_expression.as_deref()
    }

    pub fn compare_to_source_path(&self) -> Option<&str> {
        self.compare_to_source_path.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn header_field(&self) -> Option<&str> {
        self.header_field.as_deref()
    }

    pub fn minimum_id(&self) -> Option<&str> {
        self.minimum_id.as_deref()
    }

    pub fn navigation_links(&self) -> Option<bool> {
        self.navigation_links
    }

    pub fn operator(&self) -> Option<AssertionOperatorType> {
        self.operator
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn request_method(&self) -> Option<TestScriptRequestMethodCode> {
        self.request_method
    }

    pub fn request_url(&self) -> Option<&str> {
        self.request_url.as_deref()
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    pub fn response(&self) -> Option<AssertionResponseTypes> {
        self.response
    }

    pub fn response_code(&self) -> Option<&str> {
        self.response_code.as_deref()
    }

    pub fn source_id(&self) -> Option<&str> {
        self.source_id.as_deref()
    }

    pub fn validate_profile_id(&self) -> Option<&str> {
        self.validate_profile_id.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn warning_only(&self) -> bool {
        self.warning_only
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssertBuilder {
    base: BackboneBase,
    label: Option<String>,
    description: Option<String>,
    direction: Option<AssertionDirectionType>,
    compare_to_source_id: Option<String>,
    compare_to_source_expression: Option<String>,
    compare_to_source_path: Option<String>,
    content_type: Option<String>,
    expression: Option<String>,
    header_field: Option<String>,
    minimum_id: Option<String>,
    navigation_links: Option<bool>,
    operator: Option<AssertionOperatorType>,
    path: Option<String>,
    request_method: Option<TestScriptRequestMethodCode>,
    request_url: Option<String>,
    resource: Option<String>,
    response: Option<AssertionResponseTypes>,
    response_code: Option<String>,
    source_id: Option<String>,
    validate_profile_id: Option<String>,
    value: Option<String>,
    warning_only: Option<bool>,
    validating: Option<bool>,
}

impl From<Assert> for AssertBuilder {
    fn from(value: Assert) -> Self {
        Self {
            base: value.base,
            label: value.label,
            description: value.description,
            direction: value.direction,
            compare_to_source_id: value.compare_to_source_id,
            compare_to_source_expression: value.compare_to_source_expression,
            compare_to_source_path: value.compare_to_source_path,
            content_type: value.content_type,
            expression: value.expression,
            header_field: value.header_field,
            minimum_id: value.minimum_id,
            navigation_links: value.navigation_links,
            operator: value.operator,
            path: value.path,
            request_method: value.request_method,
            request_url: value.request_url,
            resource: value.resource,
            response: value.response,
            response_code: value.response_code,
            source_id: value.source_id,
            validate_profile_id: value.validate_profile_id,
            value: value.value,
            warning_only: Some(value.warning_only),
            validating: None,
        }
    }
}

impl AssertBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn direction(mut self, direction: AssertionDirectionType) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn compare_to_source_id(mut self, compare_to_source_id: impl Into<String>) -> Self {
        self.compare_to_source_id = Some(compare_to_source_id.into());
        self
    }

    pub fn compare_to_source_expression(
        mut self,
        compare_to_source_expression: impl Into<String>,
    ) -> Self {
        self.compare_to_source_expression = Some(compare_to_source_expression.into());
        self
    }

    pub fn compare_to_source_path(mut self, compare_to_source_path: impl Into<String>) -> Self {
        self.compare_to_source_path = Some(compare_to_source_path.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
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

    pub fn minimum_id(mut self, minimum_id: impl Into<String>) -> Self {
        self.minimum_id = Some(minimum_id.into());
        self
    }

    pub fn navigation_links(mut self, navigation_links: bool) -> Self {
        self.navigation_links = Some(navigation_links);
        self
    }

    pub fn operator(mut self, operator: AssertionOperatorType) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn request_method(mut self, request_method: TestScriptRequestMethodCode) -> Self {
        self.request_method = Some(request_method);
        self
    }

    pub fn request_url(mut self, request_url: impl Into<String>) -> Self {
        self.request_url = Some(request_url.into());
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn response(mut self, response: AssertionResponseTypes) -> Self {
        self.response = Some(response);
        self
    }

    pub fn response_code(mut self, response_code: impl Into<String>) -> Self {
        self.response_code = Some(response_code.into());
        self
    }

    pub fn source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn validate_profile_id(mut self, validate_profile_id: impl Into<String>) -> Self {
        self.validate_profile_id = Some(validate_profile_id.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn warning_only(mut self, warning_only: bool) -> Self {
        self.warning_only = Some(warning_only);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Assert> {
        validation::finish(
            Assert {
                base: self.base,
                label: self.label,
                description: self.description,
                direction: self.direction,
                compare_to_source_id: self.compare_to_source_id,
                compare_to_source_expression: self.compare_to_source_expression,
                compare_to_source_path: self.compare_to_source_path,
                content_type: self.content_type,
                expression: self.expression,
                header_field: self.header_field,
                minimum_id: self.minimum_id,
                navigation_links: self.navigation_links,
                operator: self.operator,
                path: self.path,
                request_method: self.request_method,
                request_url: self.request_url,
                resource: self.resource,
                response: self.response,
                response_code: self.response_code,
                source_id: self.source_id,
                validate_profile_id: self.validate_profile_id,
                value: self.value,
                warning_only: validation::require(self.warning_only, "warningOnly")?,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_backbone_element!(Assert, AssertBuilder);

impl Validate for Assert {
    fn validate(&self) -> Result<()> {
        validation::check_code(self.content_type.as_deref(), "contentType")?;
        validation::check_code(self.resource.as_deref(), "resource")?;
        validation::check_id(self.source_id.as_deref(), "sourceId")?;
        validation::check_id(self.validate_profile_id.as_deref(), "validateProfileId")?;
        Ok(())
    }
}

impl Visitable for Assert {
    fn type_name(&self) -> &'static str {
        "TestScript.Setup.Action.Assert"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.label, "label", v);
            accept_optional(&self.description, "description", v);
            accept_optional(&self.direction, "direction", v);
            accept_optional(&self.compare_to_source_id, "compareToSourceId", v);
            accept_optional(&self.compare_to_source_expression, "compareToSourceExpression", v);
            accept_optional(&self.compare_to_source_path, "compareToSourcePath", v);
            accept_optional(&self.content_type, "contentType", v);
            accept_optional(&self.expression, "expression", v);
            accept_optional(&self.header_field, "headerField", v);
            accept_optional(&self.minimum_id, "minimumId", v);
            accept_optional(&self.navigation_links, "navigationLinks", v);
            accept_optional(&self.operator, "operator", v);
            accept_optional(&self.path, "path", v);
            accept_optional(&self.request_method, "requestMethod", v);
            accept_optional(&self.request_url, "requestURL", v);
            accept_optional(&self.resource, "resource", v);
            accept_optional(&self.response, "response", v);
            accept_optional(&self.response_code, "responseCode", v);
            accept_optional(&self.source_id, "sourceId", v);
            accept_optional(&self.validate_profile_id, "validateProfileId", v);
            accept_optional(&self.value, "value", v);
            self.warning_only.accept("warningOnly", None, v);
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

    #[test]
    fn test_operation_requires_encode_request_url() {
        let err = Operation::builder().resource("Patient").build().unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "encodeRequestUrl"));
    }

    #[test]
    fn test_operation_json() {
        let operation: Operation = serde_json::from_value(serde_json::json!({
            "type": {
                "system": "http://terminology.hl7.org/CodeSystem/testscript-operation-codes",
                "code": "read"
            },
            "resource": "Patient",
            "accept": "xml",
            "encodeRequestUrl": true,
            "method": "get",
            "requestHeader": [{"field": "Accept-Charset", "value": "utf-8"}],
            "targetId": "fixture-patient-create"
        }))
        .unwrap();
        assert!(operation.encode_request_url());
        assert_eq!(operation.method(), Some(TestScriptRequestMethodCode::Get));
        assert_eq!(operation.request_header()[0].field(), "Accept-Charset");
        assert_eq!(operation.to_builder().build().unwrap(), operation);
    }

    #[test]
    fn test_assert_request_url_is_renamed() {
        let assert = Assert::builder()
            .request_url("Patient/1")
            .warning_only(false)
            .build()
            .unwrap();
        let value = serde_json::to_value(&assert).unwrap();
        assert_eq!(value["requestURL"], serde_json::json!("Patient/1"));
        assert_eq!(value["warningOnly"], serde_json::json!(false));
    }

    #[test]
    fn test_assert_requires_warning_only() {
        let err = Assert::builder()
            .response(AssertionResponseTypes::Okay)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "warningOnly"));
    }
}
