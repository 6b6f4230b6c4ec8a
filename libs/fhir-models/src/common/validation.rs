//! Validation primitives shared by every model type
//!
//! The generated-style `validate()` methods are closed lists of calls into
//! this module. Each helper returns the first violation as an [`Error`].

use super::config;
use super::error::{Error, Result};
use super::visitor::{PathTracker, Validate, Visitable, Visitor};
use crate::r4::datatypes::Reference;
use once_cell::sync::Lazy;
use regex::Regex;

const MAX_STRING_LENGTH: usize = 1_048_576;

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-\.]{1,64}$").expect("valid id pattern"));

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s]+(\s[^\s]+)*$").expect("valid code pattern"));

static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(https?://([A-Za-z0-9\-\\\.:%\$]*/)+)?([A-Z][A-Za-z]+)/[A-Za-z0-9\-\.]{1,64}(/_history/[A-Za-z0-9\-\.]{1,64})?$",
    )
    .expect("valid reference pattern")
});

static DATE_TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)(-(0[1-9]|1[0-2])(-(0[1-9]|[1-2][0-9]|3[0-1])(T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00)))?)?)?$",
    )
    .expect("valid dateTime pattern")
});

static INSTANT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9]([0-9]([0-9][1-9]|[1-9]0)|[1-9]00)|[1-9]000)-(0[1-9]|1[0-2])-(0[1-9]|[1-2][0-9]|3[0-1])T([01][0-9]|2[0-3]):[0-5][0-9]:([0-5][0-9]|60)(\.[0-9]+)?(Z|(\+|-)((0[0-9]|1[0-3]):[0-5][0-9]|14:00))$",
    )
    .expect("valid instant pattern")
});

/// Last step of every `build()`: run the type's `validate()` unless
/// validation is switched off for this builder or globally.
pub(crate) fn finish<T: Validate>(value: T, validating: Option<bool>) -> Result<T> {
    if config::should_validate(validating) {
        value.validate()?;
    }
    Ok(value)
}

/// Required field: unwrap or fail with the element name.
pub fn require<T>(value: Option<T>, element: &str) -> Result<T> {
    value.ok_or_else(|| Error::MissingRequiredElement(element.to_string()))
}

/// `1..*` cardinality.
pub fn require_non_empty<T>(items: &[T], element: &str) -> Result<()> {
    if items.is_empty() {
        return Err(Error::EmptyList(element.to_string()));
    }
    Ok(())
}

/// ele-1: a datatype instance must carry a value or at least one child.
pub fn require_value_or_children(has_content: bool, type_name: &str) -> Result<()> {
    if !has_content {
        return Err(Error::MissingValueOrChildren(type_name.to_string()));
    }
    Ok(())
}

pub fn check_id(value: Option<&str>, element: &str) -> Result<()> {
    match value {
        Some(v) if !ID_PATTERN.is_match(v) => Err(invalid(
            element,
            "id",
            v,
            "must match [A-Za-z0-9\\-\\.]{1,64}",
        )),
        _ => Ok(()),
    }
}

pub fn check_code(value: Option<&str>, element: &str) -> Result<()> {
    match value {
        Some(v) if !CODE_PATTERN.is_match(v) => Err(invalid(
            element,
            "code",
            v,
            "must be non-empty without leading, trailing or repeated whitespace",
        )),
        _ => Ok(()),
    }
}

pub fn check_date_time(value: Option<&str>, element: &str) -> Result<()> {
    match value {
        Some(v) if !DATE_TIME_PATTERN.is_match(v) => Err(invalid(
            element,
            "dateTime",
            v,
            "must be YYYY, YYYY-MM, YYYY-MM-DD or a full time with zone",
        )),
        _ => Ok(()),
    }
}

pub fn check_instant(value: Option<&str>, element: &str) -> Result<()> {
    match value {
        Some(v) if !INSTANT_PATTERN.is_match(v) => Err(invalid(
            element,
            "instant",
            v,
            "must be a full date and time with zone",
        )),
        _ => Ok(()),
    }
}

pub fn check_uri(value: Option<&str>, element: &str) -> Result<()> {
    match value {
        Some(v) if v.is_empty() => Err(invalid(element, "uri", v, "must not be empty")),
        Some(v) if v.chars().any(char::is_whitespace) => {
            Err(invalid(element, "uri", v, "must not contain whitespace"))
        }
        _ => Ok(()),
    }
}

pub fn check_string(value: Option<&str>, element: &str) -> Result<()> {
    let Some(v) = value else {
        return Ok(());
    };
    if v.is_empty() {
        return Err(invalid(element, "string", v, "must not be empty"));
    }
    if v.len() > MAX_STRING_LENGTH {
        return Err(invalid(element, "string", "", "must not exceed 1 MiB"));
    }
    if v
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        return Err(invalid(element, "string", v, "contains an illegal control character"));
    }
    Ok(())
}

fn invalid(element: &str, kind: &'static str, value: &str, reason: &'static str) -> Error {
    Error::InvalidPrimitive {
        element: element.to_string(),
        kind,
        value: value.to_string(),
        reason,
    }
}

/// Check that a reference targets one of `allowed` resource types.
///
/// The target type is taken from the literal reference (`Type/id`, an
/// absolute URL ending in `Type/id`, or a conditional `Type?query`) and from
/// the explicit `type` element. Contained (`#id`) and `urn:` references only
/// contribute their explicit `type`. No-op when reference type checking is
/// switched off.
pub fn check_reference_type(
    reference: Option<&Reference>,
    element: &str,
    allowed: &[&str],
) -> Result<()> {
    let Some(reference) = reference else {
        return Ok(());
    };
    if !config::check_reference_types() {
        return Ok(());
    }

    let declared = reference.type_();
    let literal_type = reference.reference().and_then(literal_reference_type);

    if let (Some(literal), Some(declared)) = (literal_type, declared) {
        if literal != declared {
            return Err(Error::ReferenceTypeMismatch {
                element: element.to_string(),
                literal: literal.to_string(),
                declared: declared.to_string(),
            });
        }
    }

    let Some(found) = literal_type.or(declared) else {
        return Ok(());
    };
    if !allowed.contains(&found) {
        return Err(Error::InvalidReferenceType {
            element: element.to_string(),
            found: found.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(())
}

/// Resource type named by a literal reference, if it names one.
pub fn literal_reference_type(reference: &str) -> Option<&str> {
    if reference.starts_with('#') || reference.starts_with("urn:") {
        return None;
    }
    if let Some((resource_type, _query)) = reference.split_once('?') {
        return (!resource_type.is_empty() && !resource_type.contains('/')).then_some(resource_type);
    }
    REFERENCE_PATTERN
        .captures(reference)
        .and_then(|caps| caps.get(3))
        .map(|m| m.as_str())
}

/// Validate `root` and every element below it.
///
/// Stops at the first failure and reports it with the element's location.
pub fn validate_tree(root: &dyn Visitable) -> Result<()> {
    let mut validator = TreeValidator::default();
    root.accept(root.type_name(), None, &mut validator);
    match validator.error {
        Some(err) => {
            tracing::debug!(error = %err, "tree validation failed");
            Err(err)
        }
        None => Ok(()),
    }
}

#[derive(Default)]
struct TreeValidator {
    path: PathTracker,
    error: Option<Error>,
}

impl Visitor for TreeValidator {
    fn pre_visit(&mut self, _element: &dyn Visitable) -> bool {
        self.error.is_none()
    }

    fn visit_start(&mut self, name: &str, index: Option<usize>, _element: &dyn Visitable) {
        self.path.push(name, index);
    }

    fn visit(&mut self, _name: &str, _index: Option<usize>, element: &dyn Visitable) -> bool {
        match element.validate() {
            Ok(()) => true,
            Err(err) => {
                self.error = Some(err.at(self.path.path()));
                false
            }
        }
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _element: &dyn Visitable) {
        self.path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert_eq!(require(Some(3), "index").unwrap(), 3);
        let err = require::<i32>(None, "index").unwrap_err();
        assert!(matches!(err, Error::MissingRequiredElement(ref e) if e == "index"));
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty(&[1], "action").is_ok());
        assert!(matches!(
            require_non_empty::<i32>(&[], "action"),
            Err(Error::EmptyList(_))
        ));
    }

    #[test]
    fn test_check_id() {
        assert!(check_id(Some("fixture-1.a"), "sourceId").is_ok());
        assert!(check_id(None, "sourceId").is_ok());
        assert!(check_id(Some("has space"), "sourceId").is_err());
        assert!(check_id(Some(&"a".repeat(65)), "sourceId").is_err());
        assert!(check_id(Some(""), "sourceId").is_err());
    }

    #[test]
    fn test_check_code() {
        assert!(check_code(Some("application/fhir+json"), "accept").is_ok());
        assert!(check_code(Some("two words"), "accept").is_ok());
        assert!(check_code(Some(" leading"), "accept").is_err());
        assert!(check_code(Some("double  space"), "accept").is_err());
    }

    #[test]
    fn test_check_string() {
        assert!(check_string(Some("line one\nline two\t"), "description").is_ok());
        assert!(check_string(Some(""), "description").is_err());
        assert!(check_string(Some("bell\u{7}"), "description").is_err());
    }

    #[test]
    fn test_check_uri() {
        assert!(check_uri(Some("http://example.org/fhir"), "url").is_ok());
        assert!(check_uri(Some("http://example.org/a b"), "url").is_err());
    }

    #[test]
    fn test_check_date_time() {
        for ok in ["2024", "2024-05", "2024-05-01", "2024-05-01T10:00:00Z", "2024-05-01T10:00:00.5+02:00"] {
            assert!(check_date_time(Some(ok), "start").is_ok(), "{ok}");
        }
        for bad in ["2020é", "20201", "2024-13", "2024-05-01T10:00", ""] {
            assert!(check_date_time(Some(bad), "start").is_err(), "{bad}");
        }
        assert!(check_instant(Some("2024-05-01T10:00:00Z"), "lastUpdated").is_ok());
        assert!(check_instant(Some("2024-05-01"), "lastUpdated").is_err());
    }

    #[test]
    fn test_literal_reference_type() {
        assert_eq!(literal_reference_type("Substance/123"), Some("Substance"));
        assert_eq!(
            literal_reference_type("http://example.org/fhir/Substance/123/_history/2"),
            Some("Substance")
        );
        assert_eq!(literal_reference_type("Substance?code=abc"), Some("Substance"));
        assert_eq!(literal_reference_type("#contained-1"), None);
        assert_eq!(literal_reference_type("urn:uuid:1234"), None);
        assert_eq!(literal_reference_type("not a reference"), None);
    }
}
