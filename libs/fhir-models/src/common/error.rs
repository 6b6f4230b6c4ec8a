//! Error types for FHIR models

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required element: '{0}'")]
    MissingRequiredElement(String),

    #[error("Element '{0}' must contain at least one item")]
    EmptyList(String),

    #[error("Resource type found in reference value: '{found}' for element: '{element}' must be one of: {allowed:?}")]
    InvalidReferenceType {
        element: String,
        found: String,
        allowed: Vec<String>,
    },

    #[error("Resource type found in reference value: '{literal}' for element: '{element}' does not match the specified reference type: '{declared}'")]
    ReferenceTypeMismatch {
        element: String,
        literal: String,
        declared: String,
    },

    #[error("Invalid {kind} value for element '{element}': {value:?} ({reason})")]
    InvalidPrimitive {
        element: String,
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("ele-1: All FHIR elements must have a @value or children: '{0}'")]
    MissingValueOrChildren(String),

    #[error("{key}: {human}")]
    Invariant {
        key: &'static str,
        human: &'static str,
    },

    #[error("Invalid FHIR resource: {0}")]
    InvalidResource(String),

    #[error("Unknown code '{code}' for code system '{system}'")]
    UnknownCode { system: &'static str, code: String },

    #[error("{location}: {source}")]
    Element {
        location: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// Attach the location of the offending element.
    pub fn at(self, location: impl Into<String>) -> Self {
        Error::Element {
            location: location.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with any location wrappers removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::Element { source, .. } => source.root(),
            other => other,
        }
    }

    /// Location of the offending element, if known.
    pub fn location(&self) -> Option<&str> {
        match self {
            Error::Element { location, .. } => Some(location),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
