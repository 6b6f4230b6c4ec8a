//! Closed FHIR code systems used by the R4 models

use crate::common::error::{Error, Result};
use crate::common::visitor::{accept_leaf, Primitive, Validate, Visitable, Visitor};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::str::FromStr;

/// Declare a code enum. Each variant maps to exactly one code of `$system`.
macro_rules! fhir_code {
    (
        $(#[$meta:meta])*
        $name:ident = $system:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            pub const SYSTEM: &'static str = $system;

            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($code => Ok($name::$variant),)+
                    other => Err(Error::UnknownCode {
                        system: $system,
                        code: other.to_string(),
                    }),
                }
            }
        }

        impl Validate for $name {
            fn validate(&self) -> Result<()> {
                Ok(())
            }
        }

        impl Visitable for $name {
            fn type_name(&self) -> &'static str {
                "code"
            }

            fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
                accept_leaf(self, name, index, visitor);
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_primitive(&self) -> Option<Primitive<'_>> {
                Some(Primitive::Code(self.as_str()))
            }
        }
    };
}

fhir_code! {
    /// Lifecycle status of a conformance artifact
    PublicationStatus = "http://hl7.org/fhir/publication-status" {
        Draft => "draft",
        Active => "active",
        Retired => "retired",
        Unknown => "unknown",
    }
}

fhir_code! {
    /// Whether a container type is the preferred one for a tested specimen
    SpecimenContainedPreference = "http://hl7.org/fhir/specimen-contained-preference" {
        Preferred => "preferred",
        Alternate => "alternate",
    }
}

fhir_code! {
    NarrativeStatus = "http://hl7.org/fhir/narrative-status" {
        Generated => "generated",
        Extensions => "extensions",
        Additional => "additional",
        Empty => "empty",
    }
}

fhir_code! {
    /// How a measured value relates to the stated quantity
    QuantityComparator = "http://hl7.org/fhir/quantity-comparator" {
        LessThan => "<",
        LessOrEqual => "<=",
        GreaterOrEqual => ">=",
        GreaterThan => ">",
    }
}

fhir_code! {
    IdentifierUse = "http://hl7.org/fhir/identifier-use" {
        Usual => "usual",
        Official => "official",
        Temp => "temp",
        Secondary => "secondary",
        Old => "old",
    }
}

fhir_code! {
    ContactPointSystem = "http://hl7.org/fhir/contact-point-system" {
        Phone => "phone",
        Fax => "fax",
        Email => "email",
        Pager => "pager",
        Url => "url",
        Sms => "sms",
        Other => "other",
    }
}

fhir_code! {
    ContactPointUse = "http://hl7.org/fhir/contact-point-use" {
        Home => "home",
        Work => "work",
        Temp => "temp",
        Old => "old",
        Mobile => "mobile",
    }
}

fhir_code! {
    /// Whether an assertion is evaluated on the request or the response
    AssertionDirectionType = "http://hl7.org/fhir/assert-direction-codes" {
        Response => "response",
        Request => "request",
    }
}

fhir_code! {
    AssertionOperatorType = "http://hl7.org/fhir/assert-operator-codes" {
        Equals => "equals",
        NotEquals => "notEquals",
        In => "in",
        NotIn => "notIn",
        GreaterThan => "greaterThan",
        LessThan => "lessThan",
        Empty => "empty",
        NotEmpty => "notEmpty",
        Contains => "contains",
        NotContains => "notContains",
        /// Evaluate the FHIRPath expression as a boolean condition
        Eval => "eval",
    }
}

fhir_code! {
    /// Response classes an assertion can expect
    AssertionResponseTypes = "http://hl7.org/fhir/assert-response-code-types" {
        /// 200
        Okay => "okay",
        /// 201
        Created => "created",
        /// 204
        NoContent => "noContent",
        /// 304
        NotModified => "notModified",
        /// 400
        Bad => "bad",
        /// 403
        Forbidden => "forbidden",
        /// 404
        NotFound => "notFound",
        /// 405
        MethodNotAllowed => "methodNotAllowed",
        /// 409
        Conflict => "conflict",
        /// 410
        Gone => "gone",
        /// 412
        PreconditionFailed => "preconditionFailed",
        /// 422
        Unprocessable => "unprocessable",
    }
}

fhir_code! {
    /// HTTP verb of a test operation
    TestScriptRequestMethodCode = "http://hl7.org/fhir/http-operations" {
        Delete => "delete",
        Get => "get",
        Options => "options",
        Patch => "patch",
        Post => "post",
        Put => "put",
        Head => "head",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_fhir_codes() {
        assert_eq!(
            serde_json::to_value(AssertionOperatorType::NotEquals).unwrap(),
            serde_json::json!("notEquals")
        );
        let cmp: QuantityComparator = serde_json::from_value(serde_json::json!("<=")).unwrap();
        assert_eq!(cmp, QuantityComparator::LessOrEqual);
    }

    #[test]
    fn test_from_str_round_trips_every_code() {
        for status in PublicationStatus::ALL {
            assert_eq!(status.as_str().parse::<PublicationStatus>().unwrap(), *status);
        }
        for method in TestScriptRequestMethodCode::ALL {
            assert_eq!(method.to_string().parse::<TestScriptRequestMethodCode>().unwrap(), *method);
        }
    }

    #[test]
    fn test_unknown_code() {
        let err = "maybe".parse::<SpecimenContainedPreference>().unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownCode { system, ref code }
                if system == SpecimenContainedPreference::SYSTEM && code == "maybe"
        ));
    }

    #[test]
    fn test_code_is_a_leaf() {
        let status = PublicationStatus::Active;
        let element: &dyn Visitable = &status;
        assert_eq!(element.type_name(), "code");
        assert_eq!(element.as_primitive(), Some(Primitive::Code("active")));
    }
}
