//! Declared FHIR invariants
//!
//! Each [`Invariant`] carries its key, human-readable text and FHIRPath
//! expression as published in the R4 definitions, together with a native
//! predicate that decides it for a single element. Invariants apply either
//! to a type (`Quantity`, `DomainResource`) or to an element path
//! (`TestScript.setup.action`), matched with list indices removed.

use lattice_models::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantSeverity {
    /// A violation makes the resource invalid
    Rule,
    /// Best practice; reported according to the configured mode
    Guideline,
}

pub struct Invariant {
    pub key: &'static str,
    pub severity: InvariantSeverity,
    pub human: &'static str,
    pub expression: &'static str,
    /// Type name, or element path when it contains a `.`
    pub context: &'static str,
    check: fn(&dyn Visitable) -> bool,
}

impl std::fmt::Debug for Invariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invariant")
            .field("key", &self.key)
            .field("severity", &self.severity)
            .field("context", &self.context)
            .finish()
    }
}

impl Invariant {
    /// Whether this invariant is evaluated for an element of `type_name`
    /// found at `element_path`.
    pub fn applies_to(&self, type_name: &str, element_path: &str) -> bool {
        if self.context.contains('.') {
            return self.context == element_path;
        }
        match self.context {
            "DomainResource" => Resource::SUPPORTED_TYPES.contains(&type_name),
            "Quantity" => matches!(type_name, "Quantity" | "SimpleQuantity" | "Duration"),
            context => context == type_name,
        }
    }

    /// Evaluate the predicate. Elements of an unexpected type hold trivially.
    pub fn holds(&self, element: &dyn Visitable) -> bool {
        (self.check)(element)
    }
}

pub fn find(key: &str) -> Option<&'static Invariant> {
    INVARIANTS.iter().find(|inv| inv.key == key)
}

pub fn applicable<'a>(
    type_name: &'a str,
    element_path: &'a str,
) -> impl Iterator<Item = &'static Invariant> + 'a {
    INVARIANTS
        .iter()
        .filter(move |inv| inv.applies_to(type_name, element_path))
}

const UCUM: &str = "http://unitsofmeasure.org";

pub static INVARIANTS: &[Invariant] = &[
    // ------------------------------------------------------------------
    // DomainResource
    // ------------------------------------------------------------------
    Invariant {
        key: "dom-2",
        severity: InvariantSeverity::Rule,
        human: "If the resource is contained in another resource, it SHALL NOT contain nested Resources",
        expression: "contained.contained.empty()",
        context: "DomainResource",
        check: |e| contained(e).iter().all(|r| r.contained().is_empty()),
    },
    Invariant {
        key: "dom-4",
        severity: InvariantSeverity::Rule,
        human: "If a resource is contained in another resource, it SHALL NOT have a meta.versionId or a meta.lastUpdated",
        expression: "contained.meta.versionId.empty() and contained.meta.lastUpdated.empty()",
        context: "DomainResource",
        check: |e| {
            contained(e).iter().filter_map(|r| r.meta()).all(|meta| {
                meta.version_id().is_none() && meta.last_updated().is_none()
            })
        },
    },
    Invariant {
        key: "dom-5",
        severity: InvariantSeverity::Rule,
        human: "If a resource is contained in another resource, it SHALL NOT have a security label",
        expression: "contained.meta.security.empty()",
        context: "DomainResource",
        check: |e| {
            contained(e)
                .iter()
                .filter_map(|r| r.meta())
                .all(|meta| meta.security().is_empty())
        },
    },
    Invariant {
        key: "dom-6",
        severity: InvariantSeverity::Guideline,
        human: "A resource should have narrative for robust management",
        expression: "text.`div`.exists()",
        context: "DomainResource",
        check: |e| domain_resource(e).map_or(true, |r| r.text().is_some()),
    },
    // ------------------------------------------------------------------
    // Datatypes
    // ------------------------------------------------------------------
    Invariant {
        key: "ext-1",
        severity: InvariantSeverity::Rule,
        human: "Must have either extensions or value[x], not both",
        expression: "extension.exists() != value.exists()",
        context: "Extension",
        check: |e| {
            e.downcast_ref::<Extension>().map_or(true, |ext| {
                Element::extension(ext).is_empty() != ext.value().is_none()
            })
        },
    },
    Invariant {
        key: "qty-3",
        severity: InvariantSeverity::Rule,
        human: "If a code for the unit is present, the system SHALL also be present",
        expression: "code.empty() or system.exists()",
        context: "Quantity",
        check: |e| quantity(e).map_or(true, |q| q.code().is_none() || q.system().is_some()),
    },
    Invariant {
        key: "drt-1",
        severity: InvariantSeverity::Rule,
        human: "There SHALL be a code if there is a value and it SHALL be an expression of time.  If system is present, it SHALL be UCUM.",
        expression: "code.exists() implies ((system = %ucum) and value.exists())",
        context: "Duration",
        check: |e| {
            e.downcast_ref::<Duration>().map_or(true, |d| {
                d.code().is_none() || (d.system() == Some(UCUM) && d.value().is_some())
            })
        },
    },
    Invariant {
        key: "rng-2",
        severity: InvariantSeverity::Rule,
        human: "If present, low SHALL have a lower value than high",
        expression: "low.empty() or high.empty() or (low <= high)",
        context: "Range",
        check: |e| {
            let Some(range) = e.downcast_ref::<Range>() else {
                return true;
            };
            match (range.low(), range.high()) {
                (Some(low), Some(high)) if low.code() == high.code() => {
                    match (low.value(), high.value()) {
                        (Some(l), Some(h)) => l <= h,
                        _ => true,
                    }
                }
                _ => true,
            }
        },
    },
    Invariant {
        key: "per-1",
        severity: InvariantSeverity::Rule,
        human: "If present, start SHALL have a lower value than end",
        expression: "start.hasValue().not() or end.hasValue().not() or (start <= end)",
        context: "Period",
        check: |e| {
            e.downcast_ref::<Period>().map_or(true, |p| match (p.start(), p.end()) {
                (Some(start), Some(end)) => date_time_le(start, end),
                _ => true,
            })
        },
    },
    Invariant {
        key: "cpt-2",
        severity: InvariantSeverity::Rule,
        human: "A system is required if a value is provided.",
        expression: "value.empty() or system.exists()",
        context: "ContactPoint",
        check: |e| {
            e.downcast_ref::<ContactPoint>()
                .map_or(true, |c| c.value().is_none() || c.system().is_some())
        },
    },
    // ------------------------------------------------------------------
    // TestScript
    // ------------------------------------------------------------------
    Invariant {
        key: "tst-0",
        severity: InvariantSeverity::Guideline,
        human: "Name should be usable as an identifier for the module by machine processing applications such as code generation",
        expression: "name.matches('[A-Z]([A-Za-z0-9_]){0,254}')",
        context: "TestScript",
        check: |e| {
            e.downcast_ref::<TestScript>()
                .map_or(true, |ts| MACHINE_NAME.is_match(ts.name()))
        },
    },
    Invariant {
        key: "tst-1",
        severity: InvariantSeverity::Rule,
        human: "Setup action SHALL contain either an operation or assert but not both.",
        expression: "operation.exists() xor assert.exists()",
        context: "TestScript.setup.action",
        check: |e| {
            e.downcast_ref::<SetupAction>()
                .map_or(true, |a| a.operation().is_some() != a.assert().is_some())
        },
    },
    Invariant {
        key: "tst-2",
        severity: InvariantSeverity::Rule,
        human: "Test action SHALL contain either an operation or assert but not both.",
        expression: "operation.exists() xor assert.exists()",
        context: "TestScript.test.action",
        check: |e| {
            e.downcast_ref::<TestAction>()
                .map_or(true, |a| a.operation().is_some() != a.assert().is_some())
        },
    },
    Invariant {
        key: "tst-3",
        severity: InvariantSeverity::Rule,
        human: "Variable can only contain one of expression, headerField or path.",
        expression: "expression.empty() or headerField.empty() or path.empty()",
        context: "TestScript.variable",
        check: |e| {
            e.downcast_ref::<Variable>().map_or(true, |v| {
                v.expression().is_none() || v.header_field().is_none() || v.path().is_none()
            })
        },
    },
    Invariant {
        key: "tst-4",
        severity: InvariantSeverity::Rule,
        human: "TestScript metadata capability SHALL contain required or validated or both.",
        expression: "capability.required.exists() or capability.validated.exists()",
        context: "TestScript.metadata",
        // required and validated are 1..1, so every parsed or built capability has both
        check: |_| true,
    },
    Invariant {
        key: "tst-5",
        severity: InvariantSeverity::Rule,
        human: "Only a single assertion SHALL be present within setup action assert element.",
        expression: ASSERT_SINGLE,
        context: "TestScript.setup.action.assert",
        check: |e| e.downcast_ref::<Assert>().map_or(true, single_assertion),
    },
    Invariant {
        key: "tst-6",
        severity: InvariantSeverity::Rule,
        human: "Setup action assert SHALL contain either compareToSourceId and compareToSourceExpression, compareToSourceId and compareToSourcePath or neither.",
        expression: ASSERT_COMPARE,
        context: "TestScript.setup.action.assert",
        check: |e| e.downcast_ref::<Assert>().map_or(true, compare_to_source),
    },
    Invariant {
        key: "tst-7",
        severity: InvariantSeverity::Rule,
        human: "Setup operation SHALL contain either sourceId or targetId or params or url.",
        expression: OPERATION_TARGET,
        context: "TestScript.setup.action.operation",
        check: |e| e.downcast_ref::<Operation>().map_or(true, operation_target),
    },
    Invariant {
        key: "tst-8",
        severity: InvariantSeverity::Rule,
        human: "Setup action assert response and response and responseCode SHALL be empty when direction equals request",
        expression: ASSERT_DIRECTION,
        context: "TestScript.setup.action.assert",
        check: |e| e.downcast_ref::<Assert>().map_or(true, direction_request_has_no_response),
    },
    Invariant {
        key: "tst-9",
        severity: InvariantSeverity::Rule,
        human: "Test operation SHALL contain either sourceId or targetId or params or url.",
        expression: OPERATION_TARGET,
        context: "TestScript.test.action.operation",
        check: |e| e.downcast_ref::<Operation>().map_or(true, operation_target),
    },
    Invariant {
        key: "tst-10",
        severity: InvariantSeverity::Rule,
        human: "Only a single assertion SHALL be present within test action assert element.",
        expression: ASSERT_SINGLE,
        context: "TestScript.test.action.assert",
        check: |e| e.downcast_ref::<Assert>().map_or(true, single_assertion),
    },
    Invariant {
        key: "tst-11",
        severity: InvariantSeverity::Rule,
        human: "Test action assert SHALL contain either compareToSourceId and compareToSourceExpression, compareToSourceId and compareToSourcePath or neither.",
        expression: ASSERT_COMPARE,
        context: "TestScript.test.action.assert",
        check: |e| e.downcast_ref::<Assert>().map_or(true, compare_to_source),
    },
    Invariant {
        key: "tst-12",
        severity: InvariantSeverity::Rule,
        human: "Test action assert response and response and responseCode SHALL be empty when direction equals request",
        expression: ASSERT_DIRECTION,
        context: "TestScript.test.action.assert",
        check: |e| e.downcast_ref::<Assert>().map_or(true, direction_request_has_no_response),
    },
];

const ASSERT_SINGLE: &str = "extension.exists() or (contentType.count() + expression.count() + headerField.count() + minimumId.count() + navigationLinks.count() + path.count() + requestMethod.count() + resource.count() + responseCode.count() + response.count()  + validateProfileId.count() <=1)";
const ASSERT_COMPARE: &str = "compareToSourceId.empty() xor (compareToSourceExpression.exists() or compareToSourcePath.exists())";
const ASSERT_DIRECTION: &str = "(response.empty() and responseCode.empty() and direction = 'request') or direction.empty() or direction = 'response'";
const OPERATION_TARGET: &str = "sourceId.exists() or (targetId.count() + url.count() + params.count() = 1) or (type.code in ('capabilities' |'search' | 'transaction' | 'history'))";

static MACHINE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]([A-Za-z0-9_]){0,254}$").expect("valid name pattern"));

// ============================================================================
// Predicate helpers
// ============================================================================

fn domain_resource(element: &dyn Visitable) -> Option<&dyn DomainResource> {
    if let Some(definition) = element.downcast_ref::<SpecimenDefinition>() {
        return Some(definition as &dyn DomainResource);
    }
    element
        .downcast_ref::<TestScript>()
        .map(|script| script as &dyn DomainResource)
}

fn contained(element: &dyn Visitable) -> &[Resource] {
    domain_resource(element).map_or(&[], |r| r.contained())
}

fn quantity(element: &dyn Visitable) -> Option<&Quantity> {
    if let Some(q) = element.downcast_ref::<Quantity>() {
        return Some(q);
    }
    if let Some(q) = element.downcast_ref::<SimpleQuantity>() {
        return Some(&**q);
    }
    element.downcast_ref::<Duration>().map(|d| &**d)
}

/// Compare two FHIR date/time strings at their common precision.
fn date_time_le(start: &str, end: &str) -> bool {
    let len = start.len().min(end.len());
    start.as_bytes()[..len] <= end.as_bytes()[..len]
}

fn single_assertion(assert: &Assert) -> bool {
    if !Element::extension(assert).is_empty() {
        return true;
    }
    let present = [
        assert.content_type().is_some(),
        assert.expression().is_some(),
        assert.header_field().is_some(),
        assert.minimum_id().is_some(),
        assert.navigation_links().is_some(),
        assert.path().is_some(),
        assert.request_method().is_some(),
        assert.resource().is_some(),
        assert.response_code().is_some(),
        assert.response().is_some(),
        assert.validate_profile_id().is_some(),
    ];
    present.iter().filter(|p| **p).count() <= 1
}

fn compare_to_source(assert: &Assert) -> bool {
    let source = assert.compare_to_source_id().is_some();
    let target =
        assert.compare_to_source_expression().is_some() || assert.compare_to_source_path().is_some();
    // neither, or the id together with an expression or path
    source == target
}

fn direction_request_has_no_response(assert: &Assert) -> bool {
    match assert.direction() {
        Some(AssertionDirectionType::Request) => {
            assert.response().is_none() && assert.response_code().is_none()
        }
        _ => true,
    }
}

fn operation_target(operation: &Operation) -> bool {
    if operation.source_id().is_some() {
        return true;
    }
    let targets = [operation.target_id(), operation.url(), operation.params()]
        .iter()
        .filter(|t| t.is_some())
        .count();
    if targets == 1 {
        return true;
    }
    matches!(
        operation.type_().and_then(|t| t.code()),
        Some("capabilities" | "search" | "transaction" | "history")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn check(key: &str, element: &dyn Visitable) -> bool {
        find(key).unwrap().holds(element)
    }

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = INVARIANTS.iter().map(|inv| inv.key).collect();
        assert_eq!(keys.len(), INVARIANTS.len());
        assert!(find("tst-1").is_some());
        assert!(find("tst-13").is_none());
    }

    #[test]
    fn test_context_matching() {
        let qty = find("qty-3").unwrap();
        assert!(qty.applies_to("Quantity", "SpecimenDefinition.typeTested.container.capacity"));
        assert!(qty.applies_to("Duration", "SpecimenDefinition.typeTested.retentionTime"));
        assert!(!qty.applies_to("Range", "SpecimenDefinition.typeTested.handling.temperatureRange"));

        let dom = find("dom-6").unwrap();
        assert!(dom.applies_to("TestScript", "TestScript"));
        assert!(!dom.applies_to("Narrative", "TestScript.text"));

        let setup = find("tst-7").unwrap();
        assert!(setup.applies_to("TestScript.Setup.Action.Operation", "TestScript.setup.action.operation"));
        assert!(!setup.applies_to("TestScript.Setup.Action.Operation", "TestScript.test.action.operation"));
    }

    #[test]
    fn test_action_exclusivity() {
        let operation = Operation::builder()
            .encode_request_url(true)
            .url("/Patient/1")
            .build()
            .unwrap();
        let assert = Assert::builder()
            .warning_only(false)
            .response(AssertionResponseTypes::Okay)
            .build()
            .unwrap();

        let only_operation = SetupAction::builder()
            .operation(operation.clone())
            .build()
            .unwrap();
        let both = SetupAction::builder()
            .operation(operation)
            .assert(assert)
            .build()
            .unwrap();

        assert!(check("tst-1", &only_operation));
        assert!(!check("tst-1", &both));
        // wrong element type holds trivially
        assert!(check("tst-2", &both));
    }

    #[test]
    fn test_variable_sources() {
        let variable = Variable::builder()
            .name("id")
            .expression("Patient.id")
            .header_field("Location")
            .path("fhir:Patient/fhir:id/@value")
            .build()
            .unwrap();
        assert!(!check("tst-3", &variable));

        let variable = Variable::builder()
            .name("id")
            .expression("Patient.id")
            .path("fhir:Patient/fhir:id/@value")
            .build()
            .unwrap();
        assert!(check("tst-3", &variable));

        let variable = Variable::builder()
            .name("id")
            .expression("Patient.id")
            .build()
            .unwrap();
        assert!(check("tst-3", &variable));
    }

    #[test]
    fn test_operation_target() {
        let builder = Operation::builder().encode_request_url(true);
        let op = builder.clone().target_id("a").url("/x").build().unwrap();
        assert!(!check("tst-7", &op));

        let op = builder.clone().source_id("fixture").url("/x").params("?y").build().unwrap();
        assert!(check("tst-9", &op));

        let search = Coding::of(
            "http://terminology.hl7.org/CodeSystem/testscript-operation-codes",
            "search",
        )
        .unwrap();
        assert!(check("tst-7", &builder.clone().type_(search).build().unwrap()));
        assert!(!check("tst-7", &builder.build().unwrap()));
    }

    #[test]
    fn test_assert_rules() {
        let base = Assert::builder().warning_only(false);

        let two = base.clone().path("a").resource("Patient").build().unwrap();
        assert!(!check("tst-5", &two));

        let dangling = base.clone().compare_to_source_id("src").build().unwrap();
        assert!(!check("tst-6", &dangling));
        let paired = base
            .clone()
            .compare_to_source_id("src")
            .compare_to_source_path("Patient/name")
            .build()
            .unwrap();
        assert!(check("tst-11", &paired));

        let request = base
            .direction(AssertionDirectionType::Request)
            .response_code("200")
            .build()
            .unwrap();
        assert!(!check("tst-8", &request));
    }

    #[test]
    fn test_datatype_rules() {
        let quantity = Quantity::builder().value(5).code("mg").build().unwrap();
        assert!(!check("qty-3", &quantity));

        let duration = Duration::builder().value(1).code("h").build().unwrap();
        assert!(!check("drt-1", &duration));
        assert!(check("drt-1", &Duration::ucum(1, "h").unwrap()));

        let range = Range::builder()
            .low(SimpleQuantity::builder().value(8).code("Cel").build().unwrap())
            .high(SimpleQuantity::builder().value(2).code("Cel").build().unwrap())
            .build()
            .unwrap();
        assert!(!check("rng-2", &range));

        let period = Period::builder()
            .start("2024-05-01")
            .end("2024-04-30T10:00:00Z")
            .build()
            .unwrap();
        assert!(!check("per-1", &period));

        let unordered = Period::builder()
            .validating(false)
            .start("2020é")
            .end("20201")
            .build()
            .unwrap();
        assert!(!check("per-1", &unordered));

        let contact = ContactPoint::builder().value("555-0100").build().unwrap();
        assert!(!check("cpt-2", &contact));
    }

    #[test]
    fn test_capability_flags_always_present() {
        let capability = Capability::builder()
            .required(false)
            .validated(false)
            .capabilities("CapabilityStatement/example")
            .build()
            .unwrap();
        let metadata = Metadata::builder().add_capability(capability).build().unwrap();
        assert!(check("tst-4", &metadata));
    }

    #[test]
    fn test_machine_name() {
        let script = |name: &str| {
            TestScript::builder()
                .url("http://example.org/ts")
                .name(name)
                .status(PublicationStatus::Draft)
                .build()
                .unwrap()
        };
        assert!(check("tst-0", &script("ReadPatient_01")));
        assert!(!check("tst-0", &script("Read patient")));
        assert!(!check("tst-0", &script("readPatient")));
    }
}
