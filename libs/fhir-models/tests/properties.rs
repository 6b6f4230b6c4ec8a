//! Property-based tests using QuickCheck

use lattice_models::prelude::*;
use quickcheck::{QuickCheck, TestResult};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn variable(name: String, hint: Option<String>) -> Variable {
    let mut builder = Variable::builder().name(name);
    if let Some(hint) = hint {
        builder = builder.hint(hint);
    }
    builder.build().unwrap()
}

/// Property: rebuilding from a value yields an equal value
#[test]
fn prop_to_builder_round_trip() {
    fn prop(name: String, hint: Option<String>, autocreate: bool) -> TestResult {
        let variable = variable(name, hint);
        if variable.to_builder().build().unwrap() != variable {
            return TestResult::failed();
        }

        let fixture = Fixture::builder()
            .autocreate(autocreate)
            .autodelete(!autocreate)
            .build()
            .unwrap();
        TestResult::from_bool(FixtureBuilder::from(fixture.clone()).build().unwrap() == fixture)
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String, Option<String>, bool) -> TestResult);
}

/// Property: equal values have equal hashes, and the hash is stable
#[test]
fn prop_equal_values_hash_equal() {
    fn prop(name: String, hint: Option<String>) -> TestResult {
        let a = variable(name.clone(), hint.clone());
        let b = variable(name, hint);
        let first = hash_of(&a);
        TestResult::from_bool(a == b && first == hash_of(&b) && first == hash_of(&a))
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String, Option<String>) -> TestResult);
}

/// Property: changing one field through the builder breaks equality
#[test]
fn prop_changed_field_is_unequal() {
    fn prop(index: i32, other: i32) -> TestResult {
        if index == other {
            return TestResult::discard();
        }
        let profile = Coding::of(
            "http://terminology.hl7.org/CodeSystem/testscript-profile-destination-types",
            "FHIR-Server",
        )
        .unwrap();
        let destination = Destination::builder()
            .index(index)
            .profile(profile)
            .build()
            .unwrap();
        let changed = destination.to_builder().index(other).build().unwrap();
        TestResult::from_bool(changed != destination && destination.index() == index)
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(i32, i32) -> TestResult);
}

/// Property: `x(items)` replaces whatever `add_x` appended before
#[test]
fn prop_replace_discards_appends() {
    fn prop(appended: Vec<i32>, replacement: Vec<i32>) -> TestResult {
        let mut builder = Capability::builder()
            .required(true)
            .validated(false)
            .capabilities("CapabilityStatement/example");
        for origin in &appended {
            builder = builder.add_origin(*origin);
        }
        let capability = builder.origin(replacement.clone()).build().unwrap();
        TestResult::from_bool(capability.origin() == replacement.as_slice())
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<i32>, Vec<i32>) -> TestResult);
}

/// Property: appends preserve order
#[test]
fn prop_appends_preserve_order() {
    fn prop(origins: Vec<i32>) -> TestResult {
        let capability = origins
            .iter()
            .fold(
                Capability::builder()
                    .required(false)
                    .validated(true)
                    .capabilities("CapabilityStatement/example"),
                |builder, origin| builder.add_origin(*origin),
            )
            .build()
            .unwrap();
        TestResult::from_bool(capability.origin() == origins.as_slice())
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<i32>) -> TestResult);
}

/// Property: the last choice setter wins
#[test]
fn prop_last_choice_wins() {
    fn prop(text: String, concept_last: bool) -> TestResult {
        if text.trim().is_empty() {
            return TestResult::discard();
        }
        let concept = CodeableConcept::text_only(text).unwrap();
        let reference = Reference::to("Substance/example").unwrap();
        let builder = if concept_last {
            Additive::builder()
                .additive_reference(reference)
                .additive_codeable_concept(concept)
        } else {
            Additive::builder()
                .additive_codeable_concept(concept)
                .additive_reference(reference)
        };
        let additive = builder.build().unwrap();
        let is_concept = matches!(additive.additive(), AdditiveValue::CodeableConcept(_));
        TestResult::from_bool(is_concept == concept_last)
    }

    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(String, bool) -> TestResult);
}
