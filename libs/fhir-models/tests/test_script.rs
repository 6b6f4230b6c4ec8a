use lattice_models::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path).expect("failed to read fixture");
    serde_json::from_str(&text).expect("fixture is not JSON")
}

fn example() -> TestScript {
    TestScript::from_value(fixture("testscript-example.json")).expect("fixture should validate")
}

#[test]
fn parse_testscript_example() {
    let script = example();

    assert_eq!(script.id(), Some("testscript-example"));
    assert_eq!(script.url(), "http://hl7.org/fhir/TestScript/testscript-example");
    assert_eq!(script.name(), "TestScript Example");
    assert_eq!(script.status(), PublicationStatus::Draft);
    assert_eq!(script.experimental(), Some(true));
    assert_eq!(script.text().unwrap().status(), NarrativeStatus::Generated);
    assert_eq!(
        script.contact()[0].telecom()[0].system(),
        Some(ContactPointSystem::Email)
    );
    assert!(matches!(
        script.use_context()[0].value(),
        UsageContextValue::CodeableConcept(_)
    ));
}

#[test]
fn metadata_and_fixtures() {
    let script = example();

    let metadata = script.metadata().unwrap();
    assert_eq!(metadata.link()[0].url(), "http://hl7.org/fhir/patient.html");
    let capability = &metadata.capability()[0];
    assert!(capability.required());
    assert!(!capability.validated());
    assert_eq!(capability.link().len(), 3);
    assert_eq!(capability.capabilities(), "CapabilityStatement/example");

    let fixtures = script.fixture();
    assert_eq!(fixtures.len(), 2);
    assert_eq!(fixtures[0].id(), Some("fixture-patient-create"));
    assert!(!fixtures[0].autocreate());
    assert_eq!(fixtures[1].resource().unwrap().reference(), Some("Patient/pat1"));

    assert_eq!(script.profile()[0].id(), Some("patient-profile"));
    assert_eq!(script.variable()[0].source_id(), Some("fixture-patient-create"));
}

#[test]
fn setup_test_and_teardown() {
    let script = example();

    let setup = script.setup().unwrap();
    assert_eq!(setup.action().len(), 4);
    let delete = setup.action()[0].operation().unwrap();
    assert_eq!(delete.method(), Some(TestScriptRequestMethodCode::Delete));
    assert_eq!(delete.params(), Some("/${createResourceId}"));
    assert!(setup.action()[0].assert().is_none());

    let created = setup.action()[3].assert().unwrap();
    assert_eq!(created.response_code(), Some("201"));
    assert_eq!(created.direction(), Some(AssertionDirectionType::Response));

    let test = &script.test()[0];
    assert_eq!(test.id(), Some("01-ReadPatient"));
    assert_eq!(test.action().len(), 7);
    let read = test.action()[0].operation().unwrap();
    assert!(!read.encode_request_url());
    assert_eq!(read.response_id(), Some("fixture-patient-read"));
    assert_eq!(
        test.action()[1].assert().unwrap().response(),
        Some(AssertionResponseTypes::Okay)
    );
    assert_eq!(
        test.action()[2].assert().unwrap().operator(),
        Some(AssertionOperatorType::NotEmpty)
    );
    assert!(test.action()[2].assert().unwrap().warning_only());

    let teardown = script.teardown().unwrap();
    assert_eq!(
        teardown.action()[0].operation().target_id(),
        Some("fixture-patient-create")
    );
}

#[test]
fn round_trips_are_equal() {
    let script = example();

    let value = script.to_value().unwrap();
    assert_eq!(value["resourceType"], "TestScript");
    assert_eq!(
        value["setup"]["action"][0]["operation"]["encodeRequestUrl"],
        json!(true)
    );
    assert_eq!(TestScript::from_value(value).unwrap(), script);

    assert_eq!(script.to_builder().build().unwrap(), script);
}

#[test]
fn parsing_through_resource() {
    let resource = Resource::from_value(fixture("testscript-example.json")).unwrap();
    assert_eq!(resource.resource_type(), "TestScript");
    assert!(resource.as_specimen_definition().is_none());
    assert_eq!(resource.as_test_script(), Some(&example()));

    let json = resource.to_json_pretty().unwrap();
    assert_eq!(Resource::from_json(&json).unwrap(), resource);
}

#[test]
fn empty_setup_fails_with_location() {
    let mut value = fixture("testscript-example.json");
    value["setup"]["action"] = json!([]);

    let err = TestScript::from_value(value).unwrap_err();
    assert_eq!(err.location(), Some("TestScript.setup"));
    assert!(matches!(err.root(), Error::EmptyList(name) if name == "action"));
}

#[test]
fn empty_capability_list_fails() {
    let mut value = fixture("testscript-example.json");
    value["metadata"]["capability"] = json!([]);

    let err = TestScript::from_value(value).unwrap_err();
    assert_eq!(err.location(), Some("TestScript.metadata"));
    assert!(matches!(err.root(), Error::EmptyList(name) if name == "capability"));
}

#[test]
fn bad_fixture_id_fails() {
    let mut value = fixture("testscript-example.json");
    value["test"][0]["action"][0]["operation"]["targetId"] = json!("not an id");

    let err = TestScript::from_value(value).unwrap_err();
    assert_eq!(err.location(), Some("TestScript.test[0].action[0].operation"));
    assert!(matches!(
        err.root(),
        Error::InvalidPrimitive { element, kind: "id", .. } if element == "targetId"
    ));
}

#[test]
fn missing_encode_request_url_fails_to_parse() {
    let mut value = fixture("testscript-example.json");
    value["teardown"]["action"][0]["operation"]
        .as_object_mut()
        .unwrap()
        .remove("encodeRequestUrl");

    let err = TestScript::from_value(value).unwrap_err();
    assert!(err.to_string().contains("encodeRequestUrl"));
}

#[test]
fn build_script_from_parts() {
    let read = Operation::builder()
        .type_(
            Coding::of(
                "http://terminology.hl7.org/CodeSystem/testscript-operation-codes",
                "read",
            )
            .unwrap(),
        )
        .resource("Patient")
        .encode_request_url(true)
        .add_request_header(
            RequestHeader::builder()
                .field("Accept")
                .value("application/fhir+json")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let script = TestScript::builder()
        .url("http://example.org/fhir/TestScript/read")
        .name("ReadPatient")
        .status(PublicationStatus::Active)
        .add_origin(
            Origin::builder()
                .index(1)
                .profile(
                    Coding::of(
                        "http://terminology.hl7.org/CodeSystem/testscript-profile-origin-types",
                        "FHIR-Client",
                    )
                    .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .add_test(
            Test::builder()
                .name("read")
                .add_action(TestAction::builder().operation(read).build().unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    assert_eq!(script.origin()[0].index(), 1);
    let header = &script.test()[0].action()[0].operation().unwrap().request_header()[0];
    assert_eq!(header.field(), "Accept");
}
