use lattice_models::prelude::*;
use lattice_models::PathTracker;

fn small_script() -> TestScript {
    let operation = Operation::builder()
        .resource("Patient")
        .encode_request_url(true)
        .build()
        .unwrap();
    TestScript::builder()
        .id("ts")
        .url("http://example.org/ts")
        .name("Small")
        .status(PublicationStatus::Draft)
        .setup(
            Setup::builder()
                .add_action(SetupAction::builder().operation(operation).build().unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

/// Records every hook as a line of text.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    skip_children_of: Option<&'static str>,
    reject: Option<&'static str>,
}

impl Visitor for Recorder {
    fn pre_visit(&mut self, element: &dyn Visitable) -> bool {
        let allowed = self.reject != Some(element.type_name());
        self.events.push(format!("pre {}", element.type_name()));
        allowed
    }

    fn visit_start(&mut self, name: &str, index: Option<usize>, _element: &dyn Visitable) {
        match index {
            Some(i) => self.events.push(format!("start {name}[{i}]")),
            None => self.events.push(format!("start {name}")),
        }
    }

    fn visit(&mut self, _name: &str, _index: Option<usize>, element: &dyn Visitable) -> bool {
        self.skip_children_of != Some(element.type_name())
    }

    fn visit_end(&mut self, name: &str, _index: Option<usize>, _element: &dyn Visitable) {
        self.events.push(format!("end {name}"));
    }

    fn post_visit(&mut self, element: &dyn Visitable) {
        self.events.push(format!("post {}", element.type_name()));
    }

    fn visit_list_start(&mut self, name: &str, len: usize) {
        self.events.push(format!("list {name} {len}"));
    }

    fn visit_list_end(&mut self, name: &str, _len: usize) {
        self.events.push(format!("/list {name}"));
    }
}

fn starts(events: &[String]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| e.strip_prefix("start "))
        .collect()
}

#[test]
fn children_are_visited_in_declaration_order() {
    let script = small_script();
    let mut recorder = Recorder::default();
    script.accept("TestScript", None, &mut recorder);

    assert_eq!(
        starts(&recorder.events),
        vec![
            "TestScript",
            "id",
            "url",
            "name",
            "status",
            "setup",
            "action[0]",
            "operation",
            "resource",
            "encodeRequestUrl",
        ]
    );
}

#[test]
fn hook_sequence_wraps_each_element() {
    let reference = Reference::to("Substance/1").unwrap();
    let mut recorder = Recorder::default();
    reference.accept("additive", None, &mut recorder);

    assert_eq!(
        recorder.events,
        vec![
            "pre Reference",
            "start additive",
            "pre string",
            "start reference",
            "end reference",
            "post string",
            "end additive",
            "post Reference",
        ]
    );
}

#[test]
fn list_hooks_surround_repeated_fields() {
    let script = small_script();
    let mut recorder = Recorder::default();
    script.accept("TestScript", None, &mut recorder);

    let list_start = recorder
        .events
        .iter()
        .position(|e| e == "list action 1")
        .unwrap();
    let list_end = recorder
        .events
        .iter()
        .position(|e| e == "/list action")
        .unwrap();
    let item = recorder
        .events
        .iter()
        .position(|e| e == "start action[0]")
        .unwrap();
    assert!(list_start < item && item < list_end);
    assert!(!recorder.events.iter().any(|e| e.starts_with("list test")));
}

#[test]
fn visit_false_skips_children_only() {
    let script = small_script();
    let mut recorder = Recorder {
        skip_children_of: Some("TestScript.Setup"),
        ..Default::default()
    };
    script.accept("TestScript", None, &mut recorder);

    assert!(recorder.events.contains(&"start setup".to_string()));
    assert!(recorder.events.contains(&"end setup".to_string()));
    assert!(recorder.events.contains(&"post TestScript.Setup".to_string()));
    assert!(!recorder.events.iter().any(|e| e.starts_with("start action")));
}

#[test]
fn pre_visit_false_skips_everything() {
    let script = small_script();
    let mut recorder = Recorder {
        reject: Some("TestScript.Setup"),
        ..Default::default()
    };
    script.accept("TestScript", None, &mut recorder);

    assert!(recorder.events.contains(&"pre TestScript.Setup".to_string()));
    assert!(!recorder.events.contains(&"start setup".to_string()));
    assert!(!recorder.events.contains(&"end setup".to_string()));
    assert!(!recorder.events.contains(&"post TestScript.Setup".to_string()));
    assert_eq!(recorder.events.last().unwrap(), "post TestScript");
}

#[test]
fn choice_is_visited_under_its_element_name() {
    let container = Container::builder()
        .minimum_volume_string("2 mL")
        .add_additive(
            Additive::builder()
                .additive_codeable_concept(CodeableConcept::text_only("EDTA").unwrap())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let mut recorder = Recorder::default();
    container.accept("container", None, &mut recorder);
    let starts = starts(&recorder.events);
    assert!(starts.contains(&"minimumVolume"));
    assert!(starts.contains(&"additive[0]"));
    assert!(starts.contains(&"additive"));
    assert!(recorder.events.contains(&"pre CodeableConcept".to_string()));
}

/// Collects the location and value of every primitive.
#[derive(Default)]
struct Primitives {
    path: PathTracker,
    found: Vec<(String, String)>,
}

impl Visitor for Primitives {
    fn visit_start(&mut self, name: &str, index: Option<usize>, element: &dyn Visitable) {
        self.path.push(name, index);
        if let Some(value) = element.as_primitive() {
            self.found.push((self.path.path(), value.to_string()));
        }
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _element: &dyn Visitable) {
        self.path.pop();
    }
}

#[test]
fn primitives_expose_values_and_paths() {
    let script = small_script();
    let mut collector = Primitives::default();
    script.accept("TestScript", None, &mut collector);

    assert!(collector
        .found
        .contains(&("TestScript.status".to_string(), "draft".to_string())));
    assert!(collector.found.contains(&(
        "TestScript.setup.action[0].operation.encodeRequestUrl".to_string(),
        "true".to_string()
    )));
    assert!(collector.found.contains(&(
        "TestScript.setup.action[0].operation.resource".to_string(),
        "\"Patient\"".to_string()
    )));
    assert_eq!(collector.path.depth(), 0);
}

/// Finds every operation in a tree by downcasting.
#[derive(Default)]
struct Operations(Vec<String>);

impl Visitor for Operations {
    fn visit(&mut self, _name: &str, _index: Option<usize>, element: &dyn Visitable) -> bool {
        if let Some(operation) = element.downcast_ref::<Operation>() {
            self.0.push(operation.resource().unwrap_or_default().to_string());
        }
        true
    }
}

#[test]
fn downcasting_during_traversal() {
    let resource = Resource::from(small_script());
    let mut operations = Operations::default();
    resource.accept("TestScript", None, &mut operations);
    assert_eq!(operations.0, vec!["Patient".to_string()]);
}
