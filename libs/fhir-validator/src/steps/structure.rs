//! Structural checks of every element
//!
//! Runs each element's own `validate()` while walking the tree. Unlike
//! [`lattice_models::validation::validate_tree`], the walk does not stop at
//! the first failure: every failing element is reported with its location.

use crate::validator::ValidationIssue;
use crate::StructurePlan;
use lattice_models::{Error, PathTracker, Resource, Visitable, Visitor};

pub fn validate_structure(
    resource: &Resource,
    plan: &StructurePlan,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut walker = StructureWalker {
        plan,
        path: PathTracker::new(),
        issues,
    };
    resource.accept(resource.resource_type(), None, &mut walker);
}

struct StructureWalker<'a> {
    plan: &'a StructurePlan,
    path: PathTracker,
    issues: &'a mut Vec<ValidationIssue>,
}

impl StructureWalker<'_> {
    fn reports(&self, err: &Error) -> bool {
        match err.root() {
            Error::InvalidReferenceType { .. } | Error::ReferenceTypeMismatch { .. } => {
                self.plan.check_reference_types
            }
            _ => true,
        }
    }
}

impl Visitor for StructureWalker<'_> {
    fn visit_start(&mut self, name: &str, index: Option<usize>, _element: &dyn Visitable) {
        self.path.push(name, index);
    }

    fn visit(&mut self, _name: &str, _index: Option<usize>, element: &dyn Visitable) -> bool {
        if let Err(err) = element.validate() {
            if self.reports(&err) {
                let mut location = self.path.path();
                if element.as_primitive().is_none() {
                    if let Some(child) = child_element(&err) {
                        location = format!("{location}.{child}");
                    }
                }
                tracing::trace!(%location, error = %err, "structure issue");
                self.issues.push(
                    ValidationIssue::for_model_error(&err)
                        .with_location(location.clone())
                        .with_expression(vec![location]),
                );
            }
        }
        true
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _element: &dyn Visitable) {
        self.path.pop();
    }
}

/// The child element an error is about, when it names one.
fn child_element(err: &Error) -> Option<&str> {
    match err.root() {
        Error::MissingRequiredElement(element) | Error::EmptyList(element) => Some(element),
        Error::InvalidReferenceType { element, .. }
        | Error::ReferenceTypeMismatch { element, .. }
        | Error::InvalidPrimitive { element, .. } => Some(element),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IssueCode;
    use serde_json::json;

    fn unchecked(value: serde_json::Value) -> Resource {
        Resource::from_value_unchecked(value).unwrap()
    }

    #[test]
    fn test_reports_every_failure() {
        let resource = unchecked(json!({
            "resourceType": "TestScript",
            "url": "http://example.org/ts",
            "name": "Broken",
            "status": "draft",
            "setup": {"action": []},
            "test": [{"action": []}]
        }));
        let mut issues = Vec::new();
        validate_structure(
            &resource,
            &StructurePlan {
                check_reference_types: true,
            },
            &mut issues,
        );

        let locations: Vec<_> = issues.iter().filter_map(|i| i.location.as_deref()).collect();
        assert_eq!(
            locations,
            vec!["TestScript.setup.action", "TestScript.test[0].action"]
        );
        assert!(issues.iter().all(|i| i.code == IssueCode::Required));
    }

    #[test]
    fn test_reference_types_can_be_ignored() {
        let resource = unchecked(json!({
            "resourceType": "SpecimenDefinition",
            "typeTested": [{
                "preference": "preferred",
                "container": {
                    "additive": [{"additiveReference": {"reference": "Medication/heparin"}}]
                }
            }]
        }));

        let mut issues = Vec::new();
        validate_structure(
            &resource,
            &StructurePlan {
                check_reference_types: true,
            },
            &mut issues,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].location.as_deref(),
            Some("SpecimenDefinition.typeTested[0].container.additive[0].additive")
        );
        assert_eq!(issues[0].code, IssueCode::Value);

        let mut issues = Vec::new();
        validate_structure(
            &resource,
            &StructurePlan {
                check_reference_types: false,
            },
            &mut issues,
        );
        assert!(issues.is_empty());
    }
}
