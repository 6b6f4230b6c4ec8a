//! Evaluation of declared invariants while walking the tree

use crate::invariants::{self, Invariant, InvariantSeverity};
use crate::validator::{IssueCode, IssueSeverity, ValidationIssue};
use crate::{BestPracticeMode, InvariantsMode, InvariantsPlan};
use lattice_models::{PathTracker, Resource, Visitable, Visitor};

pub fn validate_invariants(
    resource: &Resource,
    plan: &InvariantsPlan,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut walker = InvariantWalker {
        plan,
        path: PathTracker::new(),
        issues,
    };
    resource.accept(resource.resource_type(), None, &mut walker);
}

struct InvariantWalker<'a> {
    plan: &'a InvariantsPlan,
    path: PathTracker,
    issues: &'a mut Vec<ValidationIssue>,
}

impl InvariantWalker<'_> {
    /// Severity a violation is reported with, or `None` if it is not evaluated.
    fn severity_for(&self, invariant: &Invariant) -> Option<IssueSeverity> {
        if self.plan.is_suppressed(invariant.key) {
            return Some(IssueSeverity::Information);
        }
        match invariant.severity {
            InvariantSeverity::Rule => Some(IssueSeverity::Error),
            InvariantSeverity::Guideline if self.plan.mode == InvariantsMode::RulesOnly => None,
            InvariantSeverity::Guideline => match self.plan.best_practice {
                BestPracticeMode::Ignore => None,
                BestPracticeMode::Warn => Some(IssueSeverity::Warning),
                BestPracticeMode::Error => Some(IssueSeverity::Error),
            },
        }
    }
}

impl Visitor for InvariantWalker<'_> {
    fn visit_start(&mut self, name: &str, index: Option<usize>, _element: &dyn Visitable) {
        self.path.push(name, index);
    }

    fn visit(&mut self, _name: &str, _index: Option<usize>, element: &dyn Visitable) -> bool {
        if element.as_primitive().is_some() {
            return true;
        }
        let location = self.path.path();
        let element_path = super::element_path(&location);

        for invariant in invariants::applicable(element.type_name(), &element_path) {
            let Some(severity) = self.severity_for(invariant) else {
                continue;
            };
            tracing::trace!(key = invariant.key, %location, "evaluating invariant");
            if invariant.holds(element) {
                continue;
            }

            let issue = if severity == IssueSeverity::Information {
                ValidationIssue::information(
                    IssueCode::Suppressed,
                    format!("{} (suppressed): {}", invariant.key, invariant.human),
                )
            } else {
                ValidationIssue::new(
                    severity,
                    IssueCode::Invariant,
                    format!("{}: {}", invariant.key, invariant.human),
                )
            };
            self.issues.push(
                issue
                    .with_location(location.clone())
                    .with_expression(vec![location.clone()]),
            );
        }
        true
    }

    fn visit_end(&mut self, _name: &str, _index: Option<usize>, _element: &dyn Visitable) {
        self.path.pop();
    }
}
