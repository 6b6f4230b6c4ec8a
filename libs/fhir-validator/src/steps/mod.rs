//! Validation steps, one module per [`crate::Step`] variant

pub mod invariants;
pub mod structure;

/// Element path with list indices removed, e.g.
/// `TestScript.setup.action[2].assert` becomes `TestScript.setup.action.assert`.
pub(crate) fn element_path(location: &str) -> String {
    let mut path = String::with_capacity(location.len());
    let mut in_index = false;
    for c in location.chars() {
        match c {
            '[' => in_index = true,
            ']' => in_index = false,
            c if !in_index => path.push(c),
            _ => {}
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_path() {
        assert_eq!(
            element_path("TestScript.test[0].action[12].operation"),
            "TestScript.test.action.operation"
        );
        assert_eq!(element_path("SpecimenDefinition"), "SpecimenDefinition");
    }
}
