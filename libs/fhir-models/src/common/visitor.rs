//! Double-dispatch traversal of model values
//!
//! Every model type implements [`Visitable`]. Calling `accept` walks the value
//! and all of its children in declaration order, reporting each element to a
//! [`Visitor`]:
//!
//! ```text
//! pre_visit ──false──▶ (nothing)
//!     │true
//! visit_start
//! visit ──true──▶ children (inherited fields first, then own fields)
//! visit_end
//! post_visit
//! ```
//!
//! Repeated fields with at least one item are wrapped in
//! `visit_list_start` / `visit_list_end`, and every item is visited with its
//! index. Primitive values are leaves and expose their value through
//! [`Visitable::as_primitive`].

use super::error::Result;
use rust_decimal::Decimal;
use std::any::Any;
use std::fmt;

/// Build-time checks of a single element, excluding its children.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub trait Visitable: Validate + Any {
    /// FHIR type name, e.g. `CodeableConcept` or `TestScript.Setup`.
    fn type_name(&self) -> &'static str;

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor);

    fn as_any(&self) -> &dyn Any;

    fn as_primitive(&self) -> Option<Primitive<'_>> {
        None
    }
}

impl<'a> dyn Visitable + 'a {
    pub fn downcast_ref<T: Visitable>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Visitable>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Hooks invoked while walking a value. All hooks default to "continue".
#[allow(unused_variables)]
pub trait Visitor {
    fn pre_visit(&mut self, element: &dyn Visitable) -> bool {
        true
    }

    fn visit_start(&mut self, name: &str, index: Option<usize>, element: &dyn Visitable) {}

    /// Return `false` to skip the children of `element`.
    fn visit(&mut self, name: &str, index: Option<usize>, element: &dyn Visitable) -> bool {
        true
    }

    fn visit_end(&mut self, name: &str, index: Option<usize>, element: &dyn Visitable) {}

    fn post_visit(&mut self, element: &dyn Visitable) {}

    fn visit_list_start(&mut self, name: &str, len: usize) {}

    fn visit_list_end(&mut self, name: &str, len: usize) {}
}

/// Primitive value seen at a leaf of the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive<'a> {
    String(&'a str),
    Boolean(bool),
    Integer(i32),
    UnsignedInt(u32),
    Decimal(&'a Decimal),
    Code(&'static str),
}

impl fmt::Display for Primitive<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::String(s) => write!(f, "{s:?}"),
            Primitive::Boolean(b) => write!(f, "{b}"),
            Primitive::Integer(i) => write!(f, "{i}"),
            Primitive::UnsignedInt(u) => write!(f, "{u}"),
            Primitive::Decimal(d) => write!(f, "{d}"),
            Primitive::Code(c) => write!(f, "{c}"),
        }
    }
}

/// Walk a composite element: the hook sequence around `children`.
pub fn accept_composite<T: Visitable>(
    element: &T,
    name: &str,
    index: Option<usize>,
    visitor: &mut dyn Visitor,
    children: impl FnOnce(&mut dyn Visitor),
) {
    if !visitor.pre_visit(element) {
        return;
    }
    visitor.visit_start(name, index, element);
    if visitor.visit(name, index, element) {
        children(visitor);
    }
    visitor.visit_end(name, index, element);
    visitor.post_visit(element);
}

/// Walk a leaf element.
pub fn accept_leaf(element: &dyn Visitable, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
    if !visitor.pre_visit(element) {
        return;
    }
    visitor.visit_start(name, index, element);
    visitor.visit(name, index, element);
    visitor.visit_end(name, index, element);
    visitor.post_visit(element);
}

pub fn accept_optional<T: Visitable>(value: &Option<T>, name: &str, visitor: &mut dyn Visitor) {
    if let Some(value) = value {
        value.accept(name, None, visitor);
    }
}

pub fn accept_list<T: Visitable>(items: &[T], name: &str, visitor: &mut dyn Visitor) {
    if items.is_empty() {
        return;
    }
    visitor.visit_list_start(name, items.len());
    for (i, item) in items.iter().enumerate() {
        item.accept(name, Some(i), visitor);
    }
    visitor.visit_list_end(name, items.len());
}

macro_rules! leaf_visitable {
    ($ty:ty, $name:literal, |$v:ident| $prim:expr) => {
        impl Visitable for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
                accept_leaf(self, name, index, visitor);
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_primitive(&self) -> Option<Primitive<'_>> {
                let $v = self;
                Some($prim)
            }
        }
    };
}

leaf_visitable!(String, "string", |v| Primitive::String(v.as_str()));
leaf_visitable!(bool, "boolean", |v| Primitive::Boolean(*v));
leaf_visitable!(i32, "integer", |v| Primitive::Integer(*v));
leaf_visitable!(u32, "unsignedInt", |v| Primitive::UnsignedInt(*v));
leaf_visitable!(Decimal, "decimal", |v| Primitive::Decimal(v));

impl Validate for String {
    fn validate(&self) -> Result<()> {
        super::validation::check_string(Some(self.as_str()), "value")
    }
}

impl Validate for bool {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Validate for i32 {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Validate for u32 {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Validate for Decimal {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Tracks the FHIRPath-style location of the element being visited.
///
/// Call [`PathTracker::push`] from `visit_start` and [`PathTracker::pop`]
/// from `visit_end`.
#[derive(Debug, Default, Clone)]
pub struct PathTracker {
    segments: Vec<String>,
}

impl PathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, index: Option<usize>) {
        let segment = match index {
            Some(i) => format!("{name}[{i}]"),
            None => name.to_string(),
        };
        self.segments.push(segment);
    }

    pub fn pop(&mut self) {
        self.segments.pop();
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn path(&self) -> String {
        self.segments.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Events(Vec<String>);

    impl Visitor for Events {
        fn visit_start(&mut self, name: &str, index: Option<usize>, element: &dyn Visitable) {
            self.0.push(format!("start {name} {index:?} {}", element.type_name()));
        }

        fn visit_end(&mut self, name: &str, _index: Option<usize>, _element: &dyn Visitable) {
            self.0.push(format!("end {name}"));
        }

        fn visit_list_start(&mut self, name: &str, len: usize) {
            self.0.push(format!("list {name} {len}"));
        }
    }

    #[test]
    fn test_leaf_sequence() {
        let mut events = Events::default();
        true.accept("flag", None, &mut events);
        assert_eq!(events.0, vec!["start flag None boolean", "end flag"]);
    }

    #[test]
    fn test_list_indices() {
        let mut events = Events::default();
        accept_list(&[1i32, 2], "origin", &mut events);
        assert_eq!(
            events.0,
            vec![
                "list origin 2",
                "start origin Some(0) integer",
                "end origin",
                "start origin Some(1) integer",
                "end origin",
            ]
        );
    }

    #[test]
    fn test_empty_list_is_silent() {
        let mut events = Events::default();
        accept_list::<String>(&[], "link", &mut events);
        assert!(events.0.is_empty());
    }

    #[test]
    fn test_downcast() {
        let value = "abc".to_string();
        let element: &dyn Visitable = &value;
        assert!(element.is::<String>());
        assert_eq!(element.downcast_ref::<String>().map(String::as_str), Some("abc"));
        assert_eq!(element.as_primitive(), Some(Primitive::String("abc")));
    }

    #[test]
    fn test_path_tracker() {
        let mut path = PathTracker::new();
        path.push("TestScript", None);
        path.push("setup", None);
        path.push("action", Some(1));
        assert_eq!(path.path(), "TestScript.setup.action[1]");
        path.pop();
        assert_eq!(path.path(), "TestScript.setup");
        assert_eq!(path.depth(), 2);
    }
}
