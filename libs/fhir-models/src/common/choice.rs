//! JSON reading for choice-typed (`[x]`) elements
//!
//! A choice element is stored as a flattened enum, one variant per
//! permitted type. Reading it from the parent's flattened map counts every
//! `<element><Type>` key: two keys for the same element, or a type the
//! element does not permit, fail the parse. Errors inside the selected
//! value are propagated.

use serde::de::{self, Deserializer, IgnoredAny, MapAccess};
use std::fmt;
use std::marker::PhantomData;

pub(crate) trait ChoiceType: Sized {
    /// Element name without the type suffix
    const ELEMENT: &'static str;
    /// JSON key of every variant
    const KEYS: &'static [&'static str];

    fn read_entry<'de, A: MapAccess<'de>>(key: &str, map: &mut A) -> Result<Self, A::Error>;
}

/// `valueQuantity` belongs to `value`; `values` and `value` do not.
fn is_choice_key(key: &str, element: &str) -> bool {
    key.strip_prefix(element)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

struct ChoiceVisitor<T>(PhantomData<T>);

impl<'de, T: ChoiceType> de::Visitor<'de> for ChoiceVisitor<T> {
    type Value = Option<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at most one {}[x] element", T::ELEMENT)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut found: Option<(String, T)> = None;
        while let Some(key) = map.next_key::<String>()? {
            if !is_choice_key(&key, T::ELEMENT) {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if !T::KEYS.contains(&key.as_str()) {
                return Err(de::Error::unknown_field(&key, T::KEYS));
            }
            if let Some((first, _)) = &found {
                return Err(de::Error::custom(format!(
                    "{}[x] has more than one value: '{first}' and '{key}'",
                    T::ELEMENT
                )));
            }
            let value = T::read_entry(&key, &mut map)?;
            found = Some((key, value));
        }
        Ok(found.map(|(_, value)| value))
    }
}

pub(crate) fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: ChoiceType,
{
    deserializer.deserialize_map(ChoiceVisitor(PhantomData))
}

pub(crate) fn required<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: ChoiceType,
{
    optional(deserializer)?.ok_or_else(|| {
        de::Error::custom(format!("missing required element '{}[x]'", T::ELEMENT))
    })
}

/// Implement [`ChoiceType`] for an enum whose variants each wrap one type.
macro_rules! impl_choice {
    ($ty:ident, $element:literal { $($key:literal => $variant:ident),+ $(,)? }) => {
        impl $crate::common::choice::ChoiceType for $ty {
            const ELEMENT: &'static str = $element;
            const KEYS: &'static [&'static str] = &[$($key),+];

            fn read_entry<'de, A: ::serde::de::MapAccess<'de>>(
                key: &str,
                map: &mut A,
            ) -> ::std::result::Result<Self, A::Error> {
                match key {
                    $($key => map.next_value().map($ty::$variant),)+
                    _ => Err(::serde::de::Error::unknown_field(key, Self::KEYS)),
                }
            }
        }
    };
}

pub(crate) use impl_choice;
