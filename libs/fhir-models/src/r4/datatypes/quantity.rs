//! Quantity and its profiles, plus Range

use crate::common::error::{Error, Result};
use crate::common::hash::{impl_cached_hash, HashCache};
use crate::common::validation;
use crate::common::visitor::{accept_composite, accept_optional, Validate, Visitable, Visitor};
use crate::r4::codes::QuantityComparator;
use crate::r4::element::{impl_element, Element, ElementBase, ElementBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::ops::Deref;

/// A measured amount (or an amount that can potentially be measured)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    #[serde(flatten)]
    base: ElementBase,

    /// Numerical value (with implicit precision)
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Decimal>,

    /// < | <= | >= | > - how to understand the value
    #[serde(skip_serializing_if = "Option::is_none")]
    comparator: Option<QuantityComparator>,

    /// Unit representation
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,

    /// System that defines coded unit form
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Coded form of the unit
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Quantity { base, value, comparator, unit, system, code });

impl Quantity {
    pub fn builder() -> QuantityBuilder {
        QuantityBuilder::default()
    }

    pub fn to_builder(&self) -> QuantityBuilder {
        QuantityBuilder::from(self.clone())
    }

    pub fn value(&self) -> Option<&Decimal> {
        self.value.as_ref()
    }

    pub fn comparator(&self) -> Option<QuantityComparator> {
        self.comparator
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn accept_children(&self, visitor: &mut dyn Visitor) {
        self.base.accept_children(visitor);
        accept_optional(&self.value, "value", visitor);
        accept_optional(&self.comparator, "comparator", visitor);
        accept_optional(&self.unit, "unit", visitor);
        accept_optional(&self.system, "system", visitor);
        accept_optional(&self.code, "code", visitor);
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuantityBuilder {
    base: ElementBase,
    value: Option<Decimal>,
    comparator: Option<QuantityComparator>,
    unit: Option<String>,
    system: Option<String>,
    code: Option<String>,
    validating: Option<bool>,
}

impl From<Quantity> for QuantityBuilder {
    fn from(value: Quantity) -> Self {
        Self {
            base: value.base,
            value: value.value,
            comparator: value.comparator,
            unit: value.unit,
            system: value.system,
            code: value.code,
            validating: None,
        }
    }
}

impl QuantityBuilder {
    pub fn value(mut self, value: impl Into<Decimal>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn comparator(mut self, comparator: QuantityComparator) -> Self {
        self.comparator = Some(comparator);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    fn into_parts(self) -> (Quantity, Option<bool>) {
        let quantity = Quantity {
            base: self.base,
            value: self.value,
            comparator: self.comparator,
            unit: self.unit,
            system: self.system,
            code: self.code,
            hash_cache: HashCache::default(),
        };
        (quantity, self.validating)
    }

    pub fn build(self) -> Result<Quantity> {
        let (quantity, validating) = self.into_parts();
        validation::finish(quantity, validating)
    }
}

impl_element!(Quantity, QuantityBuilder);

impl Validate for Quantity {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children()
                || self.value.is_some()
                || self.comparator.is_some()
                || self.unit.is_some()
                || self.system.is_some()
                || self.code.is_some(),
            "Quantity",
        )?;
        validation::check_uri(self.system.as_deref(), "system")?;
        validation::check_code(self.code.as_deref(), "code")?;
        Ok(())
    }
}

impl Visitable for Quantity {
    fn type_name(&self) -> &'static str {
        "Quantity"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| self.accept_children(v));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// SimpleQuantity
// ============================================================================

/// A Quantity without a comparator (sqty-1)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimpleQuantity(Quantity);

impl SimpleQuantity {
    pub fn builder() -> SimpleQuantityBuilder {
        SimpleQuantityBuilder::default()
    }

    pub fn to_builder(&self) -> SimpleQuantityBuilder {
        SimpleQuantityBuilder::from(self.clone())
    }

    pub fn into_quantity(self) -> Quantity {
        self.0
    }
}

impl Deref for SimpleQuantity {
    type Target = Quantity;

    fn deref(&self) -> &Quantity {
        &self.0
    }
}

/// Builder without a comparator setter
#[derive(Debug, Clone, Default)]
pub struct SimpleQuantityBuilder(QuantityBuilder);

impl From<SimpleQuantity> for SimpleQuantityBuilder {
    fn from(value: SimpleQuantity) -> Self {
        Self(QuantityBuilder::from(value.0))
    }
}

impl SimpleQuantityBuilder {
    pub fn value(self, value: impl Into<Decimal>) -> Self {
        Self(self.0.value(value))
    }

    pub fn unit(self, unit: impl Into<String>) -> Self {
        Self(self.0.unit(unit))
    }

    pub fn system(self, system: impl Into<String>) -> Self {
        Self(self.0.system(system))
    }

    pub fn code(self, code: impl Into<String>) -> Self {
        Self(self.0.code(code))
    }

    pub fn validating(self, enabled: bool) -> Self {
        Self(self.0.validating(enabled))
    }

    pub fn build(self) -> Result<SimpleQuantity> {
        let (quantity, validating) = self.0.into_parts();
        validation::finish(SimpleQuantity(quantity), validating)
    }
}

impl Element for SimpleQuantity {
    fn element_base(&self) -> &ElementBase {
        &self.0.base
    }
}

impl ElementBuilder for SimpleQuantityBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.0.base
    }
}

impl Validate for SimpleQuantity {
    fn validate(&self) -> Result<()> {
        self.0.validate()?;
        if self.0.comparator.is_some() {
            return Err(Error::Invariant {
                key: "sqty-1",
                human: "The comparator is not used on a SimpleQuantity",
            });
        }
        Ok(())
    }
}

impl Visitable for SimpleQuantity {
    fn type_name(&self) -> &'static str {
        "SimpleQuantity"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| self.0.accept_children(v));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Duration
// ============================================================================

/// A length of time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(Quantity);

impl Duration {
    pub fn builder() -> DurationBuilder {
        DurationBuilder::default()
    }

    /// A UCUM-coded duration, e.g. `Duration::ucum(24, "h")`.
    pub fn ucum(value: impl Into<Decimal>, code: &str) -> Result<Self> {
        Self::builder()
            .value(value)
            .unit(code)
            .system("http://unitsofmeasure.org")
            .code(code)
            .build()
    }

    pub fn to_builder(&self) -> DurationBuilder {
        DurationBuilder::from(self.clone())
    }

    pub fn into_quantity(self) -> Quantity {
        self.0
    }
}

impl Deref for Duration {
    type Target = Quantity;

    fn deref(&self) -> &Quantity {
        &self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DurationBuilder(QuantityBuilder);

impl From<Duration> for DurationBuilder {
    fn from(value: Duration) -> Self {
        Self(QuantityBuilder::from(value.0))
    }
}

impl DurationBuilder {
    pub fn value(self, value: impl Into<Decimal>) -> Self {
        Self(self.0.value(value))
    }

    pub fn comparator(self, comparator: QuantityComparator) -> Self {
        Self(self.0.comparator(comparator))
    }

    pub fn unit(self, unit: impl Into<String>) -> Self {
        Self(self.0.unit(unit))
    }

    pub fn system(self, system: impl Into<String>) -> Self {
        Self(self.0.system(system))
    }

    pub fn code(self, code: impl Into<String>) -> Self {
        Self(self.0.code(code))
    }

    pub fn validating(self, enabled: bool) -> Self {
        Self(self.0.validating(enabled))
    }

    pub fn build(self) -> Result<Duration> {
        let (quantity, validating) = self.0.into_parts();
        validation::finish(Duration(quantity), validating)
    }
}

impl Element for Duration {
    fn element_base(&self) -> &ElementBase {
        &self.0.base
    }
}

impl ElementBuilder for DurationBuilder {
    fn element_base_mut(&mut self) -> &mut ElementBase {
        &mut self.0.base
    }
}

impl Validate for Duration {
    fn validate(&self) -> Result<()> {
        self.0.validate()
    }
}

impl Visitable for Duration {
    fn type_name(&self) -> &'static str {
        "Duration"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| self.0.accept_children(v));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Range
// ============================================================================

/// Set of values bounded by low and high
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    #[serde(flatten)]
    base: ElementBase,

    /// Low limit
    #[serde(skip_serializing_if = "Option::is_none")]
    low: Option<SimpleQuantity>,

    /// High limit
    #[serde(skip_serializing_if = "Option::is_none")]
    high: Option<SimpleQuantity>,

    #[serde(skip)]
    hash_cache: HashCache,
}

impl_cached_hash!(Range { base, low, high });

impl Range {
    pub fn builder() -> RangeBuilder {
        RangeBuilder::default()
    }

    pub fn to_builder(&self) -> RangeBuilder {
        RangeBuilder::from(self.clone())
    }

    pub fn low(&self) -> Option<&SimpleQuantity> {
        self.low.as_ref()
    }

    pub fn high(&self) -> Option<&SimpleQuantity> {
        self.high.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RangeBuilder {
    base: ElementBase,
    low: Option<SimpleQuantity>,
    high: Option<SimpleQuantity>,
    validating: Option<bool>,
}

impl From<Range> for RangeBuilder {
    fn from(value: Range) -> Self {
        Self {
            base: value.base,
            low: value.low,
            high: value.high,
            validating: None,
        }
    }
}

impl RangeBuilder {
    pub fn low(mut self, low: SimpleQuantity) -> Self {
        self.low = Some(low);
        self
    }

    pub fn high(mut self, high: SimpleQuantity) -> Self {
        self.high = Some(high);
        self
    }

    pub fn validating(mut self, enabled: bool) -> Self {
        self.validating = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Range> {
        validation::finish(
            Range {
                base: self.base,
                low: self.low,
                high: self.high,
                hash_cache: HashCache::default(),
            },
            self.validating,
        )
    }
}

impl_element!(Range, RangeBuilder);

impl Validate for Range {
    fn validate(&self) -> Result<()> {
        validation::require_value_or_children(
            self.base.has_children() || self.low.is_some() || self.high.is_some(),
            "Range",
        )
    }
}

impl Visitable for Range {
    fn type_name(&self) -> &'static str {
        "Range"
    }

    fn accept(&self, name: &str, index: Option<usize>, visitor: &mut dyn Visitor) {
        accept_composite(self, name, index, visitor, |v| {
            self.base.accept_children(v);
            accept_optional(&self.low, "low", v);
            accept_optional(&self.high, "high", v);
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_serializes_as_number() {
        let quantity = Quantity::builder()
            .value(Decimal::new(25, 1))
            .unit("mL")
            .build()
            .unwrap();
        assert_eq!(
            serde_json::to_value(&quantity).unwrap(),
            serde_json::json!({"value": 2.5, "unit": "mL"})
        );
    }

    #[test]
    fn test_simple_quantity_is_transparent() {
        let simple: SimpleQuantity = serde_json::from_value(serde_json::json!({
            "value": 10,
            "unit": "mL",
            "system": "http://unitsofmeasure.org",
            "code": "mL"
        }))
        .unwrap();
        assert_eq!(simple.value(), Some(&Decimal::from(10)));
        assert_eq!(simple.code(), Some("mL"));
    }

    #[test]
    fn test_simple_quantity_rejects_comparator() {
        let simple: SimpleQuantity =
            serde_json::from_value(serde_json::json!({"value": 1, "comparator": "<"})).unwrap();
        let err = simple.validate().unwrap_err();
        assert!(matches!(err, Error::Invariant { key: "sqty-1", .. }));
    }

    #[test]
    fn test_duration_ucum() {
        let duration = Duration::ucum(24, "h").unwrap();
        assert_eq!(duration.system(), Some("http://unitsofmeasure.org"));
        assert_eq!(duration.to_builder().build().unwrap(), duration);
        assert_eq!(duration.type_name(), "Duration");
    }

    #[test]
    fn test_range() {
        let low = SimpleQuantity::builder().value(2).unit("Cel").build().unwrap();
        let high = SimpleQuantity::builder().value(8).unit("Cel").build().unwrap();
        let range = Range::builder().low(low.clone()).high(high).build().unwrap();
        assert_eq!(range.low(), Some(&low));
        assert!(Range::builder().build().is_err());
    }
}
