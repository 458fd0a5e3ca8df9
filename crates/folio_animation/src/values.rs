//! Animatable value types
//!
//! Provides the interpolation trait and the property sets that keyframes
//! carry: translation offsets, opacity, and scale.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Element identity
// ============================================================================

/// Identifier of a visual element inside a section (e.g. `"about/statement"`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Properties
// ============================================================================

/// A visual property that a timeline can drive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    /// Horizontal offset in pixels
    X,
    /// Vertical offset in pixels
    Y,
    Opacity,
    /// Uniform scale
    Scale,
    ScaleX,
    ScaleY,
}

impl Property {
    /// The value an element has when nothing animates it
    pub fn rest_value(self) -> f32 {
        match self {
            Property::X | Property::Y => 0.0,
            Property::Opacity | Property::Scale | Property::ScaleX | Property::ScaleY => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Opacity => "opacity",
            Property::Scale => "scale",
            Property::ScaleX => "scaleX",
            Property::ScaleY => "scaleY",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A sparse set of property values
///
/// Only the properties that are present are driven; an element's other
/// properties are left alone. Insertion order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySet {
    values: SmallVec<[(Property, f32); 4]>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value
    pub fn set(&mut self, property: Property, value: f32) {
        match self.values.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.values.push((property, value)),
        }
    }

    /// Builder form of [`PropertySet::set`]
    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.set(property, value);
        self
    }

    pub fn x(self, value: f32) -> Self {
        self.with(Property::X, value)
    }

    pub fn y(self, value: f32) -> Self {
        self.with(Property::Y, value)
    }

    pub fn opacity(self, value: f32) -> Self {
        self.with(Property::Opacity, value)
    }

    pub fn scale(self, value: f32) -> Self {
        self.with(Property::Scale, value)
    }

    pub fn scale_x(self, value: f32) -> Self {
        self.with(Property::ScaleX, value)
    }

    pub fn scale_y(self, value: f32) -> Self {
        self.with(Property::ScaleY, value)
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        self.values
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, property: Property) -> bool {
        self.get(property).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, f32)> + '_ {
        self.values.iter().copied()
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.values.iter().map(|(p, _)| *p)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of self
    pub fn merge(&mut self, other: &PropertySet) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }

    /// The same properties, each at its rest value
    pub fn at_rest(&self) -> PropertySet {
        let mut rest = PropertySet::new();
        for property in self.properties() {
            rest.set(property, property.rest_value());
        }
        rest
    }

    /// Whether every value is finite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|(_, v)| v.is_finite())
    }
}

impl Interpolate for PropertySet {
    /// Properties present on both sides are interpolated; one-sided
    /// properties keep the value they have.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut out = self.clone();
        for (property, to) in other.iter() {
            let value = match self.get(property) {
                Some(from) => from.lerp(&to, t),
                None => to,
            };
            out.set(property, value);
        }
        out
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.len() == other.len()
            && self.iter().all(|(property, value)| {
                other
                    .get(property)
                    .is_some_and(|o| value.approx_eq(&o, epsilon))
            })
    }
}

impl FromIterator<(Property, f32)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (Property, f32)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (property, value) in iter {
            set.set(property, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_replaces() {
        let mut set = PropertySet::new().opacity(0.0);
        set.set(Property::Opacity, 0.5);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(Property::Opacity), Some(0.5));
    }

    #[test]
    fn test_property_set_lerp() {
        let from = PropertySet::new().y(400.0).opacity(0.0);
        let to = PropertySet::new().y(0.0).opacity(1.0);
        let mid = from.lerp(&to, 0.5);

        assert!((mid.get(Property::Y).unwrap() - 200.0).abs() < 1e-4);
        assert!((mid.get(Property::Opacity).unwrap() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_lerp_keeps_one_sided_properties() {
        let from = PropertySet::new().x(10.0);
        let to = PropertySet::new().opacity(0.5);
        let out = from.lerp(&to, 0.3);

        assert_eq!(out.get(Property::X), Some(10.0));
        assert_eq!(out.get(Property::Opacity), Some(0.5));
    }

    #[test]
    fn test_at_rest() {
        let set = PropertySet::new().x(-120.0).opacity(0.25).scale_x(0.0);
        let rest = set.at_rest();

        assert_eq!(rest.get(Property::X), Some(0.0));
        assert_eq!(rest.get(Property::Opacity), Some(1.0));
        assert_eq!(rest.get(Property::ScaleX), Some(1.0));
    }

    #[test]
    fn test_approx_eq_requires_same_properties() {
        let a = PropertySet::new().x(1.0);
        let b = PropertySet::new().x(1.0).y(0.0);
        assert!(!a.approx_eq(&b, 1e-3));
        assert!(a.approx_eq(&PropertySet::new().x(1.0005), 1e-3));
    }
}
