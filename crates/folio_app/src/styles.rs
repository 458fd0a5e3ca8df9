//! Element style table
//!
//! [`ElementStyles`] is the property sink every player on the page writes
//! into. Each write merges into the element's current properties, so tracks
//! that animate different properties of one element compose.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use folio_animation::{ElementId, Property, PropertySet, PropertySink};
use rustc_hash::FxHashMap;

/// Current animated properties of every element
#[derive(Debug, Default)]
pub struct ElementStyles {
    styles: RwLock<FxHashMap<ElementId, PropertySet>>,
    writes: AtomicU64,
}

impl ElementStyles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Properties of `element`, if anything has been applied to it
    pub fn get(&self, element: &str) -> Option<PropertySet> {
        self.styles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ElementId::from(element))
            .cloned()
    }

    /// One property of `element`
    pub fn value(&self, element: &str, property: Property) -> Option<f32> {
        self.get(element).and_then(|props| props.get(property))
    }

    /// Every styled element, sorted by id
    pub fn snapshot(&self) -> Vec<(ElementId, PropertySet)> {
        let mut entries: Vec<_> = self
            .styles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, props)| (id.clone(), props.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.styles.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of writes since creation
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.styles.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl PropertySink for ElementStyles {
    fn apply(&self, element: &ElementId, properties: &PropertySet) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        let mut styles = self.styles.write().unwrap_or_else(PoisonError::into_inner);
        match styles.get_mut(element) {
            Some(current) => current.merge(properties),
            None => {
                styles.insert(element.clone(), properties.clone());
            }
        }
    }
}

/// Render properties as inline CSS
pub fn to_css(properties: &PropertySet) -> String {
    let get = |property| properties.get(property);
    let mut css = String::new();

    if let Some(opacity) = get(Property::Opacity) {
        let _ = write!(css, "opacity: {opacity:.3};");
    }

    let mut transform = String::new();
    if get(Property::X).is_some() || get(Property::Y).is_some() {
        let x = get(Property::X).unwrap_or(0.0);
        let y = get(Property::Y).unwrap_or(0.0);
        let _ = write!(transform, "translate({x:.1}px, {y:.1}px)");
    }
    let uniform = get(Property::Scale).unwrap_or(1.0);
    let scale_x = get(Property::ScaleX).unwrap_or(1.0) * uniform;
    let scale_y = get(Property::ScaleY).unwrap_or(1.0) * uniform;
    if [Property::Scale, Property::ScaleX, Property::ScaleY]
        .into_iter()
        .any(|p| properties.contains(p))
    {
        if !transform.is_empty() {
            transform.push(' ');
        }
        let _ = write!(transform, "scale({scale_x:.3}, {scale_y:.3})");
    }

    if !transform.is_empty() {
        if !css.is_empty() {
            css.push(' ');
        }
        let _ = write!(css, "transform: {transform};");
    }
    css
}
