//! Keyframe tracks and tween timelines
//!
//! A [`KeyframeTrack`] is the per-element list of `(progress, properties)`
//! pairs that a timeline player samples. Tracks are usually not written by
//! hand: sections describe their choreography as tweens placed on a timeline
//! ([`TimelineBuilder`]), which is then flattened into one track per element
//! with all positions normalized to `[0, 1]`.
//!
//! # Example
//!
//! ```rust
//! use folio_animation::{Easing, PropertySet, TimelineBuilder, Tween};
//!
//! let tracks = TimelineBuilder::new()
//!     // entrance
//!     .add(Tween::from_to(
//!         "statement",
//!         PropertySet::new().y(400.0).opacity(0.0),
//!         PropertySet::new().y(0.0).opacity(1.0),
//!     ).ease(Easing::Linear))
//!     // exit
//!     .add(Tween::from_to(
//!         "statement",
//!         PropertySet::new().opacity(1.0),
//!         PropertySet::new().opacity(0.25),
//!     ).at(0.7).ease(Easing::PowerIn(2)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(tracks.len(), 1);
//! ```

use indexmap::IndexMap;

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::values::{ElementId, Interpolate, Property, PropertySet};

/// Default tween length in timeline units
pub const DEFAULT_TWEEN_DURATION: f32 = 0.5;

/// A single keyframe
#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe {
    /// Position within the owning range (0.0 to 1.0)
    pub progress: f32,
    /// Property values at this keyframe
    pub properties: PropertySet,
    /// Easing used when transitioning TO this keyframe
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(progress: f32, properties: PropertySet, easing: Easing) -> Self {
        Self {
            progress,
            properties,
            easing,
        }
    }

    /// Keyframe with linear easing
    pub fn linear(progress: f32, properties: PropertySet) -> Self {
        Self::new(progress, properties, Easing::Linear)
    }
}

/// The keyframes that drive one visual element
#[derive(Clone, Debug)]
pub struct KeyframeTrack {
    element: ElementId,
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    /// Create a track, validating the keyframes
    ///
    /// Every progress must be finite and within `[0, 1]`, and progress
    /// values must be non-decreasing.
    pub fn new(element: impl Into<ElementId>, keyframes: Vec<Keyframe>) -> Result<Self> {
        let element = element.into();

        let mut last = 0.0_f32;
        for keyframe in &keyframes {
            let progress = keyframe.progress;
            if !progress.is_finite() || !(0.0..=1.0).contains(&progress) {
                return Err(AnimationError::KeyframeOutOfRange {
                    element: element.to_string(),
                    progress,
                });
            }
            if progress < last {
                return Err(AnimationError::NonMonotonicKeyframes {
                    element: element.to_string(),
                });
            }
            if !keyframe.properties.is_finite() {
                return Err(AnimationError::InvalidTween {
                    element: element.to_string(),
                    reason: "non-finite property value".to_string(),
                });
            }
            last = progress;
        }

        Ok(Self { element, keyframes })
    }

    pub fn element(&self) -> &ElementId {
        &self.element
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Every property this track drives, in first-appearance order
    pub fn properties(&self) -> Vec<Property> {
        let mut out: Vec<Property> = Vec::new();
        for keyframe in &self.keyframes {
            for property in keyframe.properties.properties() {
                if !out.contains(&property) {
                    out.push(property);
                }
            }
        }
        out
    }

    /// Sample the track at `progress`
    ///
    /// Each property is interpolated independently between the keyframes
    /// that mention it. Before the first such keyframe the property holds its
    /// first value; after the last it holds its last value. When several
    /// keyframes share a progress value the later one wins.
    pub fn sample(&self, progress: f32) -> PropertySet {
        let t = progress.clamp(0.0, 1.0);
        let mut out = PropertySet::new();

        for property in self.properties() {
            let mut prev: Option<(&Keyframe, f32)> = None;
            let mut next: Option<(&Keyframe, f32)> = None;

            for keyframe in &self.keyframes {
                let Some(value) = keyframe.properties.get(property) else {
                    continue;
                };
                if keyframe.progress <= t {
                    prev = Some((keyframe, value));
                } else {
                    next = Some((keyframe, value));
                    break;
                }
            }

            let value = match (prev, next) {
                (Some((a, from)), Some((b, to))) => {
                    let span = b.progress - a.progress;
                    let local = if span > f32::EPSILON {
                        (t - a.progress) / span
                    } else {
                        1.0
                    };
                    from.lerp(&to, b.easing.apply(local))
                }
                (Some((_, value)), None) | (None, Some((_, value))) => value,
                (None, None) => continue,
            };
            out.set(property, value);
        }

        out
    }
}

// ============================================================================
// Tweens and timelines
// ============================================================================

/// A from/to transition placed on a timeline
#[derive(Clone, Debug)]
pub struct Tween {
    pub element: ElementId,
    pub from: PropertySet,
    pub to: PropertySet,
    /// Start position in timeline units
    pub position: f32,
    /// Length in timeline units
    pub duration: f32,
    pub easing: Easing,
}

impl Tween {
    /// Tween starting at position 0 with the default duration and a
    /// `power1.out` ease
    pub fn from_to(element: impl Into<ElementId>, from: PropertySet, to: PropertySet) -> Self {
        Self {
            element: element.into(),
            from,
            to,
            position: 0.0,
            duration: DEFAULT_TWEEN_DURATION,
            easing: Easing::PowerOut(1),
        }
    }

    pub fn at(mut self, position: f32) -> Self {
        self.position = position;
        self
    }

    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn end(&self) -> f32 {
        self.position + self.duration
    }

    /// A property both tweens animate while both are running
    fn conflict(&self, other: &Tween) -> Option<Property> {
        if self.element != other.element
            || self.position >= other.end()
            || other.position >= self.end()
        {
            return None;
        }
        self.from
            .properties()
            .chain(self.to.properties())
            .find(|&property| other.from.contains(property) || other.to.contains(property))
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| AnimationError::InvalidTween {
            element: self.element.to_string(),
            reason: reason.to_string(),
        };
        if !self.position.is_finite() || self.position < 0.0 {
            return Err(invalid("position must be finite and non-negative"));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(invalid("duration must be finite and non-negative"));
        }
        if !self.from.is_finite() || !self.to.is_finite() {
            return Err(invalid("non-finite property value"));
        }
        Ok(())
    }
}

/// Builds keyframe tracks from tweens placed on a shared timeline
#[derive(Clone, Debug, Default)]
pub struct TimelineBuilder {
    tweens: Vec<Tween>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tween (builder pattern)
    pub fn add(mut self, tween: Tween) -> Self {
        self.tweens.push(tween);
        self
    }

    /// Add the same tween for several elements
    pub fn add_each<I, E>(mut self, elements: I, tween: Tween) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ElementId>,
    {
        for element in elements {
            self.tweens.push(Tween {
                element: element.into(),
                ..tween.clone()
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Total timeline length: the latest tween end
    pub fn total_duration(&self) -> f32 {
        self.tweens.iter().map(Tween::end).fold(0.0, f32::max)
    }

    /// Flatten the timeline into one track per element
    ///
    /// Tracks come out in the order their elements first appear on the
    /// timeline (by tween position, ties in insertion order).
    pub fn build(self) -> Result<Vec<KeyframeTrack>> {
        for tween in &self.tweens {
            tween.validate()?;
        }

        let total = self.total_duration();
        if self.tweens.is_empty() || total <= 0.0 {
            return Err(AnimationError::EmptyTimeline);
        }

        let mut tweens = self.tweens;
        tweens.sort_by(|a, b| a.position.total_cmp(&b.position));
        for (i, tween) in tweens.iter().enumerate() {
            for later in &tweens[i + 1..] {
                if let Some(property) = tween.conflict(later) {
                    return Err(AnimationError::OverlappingTweens {
                        element: tween.element.to_string(),
                        property: property.name().to_string(),
                    });
                }
            }
        }

        let mut per_element: IndexMap<ElementId, Vec<Keyframe>> = IndexMap::new();

        for tween in tweens {
            let start = (tween.position / total).clamp(0.0, 1.0);
            let end = (tween.end() / total).clamp(0.0, 1.0);
            let keyframes = per_element.entry(tween.element).or_default();
            keyframes.push(Keyframe::linear(start, tween.from));
            keyframes.push(Keyframe::new(end, tween.to, tween.easing));
        }

        per_element
            .into_iter()
            .map(|(element, mut keyframes)| {
                // Tweens on one element touch at most at their ends
                keyframes.sort_by(|a, b| a.progress.total_cmp(&b.progress));
                KeyframeTrack::new(element, keyframes)
            })
            .collect()
    }
}
