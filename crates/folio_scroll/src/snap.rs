//! Global scroll snapping
//!
//! Pinned spans are normalized to fractions of the page's scrollable
//! distance. When scrolling comes to rest inside (or within a small buffer
//! of) a pinned interval, the resting point is pulled to the nearest pinned
//! center. Everywhere else scroll is left where the user put it.
//!
//! # Example
//!
//! ```rust
//! use folio_scroll::{NormalizedInterval, SnapResolver};
//!
//! let resolver = SnapResolver::new(
//!     vec![
//!         NormalizedInterval::new(0.0, 0.2),
//!         NormalizedInterval::new(0.4, 0.5),
//!         NormalizedInterval::new(0.8, 1.0),
//!     ],
//!     0.02,
//! );
//!
//! assert!((resolver.resolve(0.42) - 0.45).abs() < 1e-6);
//! assert_eq!(resolver.resolve(0.3), 0.3);
//! ```

use std::time::Duration;

use folio_animation::Easing;
use serde::{Deserialize, Serialize};

use crate::barrier::DEFAULT_SETTLE_DELAY;
use crate::registry::PinEntry;

/// Distance (as a fraction of scrollable distance) around a pinned interval
/// that still counts as inside it
pub const DEFAULT_SNAP_BUFFER: f32 = 0.02;

/// Name of the page-level snap rule slot
pub const GLOBAL_SNAP_RULE: &str = "global-scroll-snap";

const DEFAULT_MIN_DURATION_MS: u64 = 150;
const DEFAULT_MAX_DURATION_MS: u64 = 350;

// ============================================================================
// Normalized intervals
// ============================================================================

/// A pinned span expressed as a fraction of the scrollable distance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedInterval {
    pub start: f32,
    pub end: f32,
    pub center: f32,
}

impl NormalizedInterval {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            center: start + (end - start) / 2.0,
        }
    }

    /// Whether `value` is within `buffer` of the interval
    pub fn contains(&self, value: f32, buffer: f32) -> bool {
        value >= self.start - buffer && value <= self.end + buffer
    }
}

/// Normalize registry entries against `max_scroll`
///
/// Returns nothing when there is no scrollable distance.
pub fn normalize(entries: &[PinEntry], max_scroll: f32) -> Vec<NormalizedInterval> {
    if !max_scroll.is_finite() || max_scroll <= 0.0 {
        return Vec::new();
    }
    entries
        .iter()
        .map(|entry| NormalizedInterval {
            start: entry.span.start() / max_scroll,
            end: entry.span.end() / max_scroll,
            center: entry.span.center() / max_scroll,
        })
        .collect()
}

/// Resolve a scroll fraction to its resting fraction
///
/// Outside every (buffered) interval the value is returned unchanged. Inside,
/// the nearest center wins; on a tie the earlier interval wins.
pub fn resolve_snap(value: f32, intervals: &[NormalizedInterval], buffer: f32) -> f32 {
    if !intervals.iter().any(|r| r.contains(value, buffer)) {
        return value;
    }

    let mut best = value;
    let mut best_distance = f32::INFINITY;
    for interval in intervals {
        let distance = (interval.center - value).abs();
        if distance < best_distance {
            best = interval.center;
            best_distance = distance;
        }
    }
    best
}

/// Snap resolution over a fixed set of intervals
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapResolver {
    intervals: Vec<NormalizedInterval>,
    buffer: f32,
}

impl SnapResolver {
    pub fn new(intervals: Vec<NormalizedInterval>, buffer: f32) -> Self {
        Self {
            intervals,
            buffer: buffer.max(0.0),
        }
    }

    /// Build from a registry snapshot
    pub fn from_snapshot(entries: &[PinEntry], max_scroll: f32, buffer: f32) -> Self {
        Self::new(normalize(entries, max_scroll), buffer)
    }

    pub fn intervals(&self) -> &[NormalizedInterval] {
        &self.intervals
    }

    pub fn buffer(&self) -> f32 {
        self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn in_pinned(&self, value: f32) -> bool {
        self.intervals.iter().any(|r| r.contains(value, self.buffer))
    }

    pub fn resolve(&self, value: f32) -> f32 {
        resolve_snap(value, &self.intervals, self.buffer)
    }
}

// ============================================================================
// Snap animation and rule
// ============================================================================

/// How the host animates to a snap target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapAnimation {
    /// Seconds, used for tiny corrections
    pub min_duration: f32,
    /// Seconds, used for corrections of a full viewport or more
    pub max_duration: f32,
    /// Seconds to wait after release before moving
    pub delay: f32,
    pub easing: Easing,
}

impl Default for SnapAnimation {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION_MS as f32 / 1000.0,
            max_duration: DEFAULT_MAX_DURATION_MS as f32 / 1000.0,
            delay: 0.0,
            easing: Easing::PowerOut(2),
        }
    }
}

impl SnapAnimation {
    /// Duration for a move of `distance` px in a viewport `viewport_height` px tall
    pub fn duration_for(&self, distance: f32, viewport_height: f32) -> f32 {
        let t = if viewport_height > 0.0 {
            (distance.abs() / viewport_height).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.min_duration + (self.max_duration - self.min_duration) * t
    }
}

/// A named snap rule installed into a scroll host
#[derive(Clone, Debug, PartialEq)]
pub struct SnapRule {
    name: String,
    resolver: SnapResolver,
    animation: SnapAnimation,
}

impl SnapRule {
    pub fn new(name: impl Into<String>, resolver: SnapResolver, animation: SnapAnimation) -> Self {
        Self {
            name: name.into(),
            resolver,
            animation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolver(&self) -> &SnapResolver {
        &self.resolver
    }

    pub fn animation(&self) -> &SnapAnimation {
        &self.animation
    }

    /// Resting offset in px for a scroll that ended at `offset`
    pub fn target(&self, offset: f32, max_scroll: f32) -> f32 {
        if !max_scroll.is_finite() || max_scroll <= 0.0 {
            return offset;
        }
        self.resolver.resolve(offset / max_scroll) * max_scroll
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Snapping configuration, as read from the `[snap]` table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Snap rule slot name
    pub name: String,
    /// Buffer around pinned intervals, as a fraction of scrollable distance
    pub buffer: f32,
    /// Mount barrier deadline
    pub settle_ms: u64,
    pub min_duration_ms: u64,
    pub max_duration_ms: u64,
    pub delay_ms: u64,
    pub easing: Easing,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            name: GLOBAL_SNAP_RULE.to_owned(),
            buffer: DEFAULT_SNAP_BUFFER,
            settle_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            min_duration_ms: DEFAULT_MIN_DURATION_MS,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            delay_ms: 0,
            easing: Easing::PowerOut(2),
        }
    }
}

impl SnapConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn animation(&self) -> SnapAnimation {
        let min = self.min_duration_ms.min(self.max_duration_ms);
        SnapAnimation {
            min_duration: min as f32 / 1000.0,
            max_duration: self.max_duration_ms as f32 / 1000.0,
            delay: self.delay_ms as f32 / 1000.0,
            easing: self.easing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{PinRegistry, PinSpan, SectionId};

    fn example() -> SnapResolver {
        SnapResolver::new(
            vec![
                NormalizedInterval::new(0.0, 0.2),
                NormalizedInterval::new(0.4, 0.5),
                NormalizedInterval::new(0.8, 1.0),
            ],
            DEFAULT_SNAP_BUFFER,
        )
    }

    #[test]
    fn test_example_intervals() {
        let resolver = example();
        assert!((resolver.resolve(0.42) - 0.45).abs() < 1e-6);
        assert_eq!(resolver.resolve(0.3), 0.3);
    }

    #[test]
    fn test_identity_on_flowing_regions() {
        let resolver = example();
        for value in [0.23, 0.3, 0.37, 0.6, 0.77] {
            assert_eq!(resolver.resolve(value), value);
        }
    }

    #[test]
    fn test_nearest_center_inside_pinned() {
        let resolver = example();
        assert!((resolver.resolve(0.05) - 0.1).abs() < 1e-6);
        assert!((resolver.resolve(0.19) - 0.1).abs() < 1e-6);
        assert!((resolver.resolve(0.99) - 0.9).abs() < 1e-6);
        // Inside the buffer
        assert!((resolver.resolve(0.215) - 0.1).abs() < 1e-6);
        assert!((resolver.resolve(0.385) - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_tie_goes_to_first_interval() {
        // Overlapping spans: 0.5 is equidistant from both centers
        let resolver = SnapResolver::new(
            vec![NormalizedInterval::new(0.3, 0.5), NormalizedInterval::new(0.5, 0.7)],
            0.0,
        );
        for _ in 0..10 {
            assert!((resolver.resolve(0.5) - 0.4).abs() < 1e-6);
        }
    }

    #[test]
    fn test_empty_is_identity() {
        let resolver = SnapResolver::default();
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve(0.0), 0.0);
        assert_eq!(resolver.resolve(0.5), 0.5);
        assert_eq!(resolve_snap(1.0, &[], DEFAULT_SNAP_BUFFER), 1.0);
    }

    #[test]
    fn test_normalize_uses_max_scroll() {
        let registry = PinRegistry::new();
        let id = SectionId::from("hero");
        registry.register(id.clone(), PinSpan::new(&id, 0.0, 400.0).unwrap());

        let intervals = normalize(&registry.snapshot(), 2000.0);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].end - 0.2).abs() < 1e-6);
        assert!((intervals[0].center - 0.1).abs() < 1e-6);

        assert!(normalize(&registry.snapshot(), 0.0).is_empty());
    }

    #[test]
    fn test_rule_target_in_pixels() {
        let rule = SnapRule::new(GLOBAL_SNAP_RULE, example(), SnapAnimation::default());
        assert!((rule.target(840.0, 2000.0) - 900.0).abs() < 1e-3);
        assert_eq!(rule.target(600.0, 2000.0), 600.0);
        assert_eq!(rule.target(600.0, 0.0), 600.0);
    }

    #[test]
    fn test_duration_scales_with_distance() {
        let animation = SnapAnimation::default();
        assert!((animation.duration_for(0.0, 800.0) - 0.15).abs() < 1e-6);
        assert!((animation.duration_for(400.0, 800.0) - 0.25).abs() < 1e-6);
        assert!((animation.duration_for(-5000.0, 800.0) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_config_defaults() {
        let config = SnapConfig::default();
        assert_eq!(config.name, GLOBAL_SNAP_RULE);
        assert_eq!(config.settle_delay(), Duration::from_millis(100));
        let animation = config.animation();
        assert!((animation.min_duration - 0.15).abs() < 1e-6);
        assert!((animation.max_duration - 0.35).abs() < 1e-6);
        assert_eq!(animation.easing, Easing::PowerOut(2));
    }
}
