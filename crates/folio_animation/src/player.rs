//! Scroll-driven timeline player
//!
//! A [`TimelinePlayer`] maps an absolute scroll offset to a progress value
//! within its [`ScrollRange`] and applies the sampled keyframe tracks to a
//! [`PropertySink`]. Several players can run against the same scroll signal;
//! each one owns its own range and tracks.
//!
//! Two scrub modes are supported:
//!
//! - [`Scrub::Instant`]: properties follow the scroll offset exactly, applied
//!   synchronously on every scroll event.
//! - [`Scrub::Lag`]: the displayed progress chases the scroll progress on
//!   frame ticks, so the animation trails the scrollbar slightly.

use std::fmt;
use std::sync::Arc;

use crate::error::{AnimationError, Result};
use crate::keyframe::KeyframeTrack;
use crate::values::{ElementId, PropertySet};

/// Displayed progress within this distance of the target counts as caught up
const CATCH_UP_EPSILON: f32 = 1e-4;

// ============================================================================
// Scroll range
// ============================================================================

/// The absolute scroll offsets a timeline is bound to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRange {
    start: f32,
    end: f32,
}

impl ScrollRange {
    /// Create a range, rejecting empty, inverted, and non-finite ranges
    pub fn new(start: f32, end: f32) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(AnimationError::NonFiniteRange);
        }
        if end == start {
            return Err(AnimationError::ZeroLengthRange { start });
        }
        if end < start {
            return Err(AnimationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn length(&self) -> f32 {
        self.end - self.start
    }

    /// Progress of `offset` through the range, clamped to `[0, 1]`
    pub fn progress_at(&self, offset: f32) -> f32 {
        ((offset - self.start) / self.length()).clamp(0.0, 1.0)
    }

    fn region_of(&self, offset: f32) -> Region {
        if offset < self.start {
            Region::Before
        } else if offset > self.end {
            Region::After
        } else {
            Region::Active
        }
    }
}

// ============================================================================
// Scrub and toggle events
// ============================================================================

/// How a player follows the scroll offset
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Scrub {
    /// Apply on every scroll event
    #[default]
    Instant,
    /// Chase the scroll progress, covering ~95% of the gap in this many seconds
    Lag(f32),
}

/// Boundary crossings reported by a player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleEvent {
    /// Scrolled forward past the start
    Enter,
    /// Scrolled forward past the end
    Leave,
    /// Scrolled backward past the end
    EnterBack,
    /// Scrolled backward past the start
    LeaveBack,
}

/// Callback invoked on boundary crossings
pub type ToggleCallback = Arc<dyn Fn(ToggleEvent) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Before,
    Active,
    After,
}

fn crossings(from: Region, to: Region) -> &'static [ToggleEvent] {
    use Region::*;
    use ToggleEvent::*;
    match (from, to) {
        (Before, Active) => &[Enter],
        (Before, After) => &[Enter, Leave],
        (Active, After) => &[Leave],
        (After, Active) => &[EnterBack],
        (After, Before) => &[EnterBack, LeaveBack],
        (Active, Before) => &[LeaveBack],
        _ => &[],
    }
}

// ============================================================================
// Property sink
// ============================================================================

/// Receives the property values a player produces
///
/// Implementations typically write into a style table shared by every
/// player on the page.
pub trait PropertySink: Send + Sync {
    fn apply(&self, element: &ElementId, properties: &PropertySet);
}

// ============================================================================
// Timeline player
// ============================================================================

/// Drives a set of keyframe tracks from scroll position
pub struct TimelinePlayer {
    range: ScrollRange,
    tracks: Vec<KeyframeTrack>,
    scrub: Scrub,
    /// Progress implied by the last scroll offset
    target: f32,
    /// Progress currently shown
    displayed: f32,
    region: Option<Region>,
    on_toggle: Option<ToggleCallback>,
}

impl fmt::Debug for TimelinePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelinePlayer")
            .field("range", &self.range)
            .field("tracks", &self.tracks.len())
            .field("scrub", &self.scrub)
            .field("target", &self.target)
            .field("displayed", &self.displayed)
            .finish()
    }
}

impl TimelinePlayer {
    pub fn new(range: ScrollRange, tracks: Vec<KeyframeTrack>) -> Self {
        Self {
            range,
            tracks,
            scrub: Scrub::Instant,
            target: 0.0,
            displayed: 0.0,
            region: None,
            on_toggle: None,
        }
    }

    /// Set the scrub mode (builder pattern)
    pub fn with_scrub(mut self, scrub: Scrub) -> Self {
        self.scrub = scrub;
        self
    }

    /// Set a boundary-crossing callback (builder pattern)
    pub fn on_toggle<F>(mut self, callback: F) -> Self
    where
        F: Fn(ToggleEvent) + Send + Sync + 'static,
    {
        self.on_toggle = Some(Arc::new(callback));
        self
    }

    pub fn range(&self) -> ScrollRange {
        self.range
    }

    pub fn tracks(&self) -> &[KeyframeTrack] {
        &self.tracks
    }

    pub fn scrub(&self) -> Scrub {
        self.scrub
    }

    /// Progress currently shown
    pub fn progress(&self) -> f32 {
        self.displayed
    }

    /// Progress implied by the last scroll offset
    pub fn target_progress(&self) -> f32 {
        self.target
    }

    /// Whether a lagging player still has to catch up
    pub fn is_catching_up(&self) -> bool {
        (self.target - self.displayed).abs() > CATCH_UP_EPSILON
    }

    /// Jump straight to `offset` regardless of scrub mode and apply
    ///
    /// Used when a section mounts so its elements start in the right state.
    /// No toggle events are emitted.
    pub fn seek(&mut self, offset: f32, sink: &dyn PropertySink) {
        self.target = self.range.progress_at(offset);
        self.displayed = self.target;
        self.region = Some(self.range.region_of(offset));
        self.apply(sink);
    }

    /// React to a scroll offset change
    ///
    /// Returns true if properties were applied.
    pub fn scroll_to(&mut self, offset: f32, sink: &dyn PropertySink) -> bool {
        self.target = self.range.progress_at(offset);
        self.update_region(offset);

        match self.scrub {
            Scrub::Instant => {
                self.displayed = self.target;
                self.apply(sink);
                true
            }
            Scrub::Lag(_) => false,
        }
    }

    /// Advance a lagging player by `dt` seconds
    ///
    /// Returns true if properties were applied.
    pub fn advance(&mut self, dt: f32, sink: &dyn PropertySink) -> bool {
        let Scrub::Lag(lag) = self.scrub else {
            return false;
        };
        if !self.is_catching_up() {
            return false;
        }

        if lag <= 0.0 {
            self.displayed = self.target;
        } else {
            // ~95% of the remaining gap is covered after `lag` seconds
            let alpha = 1.0 - (-3.0 * dt.max(0.0) / lag).exp();
            self.displayed += (self.target - self.displayed) * alpha;
            if !self.is_catching_up() {
                self.displayed = self.target;
            }
        }

        self.apply(sink);
        true
    }

    /// Sample every track at `progress`
    pub fn sample(&self, progress: f32) -> Vec<(ElementId, PropertySet)> {
        self.tracks
            .iter()
            .map(|track| (track.element().clone(), track.sample(progress)))
            .collect()
    }

    /// Apply the displayed progress to `sink`
    pub fn apply(&self, sink: &dyn PropertySink) {
        for track in &self.tracks {
            sink.apply(track.element(), &track.sample(self.displayed));
        }
    }

    fn update_region(&mut self, offset: f32) {
        let region = self.range.region_of(offset);
        let previous = self.region.replace(region);

        let (Some(previous), Some(callback)) = (previous, self.on_toggle.as_ref()) else {
            return;
        };
        for event in crossings(previous, region) {
            tracing::trace!(?event, offset, "timeline boundary crossed");
            callback(*event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::{Keyframe, TimelineBuilder, Tween};
    use crate::values::Property;
    use crate::Easing;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        applied: Mutex<Vec<(ElementId, PropertySet)>>,
        calls: AtomicUsize,
    }

    impl RecordingSink {
        fn last_opacity(&self) -> f32 {
            let applied = self.applied.lock().unwrap();
            applied.last().unwrap().1.get(Property::Opacity).unwrap()
        }
    }

    impl PropertySink for RecordingSink {
        fn apply(&self, element: &ElementId, properties: &PropertySet) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.applied
                .lock()
                .unwrap()
                .push((element.clone(), properties.clone()));
        }
    }

    fn fade_player(start: f32, end: f32) -> TimelinePlayer {
        let track = KeyframeTrack::new(
            "fade",
            vec![
                Keyframe::linear(0.0, PropertySet::new().opacity(0.0)),
                Keyframe::linear(1.0, PropertySet::new().opacity(1.0)),
            ],
        )
        .unwrap();
        TimelinePlayer::new(ScrollRange::new(start, end).unwrap(), vec![track])
    }

    #[test]
    fn test_zero_length_range_is_rejected() {
        assert_eq!(
            ScrollRange::new(100.0, 100.0).unwrap_err(),
            AnimationError::ZeroLengthRange { start: 100.0 }
        );
        assert!(matches!(
            ScrollRange::new(200.0, 100.0),
            Err(AnimationError::InvertedRange { .. })
        ));
        assert_eq!(
            ScrollRange::new(f32::NAN, 1.0).unwrap_err(),
            AnimationError::NonFiniteRange
        );
    }

    #[test]
    fn test_progress_clamps() {
        let range = ScrollRange::new(100.0, 300.0).unwrap();

        for offset in [-50.0, 0.0, 99.9] {
            assert_eq!(range.progress_at(offset), 0.0);
        }
        for offset in [300.1, 500.0, 1e6] {
            assert_eq!(range.progress_at(offset), 1.0);
        }
        assert!((range.progress_at(150.0) - 0.25).abs() < 1e-6);
        assert!((range.progress_at(200.0) - 0.5).abs() < 1e-6);
        assert!((range.progress_at(250.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_instant_scrub_applies_on_scroll() {
        let sink = RecordingSink::default();
        let mut player = fade_player(0.0, 200.0);

        assert!(player.scroll_to(50.0, &sink));
        assert!((sink.last_opacity() - 0.25).abs() < 1e-4);

        assert!(player.scroll_to(400.0, &sink));
        assert!((sink.last_opacity() - 1.0).abs() < 1e-4);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_lag_scrub_catches_up_on_advance() {
        let sink = RecordingSink::default();
        let mut player = fade_player(0.0, 100.0).with_scrub(Scrub::Lag(0.6));
        player.seek(0.0, &sink);

        assert!(!player.scroll_to(100.0, &sink));
        assert_eq!(player.progress(), 0.0);
        assert_eq!(player.target_progress(), 1.0);

        assert!(player.advance(0.1, &sink));
        let early = player.progress();
        assert!(early > 0.0 && early < 1.0);

        // after the lag time most of the gap is covered
        player.advance(0.5, &sink);
        assert!(player.progress() > 0.94);

        for _ in 0..200 {
            player.advance(0.016, &sink);
        }
        assert_eq!(player.progress(), 1.0);
        assert!(!player.is_catching_up());
        assert!(!player.advance(0.016, &sink));
    }

    #[test]
    fn test_instant_player_ignores_advance() {
        let sink = RecordingSink::default();
        let mut player = fade_player(0.0, 100.0);
        player.scroll_to(50.0, &sink);
        assert!(!player.advance(0.016, &sink));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_toggle_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = RecordingSink::default();
        let mut player = fade_player(100.0, 200.0).on_toggle({
            let events = Arc::clone(&events);
            move |e| events.lock().unwrap().push(e)
        });

        player.seek(0.0, &sink);
        player.scroll_to(150.0, &sink);
        player.scroll_to(250.0, &sink);
        player.scroll_to(150.0, &sink);
        player.scroll_to(0.0, &sink);
        player.scroll_to(500.0, &sink);

        use ToggleEvent::*;
        assert_eq!(
            *events.lock().unwrap(),
            vec![Enter, Leave, EnterBack, LeaveBack, Enter, Leave]
        );
    }

    #[test]
    fn test_multi_element_timeline() {
        let tracks = TimelineBuilder::new()
            .add(
                Tween::from_to(
                    "headline",
                    PropertySet::new().x(0.0).opacity(1.0),
                    PropertySet::new().x(-100.0).opacity(0.25),
                )
                .at(0.7)
                .ease(Easing::Linear),
            )
            .add(
                Tween::from_to(
                    "location",
                    PropertySet::new().opacity(1.0),
                    PropertySet::new().opacity(0.2),
                )
                .at(0.75)
                .ease(Easing::Linear),
            )
            .build()
            .unwrap();
        let player = TimelinePlayer::new(ScrollRange::new(0.0, 1000.0).unwrap(), tracks);

        let start = player.sample(0.0);
        assert_eq!(start.len(), 2);
        assert_eq!(start[0].1.get(Property::X), Some(0.0));
        assert_eq!(start[1].1.get(Property::Opacity), Some(1.0));

        let end = player.sample(1.0);
        assert!((end[0].1.get(Property::X).unwrap() + 100.0).abs() < 1e-4);
        assert!((end[1].1.get(Property::Opacity).unwrap() - 0.2).abs() < 1e-4);
    }
}
