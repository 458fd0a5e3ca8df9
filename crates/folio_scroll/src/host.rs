//! Scroll host
//!
//! The [`ScrollHost`] trait is everything the sequencer needs from the thing
//! that actually scrolls: the current offset, the scrollable distance, a
//! subscription to scroll events, one named snap-rule slot, and animated
//! scrolling to a target.
//!
//! [`Viewport`] is the in-process host. It holds the page geometry and the
//! scroll offset, and is driven explicitly: `scroll_to`/`scroll_by` for user
//! scrolling, `release` when the gesture ends, and `advance(dt)` once per
//! frame.
//!
//! # Example
//!
//! ```rust
//! use folio_scroll::{ScrollHost, Viewport};
//!
//! let viewport = Viewport::new(1280.0, 800.0);
//! viewport.set_content_height(4000.0);
//!
//! viewport.scroll_by(600.0);
//! assert_eq!(viewport.offset(), 600.0);
//! assert_eq!(viewport.max_scroll(), 3200.0);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use folio_animation::{Easing, ScrollTween};

use crate::signal::{ScrollEvent, ScrollListener, ScrollSignal, ScrollSubscription};
use crate::snap::SnapRule;

/// Moves shorter than this (px) are not animated
const MIN_SNAP_DISTANCE: f32 = 0.5;

// ============================================================================
// Host trait
// ============================================================================

/// What the sequencer needs from a scrolling surface
pub trait ScrollHost: Send + Sync {
    /// Current scroll offset in px
    fn offset(&self) -> f32;

    /// Total scrollable distance in px
    fn max_scroll(&self) -> f32;

    fn viewport_height(&self) -> f32;

    /// Subscribe to scroll events; the listener is attached while the
    /// returned handle lives
    fn subscribe(&self, listener: ScrollListener) -> ScrollSubscription;

    /// Put `rule` in the snap slot, returning whatever was there
    fn install_snap_rule(&self, rule: SnapRule) -> Option<SnapRule>;

    /// Empty the snap slot if it holds a rule named `name`
    fn remove_snap_rule(&self, name: &str) -> Option<SnapRule>;

    /// Name of the installed snap rule, if any
    fn snap_rule_name(&self) -> Option<String>;

    /// Animate the offset to `target` over `duration` seconds after `delay`
    fn animate_to(&self, target: f32, duration: f32, delay: f32, easing: Easing);
}

// ============================================================================
// Viewport
// ============================================================================

#[derive(Debug)]
struct ViewportState {
    width: f32,
    height: f32,
    content_height: f32,
    offset: f32,
    tween: Option<ScrollTween>,
    snap_rule: Option<SnapRule>,
}

impl ViewportState {
    fn max_scroll(&self) -> f32 {
        (self.content_height - self.height).max(0.0)
    }

    fn clamp(&self, offset: f32) -> f32 {
        offset.clamp(0.0, self.max_scroll())
    }
}

/// In-process scroll host
///
/// Clones share the same state and signal.
#[derive(Clone)]
pub struct Viewport {
    state: Arc<Mutex<ViewportState>>,
    signal: ScrollSignal,
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Viewport")
            .field("width", &state.width)
            .field("height", &state.height)
            .field("content_height", &state.content_height)
            .field("offset", &state.offset)
            .field("animating", &state.tween.is_some())
            .field("snap_rule", &state.snap_rule.as_ref().map(SnapRule::name))
            .finish()
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            state: Arc::new(Mutex::new(ViewportState {
                width: width.max(0.0),
                height: height.max(0.0),
                content_height: height.max(0.0),
                offset: 0.0,
                tween: None,
                snap_rule: None,
            })),
            signal: ScrollSignal::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn signal(&self) -> &ScrollSignal {
        &self.signal
    }

    pub fn width(&self) -> f32 {
        self.lock().width
    }

    pub fn height(&self) -> f32 {
        self.lock().height
    }

    pub fn content_height(&self) -> f32 {
        self.lock().content_height
    }

    /// Set the laid-out page height; the offset is clamped into range
    pub fn set_content_height(&self, content_height: f32) {
        let moved = {
            let mut state = self.lock();
            state.content_height = content_height.max(0.0);
            let clamped = state.clamp(state.offset);
            let moved = clamped != state.offset;
            state.offset = clamped;
            moved.then_some(clamped)
        };
        if let Some(offset) = moved {
            self.signal.emit(ScrollEvent::Scrolled { offset });
        }
    }

    /// Change the viewport size; the offset is clamped into range
    pub fn resize(&self, width: f32, height: f32) {
        let moved = {
            let mut state = self.lock();
            state.width = width.max(0.0);
            state.height = height.max(0.0);
            state.tween = None;
            let clamped = state.clamp(state.offset);
            let moved = clamped != state.offset;
            state.offset = clamped;
            moved.then_some(clamped)
        };
        tracing::debug!(width, height, "viewport resized");
        if let Some(offset) = moved {
            self.signal.emit(ScrollEvent::Scrolled { offset });
        }
    }

    /// User scroll to an absolute offset
    ///
    /// Cancels any running scroll animation. Returns the clamped offset.
    pub fn scroll_to(&self, offset: f32) -> f32 {
        let (offset, moved) = {
            let mut state = self.lock();
            state.tween = None;
            let clamped = state.clamp(offset);
            let moved = clamped != state.offset;
            state.offset = clamped;
            (clamped, moved)
        };
        if moved {
            self.signal.emit(ScrollEvent::Scrolled { offset });
        }
        offset
    }

    /// User scroll by a delta
    pub fn scroll_by(&self, delta: f32) -> f32 {
        let current = self.lock().offset;
        self.scroll_to(current + delta)
    }

    /// Current offset as a fraction of the scrollable distance
    pub fn scroll_fraction(&self) -> f32 {
        let state = self.lock();
        let max = state.max_scroll();
        if max > 0.0 {
            state.offset / max
        } else {
            0.0
        }
    }

    /// The scroll gesture ended
    ///
    /// Consults the installed snap rule and starts animating towards its
    /// target. Returns the target when a snap was started.
    pub fn release(&self) -> Option<f32> {
        let mut state = self.lock();
        let rule = state.snap_rule.as_ref()?;

        let max = state.max_scroll();
        let target = state.clamp(rule.target(state.offset, max));
        let distance = target - state.offset;
        if distance.abs() < MIN_SNAP_DISTANCE {
            return None;
        }

        let animation = *rule.animation();
        let duration = animation.duration_for(distance, state.height);
        tracing::debug!(
            from = state.offset,
            target,
            duration,
            rule = rule.name(),
            "snapping"
        );
        state.tween = Some(
            ScrollTween::new(state.offset, target, duration, animation.easing)
                .with_delay(animation.delay),
        );
        Some(target)
    }

    /// Smoothly scroll to `target` (anchor navigation)
    pub fn smooth_scroll_to(&self, target: f32, duration: f32, easing: Easing) {
        self.animate_to(target, duration, 0.0, easing);
    }

    pub fn is_animating(&self) -> bool {
        self.lock().tween.is_some()
    }

    /// Target of the running scroll animation
    pub fn animation_target(&self) -> Option<f32> {
        self.lock().tween.as_ref().map(ScrollTween::target)
    }

    /// Advance one frame of `dt` seconds
    ///
    /// Steps any scroll animation, emits `Scrolled` if the offset moved, then
    /// emits `Frame`. Returns true while a scroll animation is running.
    pub fn advance(&self, dt: f32) -> bool {
        let (offset, moved, animating) = {
            let mut state = self.lock();
            let previous = state.offset;
            let mut done = false;
            if let Some(tween) = state.tween.as_mut() {
                let value = tween.advance(dt);
                done = tween.is_done();
                state.offset = state.clamp(value);
            }
            if done {
                state.tween = None;
            }
            (state.offset, state.offset != previous, state.tween.is_some())
        };

        if moved {
            self.signal.emit(ScrollEvent::Scrolled { offset });
        }
        self.signal.emit(ScrollEvent::Frame { offset, dt });
        animating
    }

    /// Advance in `dt` steps until no scroll animation is running
    ///
    /// Gives up after `max_frames`. Returns the number of frames advanced.
    pub fn settle(&self, dt: f32, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.advance(dt) {
            frames += 1;
        }
        frames
    }
}

impl ScrollHost for Viewport {
    fn offset(&self) -> f32 {
        self.lock().offset
    }

    fn max_scroll(&self) -> f32 {
        self.lock().max_scroll()
    }

    fn viewport_height(&self) -> f32 {
        self.lock().height
    }

    fn subscribe(&self, listener: ScrollListener) -> ScrollSubscription {
        self.signal.subscribe_listener(listener)
    }

    fn install_snap_rule(&self, rule: SnapRule) -> Option<SnapRule> {
        self.lock().snap_rule.replace(rule)
    }

    fn remove_snap_rule(&self, name: &str) -> Option<SnapRule> {
        let mut state = self.lock();
        if state.snap_rule.as_ref().is_some_and(|rule| rule.name() == name) {
            state.snap_rule.take()
        } else {
            None
        }
    }

    fn snap_rule_name(&self) -> Option<String> {
        self.lock().snap_rule.as_ref().map(|rule| rule.name().to_owned())
    }

    fn animate_to(&self, target: f32, duration: f32, delay: f32, easing: Easing) {
        let mut state = self.lock();
        let target = state.clamp(target);
        state.tween = Some(ScrollTween::new(state.offset, target, duration, easing).with_delay(delay));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::{NormalizedInterval, SnapAnimation, SnapResolver, GLOBAL_SNAP_RULE};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page() -> Viewport {
        let viewport = Viewport::new(1000.0, 500.0);
        viewport.set_content_height(2500.0);
        viewport
    }

    fn rule() -> SnapRule {
        SnapRule::new(
            GLOBAL_SNAP_RULE,
            SnapResolver::new(vec![NormalizedInterval::new(0.4, 0.5)], 0.02),
            SnapAnimation::default(),
        )
    }

    #[test]
    fn test_scroll_clamps() {
        let viewport = page();
        assert_eq!(viewport.max_scroll(), 2000.0);
        assert_eq!(viewport.scroll_to(-10.0), 0.0);
        assert_eq!(viewport.scroll_to(5000.0), 2000.0);
        assert_eq!(viewport.scroll_fraction(), 1.0);
    }

    #[test]
    fn test_scroll_emits_only_on_change() {
        let viewport = page();
        let count = Arc::new(AtomicUsize::new(0));
        let _sub = viewport.subscribe(Arc::new({
            let count = Arc::clone(&count);
            move |event: &ScrollEvent| {
                if matches!(event, ScrollEvent::Scrolled { .. }) {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            }
        }));

        viewport.scroll_to(100.0);
        viewport.scroll_to(100.0);
        viewport.scroll_by(50.0);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_release_without_rule_is_noop() {
        let viewport = page();
        viewport.scroll_to(840.0);
        assert_eq!(viewport.release(), None);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn test_release_snaps_to_target() {
        let viewport = page();
        viewport.install_snap_rule(rule());
        viewport.scroll_to(840.0);

        let target = viewport.release().unwrap();
        assert!((target - 900.0).abs() < 1e-3);
        viewport.settle(1.0 / 60.0, 120);
        assert!((viewport.offset() - 900.0).abs() < 1e-3);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn test_zero_duration_snap_lands_in_one_frame() {
        let viewport = page();
        viewport.install_snap_rule(SnapRule::new(
            GLOBAL_SNAP_RULE,
            SnapResolver::new(vec![NormalizedInterval::new(0.4, 0.5)], 0.02),
            SnapAnimation {
                min_duration: 0.0,
                max_duration: 0.0,
                ..SnapAnimation::default()
            },
        ));
        viewport.scroll_to(840.0);

        assert_eq!(viewport.release(), Some(900.0));
        assert!(!viewport.advance(0.0));
        assert!((viewport.offset() - 900.0).abs() < 1e-3);
    }

    #[test]
    fn test_release_in_flowing_region_stays() {
        let viewport = page();
        viewport.install_snap_rule(rule());
        viewport.scroll_to(300.0);
        assert_eq!(viewport.release(), None);
        assert_eq!(viewport.offset(), 300.0);
    }

    #[test]
    fn test_user_scroll_cancels_snap() {
        let viewport = page();
        viewport.install_snap_rule(rule());
        viewport.scroll_to(840.0);
        viewport.release();
        viewport.advance(0.05);
        viewport.scroll_to(200.0);
        assert!(!viewport.is_animating());
        assert_eq!(viewport.offset(), 200.0);
    }

    #[test]
    fn test_named_slot() {
        let viewport = page();
        assert!(viewport.install_snap_rule(rule()).is_none());
        assert!(viewport.install_snap_rule(rule()).is_some());
        assert_eq!(viewport.snap_rule_name().as_deref(), Some(GLOBAL_SNAP_RULE));

        assert!(viewport.remove_snap_rule("other").is_none());
        assert!(viewport.remove_snap_rule(GLOBAL_SNAP_RULE).is_some());
        assert!(viewport.snap_rule_name().is_none());
    }

    #[test]
    fn test_frame_events_every_advance() {
        let viewport = page();
        let frames = Arc::new(AtomicUsize::new(0));
        let _sub = viewport.subscribe(Arc::new({
            let frames = Arc::clone(&frames);
            move |event: &ScrollEvent| {
                if matches!(event, ScrollEvent::Frame { .. }) {
                    frames.fetch_add(1, Ordering::SeqCst);
                }
            }
        }));
        viewport.advance(0.016);
        viewport.advance(0.016);
        assert_eq!(frames.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let viewport = page();
        viewport.scroll_to(2000.0);
        viewport.set_content_height(1500.0);
        assert_eq!(viewport.offset(), 1000.0);
    }
}
