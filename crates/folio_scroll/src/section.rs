//! Section bindings and mount lifecycle
//!
//! A section declares one or more [`SectionAnimationDescriptor`]s: keyframe
//! tracks bound to a scroll range, either pinned (the section is held in the
//! viewport while the range is scrolled) or flowing.
//!
//! [`MountedSection::mount`] validates every binding first and only then
//! registers pins and subscribes players, so a section with one bad binding
//! leaves nothing behind. Unmounting (explicitly or by dropping the handle)
//! releases every subscription and unregisters every pin.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use folio_animation::{PropertySet, PropertySink, TimelineBuilder, Tween, ElementId};
//! use folio_scroll::{
//!     MountOptions, MountedSection, PinRegistry, SectionAnimationDescriptor,
//!     SectionPlan, Viewport,
//! };
//!
//! struct Discard;
//! impl PropertySink for Discard {
//!     fn apply(&self, _: &ElementId, _: &PropertySet) {}
//! }
//!
//! let viewport = Viewport::new(1280.0, 800.0);
//! viewport.set_content_height(4000.0);
//! let registry = PinRegistry::new();
//!
//! let tracks = TimelineBuilder::new()
//!     .add(Tween::from_to("hero-title", PropertySet::new().opacity(0.0), PropertySet::new().opacity(1.0)))
//!     .build()
//!     .unwrap();
//! let plan = SectionPlan::new("hero")
//!     .binding(SectionAnimationDescriptor::new("hero", 0.0, 1040.0, tracks).pinned());
//!
//! let section = MountedSection::mount(
//!     plan,
//!     &viewport,
//!     &registry,
//!     Arc::new(Discard),
//!     MountOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(registry.len(), 1);
//!
//! section.unmount();
//! assert!(registry.is_empty());
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use folio_animation::{
    KeyframeTrack, PropertySet, PropertySink, ScrollRange, Scrub, TimelinePlayer, ToggleCallback,
    ToggleEvent,
};

use crate::error::Result;
use crate::host::ScrollHost;
use crate::registry::{PinRegistry, PinSpan, SectionId};
use crate::signal::{ScrollEvent, ScrollSubscription};
use crate::trigger::{ElementBox, TriggerSpec};

// ============================================================================
// Descriptors
// ============================================================================

/// Keyframe tracks bound to a scroll range
#[derive(Clone)]
pub struct SectionAnimationDescriptor {
    id: SectionId,
    is_pinned: bool,
    scroll_start: f32,
    scroll_end: f32,
    tracks: Vec<KeyframeTrack>,
    scrub: Scrub,
    on_toggle: Option<ToggleCallback>,
}

impl fmt::Debug for SectionAnimationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionAnimationDescriptor")
            .field("id", &self.id)
            .field("is_pinned", &self.is_pinned)
            .field("scroll_start", &self.scroll_start)
            .field("scroll_end", &self.scroll_end)
            .field("tracks", &self.tracks.len())
            .field("scrub", &self.scrub)
            .finish()
    }
}

impl SectionAnimationDescriptor {
    /// A flowing binding over absolute offsets
    pub fn new(
        id: impl Into<SectionId>,
        scroll_start: f32,
        scroll_end: f32,
        tracks: Vec<KeyframeTrack>,
    ) -> Self {
        Self {
            id: id.into(),
            is_pinned: false,
            scroll_start,
            scroll_end,
            tracks,
            scrub: Scrub::Instant,
            on_toggle: None,
        }
    }

    /// A flowing binding whose range comes from a trigger expression
    pub fn from_trigger(
        id: impl Into<SectionId>,
        trigger: &TriggerSpec,
        element: &ElementBox,
        viewport_height: f32,
        tracks: Vec<KeyframeTrack>,
    ) -> Result<Self> {
        let id = id.into();
        let (start, end) = trigger.resolve_range(id.as_str(), element, viewport_height)?;
        Ok(Self::new(id, start, end, tracks))
    }

    /// Mark as pinned (builder pattern)
    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
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

    pub fn id(&self) -> &SectionId {
        &self.id
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    pub fn scroll_start(&self) -> f32 {
        self.scroll_start
    }

    pub fn scroll_end(&self) -> f32 {
        self.scroll_end
    }

    pub fn tracks(&self) -> &[KeyframeTrack] {
        &self.tracks
    }

    pub fn scrub(&self) -> Scrub {
        self.scrub
    }

    fn range(&self) -> Result<ScrollRange> {
        Ok(ScrollRange::new(self.scroll_start, self.scroll_end)?)
    }

    fn pin_span(&self) -> Result<PinSpan> {
        PinSpan::new(&self.id, self.scroll_start, self.scroll_end)
    }
}

/// Everything a section binds, grouped under the section's id
#[derive(Clone, Debug)]
pub struct SectionPlan {
    id: SectionId,
    bindings: Vec<SectionAnimationDescriptor>,
}

impl SectionPlan {
    pub fn new(id: impl Into<SectionId>) -> Self {
        Self {
            id: id.into(),
            bindings: Vec::new(),
        }
    }

    /// Add a binding (builder pattern)
    pub fn binding(mut self, descriptor: SectionAnimationDescriptor) -> Self {
        self.bindings.push(descriptor);
        self
    }

    pub fn push(&mut self, descriptor: SectionAnimationDescriptor) {
        self.bindings.push(descriptor);
    }

    pub fn id(&self) -> &SectionId {
        &self.id
    }

    pub fn bindings(&self) -> &[SectionAnimationDescriptor] {
        &self.bindings
    }

    pub fn pinned(&self) -> impl Iterator<Item = &SectionAnimationDescriptor> {
        self.bindings.iter().filter(|binding| binding.is_pinned)
    }

    /// Check every binding without registering anything
    pub fn validate(&self) -> Result<()> {
        for binding in &self.bindings {
            binding.range()?;
            if binding.is_pinned {
                binding.pin_span()?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Mounting
// ============================================================================

/// Options applied when mounting a section
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountOptions {
    /// Apply rest properties once instead of running players
    pub reduced_motion: bool,
}

type SharedPlayer = Arc<Mutex<TimelinePlayer>>;

fn lock_player(player: &Mutex<TimelinePlayer>) -> MutexGuard<'_, TimelinePlayer> {
    player.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A section whose bindings are live
///
/// Holds the scroll subscriptions and pin registrations created at mount.
/// They are released exactly once, by [`MountedSection::unmount`] or on drop.
pub struct MountedSection {
    id: SectionId,
    registry: PinRegistry,
    pins: Vec<SectionId>,
    players: Vec<(SectionId, SharedPlayer)>,
    subscriptions: Vec<ScrollSubscription>,
}

impl fmt::Debug for MountedSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedSection")
            .field("id", &self.id)
            .field("pins", &self.pins)
            .field("players", &self.players.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl MountedSection {
    /// Validate, register pins, and start players for `plan`
    pub fn mount(
        plan: SectionPlan,
        host: &dyn ScrollHost,
        registry: &PinRegistry,
        sink: Arc<dyn PropertySink>,
        options: MountOptions,
    ) -> Result<Self> {
        // Validate everything before touching the registry or the host
        let mut ranges = Vec::with_capacity(plan.bindings.len());
        let mut spans = Vec::new();
        for binding in &plan.bindings {
            ranges.push(binding.range()?);
            if binding.is_pinned {
                spans.push((binding.id.clone(), binding.pin_span()?));
            }
        }

        let mut section = Self {
            id: plan.id,
            registry: registry.clone(),
            pins: Vec::with_capacity(spans.len()),
            players: Vec::new(),
            subscriptions: Vec::new(),
        };

        for (id, span) in spans {
            registry.register(id.clone(), span);
            section.pins.push(id);
        }

        if options.reduced_motion {
            for binding in &plan.bindings {
                for track in &binding.tracks {
                    let rest: PropertySet = track
                        .properties()
                        .into_iter()
                        .map(|property| (property, property.rest_value()))
                        .collect();
                    sink.apply(track.element(), &rest);
                }
            }
            tracing::debug!(id = %section.id, pins = section.pins.len(), "section mounted without motion");
            return Ok(section);
        }

        let offset = host.offset();
        for (binding, range) in plan.bindings.into_iter().zip(ranges) {
            let mut player = TimelinePlayer::new(range, binding.tracks).with_scrub(binding.scrub);
            if let Some(callback) = binding.on_toggle {
                player = player.on_toggle(move |event| callback(event));
            }
            player.seek(offset, sink.as_ref());

            let player: SharedPlayer = Arc::new(Mutex::new(player));
            let subscription = host.subscribe(Arc::new({
                let player = Arc::clone(&player);
                let sink = Arc::clone(&sink);
                move |event: &ScrollEvent| {
                    let mut player = lock_player(&player);
                    match *event {
                        ScrollEvent::Scrolled { offset } => {
                            player.scroll_to(offset, sink.as_ref());
                        }
                        ScrollEvent::Frame { dt, .. } => {
                            player.advance(dt, sink.as_ref());
                        }
                    }
                }
            }));

            section.players.push((binding.id, player));
            section.subscriptions.push(subscription);
        }

        tracing::debug!(
            id = %section.id,
            pins = section.pins.len(),
            players = section.players.len(),
            "section mounted"
        );
        Ok(section)
    }

    pub fn id(&self) -> &SectionId {
        &self.id
    }

    /// Ids of the pins this section registered
    pub fn pins(&self) -> &[SectionId] {
        &self.pins
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Displayed progress of each binding, in declaration order
    pub fn progress(&self) -> Vec<(SectionId, f32)> {
        self.players
            .iter()
            .map(|(id, player)| (id.clone(), lock_player(player).progress()))
            .collect()
    }

    /// Release subscriptions and unregister pins
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.subscriptions.is_empty() && self.pins.is_empty() && self.players.is_empty() {
            return;
        }
        for subscription in self.subscriptions.drain(..) {
            subscription.release();
        }
        for id in self.pins.drain(..) {
            self.registry.unregister(&id);
        }
        self.players.clear();
        tracing::debug!(id = %self.id, "section unmounted");
    }
}

impl Drop for MountedSection {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrollError;
    use crate::host::Viewport;
    use folio_animation::{Easing, ElementId, Property, TimelineBuilder, Tween};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct SpySink {
        calls: AtomicUsize,
        last: Mutex<Vec<(ElementId, PropertySet)>>,
    }

    impl SpySink {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_opacity(&self, element: &str) -> Option<f32> {
            self.last
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(id, _)| id.as_str() == element)
                .and_then(|(_, props)| props.get(Property::Opacity))
        }
    }

    impl PropertySink for SpySink {
        fn apply(&self, element: &ElementId, properties: &PropertySet) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last
                .lock()
                .unwrap()
                .push((element.clone(), properties.clone()));
        }
    }

    fn fade_tracks(element: &str) -> Vec<KeyframeTrack> {
        TimelineBuilder::new()
            .add(
                Tween::from_to(
                    element,
                    PropertySet::new().opacity(0.0),
                    PropertySet::new().opacity(1.0),
                )
                .ease(Easing::Linear),
            )
            .build()
            .unwrap()
    }

    fn viewport() -> Viewport {
        let viewport = Viewport::new(1000.0, 500.0);
        viewport.set_content_height(3000.0);
        viewport
    }

    #[test]
    fn test_mount_registers_pins_and_players() {
        let viewport = viewport();
        let registry = PinRegistry::new();
        let sink = Arc::new(SpySink::default());

        let plan = SectionPlan::new("hero")
            .binding(SectionAnimationDescriptor::new("hero", 0.0, 650.0, fade_tracks("title")).pinned())
            .binding(SectionAnimationDescriptor::new("hero-card", 100.0, 300.0, fade_tracks("card")));

        let section =
            MountedSection::mount(plan, &viewport, &registry, sink.clone(), MountOptions::default())
                .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(section.player_count(), 2);
        // Initial seek applies once per track
        assert_eq!(sink.calls(), 2);

        viewport.scroll_to(200.0);
        assert!((sink.last_opacity("card").unwrap() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_binding_registers_nothing() {
        let viewport = viewport();
        let registry = PinRegistry::new();
        let sink = Arc::new(SpySink::default());

        let plan = SectionPlan::new("about")
            .binding(SectionAnimationDescriptor::new("about", 0.0, 500.0, fade_tracks("a")).pinned())
            .binding(SectionAnimationDescriptor::new("about-bad", 300.0, 300.0, fade_tracks("b")));

        let err = MountedSection::mount(plan, &viewport, &registry, sink.clone(), MountOptions::default())
            .unwrap_err();
        assert!(matches!(err, ScrollError::Animation(_)));
        assert!(registry.is_empty());
        assert_eq!(viewport.signal().listener_count(), 0);
        assert_eq!(sink.calls(), 0);
    }

    #[test]
    fn test_unmount_stops_updates() {
        let viewport = viewport();
        let registry = PinRegistry::new();
        let sink = Arc::new(SpySink::default());

        let plan = SectionPlan::new("contact").binding(
            SectionAnimationDescriptor::new("contact", 1000.0, 1600.0, fade_tracks("c")).pinned(),
        );
        let section =
            MountedSection::mount(plan, &viewport, &registry, sink.clone(), MountOptions::default())
                .unwrap();
        section.unmount();

        let before = sink.calls();
        viewport.scroll_to(1200.0);
        viewport.advance(0.016);
        assert_eq!(sink.calls(), before);
        assert!(registry.is_empty());
        assert_eq!(viewport.signal().listener_count(), 0);
    }

    #[test]
    fn test_drop_releases() {
        let viewport = viewport();
        let registry = PinRegistry::new();
        {
            let plan = SectionPlan::new("hero")
                .binding(SectionAnimationDescriptor::new("hero", 0.0, 650.0, fade_tracks("t")).pinned());
            let _section = MountedSection::mount(
                plan,
                &viewport,
                &registry,
                Arc::new(SpySink::default()),
                MountOptions::default(),
            )
            .unwrap();
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
        assert_eq!(viewport.signal().listener_count(), 0);
    }

    #[test]
    fn test_reduced_motion_applies_rest_once() {
        let viewport = viewport();
        let registry = PinRegistry::new();
        let sink = Arc::new(SpySink::default());

        let plan = SectionPlan::new("hero")
            .binding(SectionAnimationDescriptor::new("hero", 0.0, 650.0, fade_tracks("t")).pinned());
        let section = MountedSection::mount(
            plan,
            &viewport,
            &registry,
            sink.clone(),
            MountOptions {
                reduced_motion: true,
            },
        )
        .unwrap();

        assert_eq!(section.player_count(), 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(sink.last_opacity("t"), Some(1.0));

        let calls = sink.calls();
        viewport.scroll_to(300.0);
        assert_eq!(sink.calls(), calls);
    }

    #[test]
    fn test_toggle_callback_reaches_player() {
        let viewport = viewport();
        let registry = PinRegistry::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        let plan = SectionPlan::new("hero").binding(
            SectionAnimationDescriptor::new("hero", 100.0, 400.0, fade_tracks("t")).on_toggle({
                let events = Arc::clone(&events);
                move |event| events.lock().unwrap().push(event)
            }),
        );
        let _section = MountedSection::mount(
            plan,
            &viewport,
            &registry,
            Arc::new(SpySink::default()),
            MountOptions::default(),
        )
        .unwrap();

        viewport.scroll_to(200.0);
        viewport.scroll_to(0.0);
        assert_eq!(
            *events.lock().unwrap(),
            vec![ToggleEvent::Enter, ToggleEvent::LeaveBack]
        );
    }

    #[test]
    fn test_trigger_descriptor() {
        let trigger = TriggerSpec::parse("top 80%", "top 55%").unwrap();
        let descriptor = SectionAnimationDescriptor::from_trigger(
            "card-0",
            &trigger,
            &ElementBox::new(1000.0, 300.0),
            800.0,
            fade_tracks("card-0"),
        )
        .unwrap();
        assert_eq!(descriptor.scroll_start(), 360.0);
        assert_eq!(descriptor.scroll_end(), 560.0);
        assert!(!descriptor.is_pinned());
    }
}
