//! Global snap coordinator
//!
//! Waits for section registration to settle, then snapshots the pin
//! registry, normalizes it against the host's scrollable distance and
//! installs a single named snap rule into the host.
//!
//! ```text
//! Uninstalled --(gate open, pins and scroll distance)--> Installed
//! Installed   --(install again / registry changed)-----> Installed
//! Installed   --(teardown / invalidate / no pins left)-> Uninstalled
//! ```
//!
//! Intervals are always recomputed from a fresh snapshot. Once installed,
//! every poll checks the registry generation and reinstalls when pins were
//! added, replaced or removed, so the rule never snaps to an unmounted
//! section.

use std::time::Instant;

use crate::barrier::{GateStatus, SettleGate};
use crate::host::ScrollHost;
use crate::registry::{PinRegistry, SectionId};
use crate::snap::{SnapConfig, SnapResolver, SnapRule};

/// Coordinator lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinatorState {
    Uninstalled,
    /// A rule is in the host, built from this registry generation
    Installed { generation: u64, intervals: usize },
}

impl CoordinatorState {
    pub fn is_installed(&self) -> bool {
        matches!(self, CoordinatorState::Installed { .. })
    }
}

/// Installs and removes the page-level snap rule
#[derive(Debug)]
pub struct SnapCoordinator {
    config: SnapConfig,
    registry: PinRegistry,
    gate: SettleGate,
    state: CoordinatorState,
    /// The gate opened and installation was attempted for this arming
    settled: bool,
    /// Registry generation the last installation attempt was built from
    built: u64,
    resolver: SnapResolver,
}

impl SnapCoordinator {
    pub fn new(registry: PinRegistry, config: SnapConfig) -> Self {
        Self {
            gate: SettleGate::new(config.settle_delay()),
            config,
            registry,
            state: CoordinatorState::Uninstalled,
            settled: false,
            built: 0,
            resolver: SnapResolver::default(),
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Resolver of the installed rule (empty when uninstalled)
    pub fn resolver(&self) -> &SnapResolver {
        &self.resolver
    }

    pub fn gate_status(&mut self, now: Instant) -> GateStatus {
        self.gate.poll(now)
    }

    /// Arm the mount barrier for the `expected` sections
    pub fn arm(&mut self, expected: impl IntoIterator<Item = SectionId>, now: Instant) {
        self.settled = false;
        self.gate.arm(expected, now);
    }

    /// Report that a section finished mounting
    pub fn mark_ready(&mut self, id: SectionId) {
        self.gate.mark_ready(id);
    }

    /// Install once the barrier opens
    ///
    /// The first install is attempted once per arming. After that, polls
    /// reinstall only when the registry changed under the installed rule.
    pub fn poll(&mut self, now: Instant, host: &dyn ScrollHost) -> CoordinatorState {
        if self.settled {
            if self.built != self.registry.generation() {
                tracing::debug!(generation = self.registry.generation(), "pins changed, reinstalling");
                return self.install(host);
            }
            return self.state;
        }
        if !self.gate.poll(now).is_open() {
            return self.state;
        }
        self.settled = true;
        self.install(host)
    }

    /// Remove any previous rule and install one from a fresh snapshot
    ///
    /// Stays uninstalled when there is nothing to snap to.
    pub fn install(&mut self, host: &dyn ScrollHost) -> CoordinatorState {
        self.uninstall(host);

        let generation = self.registry.generation();
        self.built = generation;
        let snapshot = self.registry.snapshot();
        let max_scroll = host.max_scroll();
        if snapshot.is_empty() || max_scroll <= 0.0 {
            tracing::debug!(
                pins = snapshot.len(),
                max_scroll,
                "nothing to snap to, rule not installed"
            );
            return self.state;
        }

        let resolver = SnapResolver::from_snapshot(&snapshot, max_scroll, self.config.buffer);
        let rule = SnapRule::new(self.config.name.clone(), resolver.clone(), self.config.animation());
        if let Some(previous) = host.install_snap_rule(rule) {
            tracing::warn!(
                previous = previous.name(),
                name = %self.config.name,
                "replaced a foreign snap rule"
            );
        }

        let intervals = resolver.intervals().len();
        tracing::debug!(intervals, max_scroll, generation, name = %self.config.name, "snap rule installed");
        self.resolver = resolver;
        self.state = CoordinatorState::Installed {
            generation,
            intervals,
        };
        self.state
    }

    /// Remove the rule if this coordinator installed one
    pub fn uninstall(&mut self, host: &dyn ScrollHost) {
        if !self.state.is_installed() {
            return;
        }
        if host.remove_snap_rule(&self.config.name).is_none() {
            tracing::debug!(name = %self.config.name, "snap rule already gone from host");
        }
        self.resolver = SnapResolver::default();
        self.state = CoordinatorState::Uninstalled;
        tracing::debug!(name = %self.config.name, "snap rule removed");
    }

    /// Whether the registry changed since the installed rule was built
    pub fn needs_reinstall(&self) -> bool {
        match self.state {
            CoordinatorState::Installed { generation, .. } => generation != self.registry.generation(),
            CoordinatorState::Uninstalled => false,
        }
    }

    /// Uninstall and re-arm for a new round of mounting
    pub fn invalidate(
        &mut self,
        host: &dyn ScrollHost,
        expected: impl IntoIterator<Item = SectionId>,
        now: Instant,
    ) {
        self.uninstall(host);
        self.arm(expected, now);
    }

    /// Uninstall and stop waiting on the barrier
    pub fn teardown(&mut self, host: &dyn ScrollHost) {
        self.uninstall(host);
        self.gate.disarm();
        self.settled = false;
    }

    /// Resolve a fraction with the installed rule
    pub fn resolve(&self, fraction: f32) -> f32 {
        self.resolver.resolve(fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Viewport;
    use crate::registry::PinSpan;
    use crate::snap::GLOBAL_SNAP_RULE;
    use std::time::Duration;

    fn register(registry: &PinRegistry, id: &str, start: f32, end: f32) {
        let id = SectionId::from(id);
        registry.register(id.clone(), PinSpan::new(&id, start, end).unwrap());
    }

    fn setup() -> (Viewport, PinRegistry, SnapCoordinator) {
        let viewport = Viewport::new(1000.0, 500.0);
        viewport.set_content_height(1500.0); // max_scroll 1000
        let registry = PinRegistry::new();
        let coordinator = SnapCoordinator::new(registry.clone(), SnapConfig::default());
        (viewport, registry, coordinator)
    }

    #[test]
    fn test_installs_after_barrier() {
        let (viewport, registry, mut coordinator) = setup();
        let now = Instant::now();
        coordinator.arm(["hero".into(), "about".into()], now);

        register(&registry, "hero", 0.0, 200.0);
        coordinator.mark_ready("hero".into());
        assert_eq!(coordinator.poll(now, &viewport), CoordinatorState::Uninstalled);
        assert!(viewport.snap_rule_name().is_none());

        register(&registry, "about", 400.0, 500.0);
        coordinator.mark_ready("about".into());
        let state = coordinator.poll(now, &viewport);
        assert!(state.is_installed());
        assert_eq!(viewport.snap_rule_name().as_deref(), Some(GLOBAL_SNAP_RULE));
        assert!((coordinator.resolve(0.42) - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_deadline_installs_with_missing_sections() {
        let (viewport, registry, mut coordinator) = setup();
        let now = Instant::now();
        coordinator.arm(["hero".into(), "about".into(), "contact".into()], now);
        register(&registry, "hero", 0.0, 200.0);
        coordinator.mark_ready("hero".into());

        assert!(!coordinator.poll(now, &viewport).is_installed());
        assert!(coordinator
            .poll(now + Duration::from_millis(150), &viewport)
            .is_installed());
    }

    #[test]
    fn test_empty_registry_stays_uninstalled() {
        let (viewport, _registry, mut coordinator) = setup();
        let now = Instant::now();
        coordinator.arm([], now);

        assert_eq!(coordinator.poll(now, &viewport), CoordinatorState::Uninstalled);
        assert_eq!(coordinator.resolve(0.3), 0.3);
        assert!(viewport.snap_rule_name().is_none());
    }

    #[test]
    fn test_zero_scroll_distance_stays_uninstalled() {
        let viewport = Viewport::new(1000.0, 500.0);
        let registry = PinRegistry::new();
        register(&registry, "hero", 0.0, 0.0);
        let mut coordinator = SnapCoordinator::new(registry, SnapConfig::default());

        assert_eq!(coordinator.install(&viewport), CoordinatorState::Uninstalled);
    }

    #[test]
    fn test_reinstall_replaces_rule() {
        let (viewport, registry, mut coordinator) = setup();
        register(&registry, "hero", 0.0, 200.0);
        coordinator.install(&viewport);

        register(&registry, "contact", 800.0, 1000.0);
        assert!(coordinator.needs_reinstall());

        let state = coordinator.install(&viewport);
        assert_eq!(
            state,
            CoordinatorState::Installed {
                generation: registry.generation(),
                intervals: 2
            }
        );
        assert!(!coordinator.needs_reinstall());
        assert_eq!(viewport.snap_rule_name().as_deref(), Some(GLOBAL_SNAP_RULE));
    }

    #[test]
    fn test_late_mount_reinstalls_on_poll() {
        let (viewport, registry, mut coordinator) = setup();
        let now = Instant::now();
        coordinator.arm([], now);
        register(&registry, "hero", 0.0, 200.0);
        assert!(coordinator.poll(now, &viewport).is_installed());

        register(&registry, "late", 600.0, 700.0);
        assert!(coordinator.needs_reinstall());
        let state = coordinator.poll(now, &viewport);
        assert_eq!(
            state,
            CoordinatorState::Installed {
                generation: registry.generation(),
                intervals: 2
            }
        );
        assert!(!coordinator.needs_reinstall());
    }

    #[test]
    fn test_unregistered_pin_is_not_snapped_to() {
        let (viewport, registry, mut coordinator) = setup();
        let now = Instant::now();
        coordinator.arm(["hero".into()], now);
        register(&registry, "hero", 400.0, 500.0);
        coordinator.mark_ready("hero".into());
        assert!(coordinator.poll(now, &viewport).is_installed());

        registry.unregister(&SectionId::from("hero"));
        assert_eq!(coordinator.poll(now, &viewport), CoordinatorState::Uninstalled);
        assert!(viewport.snap_rule_name().is_none());

        viewport.scroll_to(420.0);
        assert_eq!(viewport.release(), None);
        assert_eq!(coordinator.resolve(0.42), 0.42);

        register(&registry, "about", 600.0, 700.0);
        assert!(coordinator.poll(now, &viewport).is_installed());
        assert!((coordinator.resolve(0.62) - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_teardown_removes_rule() {
        let (viewport, registry, mut coordinator) = setup();
        register(&registry, "hero", 0.0, 200.0);
        coordinator.install(&viewport);

        coordinator.teardown(&viewport);
        assert_eq!(coordinator.state(), CoordinatorState::Uninstalled);
        assert!(viewport.snap_rule_name().is_none());
        assert!(coordinator.resolver().is_empty());

        // Disarmed: polling never installs
        let now = Instant::now();
        assert!(!coordinator
            .poll(now + Duration::from_secs(1), &viewport)
            .is_installed());
    }

    #[test]
    fn test_invalidate_rearms() {
        let (viewport, registry, mut coordinator) = setup();
        let now = Instant::now();
        register(&registry, "hero", 0.0, 200.0);
        coordinator.install(&viewport);

        coordinator.invalidate(&viewport, ["hero".into()], now);
        assert!(viewport.snap_rule_name().is_none());
        assert!(!coordinator.poll(now, &viewport).is_installed());

        coordinator.mark_ready("hero".into());
        assert!(coordinator.poll(now, &viewport).is_installed());
    }

    #[test]
    fn test_no_updates_after_unmount_and_teardown() {
        use crate::section::{MountOptions, MountedSection, SectionAnimationDescriptor, SectionPlan};
        use folio_animation::{
            Easing, ElementId, PropertySet, PropertySink, TimelineBuilder, Tween,
        };
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        #[derive(Default)]
        struct CountingSink(AtomicUsize);

        impl PropertySink for CountingSink {
            fn apply(&self, _: &ElementId, _: &PropertySet) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (viewport, registry, mut coordinator) = setup();
        let sink = Arc::new(CountingSink::default());
        let now = Instant::now();
        coordinator.arm(["hero".into()], now);

        let tracks = TimelineBuilder::new()
            .add(
                Tween::from_to("title", PropertySet::new().y(40.0), PropertySet::new().y(0.0))
                    .ease(Easing::Linear),
            )
            .build()
            .unwrap();
        let plan = SectionPlan::new("hero")
            .binding(SectionAnimationDescriptor::new("hero", 0.0, 200.0, tracks).pinned());
        let section =
            MountedSection::mount(plan, &viewport, &registry, sink.clone(), MountOptions::default())
                .unwrap();
        coordinator.mark_ready("hero".into());
        assert!(coordinator.poll(now, &viewport).is_installed());

        viewport.scroll_to(100.0);
        assert!(sink.0.load(Ordering::SeqCst) > 0);

        section.unmount();
        coordinator.teardown(&viewport);
        let calls = sink.0.load(Ordering::SeqCst);

        viewport.scroll_to(150.0);
        viewport.release();
        viewport.advance(0.016);
        viewport.scroll_to(20.0);

        assert_eq!(sink.0.load(Ordering::SeqCst), calls);
        assert!(registry.is_empty());
        assert!(viewport.snap_rule_name().is_none());
    }
}
