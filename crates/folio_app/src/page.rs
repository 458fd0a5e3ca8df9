//! Portfolio page
//!
//! [`PortfolioPage`] owns everything a rendered page needs: the viewport it
//! scrolls, the shared pin registry, the snap coordinator, and the element
//! style table the section players write into.
//!
//! # Lifecycle
//!
//! ```text
//! navigate(route) ─► unmount all ─► teardown coordinator ─► layout
//!                 ─► arm barrier(expected = sections) ─► mount each ─► mark ready
//!                 ─► poll: barrier open ─► install snap rule
//! ```
//!
//! A resize runs the same steps but invalidates the coordinator instead of
//! tearing it down, so the rule is reinstalled against the new layout.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use folio_animation::{Easing, PropertySink};
use folio_core::PortfolioContent;
use folio_scroll::{
    CoordinatorState, MountOptions, MountedSection, PinRegistry, ScrollHost, SectionId,
    SnapConfig, SnapCoordinator, Viewport,
};

use crate::error::{FolioError, Result};
use crate::layout::{PageLayout, ViewportSize};
use crate::sections::SectionKind;
use crate::styles::ElementStyles;

/// Duration of anchor navigation scrolls, in seconds
pub const ANCHOR_SCROLL_DURATION: f32 = 0.8;

/// Share of the viewport height after which the navigation bar shows
const NAV_VISIBLE_FRACTION: f32 = 0.5;

// ============================================================================
// Routes and options
// ============================================================================

/// Pages the site serves
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    /// The animated portfolio
    #[default]
    Home,
    /// Static CV document
    Cv,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Cv => "/cv",
        }
    }

    /// Sections mounted for this route, top to bottom
    pub fn sections(self) -> &'static [SectionKind] {
        match self {
            Route::Home => &SectionKind::HOME,
            Route::Cv => &[],
        }
    }
    /// Ids the mount barrier waits on for this route
    pub fn section_ids(self) -> Vec<SectionId> {
        self.sections()
            .iter()
            .map(|kind| SectionId::from(kind.id()))
            .collect()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.path())
    }
}

impl FromStr for Route {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_end_matches('/') {
            "" => Ok(Route::Home),
            "/cv" | "cv" => Ok(Route::Cv),
            _ => Err(FolioError::UnknownRoute(s.to_owned())),
        }
    }
}

/// Page-wide behavior switches
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageOptions {
    pub snap: SnapConfig,
    /// Show sections at rest instead of animating them
    pub reduced_motion: bool,
}

/// Outcome of mounting a route's sections
#[derive(Debug, Default)]
pub struct MountSummary {
    pub route: Route,
    pub mounted: Vec<SectionId>,
    /// Sections that were skipped, with the reason
    pub failed: Vec<(SectionId, FolioError)>,
    pub pins: usize,
}

impl MountSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// ============================================================================
// Page
// ============================================================================

/// A mounted portfolio page
pub struct PortfolioPage {
    content: PortfolioContent,
    viewport: Viewport,
    registry: PinRegistry,
    coordinator: SnapCoordinator,
    styles: Arc<ElementStyles>,
    layout: PageLayout,
    sections: Vec<MountedSection>,
    route: Route,
    options: PageOptions,
}

impl fmt::Debug for PortfolioPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioPage")
            .field("route", &self.route)
            .field("viewport", &self.viewport)
            .field("sections", &self.sections.len())
            .field("pins", &self.registry.len())
            .field("coordinator", &self.coordinator.state())
            .finish()
    }
}

impl PortfolioPage {
    /// Create an empty page; nothing is mounted until [`navigate`](Self::navigate)
    pub fn new(content: PortfolioContent, viewport: ViewportSize, options: PageOptions) -> Self {
        let registry = PinRegistry::new();
        let coordinator = SnapCoordinator::new(registry.clone(), options.snap.clone());
        Self {
            content,
            viewport: Viewport::new(viewport.width, viewport.height),
            registry,
            coordinator,
            styles: Arc::new(ElementStyles::new()),
            layout: PageLayout::default(),
            sections: Vec::new(),
            route: Route::Home,
            options,
        }
    }

    /// Unmount the current route and mount `route`
    pub fn navigate(&mut self, route: Route, now: Instant) -> MountSummary {
        tracing::debug!(from = %self.route, to = %route, "navigating");
        self.unmount_all();
        self.coordinator.teardown(&self.viewport);
        self.route = route;
        self.coordinator.arm(route.section_ids(), now);
        self.mount_route(now)
    }

    /// Resize the viewport and rebuild every binding against the new layout
    pub fn resize(&mut self, width: f32, height: f32, now: Instant) -> MountSummary {
        self.viewport.resize(width, height);
        self.unmount_all();
        self.coordinator
            .invalidate(&self.viewport, self.route.section_ids(), now);
        self.mount_route(now)
    }

    fn mount_route(&mut self, now: Instant) -> MountSummary {
        let size = self.viewport_size();
        self.layout = PageLayout::compute(self.route.sections(), &self.content, size);
        self.viewport.set_content_height(self.layout.content_height());

        let sink: Arc<dyn PropertySink> = self.styles.clone();
        let options = MountOptions {
            reduced_motion: self.options.reduced_motion,
        };
        let mut summary = MountSummary {
            route: self.route,
            ..Default::default()
        };

        for section in self.layout.sections() {
            let id = SectionId::from(section.kind.id());
            let mounted = section
                .kind
                .plan(section, &self.content, size, &sink)
                .and_then(|plan| {
                    let sink = Arc::clone(&sink);
                    Ok(MountedSection::mount(plan, &self.viewport, &self.registry, sink, options)?)
                });
            match mounted {
                Ok(mounted) => {
                    self.coordinator.mark_ready(id.clone());
                    self.sections.push(mounted);
                    summary.mounted.push(id);
                }
                Err(err) => {
                    // Never reported ready: the barrier falls back to its deadline
                    tracing::warn!(section = %id, error = %err, "section failed to mount");
                    summary.failed.push((id, err));
                }
            }
        }

        summary.pins = self.registry.len();
        self.coordinator.poll(now, &self.viewport);
        tracing::debug!(
            route = %self.route,
            mounted = summary.mounted.len(),
            failed = summary.failed.len(),
            pins = summary.pins,
            "route mounted"
        );
        summary
    }

    fn unmount_all(&mut self) {
        for section in self.sections.drain(..) {
            section.unmount();
        }
    }

    /// Check the mount barrier; installs the snap rule once it opens
    pub fn poll(&mut self, now: Instant) -> CoordinatorState {
        self.coordinator.poll(now, &self.viewport)
    }

    /// Advance one frame. Returns true while a scroll animation runs.
    pub fn tick(&self, dt: f32) -> bool {
        self.viewport.advance(dt)
    }

    /// User scroll to an absolute offset
    pub fn scroll_to(&self, offset: f32) -> f32 {
        self.viewport.scroll_to(offset)
    }

    pub fn scroll_by(&self, delta: f32) -> f32 {
        self.viewport.scroll_by(delta)
    }

    /// End of a scroll gesture; returns the snap target if one was started
    pub fn release(&self) -> Option<f32> {
        self.viewport.release()
    }

    /// Smoothly scroll to the section linked by `href` (`#projects`)
    ///
    /// `#` and `#top` scroll back to the top of the page.
    pub fn anchor(&self, href: &str) -> Result<f32> {
        let target = match href.trim() {
            "#" | "#top" => 0.0,
            href => self
                .layout
                .sections()
                .iter()
                .find(|section| section.kind.anchor() == Some(href))
                .map(|section| section.top.min(self.layout.max_scroll()))
                .ok_or_else(|| FolioError::UnknownAnchor(href.to_owned()))?,
        };
        self.viewport
            .smooth_scroll_to(target, ANCHOR_SCROLL_DURATION, Easing::PowerInOut(2));
        Ok(target)
    }

    /// Whether the navigation bar is shown at the current offset
    pub fn nav_visible(&self) -> bool {
        self.viewport.offset() > self.viewport.height() * NAV_VISIBLE_FRACTION
    }

    /// Unmount every section and remove the snap rule
    pub fn teardown(&mut self) {
        self.unmount_all();
        self.coordinator.teardown(&self.viewport);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn content(&self) -> &PortfolioContent {
        &self.content
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_size(&self) -> ViewportSize {
        ViewportSize::new(self.viewport.width(), self.viewport.height())
    }

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    pub fn coordinator(&self) -> &SnapCoordinator {
        &self.coordinator
    }

    pub fn styles(&self) -> &ElementStyles {
        &self.styles
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn sections(&self) -> &[MountedSection] {
        &self.sections
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn options(&self) -> &PageOptions {
        &self.options
    }
}

impl Drop for PortfolioPage {
    fn drop(&mut self) {
        self.teardown();
    }
}
