//! Folio Scroll Sequencing
//!
//! Binds section animations to a page's scroll position and keeps the
//! resting scroll position on pinned sections.
//!
//! # Features
//!
//! - **Scroll Signal**: Snapshot-then-deliver event fan-out with releasable subscription handles
//! - **Viewport Host**: In-process scroll surface with a named snap-rule slot and animated scrolling
//! - **Pin Registry**: Shared, sorted record of pinned section spans
//! - **Snap Resolution**: Normalized intervals, buffered membership, nearest-center targets
//! - **Mount Barrier**: Expected-count gate with a settle-deadline fallback
//! - **Snap Coordinator**: Installs, reinstalls and tears down the page-level snap rule
//! - **Triggers**: `"top 80%"` / `"+=130%"` expressions resolved against element boxes
//! - **Sections**: Validated mount and exactly-once unmount of a section's bindings
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use folio_scroll::{PinRegistry, PinSpan, SectionId, SnapConfig, SnapCoordinator, Viewport};
//!
//! let viewport = Viewport::new(1280.0, 500.0);
//! viewport.set_content_height(1500.0);
//!
//! let registry = PinRegistry::new();
//! let mut coordinator = SnapCoordinator::new(registry.clone(), SnapConfig::default());
//! let now = Instant::now();
//! let hero = SectionId::from("hero");
//! coordinator.arm([hero.clone()], now);
//!
//! registry.register(hero.clone(), PinSpan::new(&hero, 400.0, 500.0).unwrap());
//! coordinator.mark_ready(hero);
//!
//! assert!(coordinator.poll(now, &viewport).is_installed());
//!
//! viewport.scroll_to(420.0);
//! let target = viewport.release().unwrap();
//! assert!((target - 450.0).abs() < 1e-3);
//! ```

pub mod barrier;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod registry;
pub mod section;
pub mod signal;
pub mod snap;
pub mod trigger;

pub use barrier::{GateStatus, OpenReason, SettleGate, DEFAULT_SETTLE_DELAY};
pub use coordinator::{CoordinatorState, SnapCoordinator};
pub use error::{Result, ScrollError};
pub use host::{ScrollHost, Viewport};
pub use registry::{PinEntry, PinRegistry, PinSpan, SectionId};
pub use section::{MountOptions, MountedSection, SectionAnimationDescriptor, SectionPlan};
pub use signal::{ScrollEvent, ScrollListener, ScrollSignal, ScrollSubscription, SubscriptionId};
pub use snap::{
    normalize, resolve_snap, NormalizedInterval, SnapAnimation, SnapConfig, SnapResolver,
    SnapRule, DEFAULT_SNAP_BUFFER, GLOBAL_SNAP_RULE,
};
pub use trigger::{Anchor, ElementBox, Length, TriggerEnd, TriggerPosition, TriggerSpec};
