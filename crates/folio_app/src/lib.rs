//! Folio App
//!
//! The portfolio page: section presets, vertical layout, routes, and the
//! wiring that binds every section to one scrolling viewport.
//!
//! # Features
//!
//! - **Section Presets**: Hero, about, contact and thank-you pins; flowing project, experience, publication and skill reveals
//! - **Layout**: Stacked sections with pin spacing, `vw`/`vh` lengths
//! - **Routes**: `/` mounts the animated page, `/cv` mounts nothing
//! - **Anchors**: Smooth scrolling to `#projects`, `#contact`, ...
//! - **Reduced Motion**: Sections shown at rest, snapping kept
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use folio_app::{PageOptions, PortfolioPage, Route, ViewportSize};
//! use folio_core::StaticContent;
//! use folio_scroll::ScrollHost;
//!
//! let content = StaticContent::sample().unwrap().content().clone();
//! let mut page = PortfolioPage::new(content, ViewportSize::new(1280.0, 800.0), PageOptions::default());
//!
//! let summary = page.navigate(Route::Home, Instant::now());
//! assert!(summary.is_complete());
//!
//! page.scroll_to(120.0);
//! let target = page.release().unwrap();
//! page.viewport().settle(1.0 / 60.0, 600);
//! assert!((page.viewport().offset() - target).abs() < 1.0);
//! ```

pub mod error;
pub mod layout;
pub mod page;
pub mod sections;
pub mod styles;

pub use error::{FolioError, Result};
pub use layout::{PageLayout, SectionLayout, ViewportSize};
pub use page::{MountSummary, PageOptions, PortfolioPage, Route, ANCHOR_SCROLL_DURATION};
pub use sections::{reset_hero, SectionKind, HERO_ELEMENTS, PINNED_SCRUB_LAG};
pub use styles::{to_css, ElementStyles};
