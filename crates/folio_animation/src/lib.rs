//! Folio Animation System
//!
//! Scroll-driven keyframe animation for page sections.
//!
//! # Features
//!
//! - **Easing**: Power, sine and cubic-bezier curves parsed from their usual names
//! - **Property Sets**: Sparse translation / opacity / scale values per element
//! - **Keyframe Tracks**: Per-element keyframes sampled independently per property
//! - **Timelines**: Tweens placed on a shared timeline, flattened to tracks
//! - **Timeline Player**: Maps scroll offset to progress and applies it, with instant or lagging scrub
//! - **Scroll Tween**: Time-based scroll offset animation for snapping

pub mod easing;
pub mod error;
pub mod keyframe;
pub mod player;
pub mod tween;
pub mod values;

pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use keyframe::{Keyframe, KeyframeTrack, TimelineBuilder, Tween, DEFAULT_TWEEN_DURATION};
pub use player::{
    PropertySink, ScrollRange, Scrub, TimelinePlayer, ToggleCallback, ToggleEvent,
};
pub use tween::ScrollTween;
pub use values::{ElementId, Interpolate, Property, PropertySet};
