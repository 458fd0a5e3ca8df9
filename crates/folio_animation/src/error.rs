//! Error types for folio_animation

use thiserror::Error;

/// Errors raised while building timelines and players
///
/// These are setup-time errors: a descriptor that produces one is rejected
/// before anything is bound to a scroll signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A scroll range with no length would divide by zero when computing progress
    #[error("scroll range starting at {start} has zero length")]
    ZeroLengthRange { start: f32 },

    /// A scroll range whose end lies before its start
    #[error("scroll range is inverted: start {start} > end {end}")]
    InvertedRange { start: f32, end: f32 },

    /// NaN or infinite range bounds
    #[error("scroll range bounds must be finite")]
    NonFiniteRange,

    /// Keyframe progress outside `[0, 1]`
    #[error("keyframe for '{element}' has progress {progress} outside [0, 1]")]
    KeyframeOutOfRange { element: String, progress: f32 },

    /// Keyframe progress values that go backwards
    #[error("keyframes for '{element}' are not in ascending progress order")]
    NonMonotonicKeyframes { element: String },

    /// A tween with a negative or non-finite position or duration
    #[error("invalid tween for '{element}': {reason}")]
    InvalidTween { element: String, reason: String },

    /// Two tweens animate the same property of one element at the same time
    #[error("overlapping tweens animate '{property}' on '{element}'")]
    OverlappingTweens { element: String, property: String },

    /// A timeline with no tweens, or whose tweens all have zero length
    #[error("timeline has no duration")]
    EmptyTimeline,

    /// An easing name that could not be parsed
    #[error("unknown easing: {0}")]
    UnknownEasing(String),
}

/// Result type for folio_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
