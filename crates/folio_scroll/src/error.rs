//! Error types for folio_scroll

use folio_animation::AnimationError;
use thiserror::Error;

/// Errors that can occur while binding sections to scroll
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrollError {
    /// A timeline or range was rejected during setup
    #[error(transparent)]
    Animation(#[from] AnimationError),

    /// A trigger expression could not be parsed
    #[error("invalid trigger expression '{expr}': {reason}")]
    InvalidTrigger { expr: String, reason: String },

    /// A binding resolved to an empty or inverted scroll range
    #[error("binding '{id}' resolves to an empty range ({start}..{end})")]
    EmptyRange { id: String, start: f32, end: f32 },

    /// A pin span with bad bounds
    #[error("invalid pin span for '{id}': {start}..{end}")]
    InvalidPinSpan { id: String, start: f32, end: f32 },
}

/// Result type for folio_scroll operations
pub type Result<T> = std::result::Result<T, ScrollError>;
