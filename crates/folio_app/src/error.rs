//! Error types for folio_app

use folio_animation::AnimationError;
use folio_core::ContentError;
use folio_scroll::ScrollError;
use thiserror::Error;

/// Errors that can occur while composing the portfolio page
#[derive(Error, Debug)]
pub enum FolioError {
    /// Content could not be loaded
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// A section binding was rejected
    #[error("scroll binding error: {0}")]
    Scroll(#[from] ScrollError),

    /// A section timeline was rejected
    #[error("timeline error: {0}")]
    Animation(#[from] AnimationError),

    /// Route not served by the page
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    /// Anchor with no matching mounted section
    #[error("unknown anchor: {0}")]
    UnknownAnchor(String),
}

/// Result type for folio_app operations
pub type Result<T> = std::result::Result<T, FolioError>;
