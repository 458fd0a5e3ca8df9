//! Error types for folio_core

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading portfolio content
#[derive(Error, Debug)]
pub enum ContentError {
    /// IO error when reading a content file
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not a known content format
    #[error("unsupported content format: {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    /// Two records of one kind share an id
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },
}

/// Result type for folio_core operations
pub type Result<T> = std::result::Result<T, ContentError>;
