//! `folio.toml` handling
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration.

use anyhow::{Context, Result};
use folio_app::{PageOptions, ViewportSize};
use folio_core::{ContentProvider, FileContentProvider, PortfolioContent, StaticContent};
use folio_scroll::SnapConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Top-level configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    /// Content file (TOML or JSON); the bundled sample when absent
    #[serde(default)]
    pub content: Option<PathBuf>,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub snap: SnapConfig,
    #[serde(default)]
    pub motion: MotionConfig,
}

/// Simulated viewport
#[derive(Debug, Deserialize, Serialize)]
pub struct ViewportConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    1440.0
}

fn default_height() -> f32 {
    900.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MotionConfig {
    /// Show sections at rest instead of animating them
    #[serde(default)]
    pub reduced_motion: bool,
}

impl FolioConfig {
    /// Load `path`, or `folio.toml` in the working directory
    ///
    /// An explicitly given file must exist; the implicit one falls back to
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file {} not found", path.display());
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: FolioConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        // Content paths are relative to the config file
        if let (Some(content), Some(dir)) = (config.content.as_mut(), path.parent()) {
            if content.is_relative() {
                *content = dir.join(&*content);
            }
        }
        Ok(config)
    }

    pub fn viewport_size(&self) -> ViewportSize {
        ViewportSize::new(self.viewport.width, self.viewport.height)
    }

    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            snap: self.snap.clone(),
            reduced_motion: self.motion.reduced_motion,
        }
    }

    /// Load the configured content, or the bundled sample
    pub fn load_content(&self) -> Result<PortfolioContent> {
        match &self.content {
            Some(path) => FileContentProvider::new(path)
                .load()
                .with_context(|| format!("Failed to load content from {}", path.display())),
            None => StaticContent::sample()
                .and_then(|sample| sample.load())
                .context("Failed to load bundled sample content"),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ViewportConfig { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            anyhow::bail!("Viewport must have a positive size, got {width}x{height}");
        }
        if !self.snap.buffer.is_finite() || self.snap.buffer < 0.0 {
            anyhow::bail!("Snap buffer must be a non-negative fraction, got {}", self.snap.buffer);
        }
        if self.snap.min_duration_ms > self.snap.max_duration_ms {
            tracing::warn!(
                min = self.snap.min_duration_ms,
                max = self.snap.max_duration_ms,
                "snap min duration exceeds max, max is used for both"
            );
        }
        Ok(())
    }
}
