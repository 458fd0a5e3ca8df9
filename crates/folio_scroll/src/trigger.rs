//! Trigger expressions
//!
//! Flowing bindings are declared relative to their element's box:
//!
//! - start: `"<element-anchor> <viewport-anchor>"`, e.g. `"top 80%"` starts
//!   when the element's top reaches 80% down the viewport.
//! - end: the same form, or `"+=<n>%"` / `"+=<n>px"` relative to the start.
//!   Relative percentages are of the viewport height.
//!
//! Anchors are `top`, `center`, `bottom`, `<n>%` or `<n>px` (a bare number
//! is px).
//!
//! # Example
//!
//! ```rust
//! use folio_scroll::{ElementBox, TriggerSpec};
//!
//! let spec = TriggerSpec::parse("top 80%", "top 55%").unwrap();
//! let (start, end) = spec.resolve(&ElementBox::new(1000.0, 400.0), 800.0);
//!
//! assert_eq!(start, 360.0);
//! assert_eq!(end, 560.0);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, ScrollError};

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(top|center|bottom)|(-?\d+(?:\.\d+)?)(%|px)?)$").expect("valid anchor regex")
});

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+=\s*(-?\d+(?:\.\d+)?)(%|px)?$").expect("valid relative regex")
});

fn invalid(expr: &str, reason: impl Into<String>) -> ScrollError {
    ScrollError::InvalidTrigger {
        expr: expr.to_owned(),
        reason: reason.into(),
    }
}

// ============================================================================
// Lengths and anchors
// ============================================================================

/// A length in px or as a percentage of some extent
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    /// Resolve against `extent` px
    pub fn resolve(&self, extent: f32) -> f32 {
        match *self {
            Length::Px(px) => px,
            Length::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(px) => write!(f, "{px}px"),
            Length::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// A point within an element or the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
    At(Length),
}

impl Anchor {
    /// Distance from the top of an extent `extent` px tall
    pub fn resolve(&self, extent: f32) -> f32 {
        match self {
            Anchor::Top => 0.0,
            Anchor::Center => extent / 2.0,
            Anchor::Bottom => extent,
            Anchor::At(length) => length.resolve(extent),
        }
    }
}

impl FromStr for Anchor {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = ANCHOR_RE
            .captures(s.trim())
            .ok_or_else(|| invalid(s, "expected top, center, bottom, <n>% or <n>px"))?;

        if let Some(keyword) = caps.get(1) {
            return Ok(match keyword.as_str() {
                "top" => Anchor::Top,
                "center" => Anchor::Center,
                _ => Anchor::Bottom,
            });
        }

        let value: f32 = caps[2].parse().map_err(|_| invalid(s, "bad number"))?;
        Ok(match caps.get(3).map(|unit| unit.as_str()) {
            Some("%") => Anchor::At(Length::Percent(value)),
            _ => Anchor::At(Length::Px(value)),
        })
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Top => f.write_str("top"),
            Anchor::Center => f.write_str("center"),
            Anchor::Bottom => f.write_str("bottom"),
            Anchor::At(length) => write!(f, "{length}"),
        }
    }
}

// ============================================================================
// Trigger positions
// ============================================================================

/// `"<element-anchor> <viewport-anchor>"`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerPosition {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl TriggerPosition {
    pub fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the element anchor meets the viewport anchor
    pub fn resolve(&self, element: &ElementBox, viewport_height: f32) -> f32 {
        element.top + self.element.resolve(element.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for TriggerPosition {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid(s, "expected '<element-anchor> <viewport-anchor>'"));
        };
        Ok(Self {
            element: element.parse().map_err(|_| invalid(s, format!("bad element anchor '{element}'")))?,
            viewport: viewport
                .parse()
                .map_err(|_| invalid(s, format!("bad viewport anchor '{viewport}'")))?,
        })
    }
}

impl fmt::Display for TriggerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// End of a binding
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerEnd {
    /// Same form as the start
    At(TriggerPosition),
    /// Distance after the start; percentages are of the viewport height
    After(Length),
}

impl FromStr for TriggerEnd {
    type Err = ScrollError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if !trimmed.starts_with("+=") {
            return trimmed.parse().map(TriggerEnd::At);
        }

        let caps = RELATIVE_RE
            .captures(trimmed)
            .ok_or_else(|| invalid(s, "expected '+=<n>%' or '+=<n>px'"))?;
        let value: f32 = caps[1].parse().map_err(|_| invalid(s, "bad number"))?;
        Ok(TriggerEnd::After(match caps.get(2).map(|unit| unit.as_str()) {
            Some("%") => Length::Percent(value),
            _ => Length::Px(value),
        }))
    }
}

impl fmt::Display for TriggerEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEnd::At(position) => write!(f, "{position}"),
            TriggerEnd::After(length) => write!(f, "+={length}"),
        }
    }
}

// ============================================================================
// Element box and spec
// ============================================================================

/// Vertical extent of an element in page coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ElementBox {
    pub top: f32,
    pub height: f32,
}

impl ElementBox {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// A parsed start/end pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerSpec {
    pub start: TriggerPosition,
    pub end: TriggerEnd,
}

impl TriggerSpec {
    pub fn new(start: TriggerPosition, end: TriggerEnd) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// `"top top"` to `"+=<length>"`, the pinned-section form
    pub fn pinned(length: Length) -> Self {
        Self {
            start: TriggerPosition::new(Anchor::Top, Anchor::Top),
            end: TriggerEnd::After(length),
        }
    }

    /// Absolute `(start, end)` offsets for `element`
    ///
    /// Offsets are not clamped to the scrollable range.
    pub fn resolve(&self, element: &ElementBox, viewport_height: f32) -> (f32, f32) {
        let start = self.start.resolve(element, viewport_height);
        let end = match self.end {
            TriggerEnd::At(position) => position.resolve(element, viewport_height),
            TriggerEnd::After(length) => start + length.resolve(viewport_height),
        };
        (start, end)
    }

    /// Resolve, rejecting empty and inverted spans
    pub fn resolve_range(
        &self,
        id: &str,
        element: &ElementBox,
        viewport_height: f32,
    ) -> Result<(f32, f32)> {
        let (start, end) = self.resolve(element, viewport_height);
        if end.is_nan() || start.is_nan() || end <= start {
            return Err(ScrollError::EmptyRange {
                id: id.to_owned(),
                start,
                end,
            });
        }
        Ok((start, end))
    }
}

impl fmt::Display for TriggerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}
