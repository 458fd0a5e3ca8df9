//! Pin registry
//!
//! Tracks the scroll spans of pinned sections. Sections register a span when
//! they mount, replace it when their binding is recreated, and unregister it
//! when they unmount. The snap coordinator reads a sorted snapshot.
//!
//! The registry is a cheap-to-clone handle; every clone sees the same
//! entries.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrollError};

/// Identifier of a section binding
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Absolute scroll offsets a pinned section occupies
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinSpan {
    start: f32,
    end: f32,
}

impl PinSpan {
    /// Create a span; `end` must be finite and not before `start`
    pub fn new(id: &SectionId, start: f32, end: f32) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || end < start {
            return Err(ScrollError::InvalidPinSpan {
                id: id.to_string(),
                start,
                end,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn center(&self) -> f32 {
        self.start + (self.end - self.start) / 2.0
    }
}

/// One registered pin
#[derive(Clone, Debug, PartialEq)]
pub struct PinEntry {
    pub id: SectionId,
    pub span: PinSpan,
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// Insertion order is registration order
    entries: IndexMap<SectionId, PinSpan>,
    /// Bumped on every change
    generation: u64,
}

/// Shared registry of pinned spans
#[derive(Clone, Debug, Default)]
pub struct PinRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl PinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace the span for `id`
    ///
    /// A replaced entry keeps its original registration position.
    pub fn register(&self, id: SectionId, span: PinSpan) {
        let mut inner = self.write();
        tracing::debug!(%id, start = span.start, end = span.end, "pin registered");
        inner.entries.insert(id, span);
        inner.generation += 1;
    }

    /// Remove the span for `id`; unknown ids are ignored
    pub fn unregister(&self, id: &SectionId) -> Option<PinSpan> {
        let mut inner = self.write();
        let removed = inner.entries.shift_remove(id);
        if removed.is_some() {
            tracing::debug!(%id, "pin unregistered");
            inner.generation += 1;
        }
        removed
    }

    pub fn get(&self, id: &SectionId) -> Option<PinSpan> {
        self.read().entries.get(id).copied()
    }

    /// Entries sorted by start, equal starts in registration order
    pub fn snapshot(&self) -> Vec<PinEntry> {
        let mut entries: Vec<PinEntry> = self
            .read()
            .entries
            .iter()
            .map(|(id, span)| PinEntry {
                id: id.clone(),
                span: *span,
            })
            .collect();
        // `sort_by` is stable
        entries.sort_by(|a, b| a.span.start.total_cmp(&b.span.start));
        entries
    }

    /// Counter that changes whenever the registry changes
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        if !inner.entries.is_empty() {
            inner.entries.clear();
            inner.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: f32, end: f32) -> PinSpan {
        PinSpan::new(&SectionId::from("test"), start, end).unwrap()
    }

    #[test]
    fn test_invalid_span_rejected() {
        let id = SectionId::from("hero");
        assert!(PinSpan::new(&id, 10.0, 5.0).is_err());
        assert!(PinSpan::new(&id, f32::NAN, 5.0).is_err());
        assert!(PinSpan::new(&id, 5.0, 5.0).is_ok());
    }

    #[test]
    fn test_register_replaces() {
        let registry = PinRegistry::new();
        registry.register("hero".into(), span(0.0, 100.0));
        registry.register("hero".into(), span(0.0, 250.0));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&"hero".into()).unwrap().end(), 250.0);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = PinRegistry::new();
        registry.register("hero".into(), span(0.0, 100.0));
        let generation = registry.generation();

        assert!(registry.unregister(&"hero".into()).is_some());
        assert!(registry.unregister(&"hero".into()).is_none());
        assert!(registry.is_empty());
        assert_eq!(registry.generation(), generation + 1);
    }

    #[test]
    fn test_snapshot_sorted_and_stable() {
        let registry = PinRegistry::new();
        registry.register("contact".into(), span(900.0, 1200.0));
        registry.register("b".into(), span(100.0, 200.0));
        registry.register("a".into(), span(100.0, 300.0));
        registry.register("hero".into(), span(0.0, 100.0));

        let ids: Vec<_> = registry
            .snapshot()
            .into_iter()
            .map(|entry| entry.id.as_str().to_owned())
            .collect();
        assert_eq!(ids, ["hero", "b", "a", "contact"]);
    }

    #[test]
    fn test_clones_share_entries() {
        let registry = PinRegistry::new();
        let handle = registry.clone();
        handle.register("about".into(), span(10.0, 20.0));
        assert_eq!(registry.len(), 1);
    }
}
