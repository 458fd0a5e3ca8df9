//! Page layout
//!
//! Sections stack vertically. Pinned sections are one viewport tall and
//! reserve their pin length as spacing after themselves, so the content
//! below only arrives once the pin is released. Flowing sections size to
//! their header and items.

use folio_core::PortfolioContent;
use folio_scroll::{ElementBox, PinSpan, SectionId};

use crate::sections::SectionKind;

/// Vertical padding above and below a flowing section's content
const SECTION_PADDING: f32 = 0.12;
const HEADER_HEIGHT: f32 = 0.18;
const FOOTER_HEIGHT: f32 = 0.35;

/// Viewport dimensions used to resolve `vw`/`vh` lengths
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// `n` percent of the viewport width
    pub fn vw(&self, n: f32) -> f32 {
        self.width * n / 100.0
    }

    /// `n` percent of the viewport height
    pub fn vh(&self, n: f32) -> f32 {
        self.height * n / 100.0
    }
}

/// Boxes of one laid-out section
#[derive(Clone, Debug, PartialEq)]
pub struct SectionLayout {
    pub kind: SectionKind,
    pub top: f32,
    pub height: f32,
    /// Scroll distance the section stays pinned for
    pub pin_spacing: f32,
    pub header: Option<ElementBox>,
    /// One box per card / entry / column, in content order
    pub items: Vec<ElementBox>,
}

impl SectionLayout {
    /// The section's own box
    pub fn element(&self) -> ElementBox {
        ElementBox::new(self.top, self.height)
    }

    /// Where the next section starts
    pub fn bottom(&self) -> f32 {
        self.top + self.height + self.pin_spacing
    }

    /// Scroll span the section is pinned over, for pinned sections
    pub fn pin_span(&self) -> Option<PinSpan> {
        if !self.kind.is_pinned() {
            return None;
        }
        PinSpan::new(
            &SectionId::from(self.kind.id()),
            self.top,
            self.top + self.pin_spacing,
        )
        .ok()
    }
}

/// Vertical layout of a whole page
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageLayout {
    viewport_height: f32,
    sections: Vec<SectionLayout>,
}

impl PageLayout {
    /// Lay out `kinds` top to bottom
    pub fn compute(kinds: &[SectionKind], content: &PortfolioContent, viewport: ViewportSize) -> Self {
        let vh = viewport.height;
        let mut sections = Vec::with_capacity(kinds.len());
        let mut top = 0.0;

        for &kind in kinds {
            let section = match kind.pin_length() {
                Some(length) => SectionLayout {
                    kind,
                    top,
                    height: vh,
                    pin_spacing: length.resolve(vh),
                    header: None,
                    items: Vec::new(),
                },
                None if kind == SectionKind::Footer => SectionLayout {
                    kind,
                    top,
                    height: FOOTER_HEIGHT * vh,
                    pin_spacing: 0.0,
                    header: None,
                    items: Vec::new(),
                },
                None => flowing(kind, top, item_count(kind, content), vh),
            };
            top = section.bottom();
            sections.push(section);
        }

        tracing::debug!(sections = sections.len(), content_height = top, "page laid out");
        Self {
            viewport_height: vh,
            sections,
        }
    }

    pub fn sections(&self) -> &[SectionLayout] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> Option<&SectionLayout> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    /// Total document height
    pub fn content_height(&self) -> f32 {
        self.sections.last().map_or(0.0, SectionLayout::bottom)
    }

    /// `content_height - viewport_height`, never negative
    pub fn max_scroll(&self) -> f32 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    /// Spans of every pinned section, in page order
    pub fn pin_spans(&self) -> Vec<(SectionKind, PinSpan)> {
        self.sections
            .iter()
            .filter_map(|section| section.pin_span().map(|span| (section.kind, span)))
            .collect()
    }
}

fn item_count(kind: SectionKind, content: &PortfolioContent) -> usize {
    match kind {
        SectionKind::Projects => content.projects.len(),
        SectionKind::Experience => content.experiences.len(),
        SectionKind::Publications => content.publications.len(),
        SectionKind::Skills => content.skill_categories.len(),
        _ => 0,
    }
}

/// Item height as a share of the viewport height
fn item_height(kind: SectionKind) -> f32 {
    match kind {
        SectionKind::Projects => 0.45,
        SectionKind::Experience => 0.40,
        SectionKind::Publications => 0.35,
        SectionKind::Skills => 0.50,
        _ => 0.0,
    }
}

fn flowing(kind: SectionKind, top: f32, count: usize, vh: f32) -> SectionLayout {
    let padding = SECTION_PADDING * vh;
    let header = ElementBox::new(top + padding, HEADER_HEIGHT * vh);
    let item_height = item_height(kind) * vh;

    let mut cursor = header.bottom();
    let items = (0..count)
        .map(|_| {
            let item = ElementBox::new(cursor, item_height);
            cursor = item.bottom();
            item
        })
        .collect();

    SectionLayout {
        kind,
        top,
        height: cursor + padding - top,
        pin_spacing: 0.0,
        header: Some(header),
        items,
    }
}
