//! Section presets
//!
//! Each [`SectionKind`] knows how to turn its laid-out boxes and the
//! portfolio content into a [`SectionPlan`]: the tweens it animates and the
//! scroll ranges they are bound to.
//!
//! Pinned sections (hero, about, contact, thank-you) hold the viewport for a
//! fixed share of its height and play an entrance/exit timeline with a
//! lagging scrub. Flowing sections bind one short tween per element to a
//! `"top 80%" -> "top 55%"` style trigger.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use folio_animation::{
    Easing, ElementId, PropertySet, PropertySink, Scrub, TimelineBuilder, ToggleEvent, Tween,
};
use folio_core::PortfolioContent;
use folio_scroll::{
    ElementBox, Length, SectionAnimationDescriptor, SectionPlan, TriggerSpec,
};

use crate::error::{FolioError, Result};
use crate::layout::{SectionLayout, ViewportSize};

/// Scrub lag of the pinned timelines, in seconds
pub const PINNED_SCRUB_LAG: f32 = 0.6;

// ============================================================================
// Section kinds
// ============================================================================

/// The sections of the home page, in page order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Hero,
    About,
    Projects,
    Experience,
    Publications,
    Skills,
    Contact,
    ThankYou,
    Footer,
}

impl SectionKind {
    /// Every section of the home page, top to bottom
    pub const HOME: [SectionKind; 9] = [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Projects,
        SectionKind::Experience,
        SectionKind::Publications,
        SectionKind::Skills,
        SectionKind::Contact,
        SectionKind::ThankYou,
        SectionKind::Footer,
    ];

    pub fn id(self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::About => "about",
            SectionKind::Projects => "projects",
            SectionKind::Experience => "experience",
            SectionKind::Publications => "publications",
            SectionKind::Skills => "skills",
            SectionKind::Contact => "contact",
            SectionKind::ThankYou => "thank-you",
            SectionKind::Footer => "footer",
        }
    }

    /// Navigation anchor (`#projects`), for sections linked from the nav bar
    pub fn anchor(self) -> Option<&'static str> {
        match self {
            SectionKind::Projects => Some("#projects"),
            SectionKind::Experience => Some("#experience"),
            SectionKind::Publications => Some("#publications"),
            SectionKind::Skills => Some("#skills"),
            SectionKind::Contact => Some("#contact"),
            _ => None,
        }
    }

    /// How long the section stays pinned, relative to the viewport height
    pub fn pin_length(self) -> Option<Length> {
        match self {
            SectionKind::Hero | SectionKind::About => Some(Length::Percent(130.0)),
            SectionKind::Contact | SectionKind::ThankYou => Some(Length::Percent(120.0)),
            _ => None,
        }
    }

    pub fn is_pinned(self) -> bool {
        self.pin_length().is_some()
    }

    /// Build the section's bindings from its layout and the page content
    pub fn plan(
        self,
        layout: &SectionLayout,
        content: &PortfolioContent,
        viewport: ViewportSize,
        sink: &Arc<dyn PropertySink>,
    ) -> Result<SectionPlan> {
        let plan = match self {
            SectionKind::Hero => hero(layout, viewport, sink)?,
            SectionKind::About => about(layout, viewport)?,
            SectionKind::Contact => contact(layout, viewport)?,
            SectionKind::ThankYou => thank_you(layout, viewport)?,
            SectionKind::Projects => projects(layout, content, viewport)?,
            SectionKind::Experience => experience(layout, content, viewport)?,
            SectionKind::Publications => publications(layout, content, viewport)?,
            SectionKind::Skills => skills(layout, content, viewport)?,
            SectionKind::Footer => footer(layout, viewport)?,
        };
        tracing::trace!(section = self.id(), bindings = plan.bindings().len(), "section planned");
        Ok(plan)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.id())
    }
}

impl FromStr for SectionKind {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().trim_start_matches('#');
        SectionKind::HOME
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| FolioError::UnknownAnchor(s.to_owned()))
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

fn fade() -> PropertySet {
    PropertySet::new().opacity(0.0)
}

fn shown() -> PropertySet {
    PropertySet::new().opacity(1.0)
}

/// Pinned entrances track the scroll linearly
fn enter(element: impl Into<ElementId>, from: PropertySet, to: PropertySet, at: f32) -> Tween {
    Tween::from_to(element, from, to).at(at).ease(Easing::Linear)
}

/// Exit tweens ease in
fn exit(element: impl Into<ElementId>, from: PropertySet, to: PropertySet, at: f32) -> Tween {
    Tween::from_to(element, from, to).at(at).ease(Easing::PowerIn(2))
}

fn pinned_binding(
    layout: &SectionLayout,
    viewport: ViewportSize,
    timeline: TimelineBuilder,
) -> Result<SectionAnimationDescriptor> {
    let kind = layout.kind;
    let length = kind.pin_length().unwrap_or(Length::Percent(100.0));
    let descriptor = SectionAnimationDescriptor::from_trigger(
        kind.id(),
        &TriggerSpec::pinned(length),
        &layout.element(),
        viewport.height,
        timeline.build()?,
    )?;
    Ok(descriptor.pinned().with_scrub(Scrub::Lag(PINNED_SCRUB_LAG)))
}

/// One tween bound to a trigger on `element`
fn flowing_binding(
    id: String,
    element: &ElementBox,
    start: &str,
    end: &str,
    viewport: ViewportSize,
    tween: Tween,
) -> Result<SectionAnimationDescriptor> {
    let trigger = TriggerSpec::parse(start, end)?;
    let tracks = TimelineBuilder::new().add(tween).build()?;
    Ok(SectionAnimationDescriptor::from_trigger(
        id,
        &trigger,
        element,
        viewport.height,
        tracks,
    )?)
}

/// Headers of flowing sections drop in from above
fn header_binding(
    layout: &SectionLayout,
    viewport: ViewportSize,
    lift_vh: f32,
    end: &str,
) -> Result<Option<SectionAnimationDescriptor>> {
    let Some(header) = layout.header else {
        return Ok(None);
    };
    let id = format!("{}-header", layout.kind.id());
    let tween = Tween::from_to(
        id.as_str(),
        PropertySet::new().y(viewport.vh(lift_vh)).opacity(0.0),
        PropertySet::new().y(0.0).opacity(1.0),
    );
    flowing_binding(id.clone(), &header, "top 80%", end, viewport, tween).map(Some)
}

fn item_box(layout: &SectionLayout, index: usize) -> ElementBox {
    layout
        .items
        .get(index)
        .copied()
        .unwrap_or_else(|| layout.element())
}

// ============================================================================
// Pinned sections
// ============================================================================

/// Hero elements animated by the exit timeline
pub const HERO_ELEMENTS: [&str; 6] = [
    "hero-headline",
    "hero-subhead",
    "hero-cta",
    "hero-line-1",
    "hero-line-2",
    "hero-location",
];

/// Put every hero element back at rest
pub fn reset_hero(sink: &dyn PropertySink) {
    let rest = PropertySet::new().x(0.0).y(0.0).opacity(1.0);
    for element in HERO_ELEMENTS {
        sink.apply(&ElementId::from(element), &rest);
    }
}

fn hero(
    layout: &SectionLayout,
    viewport: ViewportSize,
    sink: &Arc<dyn PropertySink>,
) -> Result<SectionPlan> {
    let at_rest = PropertySet::new().x(0.0).opacity(1.0);
    let pushed = PropertySet::new().x(viewport.vw(-10.0)).opacity(0.25);
    let dimmed = PropertySet::new().opacity(0.2);

    let timeline = TimelineBuilder::new()
        .add(exit("hero-headline", at_rest.clone(), pushed.clone(), 0.70))
        .add(exit("hero-subhead", at_rest.clone(), pushed.clone(), 0.72))
        .add(exit("hero-cta", at_rest, pushed, 0.74))
        .add_each(
            ["hero-line-1", "hero-line-2"],
            exit("hero-line", shown(), dimmed.clone(), 0.70),
        )
        .add(exit("hero-location", shown(), dimmed, 0.75));

    let sink = Arc::clone(sink);
    let binding = pinned_binding(layout, viewport, timeline)?.on_toggle(move |event| {
        if event == ToggleEvent::LeaveBack {
            reset_hero(sink.as_ref());
        }
    });
    Ok(SectionPlan::new(SectionKind::Hero.id()).binding(binding))
}

fn about(layout: &SectionLayout, viewport: ViewportSize) -> Result<SectionPlan> {
    let timeline = TimelineBuilder::new()
        .add(enter(
            "about-statement",
            PropertySet::new().y(viewport.vh(40.0)).opacity(0.0),
            PropertySet::new().y(0.0).opacity(1.0),
            0.0,
        ))
        .add(enter(
            "about-line",
            PropertySet::new().scale_x(0.0),
            PropertySet::new().scale_x(1.0),
            0.10,
        ))
        .add(enter(
            "about-microcopy",
            PropertySet::new().y(viewport.vh(10.0)).opacity(0.0),
            PropertySet::new().y(0.0).opacity(1.0),
            0.15,
        ))
        .add(enter("about-label", fade(), shown(), 0.10))
        .add(enter(
            "about-decor",
            PropertySet::new().opacity(0.0).scale(0.8),
            PropertySet::new().opacity(1.0).scale(1.0),
            0.20,
        ))
        .add(exit(
            "about-statement",
            PropertySet::new().y(0.0).opacity(1.0),
            PropertySet::new().y(viewport.vh(-15.0)).opacity(0.25),
            0.70,
        ))
        .add(exit("about-microcopy", shown(), PropertySet::new().opacity(0.2), 0.75))
        .add(exit("about-label", shown(), PropertySet::new().opacity(0.2), 0.75))
        .add(exit("about-decor", shown(), PropertySet::new().opacity(0.1), 0.75));

    Ok(SectionPlan::new(SectionKind::About.id()).binding(pinned_binding(
        layout, viewport, timeline,
    )?))
}

fn contact(layout: &SectionLayout, viewport: ViewportSize) -> Result<SectionPlan> {
    let settled = PropertySet::new().x(0.0).opacity(1.0);
    let timeline = TimelineBuilder::new()
        .add(enter(
            "contact-cta",
            PropertySet::new().x(viewport.vw(-30.0)).opacity(0.0),
            settled.clone(),
            0.0,
        ))
        .add(enter(
            "contact-form",
            PropertySet::new().x(viewport.vw(30.0)).opacity(0.0),
            settled.clone(),
            0.0,
        ))
        .add(enter(
            "contact-line",
            PropertySet::new().scale_y(0.0),
            PropertySet::new().scale_y(1.0),
            0.10,
        ))
        .add(enter(
            "contact-decor",
            PropertySet::new().opacity(0.0).scale(0.8),
            PropertySet::new().opacity(1.0).scale(1.0),
            0.20,
        ))
        .add(exit(
            "contact-cta",
            settled.clone(),
            PropertySet::new().x(viewport.vw(-10.0)).opacity(0.25),
            0.70,
        ))
        .add(exit(
            "contact-form",
            settled,
            PropertySet::new().x(viewport.vw(10.0)).opacity(0.25),
            0.70,
        ))
        .add(exit("contact-decor", shown(), PropertySet::new().opacity(0.1), 0.75));

    Ok(SectionPlan::new(SectionKind::Contact.id()).binding(pinned_binding(
        layout, viewport, timeline,
    )?))
}

fn thank_you(layout: &SectionLayout, viewport: ViewportSize) -> Result<SectionPlan> {
    let risen = PropertySet::new().y(0.0).opacity(1.0);
    let timeline = TimelineBuilder::new()
        .add(enter(
            "thank-you-headline",
            PropertySet::new().y(viewport.vh(30.0)).opacity(0.0),
            risen.clone(),
            0.0,
        ))
        .add(enter(
            "thank-you-subline",
            PropertySet::new().y(viewport.vh(10.0)).opacity(0.0),
            risen.clone(),
            0.10,
        ))
        .add(enter(
            "thank-you-socials",
            PropertySet::new().y(viewport.vh(10.0)).opacity(0.0),
            risen,
            0.15,
        ))
        .add(enter(
            "thank-you-line",
            PropertySet::new().scale_x(0.0),
            PropertySet::new().scale_x(1.0),
            0.20,
        ))
        .add(exit("thank-you-headline", shown(), PropertySet::new().opacity(0.35), 0.70))
        .add(exit("thank-you-subline", shown(), PropertySet::new().opacity(0.2), 0.72))
        .add(exit("thank-you-socials", shown(), PropertySet::new().opacity(0.2), 0.74));

    Ok(SectionPlan::new(SectionKind::ThankYou.id()).binding(pinned_binding(
        layout, viewport, timeline,
    )?))
}

// ============================================================================
// Flowing sections
// ============================================================================

fn projects(
    layout: &SectionLayout,
    content: &PortfolioContent,
    viewport: ViewportSize,
) -> Result<SectionPlan> {
    let mut plan = SectionPlan::new(SectionKind::Projects.id());
    if let Some(header) = header_binding(layout, viewport, -6.0, "top 50%")? {
        plan.push(header);
    }

    for (index, project) in content.projects.iter().enumerate() {
        let card = item_box(layout, index);
        let base = format!("project-{}", project.id);

        let number = format!("{base}-number");
        plan.push(flowing_binding(
            number.clone(),
            &card,
            "top 75%",
            "top 40%",
            viewport,
            Tween::from_to(
                number.as_str(),
                PropertySet::new().x(viewport.vw(-5.0)).opacity(0.0),
                PropertySet::new().x(0.0).opacity(1.0),
            ),
        )?);

        let body = format!("{base}-content");
        plan.push(flowing_binding(
            body.clone(),
            &card,
            "top 75%",
            "top 40%",
            viewport,
            Tween::from_to(
                body.as_str(),
                PropertySet::new().x(viewport.vw(5.0)).opacity(0.0),
                PropertySet::new().x(0.0).opacity(1.0),
            ),
        )?);

        let line = format!("{base}-line");
        plan.push(flowing_binding(
            line.clone(),
            &card,
            "top 70%",
            "top 45%",
            viewport,
            Tween::from_to(
                line.as_str(),
                PropertySet::new().scale_x(0.0),
                PropertySet::new().scale_x(1.0),
            ),
        )?);
    }
    Ok(plan)
}

fn experience(
    layout: &SectionLayout,
    content: &PortfolioContent,
    viewport: ViewportSize,
) -> Result<SectionPlan> {
    let mut plan = SectionPlan::new(SectionKind::Experience.id());
    if let Some(header) = header_binding(layout, viewport, -4.0, "top 55%")? {
        plan.push(header);
    }

    for (index, entry) in content.experiences.iter().enumerate() {
        let element = item_box(layout, index);
        let id = format!("experience-{}", entry.id);
        plan.push(flowing_binding(
            id.clone(),
            &element,
            "top 75%",
            "top 50%",
            viewport,
            Tween::from_to(
                id.as_str(),
                PropertySet::new().x(viewport.vw(8.0)).opacity(0.0),
                PropertySet::new().x(0.0).opacity(1.0),
            ),
        )?);

        // Later bullets start (and finish) a little further down the viewport
        for bullet in 0..entry.bullets.len() {
            let step = 5.0 * bullet as f32;
            let bullet_id = format!("{id}-bullet-{bullet}");
            plan.push(flowing_binding(
                bullet_id.clone(),
                &element,
                &format!("top {}%", 65.0 - step),
                &format!("top {}%", 50.0 - step),
                viewport,
                Tween::from_to(
                    bullet_id.as_str(),
                    PropertySet::new().scale(0.0),
                    PropertySet::new().scale(1.0),
                ),
            )?);
        }
    }
    Ok(plan)
}

fn publications(
    layout: &SectionLayout,
    content: &PortfolioContent,
    viewport: ViewportSize,
) -> Result<SectionPlan> {
    let mut plan = SectionPlan::new(SectionKind::Publications.id());
    if let Some(header) = header_binding(layout, viewport, -4.0, "top 55%")? {
        plan.push(header);
    }

    for (index, publication) in content.publications.iter().enumerate() {
        let id = format!("publication-{}", publication.id);
        plan.push(flowing_binding(
            id.clone(),
            &item_box(layout, index),
            "top 80%",
            "top 55%",
            viewport,
            Tween::from_to(
                id.as_str(),
                PropertySet::new().y(viewport.vh(8.0)).opacity(0.0),
                PropertySet::new().y(0.0).opacity(1.0),
            ),
        )?);
    }
    Ok(plan)
}

fn skills(
    layout: &SectionLayout,
    content: &PortfolioContent,
    viewport: ViewportSize,
) -> Result<SectionPlan> {
    let mut plan = SectionPlan::new(SectionKind::Skills.id());
    if let Some(header) = header_binding(layout, viewport, -4.0, "top 55%")? {
        plan.push(header);
    }

    for (index, category) in content.skill_categories.iter().enumerate() {
        let column = item_box(layout, index);
        // Columns alternate sliding in from the left and the right
        let side = if index % 2 == 0 { -1.0 } else { 1.0 };
        let id = format!("skills-column-{}", category.id);
        plan.push(flowing_binding(
            id.clone(),
            &column,
            "top 80%",
            "top 55%",
            viewport,
            Tween::from_to(
                id.as_str(),
                PropertySet::new().x(viewport.vw(6.0 * side)).opacity(0.0),
                PropertySet::new().x(0.0).opacity(1.0),
            ),
        )?);

        for row in 0..category.skills.len() {
            let step = 3.0 * row as f32;
            let row_id = format!("{id}-row-{row}");
            plan.push(flowing_binding(
                row_id.clone(),
                &column,
                &format!("top {}%", 70.0 - step),
                &format!("top {}%", 55.0 - step),
                viewport,
                Tween::from_to(
                    row_id.as_str(),
                    PropertySet::new().x(20.0 * side).opacity(0.0),
                    PropertySet::new().x(0.0).opacity(1.0),
                ),
            )?);
        }
    }
    Ok(plan)
}

fn footer(layout: &SectionLayout, viewport: ViewportSize) -> Result<SectionPlan> {
    let binding = flowing_binding(
        "footer-content".to_owned(),
        &layout.element(),
        "top 90%",
        "top 70%",
        viewport,
        Tween::from_to(
            "footer-content",
            PropertySet::new().y(12.0).opacity(0.0),
            PropertySet::new().y(0.0).opacity(1.0),
        ),
    )?;
    Ok(SectionPlan::new(SectionKind::Footer.id()).binding(binding))
}
