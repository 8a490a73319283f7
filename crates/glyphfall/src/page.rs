//! Page content and the stacking layout that places it.
//!
//! Content is a TOML document: an optional `[canvas]` hosting the rain, an
//! optional `[hero]` with a typed title and cycling strings, and a list of
//! `[[sections]]`, each tagged with the reveal kind it plays. Positions are
//! in terminal cells with `y` measured from the top of the page.

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use glyphfall_core::{AnimationKind, ElementId, Millis, Point, Rect, Rgba};
use serde::Deserialize;

const BUILTIN_PAGE: &str = include_str!("../page.toml");

/// Element of the hero title.
pub const HERO_TITLE: ElementId = ElementId(0);
/// Element of the hero's cycling line.
pub const HERO_CYCLE: ElementId = ElementId(1);
const FIRST_SECTION: u32 = 16;

const MAX_COLUMN_WIDTH: u16 = 72;
const MIN_HERO_HEIGHT: u16 = 7;
const BORDER: u16 = 2;
const GAP: u16 = 1;

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    title: String,
    canvas: Option<Canvas>,
    hero: Option<Hero>,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Vec<String>,
    text: Option<String>,
    speed: Option<Millis>,
    #[serde(default)]
    items: Vec<String>,
    #[serde(default)]
    skills: Vec<Skill>,
    #[serde(default)]
    tilt: bool,
}

/// Host for the rain field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Canvas {
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_background() -> String {
    "#000000".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hero {
    pub title: String,
    #[serde(default)]
    pub cycle: Vec<String>,
    /// Typing speed of the cycling line, ms per character.
    pub speed: Option<Millis>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Percentage, clamped to 100 when drawn.
    pub level: u8,
}

/// A reveal block on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: ElementId,
    pub kind: AnimationKind,
    pub title: String,
    pub body: Vec<String>,
    /// Typed text for typewriter kinds.
    pub text: String,
    pub speed: Option<Millis>,
    pub items: Vec<String>,
    pub skills: Vec<Skill>,
    /// Follows the pointer like a card.
    pub tilt: bool,
}

impl Section {
    /// Number of children a staggered or skill reveal animates.
    pub fn children(&self) -> usize {
        match self.kind {
            AnimationKind::StaggeredFade => self.items.len(),
            AnimationKind::SkillReveal => self.skills.len(),
            _ => 0,
        }
    }

    fn content_height(&self, inner_width: u16) -> u16 {
        let lines = match self.kind {
            AnimationKind::TypewriterOnce | AnimationKind::TypewriterScroll => {
                // One extra cell for the cursor
                let chars = self.text.chars().count() + 1;
                chars.div_ceil(usize::from(inner_width.max(1)))
            }
            AnimationKind::StaggeredFade => self.items.len(),
            AnimationKind::SkillReveal => self.skills.len(),
            AnimationKind::Fade | AnimationKind::SlideFromLeft | AnimationKind::Pulse => {
                self.body.len()
            }
        };
        u16::try_from(lines).unwrap_or(u16::MAX).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    pub canvas: Option<Canvas>,
    pub hero: Option<Hero>,
    pub sections: Vec<Section>,
}

impl Page {
    /// The page bundled with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_PAGE).wrap_err("built-in page is invalid")
    }

    /// Load `path`, or the built-in page when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read page {}", path.display()))?;
        Self::from_toml_str(&text)
            .wrap_err_with(|| format!("failed to parse page {}", path.display()))
    }

    /// Parse a page. Sections with an unknown kind are skipped.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawPage = toml::from_str(text)?;

        let sections = raw
            .sections
            .into_iter()
            .enumerate()
            .filter_map(|(index, section)| {
                let kind = match section.kind.parse::<AnimationKind>() {
                    Ok(kind) => kind,
                    Err(err) => {
                        tracing::warn!(index, %err, "skipping section");
                        return None;
                    }
                };
                let text = section
                    .text
                    .or_else(|| section.body.first().cloned())
                    .unwrap_or_default();
                Some(Section {
                    id: ElementId(FIRST_SECTION + index as u32),
                    kind,
                    title: section.title,
                    body: section.body,
                    text,
                    speed: section.speed,
                    items: section.items,
                    skills: section.skills,
                    tilt: section.tilt,
                })
            })
            .collect();

        Ok(Self {
            title: raw.title,
            canvas: raw.canvas,
            hero: raw.hero,
            sections,
        })
    }

    /// Background colour of the rain canvas; black when unset or invalid.
    pub fn background(&self) -> Rgba {
        let Some(canvas) = &self.canvas else {
            return Rgba::BLACK;
        };
        Rgba::from_hex(&canvas.background).unwrap_or_else(|| {
            tracing::warn!(value = %canvas.background, "invalid canvas background");
            Rgba::BLACK
        })
    }

    pub fn section(&self, id: ElementId) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }
}

/// Where an element sits on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub element: ElementId,
    pub area: Rect,
}

/// Elements stacked top to bottom in a single centred column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    placements: Vec<Placement>,
    height: f32,
}

impl PageLayout {
    /// Lay out `page` for a viewport of `width` by `viewport_height` cells.
    /// The hero fills the first screen so sections start below the fold.
    pub fn compute(page: &Page, width: u16, viewport_height: u16) -> Self {
        let column = width.saturating_sub(4).clamp(width.min(1), MAX_COLUMN_WIDTH);
        let x = f32::from((width - column.min(width)) / 2);
        let column_width = f32::from(column);

        let mut placements = Vec::with_capacity(page.sections.len() + 1);
        let mut y = 0.0;

        if page.hero.is_some() {
            let height = f32::from(viewport_height.max(MIN_HERO_HEIGHT));
            placements.push(Placement {
                element: HERO_TITLE,
                area: Rect::new(x, y, column_width, height),
            });
            y += height;
        }

        let inner = column.saturating_sub(BORDER);
        for section in &page.sections {
            let height = f32::from(section.content_height(inner) + BORDER);
            placements.push(Placement {
                element: section.id,
                area: Rect::new(x, y, column_width, height),
            });
            y += height + f32::from(GAP);
        }

        Self {
            placements,
            height: y,
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn bounds(&self, element: ElementId) -> Option<Rect> {
        self.placements
            .iter()
            .find(|placement| placement.element == element)
            .map(|placement| placement.area)
    }

    /// Furthest the page can scroll for a viewport of `viewport_height` rows.
    pub fn max_scroll(&self, viewport_height: u16) -> u16 {
        let max = (self.height - f32::from(viewport_height)).max(0.0);
        max.ceil().min(f32::from(u16::MAX)) as u16
    }

    /// Topmost element under a page-space point.
    pub fn hit(&self, point: Point) -> Option<ElementId> {
        self.placements
            .iter()
            .find(|placement| placement.area.contains(point))
            .map(|placement| placement.element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        title = "test"

        [canvas]

        [hero]
        title = "B4Y0N3TTA"
        cycle = ["Rae", "B4Y0N3TTA"]

        [[sections]]
        kind = "fade"
        title = "About"
        body = ["one", "two"]

        [[sections]]
        kind = "wobble"
        title = "Nope"

        [[sections]]
        kind = "typewriter-scroll"
        title = "whoami"
        body = ["0123456789"]

        [[sections]]
        kind = "staggered-fade"
        title = "Tools"
        items = ["a", "b", "c"]
        tilt = true
    "#;

    #[test]
    fn builtin_page_parses() {
        let page = Page::builtin().unwrap();
        assert!(page.canvas.is_some());
        assert!(page.hero.is_some());
        assert!(!page.sections.is_empty());
    }

    #[test]
    fn unknown_kinds_are_skipped() {
        let page = Page::from_toml_str(PAGE).unwrap();
        let kinds: Vec<AnimationKind> = page.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AnimationKind::Fade,
                AnimationKind::TypewriterScroll,
                AnimationKind::StaggeredFade
            ]
        );
        // Ids follow document order, skipped entries included
        assert_eq!(page.sections[1].id, ElementId(FIRST_SECTION + 2));
    }

    #[test]
    fn typewriter_text_falls_back_to_body() {
        let page = Page::from_toml_str(PAGE).unwrap();
        assert_eq!(page.sections[1].text, "0123456789");
        assert_eq!(page.sections[2].children(), 3);
        assert!(page.sections[2].tilt);
    }

    #[test]
    fn canvas_is_optional() {
        let page = Page::from_toml_str("[[sections]]\nkind = \"pulse\"").unwrap();
        assert!(page.canvas.is_none());
        assert_eq!(page.background(), Rgba::BLACK);
    }

    #[test]
    fn malformed_page_is_an_error() {
        assert!(Page::from_toml_str("sections = 3").is_err());
    }

    #[test]
    fn sections_stack_below_the_hero() {
        let page = Page::from_toml_str(PAGE).unwrap();
        let layout = PageLayout::compute(&page, 80, 24);

        let hero = layout.bounds(HERO_TITLE).unwrap();
        assert_eq!(hero.height, 24.0);
        assert_eq!(hero.width, 72.0);
        assert_eq!(hero.x, 4.0);

        let about = layout.bounds(page.sections[0].id).unwrap();
        assert_eq!(about.y, 24.0);
        assert_eq!(about.height, 4.0);

        let mut previous_bottom = 0.0;
        for placement in layout.placements() {
            assert!(placement.area.y >= previous_bottom);
            previous_bottom = placement.area.bottom();
        }
        // One gap row follows the last section
        let end = previous_bottom + 1.0;
        assert_eq!(layout.max_scroll(24), (end - 24.0) as u16);
    }

    #[test]
    fn typewriter_blocks_wrap_on_narrow_screens() {
        let page = Page::from_toml_str(PAGE).unwrap();
        let whoami = page.sections[1].id;

        let wide = PageLayout::compute(&page, 80, 24).bounds(whoami).unwrap();
        assert_eq!(wide.height, 3.0);

        // 8 columns leave 4 - 2 = 2 inner cells: 11 chars over 6 lines
        let narrow = PageLayout::compute(&page, 8, 24).bounds(whoami).unwrap();
        assert_eq!(narrow.width, 4.0);
        assert_eq!(narrow.height, 8.0);
    }

    #[test]
    fn hit_finds_the_section_under_a_point() {
        let page = Page::from_toml_str(PAGE).unwrap();
        let layout = PageLayout::compute(&page, 80, 24);
        let about = layout.bounds(page.sections[0].id).unwrap();

        assert_eq!(layout.hit(about.center()), Some(page.sections[0].id));
        assert_eq!(layout.hit(Point::new(0.0, about.y)), None);
    }
}
