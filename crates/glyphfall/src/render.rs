//! Drawing of page elements into off-screen buffers.
//!
//! Each element is drawn at its full size and then copied onto the frame
//! with [`blit`], which clips whatever is scrolled or slid out of view.

use glyphfall_core::{AnimationKind, Rgba, hsl_to_rgb};
use glyphfall_reveal::{Cursor, Rotation, TextDisplay};
use ratatui::{
    buffer::Buffer,
    layout::{self, Alignment},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};

use crate::page::Section;

const WHITE: Rgba = Rgba::rgb(255, 255, 255);
const CURSOR: &str = "█";

/// Colours used for page content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgba,
    pub accent: Rgba,
    pub text: Rgba,
    pub muted: Rgba,
}

impl Palette {
    pub fn new(background: Rgba, accent: Rgba) -> Self {
        Self {
            background,
            accent,
            text: Rgba::rgb(210, 215, 210),
            muted: Rgba::rgb(110, 120, 110),
        }
    }

    /// `color` faded in from the background by `t`.
    fn faded(&self, color: Rgba, t: f32) -> Style {
        Style::new().fg(self.background.lerp(color, t).into())
    }
}

/// Animation state of one section, sampled for the current frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionFrame {
    /// Eased reveal progress of the whole section.
    pub progress: f32,
    /// Eased progress per staggered item or skill bar.
    pub children: Vec<f32>,
    /// Phase of the looping pulse.
    pub pulse: Option<f32>,
    pub text: Option<TextDisplay>,
    /// Whether a resting cursor is in the visible half of its blink.
    pub cursor_on: bool,
    pub tilt: Option<Rotation>,
    pub max_tilt: f32,
}

impl SectionFrame {
    fn child(&self, index: usize) -> f32 {
        self.children.get(index).copied().unwrap_or(self.progress)
    }
}

pub fn draw_section(
    section: &Section,
    frame: &SectionFrame,
    palette: &Palette,
    width: u16,
    height: u16,
) -> Buffer {
    let area = layout::Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    let t = frame.progress;

    let mut border = palette.accent;
    if let Some(phase) = frame.pulse {
        border = border.lerp(WHITE, (phase * std::f32::consts::PI).sin() * 0.6);
    }

    let mut block = Block::bordered()
        .title(Span::styled(
            format!(" {} ", section.title),
            palette.faded(palette.accent, t).add_modifier(Modifier::BOLD),
        ))
        .style(Style::new().bg(palette.background.into()));

    if let Some(rotation) = frame.tilt.filter(|rotation| *rotation != Rotation::NEUTRAL) {
        let lean = rotation.rotate_x.abs().max(rotation.rotate_y.abs()) / frame.max_tilt.max(1.0);
        border = border.lerp(WHITE, lean.min(1.0) * 0.7);
        block = block.title_bottom(
            Line::from(Span::styled(
                rotation.to_string(),
                Style::new().fg(palette.muted.into()),
            ))
            .right_aligned(),
        );
    }
    let block = block.border_style(palette.faded(border, t));

    let lines: Vec<Line> = match section.kind {
        AnimationKind::Fade | AnimationKind::SlideFromLeft | AnimationKind::Pulse => section
            .body
            .iter()
            .map(|line| Line::from(Span::styled(line.clone(), palette.faded(palette.text, t))))
            .collect(),
        AnimationKind::StaggeredFade => section
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let t = frame.child(i);
                Line::from(vec![
                    Span::styled("▸ ", palette.faded(palette.accent, t)),
                    Span::styled(item.clone(), palette.faded(palette.text, t)),
                ])
            })
            .collect(),
        AnimationKind::SkillReveal => skill_lines(section, frame, palette, width.saturating_sub(2)),
        AnimationKind::TypewriterOnce | AnimationKind::TypewriterScroll => {
            let mut spans = Vec::new();
            if let Some(display) = &frame.text {
                spans.push(Span::styled(
                    display.text.clone(),
                    Style::new().fg(palette.text.into()),
                ));
                spans.extend(cursor_span(display.cursor, frame.cursor_on, palette.accent));
            }
            vec![Line::from(spans)]
        }
    };

    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .render(area, &mut buf);
    buf
}

fn skill_lines(
    section: &Section,
    frame: &SectionFrame,
    palette: &Palette,
    inner: u16,
) -> Vec<Line<'static>> {
    let inner = usize::from(inner);
    let name_width = (inner / 2).min(22);
    // " 100%"
    let bar_width = inner.saturating_sub(name_width + 5);

    section
        .skills
        .iter()
        .enumerate()
        .map(|(i, skill)| {
            let t = frame.child(i);
            let level = f32::from(skill.level.min(100)) / 100.0;
            let filled = ((bar_width as f32) * level * t).round() as usize;
            let color = hsl_to_rgb(120.0 * level, 0.8, 0.5);
            let name: String = skill.name.chars().take(name_width).collect();

            Line::from(vec![
                Span::styled(
                    format!("{name:<name_width$}"),
                    palette.faded(palette.text, t),
                ),
                Span::styled(CURSOR.repeat(filled), Style::new().fg(color.into())),
                Span::styled(
                    "░".repeat(bar_width - filled.min(bar_width)),
                    palette.faded(palette.muted, t),
                ),
                Span::styled(
                    format!(" {:>3}%", (level * 100.0 * t).round() as u32),
                    palette.faded(palette.text, t),
                ),
            ])
        })
        .collect()
}

fn cursor_span(cursor: Cursor, cursor_on: bool, color: Rgba) -> Option<Span<'static>> {
    let visible = match cursor {
        Cursor::Hidden => return None,
        Cursor::Typing => true,
        Cursor::Resting => cursor_on,
    };
    Some(if visible {
        Span::styled(CURSOR, Style::new().fg(color.into()))
    } else {
        Span::raw(" ")
    })
}

/// Hero text over a transparent background so the rain shows through.
pub fn draw_hero(
    title: Option<&TextDisplay>,
    cycle: Option<&TextDisplay>,
    cursor_on: bool,
    palette: &Palette,
    width: u16,
    height: u16,
) -> Buffer {
    let area = layout::Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    let middle = height / 2;

    let mut line = |row: u16, spans: Vec<Span<'static>>| {
        if row < height {
            Paragraph::new(Line::from(spans))
                .alignment(Alignment::Center)
                .render(layout::Rect::new(0, row, width, 1), &mut buf);
        }
    };

    if let Some(display) = title {
        let mut spans = vec![Span::styled(
            display.text.clone(),
            Style::new()
                .fg(palette.accent.into())
                .add_modifier(Modifier::BOLD),
        )];
        spans.extend(cursor_span(display.cursor, cursor_on, palette.accent));
        line(middle.saturating_sub(1), spans);
    }

    if let Some(display) = cycle {
        let mut spans = vec![
            Span::styled("> ", Style::new().fg(palette.muted.into())),
            Span::styled(display.text.clone(), Style::new().fg(palette.text.into())),
        ];
        spans.extend(cursor_span(display.cursor, cursor_on, palette.text));
        line(middle + 1, spans);
    }

    line(
        height.saturating_sub(2),
        vec![Span::styled("scroll ↓", Style::new().fg(palette.muted.into()))],
    );
    buf
}

/// Copy `src` onto `dst` with its top-left corner at `(x, y)`, clipped to
/// `dst`. When `transparent`, blank unstyled cells leave `dst` untouched.
pub fn blit(src: &Buffer, dst: &mut Buffer, x: i32, y: i32, transparent: bool) {
    let bounds = dst.area;
    for sy in 0..src.area.height {
        for sx in 0..src.area.width {
            let dx = x + i32::from(sx);
            let dy = y + i32::from(sy);
            if dx < i32::from(bounds.x)
                || dy < i32::from(bounds.y)
                || dx >= i32::from(bounds.right())
                || dy >= i32::from(bounds.bottom())
            {
                continue;
            }
            let Some(cell) = src.cell((src.area.x + sx, src.area.y + sy)) else {
                continue;
            };
            if transparent && cell.symbol() == " " && cell.bg == Color::Reset {
                continue;
            }
            if let Some(target) = dst.cell_mut((dx as u16, dy as u16)) {
                *target = cell.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glyphfall_core::ElementId;

    use super::*;
    use crate::page::Skill;

    fn section(kind: AnimationKind) -> Section {
        Section {
            id: ElementId(16),
            kind,
            title: "About".to_string(),
            body: vec!["hello".to_string()],
            text: String::new(),
            speed: None,
            items: vec!["a".to_string(), "b".to_string()],
            skills: vec![Skill {
                name: "Rust".to_string(),
                level: 50,
            }],
            tilt: false,
        }
    }

    fn palette() -> Palette {
        Palette::new(Rgba::BLACK, Rgba::rgb(0, 255, 65))
    }

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .filter_map(|x| buf.cell((x, y)).map(|cell| cell.symbol().to_string()))
            .collect()
    }

    #[test]
    fn unrevealed_text_matches_background() {
        let frame = SectionFrame::default();
        let buf = draw_section(&section(AnimationKind::Fade), &frame, &palette(), 20, 3);
        let cell = buf.cell((1, 1)).unwrap();
        assert_eq!(cell.symbol(), "h");
        assert_eq!(cell.fg, Color::Rgb(0, 0, 0));

        let frame = SectionFrame {
            progress: 1.0,
            ..SectionFrame::default()
        };
        let buf = draw_section(&section(AnimationKind::Fade), &frame, &palette(), 20, 3);
        assert_eq!(buf.cell((1, 1)).unwrap().fg, Color::Rgb(210, 215, 210));
    }

    #[test]
    fn skill_bar_fills_with_progress() {
        let mut frame = SectionFrame {
            progress: 1.0,
            children: vec![0.0],
            ..SectionFrame::default()
        };
        let sec = section(AnimationKind::SkillReveal);
        let empty = row(&draw_section(&sec, &frame, &palette(), 42, 3), 1);
        assert!(!empty.contains(CURSOR));
        assert!(empty.contains("  0%"));

        frame.children = vec![1.0];
        let full = row(&draw_section(&sec, &frame, &palette(), 42, 3), 1);
        // 40 inner cells: 20 for the name, 15 for the bar
        assert_eq!(full.matches(CURSOR).count(), 8);
        assert!(full.contains(" 50%"));
    }

    #[test]
    fn typewriter_shows_text_and_cursor() {
        let frame = SectionFrame {
            progress: 1.0,
            text: Some(TextDisplay {
                text: "uid".to_string(),
                cursor: Cursor::Resting,
            }),
            cursor_on: true,
            ..SectionFrame::default()
        };
        let sec = section(AnimationKind::TypewriterScroll);
        let text = row(&draw_section(&sec, &frame, &palette(), 10, 3), 1);
        assert!(text.starts_with("│uid█"));

        let blinked = SectionFrame {
            cursor_on: false,
            ..frame
        };
        let text = row(&draw_section(&sec, &blinked, &palette(), 10, 3), 1);
        assert!(!text.contains(CURSOR));
    }

    #[test]
    fn tilted_card_shows_its_transform() {
        let frame = SectionFrame {
            progress: 1.0,
            tilt: Some(Rotation {
                rotate_x: 0.0,
                rotate_y: 15.0,
            }),
            max_tilt: 15.0,
            ..SectionFrame::default()
        };
        let buf = draw_section(&section(AnimationKind::Fade), &frame, &palette(), 70, 3);
        assert!(row(&buf, 2).contains("rotateY(15.00deg)"));
    }

    #[test]
    fn blit_clips_to_destination() {
        let mut src = Buffer::empty(layout::Rect::new(0, 0, 3, 2));
        src.set_string(0, 0, "abc", Style::new());
        src.set_string(0, 1, "def", Style::new());

        let mut dst = Buffer::empty(layout::Rect::new(0, 0, 4, 4));
        blit(&src, &mut dst, -1, 3, false);
        assert_eq!(row(&dst, 3), "bc  ");
        assert_eq!(row(&dst, 0), "    ");
    }

    #[test]
    fn transparent_blit_keeps_blank_cells_underneath() {
        let mut src = Buffer::empty(layout::Rect::new(0, 0, 3, 1));
        src.set_string(1, 0, "x", Style::new());

        let mut dst = Buffer::empty(layout::Rect::new(0, 0, 3, 1));
        dst.set_string(0, 0, "111", Style::new());
        blit(&src, &mut dst, 0, 0, true);
        assert_eq!(row(&dst, 0), "1x1");
    }

    #[test]
    fn hero_centres_title_and_cycle() {
        let title = TextDisplay {
            text: "B4Y0N3TTA".to_string(),
            cursor: Cursor::Hidden,
        };
        let cycle = TextDisplay {
            text: "Rae".to_string(),
            cursor: Cursor::Typing,
        };
        let buf = draw_hero(Some(&title), Some(&cycle), true, &palette(), 20, 10);
        assert_eq!(row(&buf, 4).trim(), "B4Y0N3TTA");
        assert_eq!(row(&buf, 6).trim(), "> Rae█");
        assert_eq!(row(&buf, 8).trim(), "scroll ↓");
    }
}
