use std::{cell::RefCell, collections::BTreeMap, rc::Rc, time::Duration};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use glyphfall_config::Config;
use glyphfall_core::{
    AnimationKind, ElementId, GlyphfallError, Millis, MotionPreference, Point, Rect,
};
use glyphfall_rain::{CellSurface, FrameScheduler, RainField};
use glyphfall_reveal::{Easing, RevealAnimator, RevealTarget, TiltController, VisibilityGate};
use ratatui::{
    DefaultTerminal, Frame, layout,
    style::{Color, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::{
    clock::PollClock,
    page::{HERO_CYCLE, HERO_TITLE, Page, PageLayout, Section},
    render::{self, Palette, SectionFrame},
};

/// Input wait when no rain frame is pending.
const IDLE_POLL: Duration = Duration::from_millis(50);
/// Input wait while a rain frame is pending.
const FRAME_POLL: Duration = Duration::from_millis(8);
/// Half-period of the resting cursor blink.
const BLINK_MS: Millis = 530;
const WHEEL_STEP: i32 = 3;

/// Rain field and the cells it paints, shared with the frame callback.
#[derive(Debug)]
struct RainLayer {
    field: RainField,
    surface: CellSurface,
}

/// The main application: owns every animation component and runs the loop.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    page: Page,
    layout: PageLayout,
    palette: Palette,
    /// Terminal size in cells.
    viewport: (u16, u16),
    /// First page row shown at the top of the terminal.
    scroll: u16,
    motion: MotionPreference,
    scheduler: FrameScheduler<PollClock>,
    rain: Option<Rc<RefCell<RainLayer>>>,
    glyph_size: f32,
    gate: VisibilityGate,
    animator: RevealAnimator,
    tilts: BTreeMap<ElementId, TiltController>,
    /// Tilt card currently under the pointer.
    hovered: Option<ElementId>,
    hero_speed: Millis,
}

impl App {
    /// Wire up the components for `page`. Nothing starts until [`App::run`].
    pub fn new(config: &Config, page: Page, reduced_motion: bool) -> color_eyre::Result<Self> {
        let field_config = config.rain.to_field_config()?;
        let glyph_size = field_config.glyph_size;
        let background = page.background();
        let palette = Palette::new(background, field_config.color);
        let mut scheduler =
            FrameScheduler::new(PollClock::new(FRAME_POLL), field_config.target_fps);

        let rain = if page.canvas.is_some() {
            let layer = Rc::new(RefCell::new(RainLayer {
                field: RainField::new(field_config)?,
                surface: CellSurface::new(0, 0, glyph_size, background),
            }));
            let resized = Rc::clone(&layer);
            scheduler.on_resize(move |width, height| {
                let mut layer = resized.borrow_mut();
                let RainLayer { field, surface } = &mut *layer;
                field.resize(width, height);
                surface.resize((width / glyph_size) as u16, (height / glyph_size) as u16);
            });
            Some(layer)
        } else {
            let err = GlyphfallError::missing("rain canvas");
            tracing::warn!(%err, "rain disabled");
            None
        };

        let mut animator = RevealAnimator::new(config.reveal.to_timing(), reduced_motion);
        let mut gate = VisibilityGate::new(config.reveal.threshold);
        let mut tilts = BTreeMap::new();

        if let Some(hero) = &page.hero {
            animator.register(
                RevealTarget::new(HERO_TITLE, AnimationKind::TypewriterOnce)
                    .with_text(hero.title.clone()),
            );
            gate.watch(Some(HERO_TITLE));
        }

        for section in &page.sections {
            let mut target =
                RevealTarget::new(section.id, section.kind).with_children(section.children());
            if section.kind.is_typewriter() {
                target = target.with_text(section.text.clone());
            }
            if let Some(speed) = section.speed {
                target = target.with_speed(speed);
            }
            animator.register(target);
            gate.watch(Some(section.id));

            if section.tilt {
                tilts.insert(section.id, TiltController::new(config.reveal.max_tilt));
            }
        }

        let hero_speed = page
            .hero
            .as_ref()
            .and_then(|hero| hero.speed)
            .unwrap_or(config.reveal.hero_speed);

        tracing::info!(
            sections = page.sections.len(),
            rain = rain.is_some(),
            reduced_motion,
            "page ready"
        );

        Ok(Self {
            running: false,
            page,
            layout: PageLayout::default(),
            palette,
            viewport: (0, 0),
            scroll: 0,
            motion: MotionPreference::new(reduced_motion),
            scheduler,
            rain,
            glyph_size,
            gate,
            animator,
            tilts,
            hovered: None,
            hero_speed,
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let size = terminal.size()?;
        self.resize(size.width, size.height);
        self.start_hero();
        if !self.motion.reduced() {
            self.start_rain();
        }

        while self.running {
            self.tick();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }

        self.teardown();
        Ok(())
    }

    fn now(&self) -> Millis {
        self.scheduler.clock().now_ms()
    }

    /// The cycling hero line starts on a timer, not on visibility.
    fn start_hero(&mut self) {
        let now = self.now();
        let Some(hero) = &self.page.hero else {
            return;
        };
        if hero.cycle.is_empty() {
            return;
        }
        self.animator
            .start_cycle(HERO_CYCLE, hero.cycle.clone(), self.hero_speed, now);
    }

    fn start_rain(&mut self) {
        let Some(rain) = self.rain.clone() else {
            return;
        };
        self.scheduler.start(move |_now| {
            let mut layer = rain.borrow_mut();
            let RainLayer { field, surface } = &mut *layer;
            field.advance_and_render(surface);
        });
    }

    /// Deliver a pending rain frame, step typewriters and reveal whatever
    /// scrolled into view.
    fn tick(&mut self) {
        if self.scheduler.clock_mut().take_due().is_some() {
            let now = self.scheduler.clock().now_precise();
            self.scheduler.on_clock_tick(now);
        }

        let now = self.now();
        self.animator.advance(now);

        let viewport = self.viewport_rect();
        let layout = &self.layout;
        let animator = &mut self.animator;
        let revealed = self.gate.detect(
            viewport,
            &|element: ElementId| layout.bounds(element),
            |element| {
                animator.trigger(element, now);
            },
        );
        if revealed > 0 {
            tracing::debug!(revealed, scroll = self.scroll, "elements revealed");
        }
    }

    fn viewport_rect(&self) -> Rect {
        let (width, height) = self.viewport;
        Rect::new(
            0.0,
            f32::from(self.scroll),
            f32::from(width),
            f32::from(height),
        )
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if let Some(rain) = &self.rain {
            frame.render_widget(Paragraph::new(rain.borrow().surface.to_lines()), area);
        }

        let now = self.now();
        let cursor_on = (now / BLINK_MS) % 2 == 0;
        let scroll = i32::from(self.scroll);

        for placement in self.layout.placements() {
            let bounds = placement.area;
            let top = bounds.y as i32 - scroll;
            if top >= i32::from(area.height) || top + bounds.height as i32 <= 0 {
                continue;
            }
            let (width, height) = (bounds.width as u16, bounds.height as u16);
            let left = bounds.x as i32;

            if placement.element == HERO_TITLE {
                let hero = render::draw_hero(
                    self.animator.display(HERO_TITLE),
                    self.animator.display(HERO_CYCLE),
                    cursor_on,
                    &self.palette,
                    width,
                    height,
                );
                render::blit(&hero, frame.buffer_mut(), left, top, true);
                continue;
            }

            let Some(section) = self.page.section(placement.element) else {
                continue;
            };
            let sample = self.sample(section, now, cursor_on);
            // Not revealed yet
            if sample.progress <= 0.0 {
                continue;
            }

            let mut shift = 0;
            if section.kind == AnimationKind::SlideFromLeft {
                shift -= ((1.0 - sample.progress) * (bounds.x + bounds.width)).round() as i32;
            }
            if let Some(rotation) = sample.tilt {
                shift += (rotation.rotate_y / sample.max_tilt.max(1.0) * 2.0).round() as i32;
            }

            let buf = render::draw_section(section, &sample, &self.palette, width, height);
            render::blit(&buf, frame.buffer_mut(), left + shift, top, false);
        }

        self.render_help(frame, area);
    }

    fn sample(&self, section: &Section, now: Millis, cursor_on: bool) -> SectionFrame {
        let id = section.id;
        let ease = |t: f32| Easing::EaseOut.apply(t);
        let tilt = self.tilts.get(&id);

        SectionFrame {
            progress: ease(self.animator.progress(id, now)),
            children: (0..section.children())
                .map(|index| ease(self.animator.child_progress(id, index, now)))
                .collect(),
            pulse: self.animator.pulse(id, now),
            text: self.animator.display(id).cloned(),
            cursor_on,
            tilt: tilt.map(|tilt| tilt.sample(now)),
            max_tilt: tilt.map_or(0.0, TiltController::max_tilt),
        }
    }

    fn render_help(&self, frame: &mut Frame, area: layout::Rect) {
        if area.height == 0 {
            return;
        }
        let color: Color = self.palette.accent.into();
        let motion = if self.motion.reduced() {
            " motion off"
        } else {
            " motion on"
        };

        let help = Line::from(vec![
            Span::raw(format!("{}  ", self.page.title)).dark_gray(),
            "q".bold().fg(color),
            " quit  ".dark_gray(),
            "↑↓".bold().fg(color),
            " scroll  ".dark_gray(),
            "m".bold().fg(color),
            motion.dark_gray(),
        ])
        .centered();
        let row = layout::Rect::new(area.x, area.bottom() - 1, area.width, 1);
        frame.render_widget(help, row);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits no longer than the next rain frame or typewriter step.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        let mut timeout = self.scheduler.clock().poll_timeout(IDLE_POLL);
        if let Some(wake) = self.animator.next_wake() {
            timeout = timeout.min(Duration::from_millis(wake.saturating_sub(self.now())));
        }
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(width, height) => self.resize(width, height),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        let page = i32::from(self.viewport.1.saturating_sub(2).max(1));
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Down | KeyCode::Char('j')) => self.scroll_by(1),
            (_, KeyCode::Up | KeyCode::Char('k')) => self.scroll_by(-1),
            (_, KeyCode::PageDown | KeyCode::Char(' ')) => self.scroll_by(page),
            (_, KeyCode::PageUp) => self.scroll_by(-page),
            (_, KeyCode::Home) => self.scroll_by(i32::MIN / 2),
            (_, KeyCode::End) => self.scroll_by(i32::MAX / 2),
            (_, KeyCode::Char('m')) => self.set_reduced_motion(!self.motion.reduced()),
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(WHEEL_STEP),
            MouseEventKind::ScrollUp => self.scroll_by(-WHEEL_STEP),
            MouseEventKind::Moved => self.pointer_moved(mouse.column, mouse.row),
            _ => {}
        }
    }

    fn scroll_by(&mut self, delta: i32) {
        let max = i32::from(self.layout.max_scroll(self.viewport.1));
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, max) as u16;
    }

    /// Track the pointer over tilt cards, releasing the card it left.
    fn pointer_moved(&mut self, column: u16, row: u16) {
        let now = self.now();
        let reduced = self.motion.reduced();
        // Centre of the cell, in page space
        let point = Point::new(
            f32::from(column) + 0.5,
            f32::from(row) + 0.5 + f32::from(self.scroll),
        );
        let hit = self
            .layout
            .hit(point)
            .filter(|element| self.tilts.contains_key(element));

        if self.hovered != hit {
            if let Some(left) = self.hovered.and_then(|element| self.tilts.get_mut(&element)) {
                left.pointer_leave(now);
            }
            self.hovered = hit;
        }

        let Some(element) = hit else {
            return;
        };
        if let (Some(bounds), Some(tilt)) =
            (self.layout.bounds(element), self.tilts.get_mut(&element))
        {
            tilt.pointer_move(bounds, point, now, reduced);
        }
    }

    /// Apply a motion preference change to every component that cares.
    fn set_reduced_motion(&mut self, reduced: bool) {
        let Some(reduced) = self.motion.update(reduced) else {
            return;
        };
        let now = self.now();
        tracing::info!(reduced, "motion preference changed");

        self.animator.set_reduced_motion(reduced, now);
        if reduced {
            self.scheduler.stop();
            for tilt in self.tilts.values_mut() {
                tilt.reset(now);
            }
        } else {
            self.start_rain();
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        if self.viewport == (width, height) {
            return;
        }
        self.viewport = (width, height);
        self.layout = PageLayout::compute(&self.page, width, height);
        self.scroll = self.scroll.min(self.layout.max_scroll(height));
        self.scheduler.resize(
            f32::from(width) * self.glyph_size,
            f32::from(height) * self.glyph_size,
        );
        tracing::debug!(width, height, "viewport resized");
    }

    fn teardown(&mut self) {
        self.scheduler.destroy();
        self.gate.destroy();
        self.animator.teardown();
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use glyphfall_core::Rgba;
    use glyphfall_reveal::{RevealPhase, Rotation};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    const CARDS: &str = r#"
        title = "cards"

        [canvas]

        [[sections]]
        kind = "fade"
        title = "Card"
        body = ["x"]
        tilt = true

        [[sections]]
        kind = "slide-from-left"
        title = "Below"
        body = ["y"]
    "#;

    fn app(page: &str, reduced: bool) -> App {
        let page = Page::from_toml_str(page).unwrap();
        App::new(&Config::default(), page, reduced).unwrap()
    }

    fn builtin(reduced: bool) -> App {
        App::new(&Config::default(), Page::builtin().unwrap(), reduced).unwrap()
    }

    #[test]
    fn every_section_is_registered_and_watched() {
        let app = builtin(false);
        for section in &app.page.sections {
            assert!(app.animator.target(section.id).is_some());
            assert!(app.gate.is_watching(section.id));
        }
        assert!(app.gate.is_watching(HERO_TITLE));
        assert!(app.rain.is_some());
    }

    #[test]
    fn missing_canvas_disables_rain_only() {
        let mut app = app("[[sections]]\nkind = \"fade\"\ntitle = \"a\"", false);
        assert!(app.rain.is_none());
        app.start_rain();
        assert!(!app.scheduler.is_running());
        assert_eq!(app.gate.watched_count(), 1);
    }

    #[test]
    fn only_the_first_screen_is_revealed() {
        let mut app = builtin(false);
        app.resize(80, 24);
        app.tick();

        let hero = app.animator.target(HERO_TITLE).unwrap();
        assert!(hero.animated());
        assert!(!app.gate.is_watching(HERO_TITLE));

        // Sections start below the hero, which fills the first screen
        let first = app.page.sections[0].id;
        assert_eq!(app.animator.target(first).unwrap().phase(), RevealPhase::Pending);

        app.scroll_by(i32::MAX / 2);
        app.tick();
        let last = app.page.sections.last().unwrap().id;
        assert!(app.animator.target(last).unwrap().animated());
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut app = builtin(false);
        app.resize(80, 24);
        app.scroll_by(-5);
        assert_eq!(app.scroll, 0);
        app.scroll_by(100_000);
        assert_eq!(app.scroll, app.layout.max_scroll(24));
    }

    #[test]
    fn resize_reaches_the_rain() {
        let mut app = builtin(false);
        app.resize(40, 12);
        let rain = app.rain.as_ref().unwrap().borrow();
        assert_eq!(rain.field.columns().len(), 40);
        assert_eq!((rain.surface.cols(), rain.surface.rows()), (40, 12));
    }

    #[test]
    fn motion_toggle_stops_and_restarts_rain() {
        let mut app = builtin(false);
        app.resize(80, 24);
        app.start_rain();
        assert!(app.scheduler.is_running());

        app.set_reduced_motion(true);
        assert!(!app.scheduler.is_running());
        assert!(app.animator.reduced_motion());

        // Unchanged value is not a change
        app.set_reduced_motion(true);
        assert!(!app.scheduler.is_running());

        app.set_reduced_motion(false);
        assert!(app.scheduler.is_running());
        assert!(!app.animator.reduced_motion());
    }

    #[test]
    fn pointer_tilts_the_card_under_it() {
        let mut app = app(CARDS, false);
        app.resize(80, 24);
        let card = app.page.sections[0].id;

        // Card spans columns 4..76 of rows 0..3
        app.pointer_moved(70, 1);
        assert_eq!(app.hovered, Some(card));
        assert!(app.tilts[&card].target().rotate_y > 0.0);

        app.pointer_moved(0, 10);
        assert_eq!(app.hovered, None);
        assert_eq!(app.tilts[&card].target(), Rotation::NEUTRAL);
    }

    #[test]
    fn reduced_motion_keeps_cards_flat() {
        let mut app = app(CARDS, true);
        app.resize(80, 24);
        app.pointer_moved(70, 1);
        let card = app.page.sections[0].id;
        assert_eq!(app.tilts[&card].target(), Rotation::NEUTRAL);
    }

    #[test]
    fn reduced_motion_renders_final_state_at_once() {
        let mut app = app(CARDS, true);
        app.resize(80, 24);
        app.tick();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        let buffer = terminal.backend().buffer();

        // Fully revealed text in its final colour, slide already home
        let cell = &buffer[(5, 1)];
        assert_eq!(cell.symbol(), "x");
        assert_eq!(cell.fg, Rgba::rgb(210, 215, 210).into());
        assert_eq!(buffer[(5, 5)].symbol(), "y");

        let help: String = (0..80u16).map(|x| buffer[(x, 23)].symbol().to_string()).collect();
        assert!(help.contains("quit"));
        assert!(help.contains("motion off"));
    }
}
