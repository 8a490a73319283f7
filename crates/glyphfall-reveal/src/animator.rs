//! Reveal state machine for page elements.
//!
//! Every registered [`RevealTarget`] moves `Pending → Triggered → Done`.
//! Simple kinds finish the moment they are triggered and leave the host a
//! transition window to interpolate over; typewriter kinds finish when their
//! [`TypewriterSession`] does. Wake-ups are keyed by session id, so replacing
//! or cancelling a session turns its outstanding wake-ups into no-ops.

use std::collections::BTreeMap;

use glyphfall_core::{AnimationKind, ElementId, Millis};

use crate::{
    timer::TimerQueue,
    typewriter::{Cursor, Step, TypewriterSession},
};

/// Delays, speeds and transition lengths, all in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealTiming {
    pub once_delay: Millis,
    pub once_speed: Millis,
    pub scroll_delay: Millis,
    pub scroll_speed: Millis,
    pub cycle_start_delay: Millis,
    pub cycle_pause_full: Millis,
    pub cycle_pause_empty: Millis,
    pub fade: Millis,
    pub slide: Millis,
    pub stagger: Millis,
    pub stagger_step: Millis,
    pub pulse: Millis,
    pub pulse_period: Millis,
    pub skill: Millis,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            once_delay: 500,
            once_speed: 100,
            scroll_delay: 300,
            scroll_speed: 30,
            cycle_start_delay: 1000,
            cycle_pause_full: 2000,
            cycle_pause_empty: 500,
            fade: 800,
            slide: 600,
            stagger: 600,
            stagger_step: 100,
            pulse: 800,
            pulse_period: 2000,
            skill: 1000,
        }
    }
}

impl RevealTiming {
    /// Length of the visible transition for a kind with `children` items.
    pub fn transition(&self, kind: AnimationKind, children: usize) -> Millis {
        match kind {
            AnimationKind::Fade => self.fade,
            AnimationKind::SlideFromLeft => self.slide,
            AnimationKind::StaggeredFade => {
                self.stagger + self.stagger_step * children.saturating_sub(1) as Millis
            }
            AnimationKind::Pulse => self.pulse,
            AnimationKind::SkillReveal => self.skill,
            AnimationKind::TypewriterOnce | AnimationKind::TypewriterScroll => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Pending,
    Triggered,
    Done,
}

/// An element waiting to animate on first visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealTarget {
    element: ElementId,
    kind: AnimationKind,
    text: Option<String>,
    speed: Option<Millis>,
    children: usize,
    animated: bool,
    phase: RevealPhase,
    revealed_at: Option<Millis>,
    transition: Millis,
}

impl RevealTarget {
    pub fn new(element: ElementId, kind: AnimationKind) -> Self {
        Self {
            element,
            kind,
            text: None,
            speed: None,
            children: 1,
            animated: false,
            phase: RevealPhase::Pending,
            revealed_at: None,
            transition: 0,
        }
    }

    /// Text payload for typewriter kinds.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Per-character speed overriding the kind's default.
    pub fn with_speed(mut self, speed: Millis) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Number of items a staggered fade reveals in turn.
    pub fn with_children(mut self, children: usize) -> Self {
        self.children = children.max(1);
        self
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    pub fn children(&self) -> usize {
        self.children
    }

    pub fn animated(&self) -> bool {
        self.animated
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn revealed_at(&self) -> Option<Millis> {
        self.revealed_at
    }
}

/// Text currently shown by a typewriter element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDisplay {
    pub text: String,
    pub cursor: Cursor,
}

#[derive(Debug)]
struct ActiveSession {
    id: u64,
    session: TypewriterSession,
}

#[derive(Debug, Clone, Copy)]
struct Wake {
    element: ElementId,
    session: u64,
}

#[derive(Debug, Clone)]
struct CycleTexts {
    texts: Vec<String>,
    speed: Millis,
}

/// Drives reveal targets and typewriter sessions on the host's clock.
#[derive(Debug)]
pub struct RevealAnimator {
    timing: RevealTiming,
    reduced_motion: bool,
    targets: BTreeMap<ElementId, RevealTarget>,
    displays: BTreeMap<ElementId, TextDisplay>,
    sessions: BTreeMap<ElementId, ActiveSession>,
    cycles: BTreeMap<ElementId, CycleTexts>,
    timers: TimerQueue<Wake>,
    next_session: u64,
}

impl RevealAnimator {
    pub fn new(timing: RevealTiming, reduced_motion: bool) -> Self {
        Self {
            timing,
            reduced_motion,
            targets: BTreeMap::new(),
            displays: BTreeMap::new(),
            sessions: BTreeMap::new(),
            cycles: BTreeMap::new(),
            timers: TimerQueue::new(),
            next_session: 0,
        }
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Add a target. Registering the same element twice keeps the first.
    pub fn register(&mut self, target: RevealTarget) -> bool {
        let element = target.element;
        if self.targets.contains_key(&element) {
            tracing::debug!(%element, "reveal target already registered");
            return false;
        }
        self.targets.insert(element, target);
        true
    }

    pub fn target(&self, element: ElementId) -> Option<&RevealTarget> {
        self.targets.get(&element)
    }

    pub fn display(&self, element: ElementId) -> Option<&TextDisplay> {
        self.displays.get(&element)
    }

    /// Index of the string a cycling session is on.
    pub fn cycle_index(&self, element: ElementId) -> Option<usize> {
        self.sessions
            .get(&element)
            .filter(|active| active.session.is_cycling())
            .map(|active| active.session.text_index())
    }

    /// Number of live typewriter sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// When the earliest pending typewriter step is due.
    pub fn next_wake(&self) -> Option<Millis> {
        self.timers.next_due()
    }

    /// First-visibility notification for `element`. Returns whether anything
    /// started; repeated triggers are ignored.
    pub fn trigger(&mut self, element: ElementId, now: Millis) -> bool {
        let reduced = self.reduced_motion;
        let Some(target) = self.targets.get_mut(&element) else {
            tracing::warn!(%element, "trigger for unregistered reveal target");
            return false;
        };
        if target.animated {
            tracing::debug!(%element, "reveal already played");
            return false;
        }

        target.animated = true;
        target.phase = RevealPhase::Triggered;
        target.revealed_at = Some(now);
        target.transition = if reduced {
            0
        } else {
            self.timing.transition(target.kind, target.children)
        };

        if !target.kind.is_typewriter() {
            target.phase = RevealPhase::Done;
            return true;
        }

        let text = target.text.clone().unwrap_or_default();
        if reduced {
            target.phase = RevealPhase::Done;
            self.displays.insert(
                element,
                TextDisplay {
                    text,
                    cursor: Cursor::Hidden,
                },
            );
            return true;
        }

        let (delay, speed, finish_cursor) = match target.kind {
            AnimationKind::TypewriterScroll => (
                self.timing.scroll_delay,
                target.speed.unwrap_or(self.timing.scroll_speed),
                Cursor::Hidden,
            ),
            _ => (
                self.timing.once_delay,
                target.speed.unwrap_or(self.timing.once_speed),
                Cursor::Resting,
            ),
        };
        let session = TypewriterSession::once(&text, speed, finish_cursor);
        self.begin_session(element, session, now + delay + speed);
        true
    }

    /// Trigger by content tag, registering the element on first use.
    pub fn trigger_tagged(&mut self, element: ElementId, tag: &str, now: Millis) -> bool {
        let kind = match tag.parse::<AnimationKind>() {
            Ok(kind) => kind,
            Err(err) => {
                tracing::warn!(%element, %err, "ignoring reveal trigger");
                return false;
            }
        };
        if !self.targets.contains_key(&element) {
            self.register(RevealTarget::new(element, kind));
        }
        self.trigger(element, now)
    }

    /// Start an endless type/delete loop through `texts` on `element`.
    pub fn start_cycle(
        &mut self,
        element: ElementId,
        texts: Vec<String>,
        speed: Millis,
        now: Millis,
    ) -> bool {
        if texts.is_empty() {
            tracing::warn!(%element, "cycling typewriter needs at least one string");
            return false;
        }
        if self.cycles.contains_key(&element) {
            tracing::debug!(%element, "cycling typewriter already running");
            return false;
        }
        self.cycles.insert(element, CycleTexts { texts, speed });
        self.launch_cycle(element, now + self.timing.cycle_start_delay);
        true
    }

    /// Stop any session on `element`; its pending wake-ups become no-ops.
    pub fn cancel(&mut self, element: ElementId) {
        self.sessions.remove(&element);
        self.cycles.remove(&element);
    }

    /// Stop every session and drop all pending wake-ups.
    pub fn teardown(&mut self) {
        self.sessions.clear();
        self.cycles.clear();
        self.timers.clear();
    }

    /// Run every wake-up due at or before `now`, each at its own due time.
    /// Returns the number of typewriter steps taken.
    pub fn advance(&mut self, now: Millis) -> usize {
        let mut steps = 0;
        while let Some((due, wake)) = self.timers.pop_due(now) {
            let Some(active) = self.sessions.get_mut(&wake.element) else {
                continue;
            };
            if active.id != wake.session {
                continue;
            }

            let step = active.session.step();
            steps += 1;
            self.displays.insert(
                wake.element,
                TextDisplay {
                    text: active.session.visible_text(),
                    cursor: active.session.cursor(),
                },
            );

            match step {
                Step::Continue(delay) => self.timers.schedule(due + delay, wake),
                Step::Finished => {
                    self.sessions.remove(&wake.element);
                    if let Some(target) = self.targets.get_mut(&wake.element) {
                        target.phase = RevealPhase::Done;
                    }
                }
            }
        }
        steps
    }

    /// Apply a reduced-motion change. Turning it on completes everything in
    /// flight; turning it off restarts cycling sessions.
    pub fn set_reduced_motion(&mut self, reduced: bool, now: Millis) {
        if self.reduced_motion == reduced {
            return;
        }
        self.reduced_motion = reduced;
        tracing::info!(reduced, "reveal motion preference changed");

        if reduced {
            let sessions = std::mem::take(&mut self.sessions);
            for (element, active) in sessions {
                let text = if active.session.is_cycling() {
                    self.first_cycle_text(element)
                } else {
                    if let Some(target) = self.targets.get_mut(&element) {
                        target.phase = RevealPhase::Done;
                    }
                    active.session.full_text()
                };
                self.displays.insert(
                    element,
                    TextDisplay {
                        text,
                        cursor: Cursor::Hidden,
                    },
                );
            }
            for target in self.targets.values_mut() {
                target.transition = 0;
            }
        } else {
            let elements: Vec<ElementId> = self.cycles.keys().copied().collect();
            for element in elements {
                self.launch_cycle(element, now);
            }
        }
    }

    /// Transition progress of a simple reveal in `0.0..=1.0`.
    pub fn progress(&self, element: ElementId, now: Millis) -> f32 {
        self.targets
            .get(&element)
            .map_or(0.0, |target| Self::window(target, 0, target.transition, now))
    }

    /// Progress of the `index`-th item of a staggered fade.
    pub fn child_progress(&self, element: ElementId, index: usize, now: Millis) -> f32 {
        let Some(target) = self.targets.get(&element) else {
            return 0.0;
        };
        if target.kind != AnimationKind::StaggeredFade || target.transition == 0 {
            return Self::window(target, 0, target.transition, now);
        }
        let offset = self.timing.stagger_step * index as Millis;
        Self::window(target, offset, self.timing.stagger, now)
    }

    /// Phase in `0.0..1.0` of the looping pulse that follows a pulse reveal.
    pub fn pulse(&self, element: ElementId, now: Millis) -> Option<f32> {
        if self.reduced_motion || self.timing.pulse_period == 0 {
            return None;
        }
        let target = self.targets.get(&element)?;
        if target.kind != AnimationKind::Pulse {
            return None;
        }
        let since = now
            .checked_sub(target.revealed_at?)?
            .checked_sub(self.timing.pulse)?;
        Some((since % self.timing.pulse_period) as f32 / self.timing.pulse_period as f32)
    }

    fn window(target: &RevealTarget, offset: Millis, length: Millis, now: Millis) -> f32 {
        let Some(start) = target.revealed_at else {
            return 0.0;
        };
        if length == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(start).saturating_sub(offset);
        (elapsed as f32 / length as f32).clamp(0.0, 1.0)
    }

    fn first_cycle_text(&self, element: ElementId) -> String {
        self.cycles
            .get(&element)
            .and_then(|cycle| cycle.texts.first().cloned())
            .unwrap_or_default()
    }

    fn launch_cycle(&mut self, element: ElementId, start_at: Millis) {
        let Some(cycle) = self.cycles.get(&element) else {
            return;
        };

        if self.reduced_motion {
            let text = cycle.texts.first().cloned().unwrap_or_default();
            self.sessions.remove(&element);
            self.displays.insert(
                element,
                TextDisplay {
                    text,
                    cursor: Cursor::Hidden,
                },
            );
            return;
        }

        let speed = cycle.speed;
        let session = TypewriterSession::cycling(
            &cycle.texts,
            speed,
            self.timing.cycle_pause_full,
            self.timing.cycle_pause_empty,
        );
        self.begin_session(element, session, start_at + speed);
    }

    fn begin_session(
        &mut self,
        element: ElementId,
        session: TypewriterSession,
        first_step: Millis,
    ) {
        self.next_session += 1;
        let id = self.next_session;

        self.displays.insert(
            element,
            TextDisplay {
                text: session.visible_text(),
                cursor: session.cursor(),
            },
        );
        // Replacing the entry invalidates the previous session's wake-ups
        self.sessions.insert(element, ActiveSession { id, session });
        self.timers.schedule(first_step, Wake { element, session: id });
    }
}
