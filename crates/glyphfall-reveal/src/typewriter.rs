//! Character-by-character text reveal.
//!
//! A [`TypewriterSession`] is a pure state machine: every call to
//! [`TypewriterSession::step`] performs one visible change and says how long
//! to wait before the next one. Scheduling the wake-ups is the owner's job.

use glyphfall_core::Millis;

/// What the session does on its next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypewriterMode {
    Typing,
    Pausing,
    Deleting,
    Done,
}

/// Cursor indicator shown after the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Hidden,
    /// Solid while characters are being added or removed.
    Typing,
    /// Left behind after the text is complete; blinks.
    Resting,
}

/// Result of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Wake the session again after this many milliseconds.
    Continue(Millis),
    /// The session has reached its terminal state.
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
enum Script {
    Once {
        finish_cursor: Cursor,
    },
    Cycling {
        delete_speed: Millis,
        pause_full: Millis,
        pause_empty: Millis,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypewriterSession {
    texts: Vec<Vec<char>>,
    text_index: usize,
    char_index: usize,
    mode: TypewriterMode,
    speed: Millis,
    script: Script,
}

impl TypewriterSession {
    /// Type `text` once, leaving `finish_cursor` when done.
    pub fn once(text: &str, speed: Millis, finish_cursor: Cursor) -> Self {
        Self {
            texts: vec![text.chars().collect()],
            text_index: 0,
            char_index: 0,
            mode: TypewriterMode::Typing,
            speed,
            script: Script::Once { finish_cursor },
        }
    }

    /// Type, pause, delete and move on through `texts` forever. Deleting runs
    /// at half the typing speed.
    ///
    /// Every visible change lands one step after the previous event: the
    /// first deletion `delete_speed` after the full pause ends, and the next
    /// string's first char `speed` after the empty pause ends. Steps never
    /// wait zero milliseconds, so a cycle of empty strings still yields.
    pub fn cycling<S: AsRef<str>>(
        texts: &[S],
        speed: Millis,
        pause_full: Millis,
        pause_empty: Millis,
    ) -> Self {
        let mut texts: Vec<Vec<char>> =
            texts.iter().map(|t| t.as_ref().chars().collect()).collect();
        if texts.is_empty() {
            texts.push(Vec::new());
        }
        let speed = speed.max(1);
        Self {
            texts,
            text_index: 0,
            char_index: 0,
            mode: TypewriterMode::Typing,
            speed,
            script: Script::Cycling {
                delete_speed: (speed / 2).max(1),
                pause_full,
                pause_empty,
            },
        }
    }

    pub fn mode(&self) -> TypewriterMode {
        self.mode
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    pub fn text_index(&self) -> usize {
        self.text_index
    }

    pub fn is_cycling(&self) -> bool {
        matches!(self.script, Script::Cycling { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.mode == TypewriterMode::Done
    }

    /// The full text currently being typed.
    pub fn full_text(&self) -> String {
        self.current().iter().collect()
    }

    /// The part of the current text shown right now.
    pub fn visible_text(&self) -> String {
        self.current()[..self.char_index].iter().collect()
    }

    pub fn cursor(&self) -> Cursor {
        match (&self.script, self.mode) {
            (Script::Once { finish_cursor }, TypewriterMode::Done) => *finish_cursor,
            _ => Cursor::Typing,
        }
    }

    /// Perform one change and report when the next one is due.
    pub fn step(&mut self) -> Step {
        match self.mode {
            TypewriterMode::Typing => self.type_char(),
            TypewriterMode::Deleting => self.delete_char(),
            TypewriterMode::Pausing => self.end_pause(),
            TypewriterMode::Done => Step::Finished,
        }
    }

    /// Jump straight to the end of a one-shot session.
    pub fn finish(&mut self) {
        self.char_index = self.current().len();
        if !self.is_cycling() {
            self.mode = TypewriterMode::Done;
        }
    }

    fn current(&self) -> &[char] {
        &self.texts[self.text_index]
    }

    fn type_char(&mut self) -> Step {
        let len = self.current().len();
        if self.char_index < len {
            self.char_index += 1;
        }
        if self.char_index < len {
            return Step::Continue(self.speed);
        }

        match self.script {
            Script::Once { .. } => {
                self.mode = TypewriterMode::Done;
                Step::Finished
            }
            Script::Cycling { pause_full, .. } => {
                self.mode = TypewriterMode::Pausing;
                Step::Continue(pause_full)
            }
        }
    }

    /// Leave a pause without changing the text; the next change is one
    /// step away.
    fn end_pause(&mut self) -> Step {
        let Script::Cycling { delete_speed, .. } = self.script else {
            self.mode = TypewriterMode::Done;
            return Step::Finished;
        };
        if self.char_index > 0 {
            self.mode = TypewriterMode::Deleting;
            Step::Continue(delete_speed)
        } else {
            self.text_index = (self.text_index + 1) % self.texts.len();
            self.mode = TypewriterMode::Typing;
            Step::Continue(self.speed)
        }
    }

    fn delete_char(&mut self) -> Step {
        let Script::Cycling {
            delete_speed,
            pause_empty,
            ..
        } = self.script
        else {
            self.mode = TypewriterMode::Done;
            return Step::Finished;
        };

        self.char_index = self.char_index.saturating_sub(1);
        if self.char_index == 0 {
            self.mode = TypewriterMode::Pausing;
            Step::Continue(pause_empty)
        } else {
            Step::Continue(delete_speed)
        }
    }
}
