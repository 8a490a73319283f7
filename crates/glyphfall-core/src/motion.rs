//! Reduced-motion preference signal.

/// The user's reduced-motion preference with change detection.
///
/// The owner reads it once at start and calls [`MotionPreference::update`]
/// whenever the host reports a new value; only actual changes are surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionPreference {
    reduced: bool,
}

impl MotionPreference {
    pub fn new(reduced: bool) -> Self {
        Self { reduced }
    }

    pub fn reduced(&self) -> bool {
        self.reduced
    }

    /// Record a new value, returning it only if it differs from the old one.
    pub fn update(&mut self, reduced: bool) -> Option<bool> {
        if self.reduced == reduced {
            return None;
        }
        self.reduced = reduced;
        Some(reduced)
    }
}
