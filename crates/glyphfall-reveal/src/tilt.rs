//! Pointer-driven 3D tilt for cards.

use std::fmt;

use glyphfall_core::{Millis, Point, Rect};

use crate::easing::Easing;

/// Largest rotation around either axis, in degrees.
pub const DEFAULT_MAX_TILT: f32 = 15.0;

/// Transition while following the pointer.
const TRACK_MS: Millis = 100;

/// Transition back to neutral after the pointer leaves.
const RELEASE_MS: Millis = 500;

/// Rotation in degrees around the X and Y axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub rotate_x: f32,
    pub rotate_y: f32,
}

impl Rotation {
    pub const NEUTRAL: Rotation = Rotation {
        rotate_x: 0.0,
        rotate_y: 0.0,
    };

    fn lerp(self, to: Rotation, t: f32) -> Rotation {
        Rotation {
            rotate_x: self.rotate_x + (to.rotate_x - self.rotate_x) * t,
            rotate_y: self.rotate_y + (to.rotate_y - self.rotate_y) * t,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "perspective(1000px) rotateX({:.2}deg) rotateY({:.2}deg)",
            self.rotate_x, self.rotate_y
        )
    }
}

/// Normalized pointer offset together with the rotation it produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltSample {
    pub offset: Point,
    pub rotation: Rotation,
}

/// Tilt for a pointer over a card. The offset from the card centre is
/// divided by the half extents and clamped to `[-1, 1]`; the X rotation is
/// inverted so the edge under the pointer dips away.
pub fn compute_tilt(bounds: Rect, pointer: Point, max_tilt: f32) -> TiltSample {
    let center = bounds.center();
    let normalize = |delta: f32, half: f32| {
        if half <= 0.0 {
            0.0
        } else {
            (delta / half).clamp(-1.0, 1.0)
        }
    };
    let x = normalize(pointer.x - center.x, bounds.width / 2.0);
    let y = normalize(pointer.y - center.y, bounds.height / 2.0);

    TiltSample {
        offset: Point::new(x, y),
        rotation: Rotation {
            rotate_x: -y * max_tilt,
            rotate_y: x * max_tilt,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: Rotation,
    started_at: Millis,
    duration: Millis,
    easing: Easing,
}

/// Per-card tilt state.
#[derive(Debug, Clone, PartialEq)]
pub struct TiltController {
    max_tilt: f32,
    offset: Point,
    target: Rotation,
    transition: Transition,
}

impl Default for TiltController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TILT)
    }
}

impl TiltController {
    pub fn new(max_tilt: f32) -> Self {
        Self {
            max_tilt,
            offset: Point::default(),
            target: Rotation::NEUTRAL,
            transition: Transition {
                from: Rotation::NEUTRAL,
                started_at: 0,
                duration: 0,
                easing: Easing::Linear,
            },
        }
    }

    pub fn max_tilt(&self) -> f32 {
        self.max_tilt
    }

    /// Last normalized pointer offset, `(0, 0)` when released.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Rotation the card is heading towards.
    pub fn target(&self) -> Rotation {
        self.target
    }

    /// Follow the pointer. Does nothing under reduced motion.
    pub fn pointer_move(
        &mut self,
        bounds: Rect,
        pointer: Point,
        now: Millis,
        reduced_motion: bool,
    ) {
        if reduced_motion {
            return;
        }
        let sample = compute_tilt(bounds, pointer, self.max_tilt);
        self.offset = sample.offset;
        self.retarget(sample.rotation, now, TRACK_MS, Easing::EaseOut);
    }

    /// Ease back to neutral.
    pub fn pointer_leave(&mut self, now: Millis) {
        if self.target == Rotation::NEUTRAL && self.offset == Point::default() {
            return;
        }
        self.offset = Point::default();
        self.retarget(Rotation::NEUTRAL, now, RELEASE_MS, Easing::EaseInOut);
    }

    /// Drop any tilt immediately, e.g. when reduced motion switches on.
    pub fn reset(&mut self, now: Millis) {
        self.offset = Point::default();
        self.target = Rotation::NEUTRAL;
        self.transition = Transition {
            from: Rotation::NEUTRAL,
            started_at: now,
            duration: 0,
            easing: Easing::Linear,
        };
    }

    /// Rotation displayed at `now`.
    pub fn sample(&self, now: Millis) -> Rotation {
        let Transition {
            from,
            started_at,
            duration,
            easing,
        } = self.transition;
        if duration == 0 {
            return self.target;
        }
        let t = now.saturating_sub(started_at) as f32 / duration as f32;
        from.lerp(self.target, easing.apply(t))
    }

    /// Whether a transition is still running at `now`.
    pub fn is_animating(&self, now: Millis) -> bool {
        now < self.transition.started_at + self.transition.duration
    }

    /// CSS-style transform string for the rotation at `now`.
    pub fn transform(&self, now: Millis) -> String {
        self.sample(now).to_string()
    }

    fn retarget(&mut self, target: Rotation, now: Millis, duration: Millis, easing: Easing) {
        self.transition = Transition {
            from: self.sample(now),
            started_at: now,
            duration,
            easing,
        };
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: Rect = Rect::new(0.0, 0.0, 200.0, 200.0);

    #[test]
    fn right_edge_tilts_fully_around_y() {
        let sample = compute_tilt(CARD, Point::new(200.0, 100.0), DEFAULT_MAX_TILT);
        assert_eq!(sample.offset, Point::new(1.0, 0.0));
        assert_eq!(sample.rotation.rotate_y, 15.0);
        assert_eq!(sample.rotation.rotate_x, 0.0);
    }

    #[test]
    fn top_edge_inverts_x_rotation() {
        let sample = compute_tilt(CARD, Point::new(100.0, 0.0), 10.0);
        assert_eq!(sample.offset, Point::new(0.0, -1.0));
        assert_eq!(sample.rotation.rotate_x, 10.0);
    }

    #[test]
    fn offsets_are_clamped() {
        let sample = compute_tilt(CARD, Point::new(-500.0, 900.0), 15.0);
        assert_eq!(sample.offset, Point::new(-1.0, 1.0));
    }

    #[test]
    fn degenerate_card_is_flat() {
        let sample = compute_tilt(Rect::new(5.0, 5.0, 0.0, 0.0), Point::new(9.0, 9.0), 15.0);
        assert_eq!(sample.rotation, Rotation::NEUTRAL);
    }

    #[test]
    fn tracking_is_faster_than_release() {
        let mut tilt = TiltController::default();
        tilt.pointer_move(CARD, Point::new(200.0, 100.0), 0, false);
        assert!(tilt.is_animating(50));
        assert_eq!(tilt.sample(100).rotate_y, 15.0);

        tilt.pointer_leave(1000);
        assert!(tilt.is_animating(1300));
        let halfway = tilt.sample(1250).rotate_y;
        assert!(halfway > 0.0 && halfway < 15.0);
        assert_eq!(tilt.sample(1500), Rotation::NEUTRAL);
        assert_eq!(tilt.offset(), Point::default());
    }

    #[test]
    fn retarget_starts_from_displayed_rotation() {
        let mut tilt = TiltController::default();
        tilt.pointer_move(CARD, Point::new(200.0, 100.0), 0, false);
        tilt.pointer_leave(100);
        tilt.pointer_move(CARD, Point::new(0.0, 100.0), 350, false);
        let start = tilt.sample(350).rotate_y;
        assert!(start > -15.0 && start < 15.0);
        assert_eq!(tilt.sample(450).rotate_y, -15.0);
    }

    #[test]
    fn reduced_motion_ignores_pointer() {
        let mut tilt = TiltController::default();
        tilt.pointer_move(CARD, Point::new(200.0, 0.0), 0, true);
        assert_eq!(tilt.sample(1000), Rotation::NEUTRAL);
        assert_eq!(
            tilt.transform(1000),
            "perspective(1000px) rotateX(0.00deg) rotateY(0.00deg)"
        );
    }

    #[test]
    fn transform_formats_rotation() {
        let mut tilt = TiltController::default();
        tilt.pointer_move(CARD, Point::new(200.0, 0.0), 0, false);
        assert_eq!(
            tilt.transform(200),
            "perspective(1000px) rotateX(15.00deg) rotateY(15.00deg)"
        );
    }
}
