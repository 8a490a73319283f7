//! Reveal animations for glyphfall page content.
//!
//! A single [`VisibilityGate`] decides when registered elements first become
//! visible; the [`RevealAnimator`] turns that one-shot signal into a
//! transition or a typewriter session. [`TiltController`] tracks the pointer
//! over cards independently of both.

mod animator;
mod easing;
mod gate;
mod tilt;
mod timer;
mod typewriter;

pub use animator::{RevealAnimator, RevealPhase, RevealTarget, RevealTiming, TextDisplay};
pub use easing::Easing;
pub use gate::{DEFAULT_THRESHOLD, ElementBounds, VisibilityGate};
pub use tilt::{DEFAULT_MAX_TILT, Rotation, TiltController, TiltSample, compute_tilt};
pub use timer::TimerQueue;
pub use typewriter::{Cursor, Step, TypewriterMode, TypewriterSession};
