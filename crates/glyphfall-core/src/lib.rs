//! Core types shared by the glyphfall crates.
//!
//! Geometry, colours, element identities, animation kinds, the drawing
//! surface abstraction and the reduced-motion signal all live here so the
//! rain and reveal crates can stay independent of each other.

mod color;
mod error;
mod geometry;
mod kind;
mod motion;
mod surface;

pub use color::{Rgba, hsl_to_rgb};
pub use error::{GlyphfallError, Result};
pub use geometry::{Point, Rect};
pub use kind::AnimationKind;
pub use motion::MotionPreference;
pub use surface::Surface;

/// Milliseconds on the host's animation clock.
pub type Millis = u64;

/// Identity of a page element registered with the animation components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
