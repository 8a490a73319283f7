//! Binary rain rendering for glyphfall.
//!
//! This crate owns the stateful rain simulation ([`RainField`]), the
//! frame-rate-limited loop that drives it ([`FrameScheduler`]) and a
//! terminal-cell implementation of the drawing surface ([`CellSurface`]).

mod chars;
mod field;
mod scheduler;
mod surface;

pub use chars::{Alphabet, BINARY_CHARS, KATAKANA_CHARS};
pub use field::{Column, FieldConfig, RainField};
pub use scheduler::{AnimationClock, FrameRequest, FrameScheduler};
pub use surface::CellSurface;
