//! Drawing surface abstraction.

use crate::{Rect, Rgba};

/// A 2D surface the rain field paints onto.
///
/// Coordinates are pixels; `size` may change between frames when the host
/// resizes.
pub trait Surface {
    /// Current pixel dimensions `(width, height)`.
    fn size(&self) -> (f32, f32);

    /// Fill a rectangle, compositing by the colour's alpha.
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Draw one glyph with its top-left corner at `(x, y)`.
    fn draw_glyph(&mut self, glyph: char, x: f32, y: f32, color: Rgba);
}
