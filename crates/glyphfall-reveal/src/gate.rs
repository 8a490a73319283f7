//! One-shot visibility detection.

use glyphfall_core::{ElementId, Rect};

/// Fraction of an element's area that must be inside the viewport.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Source of element bounding boxes in the same space as the viewport.
pub trait ElementBounds {
    fn bounds(&self, element: ElementId) -> Option<Rect>;
}

impl<F> ElementBounds for F
where
    F: Fn(ElementId) -> Option<Rect>,
{
    fn bounds(&self, element: ElementId) -> Option<Rect> {
        self(element)
    }
}

/// Shared observer that reports each watched element once, the first time it
/// becomes visible, and then forgets it.
#[derive(Debug, Clone)]
pub struct VisibilityGate {
    threshold: f32,
    watched: Vec<ElementId>,
    connected: bool,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl VisibilityGate {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            watched: Vec::new(),
            connected: true,
        }
    }

    pub fn is_watching(&self, element: ElementId) -> bool {
        self.watched.contains(&element)
    }

    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    /// Start observing an element. Absent or already watched elements are
    /// ignored.
    pub fn watch(&mut self, element: Option<ElementId>) {
        let Some(element) = element else {
            return;
        };
        if !self.connected {
            tracing::debug!(%element, "visibility gate is disconnected");
            return;
        }
        if !self.is_watching(element) {
            self.watched.push(element);
        }
    }

    /// Check every watched element against the viewport, call `handler` for
    /// each one that crossed the threshold and stop watching it.
    ///
    /// Returns the number of notifications delivered.
    pub fn detect(
        &mut self,
        viewport: Rect,
        bounds: &impl ElementBounds,
        mut handler: impl FnMut(ElementId),
    ) -> usize {
        let threshold = self.threshold;
        let before = self.watched.len();

        self.watched.retain(|&element| {
            let visible = bounds.bounds(element).is_some_and(|rect| {
                intersection_ratio(rect, viewport).is_some_and(|r| r >= threshold)
            });
            if visible {
                handler(element);
            }
            !visible
        });

        before - self.watched.len()
    }

    /// Stop observing everything; the gate stays usable.
    pub fn unwatch_all(&mut self) {
        self.watched.clear();
    }

    /// Disconnect the observer for good.
    pub fn destroy(&mut self) {
        self.unwatch_all();
        self.connected = false;
    }
}

/// Visible fraction of `target` inside `viewport`, `None` when they do not
/// touch. Zero-area targets count as fully visible when they touch.
fn intersection_ratio(target: Rect, viewport: Rect) -> Option<f32> {
    let overlap = target.intersection(&viewport)?;
    let area = target.area();
    if area == 0.0 {
        return Some(1.0);
    }
    Some(overlap.area() / area)
}
