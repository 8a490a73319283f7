//! Terminal-cell drawing surface.

use glyphfall_core::{Rect, Rgba, Surface};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

/// Cells closer than this to the background colour are blanked.
const VISIBLE_THRESHOLD: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Rgba,
}

/// A grid of terminal cells addressed in pixels, one glyph box per cell.
#[derive(Debug, Clone)]
pub struct CellSurface {
    cols: u16,
    rows: u16,
    cell_size: f32,
    background: Rgba,
    cells: Vec<Cell>,
}

impl CellSurface {
    pub fn new(cols: u16, rows: u16, cell_size: f32, background: Rgba) -> Self {
        let mut surface = Self {
            cols: 0,
            rows: 0,
            cell_size: cell_size.max(f32::EPSILON),
            background,
            cells: Vec::new(),
        };
        surface.resize(cols, rows);
        surface
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Reallocate as a blank grid.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![self.blank(); cols as usize * rows as usize];
    }

    /// Glyph shown at a cell, `None` when blank or out of range.
    pub fn glyph_at(&self, col: u16, row: u16) -> Option<char> {
        self.cell(col, row)
            .map(|cell| cell.glyph)
            .filter(|glyph| *glyph != ' ')
    }

    /// Colour of a cell.
    pub fn color_at(&self, col: u16, row: u16) -> Option<Rgba> {
        self.cell(col, row).map(|cell| cell.color)
    }

    /// Render the grid as styled lines.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        if self.cols == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(self.cols as usize)
            .map(|row| {
                let spans: Vec<Span> = row
                    .iter()
                    .map(|cell| {
                        if cell.glyph == ' ' {
                            Span::raw(" ")
                        } else {
                            Span::styled(cell.glyph.to_string(), Style::new().fg(cell.color.into()))
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn blank(&self) -> Cell {
        Cell {
            glyph: ' ',
            color: self.background,
        }
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows)
            .then(|| row as usize * self.cols as usize + col as usize)
    }

    fn cell(&self, col: u16, row: u16) -> Option<&Cell> {
        self.index(col, row).map(|i| &self.cells[i])
    }

    /// Inclusive-exclusive cell span covered by `[start, end)` pixels.
    fn span(&self, start: f32, end: f32, limit: u16) -> std::ops::Range<u16> {
        let first = (start / self.cell_size).floor().max(0.0);
        let last = (end / self.cell_size).ceil().max(0.0).min(f32::from(limit));
        (first as u16)..(last as u16).max(first as u16)
    }
}

impl Surface for CellSurface {
    fn size(&self) -> (f32, f32) {
        (
            f32::from(self.cols) * self.cell_size,
            f32::from(self.rows) * self.cell_size,
        )
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let background = self.background;
        for row in self.span(rect.y, rect.bottom(), self.rows) {
            for col in self.span(rect.x, rect.right(), self.cols) {
                let Some(i) = self.index(col, row) else {
                    continue;
                };
                let cell = &mut self.cells[i];
                cell.color = color.over(cell.color);
                if cell.color.distance(background) < VISIBLE_THRESHOLD {
                    *cell = Cell {
                        glyph: ' ',
                        color: background,
                    };
                }
            }
        }
    }

    fn draw_glyph(&mut self, glyph: char, x: f32, y: f32, color: Rgba) {
        if x < 0.0 || y < 0.0 {
            return;
        }
        let col = (x / self.cell_size).floor();
        let row = (y / self.cell_size).floor();
        if col > f32::from(u16::MAX) || row > f32::from(u16::MAX) {
            return;
        }
        if let Some(i) = self.index(col as u16, row as u16) {
            let cell = &mut self.cells[i];
            cell.glyph = glyph;
            cell.color = color.over(cell.color);
        }
    }
}
