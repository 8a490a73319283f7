//! Binary rain simulation (stateful).

use std::ops::RangeInclusive;

use glyphfall_core::{GlyphfallError, Rect, Result, Rgba, Surface};

use crate::chars::BINARY_CHARS;

/// Range new drops start in, in glyph cells above the top edge.
const SPAWN_DEPTH: f32 = 100.0;

/// Static parameters of a rain field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Width and height of one glyph cell in pixels.
    pub glyph_size: f32,
    /// Symbols a column may display.
    pub alphabet: Vec<char>,
    /// Colour of the falling glyphs.
    pub color: Rgba,
    /// Colour painted over the whole surface every frame; its alpha sets the
    /// trail length.
    pub fade: Rgba,
    /// Slowest fall speed in cells per tick.
    pub min_speed: f32,
    /// Fastest fall speed in cells per tick.
    pub max_speed: f32,
    /// Ticks per second the owner should drive the field at.
    pub target_fps: u32,
    /// Chance per tick that a drop past the bottom edge restarts at the top.
    pub reset_chance: f32,
    /// Ticks a glyph is held before it is resampled.
    pub glyph_hold: RangeInclusive<u32>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            glyph_size: 14.0,
            alphabet: BINARY_CHARS.to_vec(),
            color: Rgba::rgb(0, 255, 65),
            fade: Rgba::BLACK.with_alpha(0.05),
            min_speed: 0.5,
            max_speed: 1.0,
            target_fps: 30,
            reset_chance: 0.025,
            glyph_hold: 5..=15,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.glyph_size > 0.0) {
            return Err(GlyphfallError::invalid_config("glyph size must be positive"));
        }
        if self.alphabet.is_empty() {
            return Err(GlyphfallError::invalid_config("alphabet is empty"));
        }
        if !(self.min_speed >= 0.0 && self.min_speed <= self.max_speed) {
            return Err(GlyphfallError::invalid_config(format!(
                "speed range {}..{} is invalid",
                self.min_speed, self.max_speed
            )));
        }
        if self.target_fps == 0 {
            return Err(GlyphfallError::invalid_config("target fps must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.reset_chance) {
            return Err(GlyphfallError::invalid_config(
                "reset chance must be within 0..=1",
            ));
        }
        if self.glyph_hold.is_empty() || *self.glyph_hold.start() == 0 {
            return Err(GlyphfallError::invalid_config(
                "glyph hold range must be non-empty and start above zero",
            ));
        }
        Ok(())
    }
}

/// State for a single rain column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Vertical offset of the drop in glyph cells; negative while above the
    /// visible area.
    pub position: f32,
    /// Cells advanced per tick.
    pub speed: f32,
    /// Currently displayed symbol.
    pub glyph: char,
    /// Ticks until the glyph is resampled.
    pub glyph_ticks_remaining: u32,
}

/// Per-column binary rain simulation.
#[derive(Debug)]
pub struct RainField {
    config: FieldConfig,
    columns: Vec<Column>,
    rng: fastrand::Rng,
}

impl RainField {
    /// Create an empty field; columns are allocated by [`RainField::resize`].
    pub fn new(config: FieldConfig) -> Result<Self> {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Create a field with a deterministic random sequence.
    pub fn with_seed(config: FieldConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: FieldConfig, rng: fastrand::Rng) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            columns: Vec::new(),
            rng,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Reallocate every column for a surface of the given pixel size.
    pub fn resize(&mut self, width: f32, _height: f32) {
        let count = (width.max(0.0) / self.config.glyph_size).floor() as usize;

        let columns = (0..count)
            .map(|_| Column {
                position: -self.rng.f32() * SPAWN_DEPTH,
                speed: self.random_speed(),
                glyph: self.random_glyph(),
                glyph_ticks_remaining: self.random_hold(),
            })
            .collect();
        self.columns = columns;

        tracing::debug!(columns = count, width, "rain field resized");
    }

    /// Paint one frame and advance every column by one tick.
    pub fn advance_and_render(&mut self, surface: &mut impl Surface) {
        let (width, height) = surface.size();
        let glyph_size = self.config.glyph_size;

        // Translucent wash over the previous frame leaves the trails
        surface.fill_rect(Rect::new(0.0, 0.0, width, height), self.config.fade);

        for index in 0..self.columns.len() {
            let expired = {
                let col = &mut self.columns[index];
                col.glyph_ticks_remaining = col.glyph_ticks_remaining.saturating_sub(1);
                col.glyph_ticks_remaining == 0
            };
            if expired {
                let glyph = self.random_glyph();
                let hold = self.random_hold();
                let col = &mut self.columns[index];
                col.glyph = glyph;
                col.glyph_ticks_remaining = hold;
            }

            let col = &mut self.columns[index];
            surface.draw_glyph(
                col.glyph,
                index as f32 * glyph_size,
                col.position * glyph_size,
                self.config.color,
            );
            col.position += col.speed;

            if col.position * glyph_size > height && self.rng.f32() < self.config.reset_chance {
                let speed = self.random_speed();
                let col = &mut self.columns[index];
                col.position = 0.0;
                col.speed = speed;
            }
        }
    }

    fn random_speed(&mut self) -> f32 {
        let FieldConfig {
            min_speed,
            max_speed,
            ..
        } = self.config;
        (min_speed + self.rng.f32() * (max_speed - min_speed)).clamp(min_speed, max_speed)
    }

    fn random_glyph(&mut self) -> char {
        self.config.alphabet[self.rng.usize(..self.config.alphabet.len())]
    }

    fn random_hold(&mut self) -> u32 {
        self.rng.u32(self.config.glyph_hold.clone())
    }
}
