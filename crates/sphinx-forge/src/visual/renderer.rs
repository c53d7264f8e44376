//! Text renderers.
//!
//! A renderer draws a fragment of the secret onto the canvas starting at a
//! horizontal cursor and reports where the cursor ended up, so successive
//! fragments line up.

use image::{Pixel, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use rand::Rng;
use rand::seq::IndexedRandom;
use rusttype::{Font, Scale, point};
use sphinx_common::constants::{fonts, text};
use sphinx_common::{Argb, SphinxError, SphinxResult};

use super::canvas::PixelCanvas;
use super::glyphs::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::resources::ResourceLocator;
use crate::rng::StrategyRng;

pub trait WordRenderer: Send + Sync {
    /// Draw `word` from `start_x` and return the cursor after it
    fn render(&self, word: &str, canvas: &mut PixelCanvas, start_x: i32) -> SphinxResult<i32>;

    /// Cursor for the first fragment on a fresh canvas
    fn start_x(&self, canvas: &PixelCanvas) -> i32 {
        (canvas.width() as f64 * text::X_OFFSET).round() as i32
    }
}

/// Offsets and colours shared by both renderers
#[derive(Debug)]
struct Layout {
    x_offset: f64,
    y_offset: f64,
    colors: Vec<Argb>,
    rng: StrategyRng,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            x_offset: text::X_OFFSET,
            y_offset: text::Y_OFFSET,
            colors: vec![Argb::BLACK],
            rng: StrategyRng::default(),
        }
    }
}

impl Layout {
    fn start_x(&self, canvas: &PixelCanvas) -> i32 {
        (canvas.width() as f64 * self.x_offset).round() as i32
    }

    fn baseline(&self, canvas: &PixelCanvas) -> i32 {
        let height = canvas.height() as f64;
        canvas.height() as i32 - (height * self.y_offset).round() as i32
    }

    fn next_color(&self) -> Argb {
        match self.colors.as_slice() {
            [only] => *only,
            many => self
                .rng
                .with(|rng| many.choose(rng).copied())
                .unwrap_or(Argb::BLACK),
        }
    }

    fn randomize_y_offset(&mut self) {
        self.y_offset = self
            .rng
            .with(|rng| rng.random_range(text::Y_OFFSET_MIN..text::Y_OFFSET_MAX));
    }
}

/// Blend `color` at `coverage` over the pixel at `(x, y)`, ignoring off-canvas points
fn blend_pixel(canvas: &mut PixelCanvas, x: i32, y: i32, color: Argb, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let [r, g, b, a] = color.to_rgba();
    let alpha = (a as f32 * coverage.clamp(0.0, 1.0)).round() as u8;
    if alpha == 0 {
        return;
    }
    canvas
        .image_mut()
        .get_pixel_mut(x as u32, y as u32)
        .blend(&Rgba([r, g, b, alpha]));
}

/// Renders with TrueType fonts through `rusttype`
pub struct GlyphWordRenderer {
    fonts: Vec<Font<'static>>,
    font_size: f32,
    layout: Layout,
}

impl GlyphWordRenderer {
    pub fn new(fonts: Vec<Font<'static>>) -> SphinxResult<Self> {
        if fonts.is_empty() {
            return Err(SphinxError::InvalidArgument(
                "a glyph renderer needs at least one font".into(),
            ));
        }
        Ok(Self {
            fonts,
            font_size: text::FONT_SIZE,
            layout: Layout::default(),
        })
    }

    /// Load fonts by resource name
    pub fn from_resources(locator: &ResourceLocator, names: &[&str]) -> SphinxResult<Self> {
        let fonts = names
            .iter()
            .map(|name| load_font(locator, name))
            .collect::<SphinxResult<Vec<_>>>()?;
        Self::new(fonts)
    }

    /// Courier Prime Bold and Public Sans Bold from the assets directory
    pub fn with_default_fonts(locator: &ResourceLocator) -> SphinxResult<Self> {
        Self::from_resources(locator, &[fonts::COURIER_PRIME_BOLD, fonts::PUBLIC_SANS_BOLD])
    }

    pub fn with_color(mut self, color: Argb) -> Self {
        self.layout.colors = vec![color];
        self
    }

    /// Pick a colour per character; an empty list keeps the current colours
    pub fn with_colors(mut self, colors: Vec<Argb>) -> Self {
        if !colors.is_empty() {
            self.layout.colors = colors;
        }
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_x_offset(mut self, x_offset: f64) -> Self {
        self.layout.x_offset = x_offset;
        self
    }

    pub fn with_y_offset(mut self, y_offset: f64) -> Self {
        self.layout.y_offset = y_offset;
        self
    }

    /// Baseline somewhere in the lower three quarters
    pub fn randomize_y_offset(mut self) -> Self {
        self.layout.randomize_y_offset();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.layout.rng = StrategyRng::seeded(seed);
        self
    }

    fn next_font(&self) -> &Font<'static> {
        if self.fonts.len() == 1 {
            return &self.fonts[0];
        }
        let index = self.layout.rng.with(|rng| rng.random_range(0..self.fonts.len()));
        &self.fonts[index]
    }
}

impl WordRenderer for GlyphWordRenderer {
    fn render(&self, word: &str, canvas: &mut PixelCanvas, start_x: i32) -> SphinxResult<i32> {
        let baseline = self.layout.baseline(canvas) as f32;
        let scale = Scale::uniform(self.font_size);
        let mut cursor = start_x;

        for c in word.chars() {
            let color = self.layout.next_color();
            let glyph = self
                .next_font()
                .glyph(c)
                .scaled(scale)
                .positioned(point(cursor as f32, baseline));

            let advance = match glyph.pixel_bounding_box() {
                Some(bounds) => {
                    glyph.draw(|gx, gy, coverage| {
                        let x = bounds.min.x + gx as i32;
                        let y = bounds.min.y + gy as i32;
                        blend_pixel(canvas, x, y, color, coverage);
                    });
                    bounds.width()
                }
                None => glyph.unpositioned().h_metrics().advance_width as i32,
            };
            cursor += advance;
        }
        Ok(cursor)
    }

    fn start_x(&self, canvas: &PixelCanvas) -> i32 {
        self.layout.start_x(canvas)
    }
}

impl std::fmt::Debug for GlyphWordRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphWordRenderer")
            .field("fonts", &self.fonts.len())
            .field("font_size", &self.font_size)
            .field("layout", &self.layout)
            .finish()
    }
}

fn load_font(locator: &ResourceLocator, name: &str) -> SphinxResult<Font<'static>> {
    let bytes = locator.read(name)?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| SphinxError::Format(format!("{} is not a TrueType font", name)))
}

/// Renders with the built-in 5x7 bitmap glyphs, scaled up to blocks.
///
/// Needs no font assets. Characters without a glyph leave a blank cell.
#[derive(Debug)]
pub struct PixelWordRenderer {
    scale: u32,
    layout: Layout,
}

impl PixelWordRenderer {
    pub const DEFAULT_SCALE: u32 = 4;

    pub fn new() -> Self {
        Self::default()
    }

    /// Side of one glyph pixel in canvas pixels (at least 1)
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn with_color(mut self, color: Argb) -> Self {
        self.layout.colors = vec![color];
        self
    }

    pub fn with_colors(mut self, colors: Vec<Argb>) -> Self {
        if !colors.is_empty() {
            self.layout.colors = colors;
        }
        self
    }

    pub fn with_x_offset(mut self, x_offset: f64) -> Self {
        self.layout.x_offset = x_offset;
        self
    }

    pub fn with_y_offset(mut self, y_offset: f64) -> Self {
        self.layout.y_offset = y_offset;
        self
    }

    pub fn randomize_y_offset(mut self) -> Self {
        self.layout.randomize_y_offset();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.layout.rng = StrategyRng::seeded(seed);
        self
    }

    /// Whether the built-in glyph set covers `c`
    pub fn can_draw(c: char) -> bool {
        glyphs::glyph(c).is_some()
    }

    /// Horizontal distance between glyph origins
    pub fn advance(&self) -> i32 {
        ((GLYPH_WIDTH + 1) * self.scale) as i32
    }
}

impl Default for PixelWordRenderer {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            layout: Layout::default(),
        }
    }
}

impl WordRenderer for PixelWordRenderer {
    fn render(&self, word: &str, canvas: &mut PixelCanvas, start_x: i32) -> SphinxResult<i32> {
        let top = self.layout.baseline(canvas) - (GLYPH_HEIGHT * self.scale) as i32;
        let mut cursor = start_x;

        // Nothing is drawn unless every character has a glyph
        let shapes = word
            .chars()
            .map(|c| {
                glyphs::glyph(c).ok_or_else(|| {
                    SphinxError::InvalidArgument(format!("no bitmap glyph for {:?}", c))
                })
            })
            .collect::<SphinxResult<Vec<_>>>()?;

        for glyph in shapes {
            let color = Rgba(self.layout.next_color().to_rgba());
            for (col, row) in glyphs::lit_pixels(glyph) {
                let cell = Rect::at(
                    cursor + (col * self.scale) as i32,
                    top + (row * self.scale) as i32,
                )
                .of_size(self.scale, self.scale);
                draw_filled_rect_mut(canvas.image_mut(), cell, color);
            }
            cursor += self.advance();
        }
        Ok(cursor)
    }

    fn start_x(&self, canvas: &PixelCanvas) -> i32 {
        self.layout.start_x(canvas)
    }
}
