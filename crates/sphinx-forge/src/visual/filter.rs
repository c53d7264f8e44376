//! Whole-canvas distortion filters.

use std::f64::consts::TAU;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use rand::Rng;
use sphinx_common::{Argb, SphinxError, SphinxResult};

use super::canvas::PixelCanvas;
use super::field::DisplacementField;
use super::lattice::NoiseLattice;
use super::transform::TransformFilter;
use crate::rng::StrategyRng;

/// Mutates a canvas in place
pub trait ImageFilter: Send + Sync {
    fn filter(&self, canvas: &mut PixelCanvas) -> SphinxResult<()>;
}

/// Wavy distortion through a `TransformFilter`.
///
/// The canvas keeps its size: with the zero edge policy the grown output is
/// cut back to the window over the original pixels.
#[derive(Debug, Clone, Default)]
pub struct RippleFilter {
    transform: TransformFilter,
}

impl RippleFilter {
    /// Sine ripple, amplitude 2.6/1.7, wavelength 15/5, bilinear, rgb clamp
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transform(transform: TransformFilter) -> Self {
        Self { transform }
    }

    pub fn with_field(field: DisplacementField) -> Self {
        Self::from_transform(TransformFilter::new(field))
    }

    /// Same ripple, noise waves read from `lattice`
    pub fn with_lattice(self, lattice: Arc<NoiseLattice>) -> Self {
        let field = self.transform.field().clone().with_lattice(lattice);
        Self {
            transform: self.transform.with_field(field),
        }
    }

    pub fn transform(&self) -> &TransformFilter {
        &self.transform
    }
}

impl ImageFilter for RippleFilter {
    fn filter(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        self.transform.apply_in_place(canvas)
    }
}

/// Pixelates the canvas into square blocks of averaged colour
#[derive(Debug, Clone)]
pub struct BlockFilter {
    block_size: u32,
}

impl BlockFilter {
    pub const DEFAULT_BLOCK_SIZE: u32 = 3;

    pub fn new(block_size: u32) -> SphinxResult<Self> {
        if block_size == 0 {
            return Err(SphinxError::InvalidArgument("block size must be positive".into()));
        }
        Ok(Self { block_size })
    }
}

impl Default for BlockFilter {
    fn default() -> Self {
        Self {
            block_size: Self::DEFAULT_BLOCK_SIZE,
        }
    }
}

impl ImageFilter for BlockFilter {
    fn filter(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        let (width, height) = canvas.dimensions();
        let image = canvas.image_mut();

        for by in (0..height).step_by(self.block_size as usize) {
            for bx in (0..width).step_by(self.block_size as usize) {
                let bw = self.block_size.min(width - bx);
                let bh = self.block_size.min(height - by);
                let count = bw * bh;

                let mut sum = [0u32; 3];
                for y in by..by + bh {
                    for x in bx..bx + bw {
                        let p = image.get_pixel(x, y).0;
                        for lane in 0..3 {
                            sum[lane] += p[lane] as u32;
                        }
                    }
                }
                let avg = sum.map(|s| (s / count) as u8);

                // Alpha stays per pixel
                for y in by..by + bh {
                    for x in bx..bx + bw {
                        let p = image.get_pixel_mut(x, y);
                        p.0[..3].copy_from_slice(&avg);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Scales the canvas from its top-left corner and draws the result over
/// itself, clipped to the canvas
#[derive(Debug, Clone)]
pub struct StretchFilter {
    x_scale: f64,
    y_scale: f64,
}

impl StretchFilter {
    pub const DEFAULT_X_SCALE: f64 = 1.0;
    pub const DEFAULT_Y_SCALE: f64 = 3.0;
    pub const MAX_SCALE: f64 = 16.0;

    pub fn new(x_scale: f64, y_scale: f64) -> SphinxResult<Self> {
        for (name, scale) in [("x_scale", x_scale), ("y_scale", y_scale)] {
            if !(scale > 0.0 && scale <= Self::MAX_SCALE) {
                return Err(SphinxError::InvalidArgument(format!(
                    "{} must be within (0, {}], got {}",
                    name,
                    Self::MAX_SCALE,
                    scale
                )));
            }
        }
        Ok(Self { x_scale, y_scale })
    }

    pub fn scales(&self) -> (f64, f64) {
        (self.x_scale, self.y_scale)
    }
}

impl Default for StretchFilter {
    fn default() -> Self {
        Self {
            x_scale: Self::DEFAULT_X_SCALE,
            y_scale: Self::DEFAULT_Y_SCALE,
        }
    }
}

impl ImageFilter for StretchFilter {
    fn filter(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        let (width, height) = canvas.dimensions();
        let scaled_width = ((width as f64 * self.x_scale).round() as u32).max(1);
        let scaled_height = ((height as f64 * self.y_scale).round() as u32).max(1);

        let scaled = imageops::resize(
            canvas.image(),
            scaled_width,
            scaled_height,
            FilterType::Nearest,
        );
        let window = imageops::crop_imm(&scaled, 0, 0, width, height).to_image();
        canvas.overlay(&PixelCanvas::from_image(window)?);

        tracing::trace!(scaled_width, scaled_height, "Applied stretch");
        Ok(())
    }
}

/// Shifts rows then columns along random sine waves, painting the exposed
/// gaps in a fixed colour
#[derive(Debug)]
pub struct ShearFilter {
    gap_color: Argb,
    rng: StrategyRng,
}

const SHEAR_FRAMES: f64 = 15.0;

impl ShearFilter {
    pub fn new(gap_color: Argb) -> Self {
        Self {
            gap_color,
            rng: StrategyRng::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }

    fn shear_rows(&self, canvas: &mut PixelCanvas) {
        let (period, phase) = self
            .rng
            .with(|rng| (rng.random_range(5..15u32), rng.random_range(2..7u32)));
        let (width, height) = canvas.dimensions();
        let gap = self.gap_color.to_rgba();
        let image = canvas.image_mut();

        for y in 0..height {
            let angle = y as f64 / period as f64 + TAU * phase as f64 / SHEAR_FRAMES;
            let shift = ((period >> 1) as f64 * angle.sin()) as i64;

            let row: Vec<[u8; 4]> = (0..width).map(|x| image.get_pixel(x, y).0).collect();
            for (x, value) in row.into_iter().enumerate() {
                if let Some(dest) = shifted(x as i64, shift, width) {
                    image.get_pixel_mut(dest, y).0 = value;
                }
            }
            for x in gap_span(shift, width) {
                image.get_pixel_mut(x, y).0 = gap;
            }
        }
    }

    fn shear_columns(&self, canvas: &mut PixelCanvas) {
        let period = self.rng.with(|rng| rng.random_range(10..40u32));
        let phase = 7.0;
        let (width, height) = canvas.dimensions();
        let gap = self.gap_color.to_rgba();
        let image = canvas.image_mut();

        for x in 0..width {
            let angle = (x as f32 / period as f32) as f64 + TAU * phase / SHEAR_FRAMES;
            let shift = ((period >> 1) as f64 * angle.sin()) as i64;

            let column: Vec<[u8; 4]> = (0..height).map(|y| image.get_pixel(x, y).0).collect();
            for (y, value) in column.into_iter().enumerate() {
                if let Some(dest) = shifted(y as i64, shift, height) {
                    image.get_pixel_mut(x, dest).0 = value;
                }
            }
            for y in gap_span(shift, height) {
                image.get_pixel_mut(x, y).0 = gap;
            }
        }
    }
}

impl Default for ShearFilter {
    fn default() -> Self {
        Self::new(Argb::GRAY)
    }
}

impl ImageFilter for ShearFilter {
    fn filter(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        self.shear_rows(canvas);
        self.shear_columns(canvas);
        Ok(())
    }
}

fn shifted(pos: i64, shift: i64, len: u32) -> Option<u32> {
    let dest = pos + shift;
    (0..len as i64).contains(&dest).then_some(dest as u32)
}

/// Positions painted with the gap colour after shifting a line by `shift`:
/// the span between 0 and `shift`, and between `len` and `len + shift`
fn gap_span(shift: i64, len: u32) -> impl Iterator<Item = u32> {
    let len = len as i64;
    let lead = shift.min(0)..=shift.max(0);
    let tail = (len + shift).min(len)..=(len + shift).max(len);
    lead.chain(tail)
        .filter(move |p| (0..len).contains(p))
        .map(|p| p as u32)
}
