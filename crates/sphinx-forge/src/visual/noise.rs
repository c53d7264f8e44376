//! Cosmetic noise drawn over the text layer.

use image::Rgba;
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::noise::gaussian_noise_mut;
use imageproc::point::Point;
use rand::Rng;
use sphinx_common::{Argb, SphinxError, SphinxResult};

use super::canvas::PixelCanvas;
use crate::rng::StrategyRng;

/// Mutates a canvas in place
pub trait ImageNoiseProducer: Send + Sync {
    fn make_noise(&self, canvas: &mut PixelCanvas) -> SphinxResult<()>;
}

/// Thick line from the left edge to the right edge at random heights
#[derive(Debug)]
pub struct StraightLineNoise {
    color: Argb,
    width: u32,
    rng: StrategyRng,
}

impl StraightLineNoise {
    pub const DEFAULT_WIDTH: u32 = 4;

    pub fn new(color: Argb, width: u32) -> Self {
        Self {
            color,
            width,
            rng: StrategyRng::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }
}

impl Default for StraightLineNoise {
    fn default() -> Self {
        Self::new(Argb::RED, Self::DEFAULT_WIDTH)
    }
}

impl ImageNoiseProducer for StraightLineNoise {
    fn make_noise(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        let (width, height) = canvas.dimensions();
        let (y1, y2) = self
            .rng
            .with(|rng| (rng.random_range(1..=height), rng.random_range(1..=height)));
        draw_thick_line(
            canvas,
            (0, y1 as i32),
            (width as i32, y2 as i32),
            self.width as f64,
            self.color,
        );
        Ok(())
    }
}

/// Thick cubic curve sweeping across the canvas
#[derive(Debug)]
pub struct CurvedLineNoise {
    color: Argb,
    width: f64,
    rng: StrategyRng,
}

impl CurvedLineNoise {
    pub const DEFAULT_WIDTH: f64 = 3.0;
    const SEGMENTS: usize = 24;

    pub fn new(color: Argb, width: f64) -> Self {
        Self {
            color,
            width,
            rng: StrategyRng::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }

    /// Flattened curve through random heights at 10%, 10%, 25% and 90% of the width
    fn curve_points(&self, width: u32, height: u32) -> Vec<(i32, i32)> {
        let (w, h) = (width as f64, height as f64);
        let heights: [f64; 4] = self.rng.with(|rng| std::array::from_fn(|_| rng.random::<f64>()));
        let control = [
            (w * 0.1, h * heights[0]),
            (w * 0.1, h * heights[1]),
            (w * 0.25, h * heights[2]),
            (w * 0.9, h * heights[3]),
        ];

        (0..=Self::SEGMENTS)
            .map(|i| {
                let t = i as f64 / Self::SEGMENTS as f64;
                let (x, y) = cubic(control, t);
                (x as i32, y as i32)
            })
            .collect()
    }
}

impl Default for CurvedLineNoise {
    fn default() -> Self {
        Self::new(Argb::BLACK, Self::DEFAULT_WIDTH)
    }
}

impl ImageNoiseProducer for CurvedLineNoise {
    fn make_noise(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        let points = self.curve_points(canvas.width(), canvas.height());
        for pair in points.windows(2) {
            draw_thick_line(canvas, pair[0], pair[1], self.width, self.color);
        }
        Ok(())
    }
}

/// Flips a fraction of pixels to opaque black or white
#[derive(Debug)]
pub struct SaltAndPepperNoise {
    density: f64,
    rng: StrategyRng,
}

impl SaltAndPepperNoise {
    pub const DEFAULT_DENSITY: f64 = 0.15;

    /// `density` is the chance each pixel is hit, in [0, 1]
    pub fn new(density: f64) -> SphinxResult<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(SphinxError::InvalidArgument(format!(
                "noise density must be between 0 and 1, got {}",
                density
            )));
        }
        Ok(Self {
            density,
            rng: StrategyRng::default(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }
}

impl Default for SaltAndPepperNoise {
    fn default() -> Self {
        Self {
            density: Self::DEFAULT_DENSITY,
            rng: StrategyRng::default(),
        }
    }
}

impl ImageNoiseProducer for SaltAndPepperNoise {
    fn make_noise(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        let pepper = Rgba(Argb::BLACK.to_rgba());
        let salt = Rgba(Argb::WHITE.to_rgba());
        self.rng.with(|rng| {
            for pixel in canvas.image_mut().pixels_mut() {
                if rng.random::<f64>() < self.density {
                    *pixel = if rng.random::<bool>() { pepper } else { salt };
                }
            }
        });
        Ok(())
    }
}

/// Adds normally distributed jitter to every channel
#[derive(Debug)]
pub struct GaussianNoise {
    std_dev: f64,
    mean: f64,
    rng: StrategyRng,
}

impl GaussianNoise {
    pub const DEFAULT_STD_DEV: f64 = 20.0;
    pub const DEFAULT_MEAN: f64 = 0.0;

    pub fn new(std_dev: f64, mean: f64) -> Self {
        Self {
            std_dev,
            mean,
            rng: StrategyRng::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STD_DEV, Self::DEFAULT_MEAN)
    }
}

impl ImageNoiseProducer for GaussianNoise {
    fn make_noise(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        let seed = self.rng.with(|rng| rng.random());
        gaussian_noise_mut(canvas.image_mut(), self.mean, self.std_dev, seed);
        Ok(())
    }
}

/// Point on a cubic Bezier curve
fn cubic(control: [(f64, f64); 4], t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let weights = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    control
        .iter()
        .zip(weights)
        .fold((0.0, 0.0), |(x, y), (&(cx, cy), w)| (x + cx * w, y + cy * w))
}

/// Filled quadrilateral `width` pixels across, centred on the segment
fn draw_thick_line(canvas: &mut PixelCanvas, from: (i32, i32), to: (i32, i32), width: f64, color: Argb) {
    let rgba = Rgba(color.to_rgba());
    let (x1, y1) = from;
    let (x2, y2) = to;
    let (dx, dy) = ((x2 - x1) as f64, (y2 - y1) as f64);
    let length = (dx * dx + dy * dy).sqrt();

    if length == 0.0 {
        let radius = ((width / 2.0) as i32).max(0);
        draw_filled_circle_mut(canvas.image_mut(), from, radius, rgba);
        return;
    }

    let scale = width / (2.0 * length);
    let round_away = |v: f64| (v + if v > 0.0 { 0.5 } else { -0.5 }) as i32;
    let ox = round_away(-scale * dy);
    let oy = round_away(scale * dx);

    let corners = [
        Point::new(x1 + ox, y1 + oy),
        Point::new(x1 - ox, y1 - oy),
        Point::new(x2 - ox, y2 - oy),
        Point::new(x2 + ox, y2 + oy),
    ];
    draw_polygon_mut(canvas.image_mut(), &corners, rgba);
}
