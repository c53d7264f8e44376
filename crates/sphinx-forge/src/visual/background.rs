//! Backgrounds the finished text layer is composited onto.

use sphinx_common::{Argb, SphinxResult};

use super::canvas::PixelCanvas;

pub trait BackgroundProducer: Send + Sync {
    fn background(&self, width: u32, height: u32) -> SphinxResult<PixelCanvas>;
}

/// Fully transparent; what `build()` uses when no background was set
#[derive(Debug, Clone, Copy, Default)]
pub struct TransparentBackground;

impl BackgroundProducer for TransparentBackground {
    fn background(&self, width: u32, height: u32) -> SphinxResult<PixelCanvas> {
        PixelCanvas::new(width, height)
    }
}

/// One opaque colour, gray by default
#[derive(Debug, Clone, Copy)]
pub struct FlatColorBackground {
    color: Argb,
}

impl FlatColorBackground {
    /// Alpha is ignored; the background is always opaque
    pub fn new(color: Argb) -> Self {
        Self {
            color: opaque(color),
        }
    }
}

impl Default for FlatColorBackground {
    fn default() -> Self {
        Self::new(Argb::GRAY)
    }
}

impl BackgroundProducer for FlatColorBackground {
    fn background(&self, width: u32, height: u32) -> SphinxResult<PixelCanvas> {
        PixelCanvas::filled(width, height, self.color)
    }
}

/// Opaque diagonal gradient from the top-left to the bottom-right corner
#[derive(Debug, Clone, Copy)]
pub struct GradientBackground {
    from: Argb,
    to: Argb,
}

impl GradientBackground {
    pub fn new(from: Argb, to: Argb) -> Self {
        Self {
            from: opaque(from),
            to: opaque(to),
        }
    }
}

impl Default for GradientBackground {
    fn default() -> Self {
        Self::new(Argb::DARK_GRAY, Argb::WHITE)
    }
}

impl BackgroundProducer for GradientBackground {
    fn background(&self, width: u32, height: u32) -> SphinxResult<PixelCanvas> {
        let mut canvas = PixelCanvas::new(width, height)?;
        let (w, h) = (width as f64, height as f64);
        let length_sq = w * w + h * h;
        let from = self.from.to_rgba();
        let to = self.to.to_rgba();

        for (x, y, pixel) in canvas.image_mut().enumerate_pixels_mut() {
            // Project the pixel centre onto the (0,0) -> (w,h) axis
            let t = (((x as f64 + 0.5) * w + (y as f64 + 0.5) * h) / length_sq).clamp(0.0, 1.0);
            for lane in 0..4 {
                let a = from[lane] as f64;
                let b = to[lane] as f64;
                pixel.0[lane] = (a + (b - a) * t).round() as u8;
            }
        }
        Ok(canvas)
    }
}

fn opaque(color: Argb) -> Argb {
    Argb::new(color.value() | 0xFF00_0000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparent() {
        let canvas = TransparentBackground.background(4, 3).unwrap();
        assert!(canvas.argb_pixels().iter().all(|p| *p == Argb::TRANSPARENT));
    }

    #[test]
    fn test_flat_is_opaque() {
        let canvas = FlatColorBackground::new(Argb::new(0x1122_3344)).background(3, 3).unwrap();
        assert!(canvas.argb_pixels().iter().all(|p| *p == Argb::new(0xFF22_3344)));
        assert_eq!(FlatColorBackground::default().background(1, 1).unwrap().pixel(0, 0), Argb::GRAY);
    }

    #[test]
    fn test_gradient_runs_dark_to_light() {
        let canvas = GradientBackground::default().background(100, 20).unwrap();
        let start = canvas.pixel(0, 0).to_rgba();
        let end = canvas.pixel(99, 19).to_rgba();
        assert!(start[0] < 0x50);
        assert!(end[0] > 0xF0);
        assert_eq!(start[3], 255);
        assert!(canvas.pixel(50, 10).to_rgba()[0] > start[0]);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(GradientBackground::default().background(0, 5).is_err());
    }
}
