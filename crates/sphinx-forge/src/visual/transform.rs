//! Inverse-mapping geometric transform.
//!
//! Every destination pixel asks the displacement field where it comes from
//! and resamples the source there. Samples that land outside the source are
//! resolved by the edge policy.

use image::{Rgba, RgbaImage, imageops};
use sphinx_common::{EdgePolicy, Interpolation, SphinxError, SphinxResult};

use super::canvas::PixelCanvas;
use super::field::DisplacementField;

type Rgba8 = [u8; 4];

const TRANSPARENT: Rgba8 = [0, 0, 0, 0];

/// Destination rectangle in source coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSpace {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Applies a `DisplacementField` with a resampling mode and edge policy
#[derive(Debug, Clone, Default)]
pub struct TransformFilter {
    field: DisplacementField,
    edge_policy: EdgePolicy,
    interpolation: Interpolation,
}

impl TransformFilter {
    pub fn new(field: DisplacementField) -> Self {
        Self {
            field,
            edge_policy: EdgePolicy::default(),
            interpolation: Interpolation::default(),
        }
    }

    pub fn with_edge_policy(mut self, edge_policy: EdgePolicy) -> Self {
        self.edge_policy = edge_policy;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_field(mut self, field: DisplacementField) -> Self {
        self.field = field;
        self
    }

    pub fn field(&self) -> &DisplacementField {
        &self.field
    }

    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Destination space for a `width` x `height` source.
    ///
    /// Only the zero policy grows it, by the amplitude on each side.
    pub fn output_space(&self, width: u32, height: u32) -> SphinxResult<OutputSpace> {
        let mut space = OutputSpace { x: 0, y: 0, width, height };
        if self.edge_policy == EdgePolicy::Zero {
            let (xa, ya) = self.field.amplitudes();
            let (x, width) = grow(width, xa)?;
            let (y, height) = grow(height, ya)?;
            space = OutputSpace { x, y, width, height };
        }
        Ok(space)
    }

    /// Transform `src` into a new canvas covering `output_space`
    pub fn apply(&self, src: &PixelCanvas) -> SphinxResult<PixelCanvas> {
        let (width, height) = src.dimensions();
        let space = self.output_space(width, height)?;
        let source = Source::new(src, self.edge_policy);

        let mut out = RgbaImage::new(space.width, space.height);
        for (dx, dy, pixel) in out.enumerate_pixels_mut() {
            let (sx, sy) = self.field.source_of(space.x + dx as i32, space.y + dy as i32);
            let value = match self.interpolation {
                Interpolation::Bilinear => source.bilinear(sx, sy),
                Interpolation::NearestNeighbour => source.nearest(sx, sy),
            };
            *pixel = Rgba(value);
        }

        tracing::trace!(
            wave = ?self.field.wave(),
            edge_policy = ?self.edge_policy,
            width = space.width,
            height = space.height,
            "Applied transform"
        );
        PixelCanvas::from_image(out)
    }

    /// Transform `canvas` and draw the window over its original extent on
    /// top of the old pixels
    pub fn apply_in_place(&self, canvas: &mut PixelCanvas) -> SphinxResult<()> {
        let (width, height) = canvas.dimensions();
        let space = self.output_space(width, height)?;
        let transformed = self.apply(canvas)?;
        let window = imageops::crop_imm(
            transformed.image(),
            space.x.unsigned_abs(),
            space.y.unsigned_abs(),
            width,
            height,
        )
        .to_image();
        canvas.overlay(&PixelCanvas::from_image(window)?);
        Ok(())
    }
}

/// Origin and extent of one axis grown by `amplitude` on each side
fn grow(len: u32, amplitude: f32) -> SphinxResult<(i32, u32)> {
    let overflow = || SphinxError::InvalidArgument(format!("amplitude {} too large", amplitude));
    let origin = i32::try_from(amplitude as i64).map_err(|_| overflow())?;
    let extra = u32::try_from((2.0 * amplitude) as i64).map_err(|_| overflow())?;
    let extent = len.checked_add(extra).ok_or_else(overflow)?;
    Ok((-origin, extent))
}

struct Source {
    pixels: Vec<Rgba8>,
    width: i32,
    height: i32,
    edge_policy: EdgePolicy,
}

impl Source {
    fn new(canvas: &PixelCanvas, edge_policy: EdgePolicy) -> Self {
        Self {
            pixels: canvas.image().pixels().map(|p| p.0).collect(),
            width: canvas.width() as i32,
            height: canvas.height() as i32,
            edge_policy,
        }
    }

    /// Pixel at an integer coordinate, edge policy applied when outside
    fn fetch(&self, x: i32, y: i32) -> Rgba8 {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.at(x, y)
        } else {
            self.outside(x, y)
        }
    }

    fn outside(&self, x: i32, y: i32) -> Rgba8 {
        let clamped = || self.at(x.clamp(0, self.width - 1), y.clamp(0, self.height - 1));
        match self.edge_policy {
            EdgePolicy::Zero => TRANSPARENT,
            EdgePolicy::Wrap => self.at(x.rem_euclid(self.width), y.rem_euclid(self.height)),
            EdgePolicy::Clamp => clamped(),
            EdgePolicy::RgbClamp => {
                let mut p = clamped();
                p[3] = 0;
                p
            }
        }
    }

    fn at(&self, x: i32, y: i32) -> Rgba8 {
        self.pixels[(y * self.width + x) as usize]
    }

    fn bilinear(&self, sx: f32, sy: f32) -> Rgba8 {
        let (fx, fy) = (sx.floor(), sy.floor());
        let (x0, y0) = (fx as i32, fy as i32);
        let (xw, yw) = (sx - fx, sy - fy);

        let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));
        let nw = self.fetch(x0, y0);
        let ne = self.fetch(x1, y0);
        let sw = self.fetch(x0, y1);
        let se = self.fetch(x1, y1);
        bilinear_interpolate(xw, yw, nw, ne, sw, se)
    }

    fn nearest(&self, sx: f32, sy: f32) -> Rgba8 {
        let x = sx as i32;
        let y = sy as i32;
        // Truncation maps (-0.5, _) to column 0, so bounds use the float coordinate
        if sx < 0.0 || x >= self.width || sy < 0.0 || y >= self.height {
            self.outside(x, y)
        } else {
            self.at(x, y)
        }
    }
}

/// Per-lane bilinear blend, truncated to integer
fn bilinear_interpolate(x: f32, y: f32, nw: Rgba8, ne: Rgba8, sw: Rgba8, se: Rgba8) -> Rgba8 {
    let cx = 1.0 - x;
    let cy = 1.0 - y;
    let mut out = [0u8; 4];
    for lane in 0..4 {
        let top = cx * nw[lane] as f32 + x * ne[lane] as f32;
        let bottom = cx * sw[lane] as f32 + x * se[lane] as f32;
        out[lane] = (cy * top + y * bottom) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sphinx_common::{Argb, WaveType};

    fn gradient_canvas(width: u32, height: u32) -> PixelCanvas {
        let mut canvas = PixelCanvas::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                canvas.set_pixel(x, y, Argb::from_channels(255, (x * 20) as u8, (y * 30) as u8, 7));
            }
        }
        canvas
    }

    fn source(canvas: &PixelCanvas, edge_policy: EdgePolicy) -> Source {
        Source::new(canvas, edge_policy)
    }

    fn still(wave: WaveType) -> DisplacementField {
        DisplacementField::new(wave, 0.0, 0.0, 15.0, 5.0).unwrap()
    }

    #[test]
    fn test_zero_amplitude_is_identity() {
        let canvas = gradient_canvas(9, 6);
        for policy in [EdgePolicy::Zero, EdgePolicy::Clamp, EdgePolicy::Wrap, EdgePolicy::RgbClamp] {
            for interpolation in [Interpolation::Bilinear, Interpolation::NearestNeighbour] {
                let out = TransformFilter::new(still(WaveType::Sine))
                    .with_edge_policy(policy)
                    .with_interpolation(interpolation)
                    .apply(&canvas)
                    .unwrap();
                assert_eq!(out, canvas, "{:?} {:?}", policy, interpolation);
            }
        }
    }

    #[test]
    fn test_wrap_is_toroidal() {
        let canvas = gradient_canvas(5, 4);
        let src = source(&canvas, EdgePolicy::Wrap);
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(src.fetch(x + 5, y), src.fetch(x, y));
                assert_eq!(src.fetch(x - 5, y - 4), src.fetch(x, y));
            }
        }
    }

    #[test]
    fn test_clamp_uses_nearest_edge_pixel() {
        let canvas = gradient_canvas(5, 4);
        let src = source(&canvas, EdgePolicy::Clamp);
        assert_eq!(src.fetch(-3, 2), src.fetch(0, 2));
        assert_eq!(src.fetch(9, 9), src.fetch(4, 3));

        let rgb = source(&canvas, EdgePolicy::RgbClamp);
        let mut expected = src.fetch(4, 0);
        expected[3] = 0;
        assert_eq!(rgb.fetch(6, -1), expected);
        assert_eq!(rgb.fetch(1, 1), src.fetch(1, 1));
    }

    #[test]
    fn test_zero_policy_is_transparent_outside() {
        let canvas = gradient_canvas(5, 4);
        let src = source(&canvas, EdgePolicy::Zero);
        assert_eq!(src.fetch(-1, 0), TRANSPARENT);
        assert_eq!(src.fetch(0, 4), TRANSPARENT);
    }

    #[test]
    fn test_zero_policy_expands_output() {
        let field = DisplacementField::new(WaveType::Sine, 2.6, 1.7, 15.0, 5.0).unwrap();
        let filter = TransformFilter::new(field).with_edge_policy(EdgePolicy::Zero);
        assert_eq!(
            filter.output_space(10, 8).unwrap(),
            OutputSpace { x: -2, y: -1, width: 15, height: 11 }
        );
        assert_eq!(filter.apply(&gradient_canvas(10, 8)).unwrap().dimensions(), (15, 11));

        let clamped = filter.clone().with_edge_policy(EdgePolicy::Clamp);
        assert_eq!(clamped.output_space(10, 8).unwrap().width, 10);
    }

    #[test]
    fn test_in_place_keeps_dimensions() {
        let field = DisplacementField::new(WaveType::Triangle, 3.0, 2.0, 4.0, 4.0).unwrap();
        for policy in [EdgePolicy::Zero, EdgePolicy::RgbClamp] {
            let mut canvas = gradient_canvas(12, 7);
            TransformFilter::new(field.clone())
                .with_edge_policy(policy)
                .apply_in_place(&mut canvas)
                .unwrap();
            assert_eq!(canvas.dimensions(), (12, 7));
        }
    }

    #[test]
    fn test_huge_coordinates_do_not_overflow() {
        let canvas = gradient_canvas(4, 4);
        let src = source(&canvas, EdgePolicy::Clamp);
        assert_eq!(src.bilinear(3.0e9, 1.0), src.fetch(3, 1));
        assert_eq!(src.bilinear(-3.0e9, 2.0), src.fetch(0, 2));
    }

    #[test]
    fn test_output_space_rejects_unbounded_growth() {
        assert!(grow(u32::MAX, 1.0).is_err());
        assert!(grow(4, 3.0e9).is_err());
        assert_eq!(grow(4, 4096.0).unwrap(), (-4096, 8196));
    }

    #[test]
    fn test_in_place_keeps_opaque_edges() {
        let field = DisplacementField::new(WaveType::Sine, 2.6, 1.7, 15.0, 5.0).unwrap();
        let mut canvas = gradient_canvas(20, 10);
        TransformFilter::new(field)
            .with_edge_policy(EdgePolicy::RgbClamp)
            .apply_in_place(&mut canvas)
            .unwrap();
        // Source-over on an opaque base can only lose float rounding
        assert!(canvas.argb_pixels().iter().all(|p| p.alpha() >= 254));
    }

    #[test]
    fn test_nearest_tests_float_coordinate() {
        let canvas = gradient_canvas(4, 4);
        let src = source(&canvas, EdgePolicy::Zero);
        // -0.5 truncates to 0 but is still outside
        assert_eq!(src.nearest(-0.5, 1.0), TRANSPARENT);
        assert_eq!(src.nearest(0.9, 1.2), src.fetch(0, 1));
    }

    #[test]
    fn test_bilinear_midpoint() {
        let nw = [0, 0, 0, 255];
        let ne = [100, 0, 0, 255];
        let out = bilinear_interpolate(0.5, 0.0, nw, ne, nw, ne);
        assert_eq!(out, [50, 0, 0, 255]);
        // Truncates rather than rounds
        let out = bilinear_interpolate(0.5, 0.0, [0, 0, 0, 0], [3, 0, 0, 0], [0; 4], [3, 0, 0, 0]);
        assert_eq!(out[0], 1);
    }
}
