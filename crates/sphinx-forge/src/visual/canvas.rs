//! Mutable RGBA pixel buffer every image strategy draws on.

use std::fmt;
use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use sphinx_common::{Argb, SphinxError, SphinxResult};

/// A width x height grid of straight-alpha RGBA pixels
#[derive(Clone, PartialEq)]
pub struct PixelCanvas {
    image: RgbaImage,
}

impl PixelCanvas {
    /// A fully transparent canvas
    pub fn new(width: u32, height: u32) -> SphinxResult<Self> {
        Self::filled(width, height, Argb::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Argb) -> SphinxResult<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, Rgba(color.to_rgba())),
        })
    }

    pub fn from_image(image: RgbaImage) -> SphinxResult<Self> {
        check_dimensions(image.width(), image.height())?;
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Panics when `(x, y)` is outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Argb {
        Argb::from_rgba(self.image.get_pixel(x, y).0)
    }

    /// `None` outside the canvas
    pub fn get(&self, x: i64, y: i64) -> Option<Argb> {
        if x < 0 || y < 0 {
            return None;
        }
        self.image
            .get_pixel_checked(x as u32, y as u32)
            .map(|p| Argb::from_rgba(p.0))
    }

    /// Panics when `(x, y)` is outside the canvas
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Argb) {
        self.image.put_pixel(x, y, Rgba(color.to_rgba()));
    }

    pub fn fill(&mut self, color: Argb) {
        let rgba = Rgba(color.to_rgba());
        for pixel in self.image.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Composite `top` over this canvas at the origin (source-over)
    pub fn overlay(&mut self, top: &PixelCanvas) {
        imageops::overlay(&mut self.image, &top.image, 0, 0);
    }

    /// One-pixel frame around the outermost pixels
    pub fn draw_border(&mut self, color: Argb) {
        let frame = Rect::at(0, 0).of_size(self.width(), self.height());
        draw_hollow_rect_mut(&mut self.image, frame, Rgba(color.to_rgba()));
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Row-major packed ARGB values
    pub fn argb_pixels(&self) -> Vec<Argb> {
        self.image.pixels().map(|p| Argb::from_rgba(p.0)).collect()
    }

    pub fn to_png(&self) -> SphinxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| SphinxError::Encoding(format!("PNG: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

impl fmt::Debug for PixelCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[PixelCanvas: {}x{}]", self.width(), self.height())
    }
}

fn check_dimensions(width: u32, height: u32) -> SphinxResult<()> {
    if width == 0 || height == 0 {
        return Err(SphinxError::Construction(format!(
            "canvas dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(PixelCanvas::new(0, 10), Err(SphinxError::Construction(_))));
        assert!(matches!(PixelCanvas::new(10, 0), Err(SphinxError::Construction(_))));
    }

    #[test]
    fn test_new_is_transparent() {
        let canvas = PixelCanvas::new(3, 2).unwrap();
        assert_eq!(canvas.dimensions(), (3, 2));
        assert!(canvas.argb_pixels().iter().all(|p| *p == Argb::TRANSPARENT));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let canvas = PixelCanvas::filled(2, 2, Argb::WHITE).unwrap();
        assert_eq!(canvas.get(1, 1), Some(Argb::WHITE));
        assert_eq!(canvas.get(-1, 0), None);
        assert_eq!(canvas.get(2, 0), None);
    }

    #[test]
    fn test_overlay_source_over() {
        let mut bottom = PixelCanvas::filled(2, 1, Argb::WHITE).unwrap();
        let mut top = PixelCanvas::new(2, 1).unwrap();
        top.set_pixel(0, 0, Argb::BLACK);
        bottom.overlay(&top);

        assert_eq!(bottom.pixel(0, 0), Argb::BLACK);
        assert_eq!(bottom.pixel(1, 0), Argb::WHITE);
    }

    #[test]
    fn test_border_is_outermost_ring() {
        let mut canvas = PixelCanvas::filled(4, 3, Argb::WHITE).unwrap();
        canvas.draw_border(Argb::BLACK);

        for x in 0..4 {
            assert_eq!(canvas.pixel(x, 0), Argb::BLACK);
            assert_eq!(canvas.pixel(x, 2), Argb::BLACK);
        }
        assert_eq!(canvas.pixel(0, 1), Argb::BLACK);
        assert_eq!(canvas.pixel(3, 1), Argb::BLACK);
        assert_eq!(canvas.pixel(1, 1), Argb::WHITE);
        assert_eq!(canvas.pixel(2, 1), Argb::WHITE);
    }

    #[test]
    fn test_png_signature() {
        let png = PixelCanvas::new(5, 5).unwrap().to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
