//! Image challenge primitives.
//!
//! - `canvas` - the RGBA pixel buffer
//! - `lattice` / `field` / `transform` - gradient noise, displacement and resampling
//! - `filter` - whole-canvas distortions (ripple, block, shear, stretch)
//! - `renderer` / `glyphs` - drawing the secret text
//! - `background` / `noise` - layers under and over the text

mod background;
mod canvas;
mod field;
mod filter;
mod glyphs;
mod lattice;
mod noise;
mod renderer;
mod transform;

pub use background::{
    BackgroundProducer, FlatColorBackground, GradientBackground, TransparentBackground,
};
pub use canvas::PixelCanvas;
pub use field::{DisplacementField, sawtooth, triangle};
pub use filter::{BlockFilter, ImageFilter, RippleFilter, ShearFilter, StretchFilter};
pub use glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH};
pub use lattice::NoiseLattice;
pub use noise::{
    CurvedLineNoise, GaussianNoise, ImageNoiseProducer, SaltAndPepperNoise, StraightLineNoise,
};
pub use renderer::{GlyphWordRenderer, PixelWordRenderer, WordRenderer};
pub use transform::{OutputSpace, TransformFilter};
