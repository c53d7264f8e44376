//! # Sphinx Forge - Challenge Synthesis Engine
//!
//! Builds human-solvable, machine-resistant challenges: a secret answer
//! paired with either a distorted image or a noisy spoken clip.
//!
//! ## Architecture
//! ```text
//! ContentProducer ──▶ ImageChallengeBuilder ──▶ WordRenderer ─▶ PixelCanvas
//!                        │                      ImageNoiseProducer / ImageFilter
//!                        │                      (RippleFilter = TransformFilter + DisplacementField)
//!                        └──▶ build() ──▶ Challenge<PixelCanvas>
//!
//! ContentProducer ──▶ AudioChallengeBuilder ──▶ VoiceProducer ─▶ Sample
//!                        │                      AudioNoiseProducer / mixer
//!                        └──▶ build() ──▶ Challenge<Sample>
//! ```

pub mod audio;
pub mod builder;
pub mod challenge;
pub mod content;
pub mod resources;
pub mod rng;
pub mod visual;

pub use audio::{PcmFormat, Sample};
pub use builder::{AudioChallengeBuilder, ImageChallengeBuilder};
pub use challenge::{AudioChallenge, Challenge, ImageChallenge};
pub use content::{AlphabetContentProducer, ContentProducer, FixedContentProducer};
pub use resources::ResourceLocator;
pub use visual::PixelCanvas;

pub use sphinx_common::{SphinxError, SphinxResult};
