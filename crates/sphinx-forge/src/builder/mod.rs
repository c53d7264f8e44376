//! Single-use challenge builders.
//!
//! Every step consumes the builder and hands it back, so a builder can only
//! move forward and `build()` can only run once. Steps that touch pixels or
//! pick the secret run immediately; the background, the border and audio
//! assembly are deferred to `build()`.
//!
//! Each builder keeps a journal of the steps taken, and the same pipeline can
//! be described up front as a recipe and replayed any number of times.

mod audio;
mod image;

pub use self::audio::{AudioChallengeBuilder, AudioRecipe, AudioStage, AudioStep};
pub use self::image::{ImageChallengeBuilder, ImageRecipe, ImageStage, ImageStep};
