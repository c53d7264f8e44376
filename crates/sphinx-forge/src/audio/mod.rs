//! Audio challenge primitives.
//!
//! All audio is fixed-format PCM (16 kHz, 16-bit, mono, signed, little-endian).
//! - `sample` - immutable PCM buffer and its codec
//! - `mixer` - concatenation and weighted mixing
//! - `voice` - per-character vocalization strategies
//! - `noise` - background noise layering strategies

mod mixer;
mod noise;
mod sample;
mod voice;

pub use mixer::{concatenate, mix};
pub use noise::{AudioNoiseProducer, RandomNoiseProducer};
pub use sample::{PcmFormat, Sample, decode_pcm16, encode_pcm16};
pub use voice::{RandomNumberVoiceProducer, VoiceBank, VoiceProducer};
