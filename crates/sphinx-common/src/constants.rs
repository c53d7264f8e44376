//! Shared constants for Sphinx components.

/// Fixed PCM sample rate (Hz)
pub const PCM_SAMPLE_RATE: u32 = 16_000;

/// Fixed PCM bit depth
pub const PCM_BITS_PER_SAMPLE: u16 = 16;

/// Fixed PCM channel count (mono)
pub const PCM_CHANNELS: u16 = 1;

/// Divisor used when decoding 16-bit samples to [-1, 1]
pub const PCM_DECODE_SCALE: f64 = 32768.0;

/// Multiplier used when encoding [-1, 1] samples back to 16 bits
pub const PCM_ENCODE_SCALE: f64 = 32767.0;

/// Default challenge text length
pub const DEFAULT_CONTENT_LENGTH: usize = 5;

/// Default image challenge width (pixels)
pub const DEFAULT_IMAGE_WIDTH: u32 = 200;

/// Default image challenge height (pixels)
pub const DEFAULT_IMAGE_HEIGHT: u32 = 50;

/// Volume applied to background noise when layering it under voices
pub const DEFAULT_NOISE_GAIN: f64 = 0.6;

/// Default assets directory for voices, noises and fonts
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Ripple distortion defaults
pub mod ripple {
    pub const X_AMPLITUDE: f32 = 2.6;
    pub const Y_AMPLITUDE: f32 = 1.7;
    pub const X_WAVELENGTH: f32 = 15.0;
    pub const Y_WAVELENGTH: f32 = 5.0;

    /// Largest accepted displacement amplitude (pixels)
    pub const MAX_AMPLITUDE: f32 = 4096.0;
}

/// Word rendering defaults
pub mod text {
    /// Glyph size in points for TrueType rendering
    pub const FONT_SIZE: f32 = 40.0;

    /// Left margin as a fraction of the canvas width
    pub const X_OFFSET: f64 = 0.05;

    /// Baseline lift as a fraction of the canvas height
    pub const Y_OFFSET: f64 = 0.25;

    /// Bounds for a randomised baseline lift
    pub const Y_OFFSET_MIN: f64 = 0.0;
    pub const Y_OFFSET_MAX: f64 = 0.75;
}

/// Built-in audio resources (relative to the assets directory)
pub mod sounds {
    /// Prefix for spoken digit samples: {prefix}{digit}-{voice}.wav
    pub const VOICES_PREFIX: &str = "sounds/en/numbers/";

    /// Built-in voice names
    pub const VOICES: &[&str] = &["alex", "bruce", "fred", "ralph", "kathy", "vicki", "victoria"];

    /// Built-in background noises
    pub const NOISES: &[&str] = &[
        "sounds/noises/radio_tuning.wav",
        "sounds/noises/restaurant.wav",
        "sounds/noises/swimming.wav",
    ];
}

/// Built-in fonts (relative to the assets directory)
pub mod fonts {
    pub const COURIER_PRIME_BOLD: &str = "fonts/CourierPrime-Bold.ttf";
    pub const PUBLIC_SANS_BOLD: &str = "fonts/PublicSans-Bold.ttf";
}
