//! Configuration management for the forge CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use sphinx_common::{Argb, SphinxError, SphinxResult};
use sphinx_common::constants::{
    DEFAULT_ASSETS_DIR, DEFAULT_CONTENT_LENGTH, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH,
    DEFAULT_NOISE_GAIN, ripple,
};
use sphinx_common::{Alphabet, EdgePolicy, Interpolation, WaveType};

/// Forge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ForgeConfig {
    /// Directory voices, noises and fonts are resolved against
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Image challenge configuration
    #[serde(default)]
    pub image: ImageConfig,

    /// Audio challenge configuration
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Background layer under the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    None,
    Flat,
    Gradient,
}

/// Image-specific configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    pub content_length: usize,
    pub alphabet: Alphabet,

    /// TrueType fonts under the assets directory; empty uses the bitmap renderer
    pub fonts: Vec<String>,

    pub background: BackgroundKind,

    /// Curved line over the text
    pub noise: bool,

    pub border: bool,

    pub colors: ColorConfig,

    pub ripple: RippleConfig,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
            content_length: DEFAULT_CONTENT_LENGTH,
            alphabet: Alphabet::default(),
            fonts: Vec::new(),
            background: BackgroundKind::default(),
            noise: true,
            border: true,
            colors: ColorConfig::default(),
            ripple: RippleConfig::default(),
        }
    }
}

/// Colours as `#RRGGBB` or `#AARRGGBB`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Text colours, picked per character
    pub text: Vec<Argb>,
    pub flat: Argb,
    pub gradient_from: Argb,
    pub gradient_to: Argb,
    pub noise: Argb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            text: vec![Argb::BLACK],
            flat: Argb::GRAY,
            gradient_from: Argb::DARK_GRAY,
            gradient_to: Argb::WHITE,
            noise: Argb::BLACK,
        }
    }
}

/// Ripple distortion parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    pub enabled: bool,
    pub wave: WaveType,
    pub x_amplitude: f32,
    pub y_amplitude: f32,
    pub x_wavelength: f32,
    pub y_wavelength: f32,
    pub edge_policy: EdgePolicy,
    pub interpolation: Interpolation,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wave: WaveType::default(),
            x_amplitude: ripple::X_AMPLITUDE,
            y_amplitude: ripple::Y_AMPLITUDE,
            x_wavelength: ripple::X_WAVELENGTH,
            y_wavelength: ripple::Y_WAVELENGTH,
            edge_policy: EdgePolicy::default(),
            interpolation: Interpolation::default(),
        }
    }
}

/// Audio-specific configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Number of spoken digits
    pub content_length: usize,

    /// Layer a background noise clip under the voices
    pub noise: bool,

    pub noise_gain: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            content_length: DEFAULT_CONTENT_LENGTH,
            noise: true,
            noise_gain: DEFAULT_NOISE_GAIN,
        }
    }
}

fn default_assets_dir() -> String {
    DEFAULT_ASSETS_DIR.to_string()
}

impl ForgeConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = Self::from_file(config_path)?;

        // Apply CLI overrides
        if let Some(ref assets_dir) = args.assets_dir {
            config.assets_dir = assets_dir.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values no challenge can be built from
    pub fn validate(&self) -> SphinxResult<()> {
        let invalid = |msg: String| Err(SphinxError::Config(msg));
        let image = &self.image;
        if image.width == 0 || image.height == 0 {
            return invalid(format!(
                "image size must be positive, got {}x{}",
                image.width, image.height
            ));
        }
        if image.content_length == 0 || self.audio.content_length == 0 {
            return invalid("content_length must be positive".into());
        }
        if image.colors.text.is_empty() {
            return invalid("image.colors.text needs at least one colour".into());
        }
        if !self.audio.noise_gain.is_finite() || self.audio.noise_gain < 0.0 {
            return invalid(format!(
                "audio.noise_gain must be finite and non-negative, got {}",
                self.audio.noise_gain
            ));
        }
        Ok(())
    }

    fn from_file(config_path: &str) -> Result<Self> {
        if !Path::new(config_path).exists() {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path))
            .build()
            .context("Failed to load config file")?;

        settings
            .try_deserialize()
            .context("Failed to parse config")
    }
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            image: ImageConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ForgeConfig::from_file("/definitely/not/here.toml").unwrap();
        assert_eq!(config.assets_dir, "assets");
        assert_eq!((config.image.width, config.image.height), (200, 50));
        assert_eq!(config.audio.noise_gain, 0.6);
        assert!(config.image.ripple.enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge.toml");
        std::fs::write(
            &path,
            r#"
assets_dir = "/srv/sphinx"

[image]
width = 320
alphabet = "numbers"
background = "gradient"

[image.ripple]
wave = "noise"
edge_policy = "wrap"

[audio]
noise = false
"#,
        )
        .unwrap();

        let config = ForgeConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.assets_dir, "/srv/sphinx");
        assert_eq!(config.image.width, 320);
        assert_eq!(config.image.height, 50);
        assert_eq!(config.image.alphabet, Alphabet::Numbers);
        assert_eq!(config.image.background, BackgroundKind::Gradient);
        assert_eq!(config.image.ripple.wave, WaveType::Noise);
        assert_eq!(config.image.ripple.edge_policy, EdgePolicy::Wrap);
        assert_eq!(config.image.ripple.x_wavelength, 15.0);
        assert!(!config.audio.noise);
        assert_eq!(config.audio.content_length, 5);
        assert_eq!(config.image.colors.noise, Argb::BLACK);
    }

    #[test]
    fn test_colors_parse_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge.toml");
        std::fs::write(
            &path,
            r##"
[image.colors]
text = ["#FF0000", "#0000FF"]
flat = "#FFFFFF"
noise = "#80112233"
"##,
        )
        .unwrap();

        let config = ForgeConfig::from_file(path.to_str().unwrap()).unwrap();
        let colors = &config.image.colors;
        assert_eq!(colors.text, vec![Argb::RED, Argb::from_channels(255, 0, 0, 255)]);
        assert_eq!(colors.flat, Argb::WHITE);
        assert_eq!(colors.noise, Argb::from_channels(0x80, 0x11, 0x22, 0x33));
        assert_eq!(colors.gradient_to, Argb::WHITE);
    }

    #[test]
    fn test_bad_colour_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forge.toml");
        std::fs::write(&path, "[image.colors]\nflat = \"mauve\"\n").unwrap();
        assert!(ForgeConfig::from_file(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_reports_config_errors() {
        assert!(ForgeConfig::default().validate().is_ok());

        let mut config = ForgeConfig::default();
        config.image.width = 0;
        assert!(matches!(config.validate(), Err(SphinxError::Config(_))));

        let mut config = ForgeConfig::default();
        config.audio.noise_gain = -0.5;
        assert!(matches!(config.validate(), Err(SphinxError::Config(_))));

        let mut config = ForgeConfig::default();
        config.image.colors.text.clear();
        assert!(matches!(config.validate(), Err(SphinxError::Config(_))));
    }
}
