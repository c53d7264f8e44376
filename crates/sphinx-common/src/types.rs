//! Core types shared across Sphinx components.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SphinxError;

/// Periodic function driving a displacement field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveType {
    #[default]
    Sine,
    Sawtooth,
    Triangle,
    /// Coherent (Perlin-style) noise
    Noise,
}

/// What to sample when a source coordinate falls outside the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Fully transparent black
    Zero,
    /// Nearest in-bounds pixel
    Clamp,
    /// Toroidal wraparound
    Wrap,
    /// Nearest in-bounds pixel with alpha forced to zero (no grey halo)
    #[default]
    RgbClamp,
}

/// Resampling strategy for inverse-mapped coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    NearestNeighbour,
    #[default]
    Bilinear,
}

/// Built-in content alphabets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alphabet {
    Numbers,
    #[default]
    Latin,
    Arabic,
    Chinese,
}

/// Artifact kind of a finished challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Image,
    Audio,
}

impl ChallengeKind {
    /// MIME type of the encoded artifact
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Image => "image/png",
            Self::Audio => "audio/wav",
        }
    }
}

/// A packed 0xAARRGGBB colour.
///
/// Parses from `#RRGGBB` (opaque) or `#AARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Argb(u32);

impl Argb {
    pub const TRANSPARENT: Argb = Argb(0x0000_0000);
    pub const BLACK: Argb = Argb(0xFF00_0000);
    pub const WHITE: Argb = Argb(0xFFFF_FFFF);
    pub const GRAY: Argb = Argb(0xFF80_8080);
    pub const DARK_GRAY: Argb = Argb(0xFF40_4040);
    pub const RED: Argb = Argb(0xFFFF_0000);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn from_channels(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Channels in RGBA order
    pub fn to_rgba(&self) -> [u8; 4] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8, self.alpha()]
    }

    pub fn from_rgba(rgba: [u8; 4]) -> Self {
        Self::from_channels(rgba[3], rgba[0], rgba[1], rgba[2])
    }
}

impl FromStr for Argb {
    type Err = SphinxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let parsed = u32::from_str_radix(hex, 16)
            .map_err(|_| SphinxError::InvalidArgument(format!("invalid colour '{}'", s)))?;
        match hex.len() {
            6 => Ok(Self(0xFF00_0000 | parsed)),
            8 => Ok(Self(parsed)),
            _ => Err(SphinxError::InvalidArgument(format!(
                "colour '{}' must be #RRGGBB or #AARRGGBB",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Argb {
    type Error = SphinxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Argb> for String {
    fn from(value: Argb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Serializable description of a finished challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeEnvelope {
    /// Artifact kind
    pub kind: ChallengeKind,

    /// The expected answer (server-side only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Base64 `data:` URI of the encoded artifact
    pub data_uri: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_parse_opaque_and_translucent() {
        let red: Argb = "#FF0000".parse().unwrap();
        assert_eq!(red, Argb::RED);
        assert_eq!(red.to_rgba(), [255, 0, 0, 255]);

        let ghost: Argb = "#80FFFFFF".parse().unwrap();
        assert_eq!(ghost.alpha(), 0x80);
    }

    #[test]
    fn test_argb_rejects_garbage() {
        assert!("#12345".parse::<Argb>().is_err());
        assert!("blue".parse::<Argb>().is_err());
    }

    #[test]
    fn test_argb_rgba_roundtrip() {
        let c = Argb::from_channels(10, 20, 30, 40);
        assert_eq!(Argb::from_rgba(c.to_rgba()), c);
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(serde_json::to_string(&EdgePolicy::RgbClamp).unwrap(), "\"rgb_clamp\"");
        assert_eq!(serde_json::to_string(&WaveType::Sawtooth).unwrap(), "\"sawtooth\"");
        let policy: EdgePolicy = serde_json::from_str("\"wrap\"").unwrap();
        assert_eq!(policy, EdgePolicy::Wrap);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(EdgePolicy::default(), EdgePolicy::RgbClamp);
        assert_eq!(Interpolation::default(), Interpolation::Bilinear);
        assert_eq!(WaveType::default(), WaveType::Sine);
    }

    #[test]
    fn test_envelope_hides_missing_answer() {
        let envelope = ChallengeEnvelope {
            kind: ChallengeKind::Image,
            answer: None,
            data_uri: "data:image/png;base64,".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("answer").is_none());
        assert_eq!(json["kind"], "image");
    }
}
