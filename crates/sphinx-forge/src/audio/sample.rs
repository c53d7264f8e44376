//! Fixed-format PCM sample buffer.
//!
//! Only one format is accepted anywhere in the engine:
//! - Sample rate: 16 kHz
//! - Sample size: 16 bits, signed
//! - Channels: 1
//! - Byte order: little-endian
//!
//! Decoding divides by 32768 while encoding multiplies by 32767, so a
//! decode/encode round trip can move a sample by one LSB.

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;

use sphinx_common::constants::{
    PCM_BITS_PER_SAMPLE, PCM_CHANNELS, PCM_DECODE_SCALE, PCM_ENCODE_SCALE, PCM_SAMPLE_RATE,
};
use sphinx_common::{SphinxError, SphinxResult};

use crate::resources::ResourceLocator;

/// Description of a PCM stream layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    pub signed: bool,
    pub big_endian: bool,
}

impl PcmFormat {
    /// The one format every `Sample` uses
    pub const FIXED: PcmFormat = PcmFormat {
        sample_rate: PCM_SAMPLE_RATE,
        bits_per_sample: PCM_BITS_PER_SAMPLE,
        channels: PCM_CHANNELS,
        signed: true,
        big_endian: false,
    };

    /// Format of a WAV stream (RIFF PCM is little-endian; only 8-bit is unsigned)
    fn from_wav_spec(spec: &hound::WavSpec) -> Self {
        Self {
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            channels: spec.channels,
            signed: spec.sample_format == hound::SampleFormat::Int && spec.bits_per_sample > 8,
            big_endian: false,
        }
    }

    fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        }
    }

    fn ensure_fixed(&self) -> SphinxResult<()> {
        if *self == Self::FIXED {
            Ok(())
        } else {
            Err(SphinxError::Format(format!("expected {}, got {}", Self::FIXED, self)))
        }
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {}-bit, {} channel(s), {}, {}",
            self.sample_rate,
            self.bits_per_sample,
            self.channels,
            if self.signed { "signed" } else { "unsigned" },
            if self.big_endian { "big-endian" } else { "little-endian" },
        )
    }
}

/// An immutable buffer of fixed-format PCM audio
#[derive(Clone, PartialEq, Eq)]
pub struct Sample {
    pcm: Arc<[u8]>,
}

impl Sample {
    /// Load a WAV resource by name
    pub fn from_resource(locator: &ResourceLocator, name: &str) -> SphinxResult<Self> {
        let bytes = locator.read(name)?;
        Self::from_wav_bytes(&bytes).map_err(|e| match e {
            SphinxError::Format(msg) => SphinxError::Format(format!("{}: {}", name, msg)),
            other => other,
        })
    }

    /// Decode a complete WAV file held in memory
    pub fn from_wav_bytes(bytes: &[u8]) -> SphinxResult<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Demux a WAV byte stream, rejecting anything but the fixed format
    pub fn from_reader<R: Read>(reader: R) -> SphinxResult<Self> {
        let reader = hound::WavReader::new(reader).map_err(wav_error)?;
        PcmFormat::from_wav_spec(&reader.spec()).ensure_fixed()?;

        let mut pcm = Vec::with_capacity(reader.len() as usize * 2);
        for sample in reader.into_samples::<i16>() {
            pcm.extend_from_slice(&sample.map_err(wav_error)?.to_le_bytes());
        }
        Ok(Self { pcm: pcm.into() })
    }

    /// Wrap already-demuxed PCM bytes declared to be in `format`
    pub fn from_pcm(format: PcmFormat, pcm: Vec<u8>) -> SphinxResult<Self> {
        format.ensure_fixed()?;
        if pcm.len() % 2 != 0 {
            return Err(SphinxError::Format(format!(
                "{} bytes is not a whole number of 16-bit samples",
                pcm.len()
            )));
        }
        Ok(Self { pcm: pcm.into() })
    }

    /// Wrap PCM produced inside the crate (always whole 16-bit samples)
    pub(super) fn from_raw(pcm: Vec<u8>) -> Self {
        debug_assert!(pcm.len() % 2 == 0);
        Self { pcm: pcm.into() }
    }

    /// Encode normalized samples in [-1, 1]
    pub fn from_samples(samples: &[f64]) -> Self {
        Self {
            pcm: encode_pcm16(samples).into(),
        }
    }

    /// A zero-length buffer
    pub fn empty() -> Self {
        Self {
            pcm: Vec::new().into(),
        }
    }

    pub fn format(&self) -> PcmFormat {
        PcmFormat::FIXED
    }

    /// Number of frames (mono, so also the number of samples)
    pub fn sample_count(&self) -> usize {
        self.pcm.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    /// Raw little-endian PCM bytes
    pub fn pcm_bytes(&self) -> &[u8] {
        &self.pcm
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.sample_count() as f64 / PCM_SAMPLE_RATE as f64
    }

    /// Normalized samples in [-1, 1)
    pub fn decode(&self) -> Vec<f64> {
        decode_pcm16(&self.pcm)
    }

    /// Serialize as a complete WAV file
    pub fn to_wav_bytes(&self) -> SphinxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(44 + self.pcm.len()));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, PcmFormat::FIXED.wav_spec())
                .map_err(encoding_error)?;
            for chunk in self.pcm.chunks_exact(2) {
                writer
                    .write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))
                    .map_err(encoding_error)?;
            }
            writer.finalize().map_err(encoding_error)?;
        }
        Ok(cursor.into_inner())
    }
}

impl fmt::Debug for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Sample: samples={} format={}]", self.sample_count(), PcmFormat::FIXED)
    }
}

/// Decode 16-bit little-endian PCM to [-1, 1): value = raw / 32768
pub fn decode_pcm16(pcm: &[u8]) -> Vec<f64> {
    pcm.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f64 / PCM_DECODE_SCALE)
        .collect()
}

/// Encode [-1, 1] samples to 16-bit little-endian PCM: round(value * 32767), clamped
pub fn encode_pcm16(samples: &[f64]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample * PCM_ENCODE_SCALE)
            .round()
            .clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        pcm.extend_from_slice(&value.to_le_bytes());
    }
    pcm
}

fn wav_error(e: hound::Error) -> SphinxError {
    match e {
        hound::Error::IoError(io) => SphinxError::Io(io),
        other => SphinxError::Format(other.to_string()),
    }
}

fn encoding_error(e: hound::Error) -> SphinxError {
    SphinxError::Encoding(format!("WAV: {}", e))
}
