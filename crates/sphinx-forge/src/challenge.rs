//! Finished challenges: a secret answer and the artifact that encodes it.
//!
//! Challenges are only produced by the builders and expose no setters.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use sphinx_common::{ChallengeEnvelope, ChallengeKind, SphinxResult};

use crate::audio::Sample;
use crate::visual::PixelCanvas;

/// Something a challenge can carry and serialize
pub trait Artifact {
    const KIND: ChallengeKind;

    /// Encoded bytes (PNG or WAV)
    fn encode(&self) -> SphinxResult<Vec<u8>>;
}

impl Artifact for PixelCanvas {
    const KIND: ChallengeKind = ChallengeKind::Image;

    fn encode(&self) -> SphinxResult<Vec<u8>> {
        self.to_png()
    }
}

impl Artifact for Sample {
    const KIND: ChallengeKind = ChallengeKind::Audio;

    fn encode(&self) -> SphinxResult<Vec<u8>> {
        self.to_wav_bytes()
    }
}

pub struct Challenge<A> {
    content: String,
    artifact: A,
    created: DateTime<Utc>,
}

pub type ImageChallenge = Challenge<PixelCanvas>;
pub type AudioChallenge = Challenge<Sample>;

impl<A: Artifact> Challenge<A> {
    pub(crate) fn new(content: String, artifact: A) -> Self {
        Self {
            content,
            artifact,
            created: Utc::now(),
        }
    }

    /// The expected answer
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn artifact(&self) -> &A {
        &self.artifact
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn kind(&self) -> ChallengeKind {
        A::KIND
    }

    /// Exact, case-sensitive comparison with the secret
    pub fn is_correct(&self, answer: &str) -> bool {
        self.content == answer
    }

    /// `data:` URI with the base64-encoded artifact
    pub fn to_data_uri(&self) -> SphinxResult<String> {
        let bytes = self.artifact.encode()?;
        Ok(format!("data:{};base64,{}", A::KIND.media_type(), STANDARD.encode(bytes)))
    }

    /// Serializable description; the answer is included only on request
    pub fn envelope(&self, include_answer: bool) -> SphinxResult<ChallengeEnvelope> {
        Ok(ChallengeEnvelope {
            kind: A::KIND,
            answer: include_answer.then(|| self.content.clone()),
            data_uri: self.to_data_uri()?,
            created_at: self.created,
        })
    }

    pub fn into_parts(self) -> (String, A) {
        (self.content, self.artifact)
    }
}

impl ImageChallenge {
    pub fn image(&self) -> &PixelCanvas {
        &self.artifact
    }

    pub fn to_png(&self) -> SphinxResult<Vec<u8>> {
        self.artifact.to_png()
    }
}

impl AudioChallenge {
    pub fn audio(&self) -> &Sample {
        &self.artifact
    }

    pub fn to_wav(&self) -> SphinxResult<Vec<u8>> {
        self.artifact.to_wav_bytes()
    }
}

impl<A: fmt::Debug> fmt::Debug for Challenge<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keep the answer out of logs
        f.debug_struct("Challenge")
            .field("artifact", &self.artifact)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sphinx_common::Argb;

    fn image_challenge() -> ImageChallenge {
        Challenge::new("x7k".into(), PixelCanvas::filled(4, 2, Argb::WHITE).unwrap())
    }

    #[test]
    fn test_is_correct_is_exact() {
        let challenge = image_challenge();
        assert!(challenge.is_correct("x7k"));
        assert!(!challenge.is_correct("X7K"));
        assert!(!challenge.is_correct("x7k "));
    }

    #[test]
    fn test_image_data_uri_and_png() {
        let challenge = image_challenge();
        let png = challenge.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let uri = challenge.to_data_uri().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        let decoded = STANDARD.decode(&uri["data:image/png;base64,".len()..]).unwrap();
        assert_eq!(decoded, png);
    }

    #[test]
    fn test_audio_envelope() {
        let challenge = Challenge::new("42".into(), Sample::from_samples(&[0.0, 0.5, -0.5]));
        assert_eq!(challenge.kind(), ChallengeKind::Audio);
        assert_eq!(&challenge.to_wav().unwrap()[..4], b"RIFF");

        let public = challenge.envelope(false).unwrap();
        assert!(public.answer.is_none());
        assert!(public.data_uri.starts_with("data:audio/wav;base64,"));

        let private = challenge.envelope(true).unwrap();
        assert_eq!(private.answer.as_deref(), Some("42"));
    }

    #[test]
    fn test_debug_hides_answer() {
        let rendered = format!("{:?}", image_challenge());
        assert!(!rendered.contains("x7k"));
        assert!(rendered.contains("PixelCanvas"));
    }
}
