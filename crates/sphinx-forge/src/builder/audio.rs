use std::fmt;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use sphinx_common::{SphinxError, SphinxResult};

use crate::audio::{
    AudioNoiseProducer, RandomNumberVoiceProducer, Sample, VoiceProducer, concatenate,
};
use crate::challenge::AudioChallenge;
use crate::content::ContentProducer;
use crate::resources::ResourceLocator;
use crate::rng::StrategyRng;

/// Journal entry for one audio builder step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStep {
    Content { chars: usize },
    Voice,
    Noise,
}

/// Collects the secret and the strategies that will speak it
pub struct AudioChallengeBuilder {
    content: String,
    voices: Vec<Arc<dyn VoiceProducer>>,
    noises: Vec<Arc<dyn AudioNoiseProducer>>,
    locator: ResourceLocator,
    seed: Option<u64>,
    rng: StrategyRng,
    steps: Vec<AudioStep>,
}

impl AudioChallengeBuilder {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            voices: Vec::new(),
            noises: Vec::new(),
            locator: ResourceLocator::default(),
            seed: None,
            rng: StrategyRng::default(),
            steps: Vec::new(),
        }
    }

    /// Assets directory for the default voice
    pub fn with_locator(mut self, locator: ResourceLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Makes the per-character voice choice (and the default voice) reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rng = StrategyRng::seeded(seed);
        self
    }

    pub fn add_content(mut self, producer: &dyn ContentProducer) -> SphinxResult<Self> {
        let fragment = producer.content()?;
        self.steps.push(AudioStep::Content {
            chars: fragment.chars().count(),
        });
        self.content.push_str(&fragment);
        Ok(self)
    }

    pub fn add_voice(mut self, producer: Arc<dyn VoiceProducer>) -> Self {
        self.voices.push(producer);
        self.steps.push(AudioStep::Voice);
        self
    }

    /// Only the most recently added noise strategy is used
    pub fn add_noise(mut self, producer: Arc<dyn AudioNoiseProducer>) -> Self {
        self.noises.push(producer);
        self.steps.push(AudioStep::Noise);
        self
    }

    pub fn steps(&self) -> &[AudioStep] {
        &self.steps
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn build(self) -> SphinxResult<AudioChallenge> {
        let voices = if self.voices.is_empty() {
            let fallback = match self.seed {
                Some(seed) => RandomNumberVoiceProducer::new(self.locator.clone()).with_seed(seed),
                None => RandomNumberVoiceProducer::new(self.locator.clone()),
            };
            vec![Arc::new(fallback) as Arc<dyn VoiceProducer>]
        } else {
            self.voices.clone()
        };

        let samples = self
            .content
            .chars()
            .map(|c| {
                let voice = self
                    .rng
                    .with(|rng| voices.choose(rng).cloned())
                    .ok_or_else(|| SphinxError::Construction("no voice configured".into()))?;
                voice.vocalize(c)
            })
            .collect::<SphinxResult<Vec<Sample>>>()?;

        let audio = match self.noises.last() {
            Some(noise) => noise.add_noise(&samples)?,
            None => concatenate(&samples),
        };

        tracing::debug!(
            chars = samples.len(),
            voices = voices.len(),
            noisy = !self.noises.is_empty(),
            duration_secs = audio.duration_secs(),
            "Built audio challenge"
        );
        Ok(AudioChallenge::new(self.content, audio))
    }
}

impl Default for AudioChallengeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AudioChallengeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioChallengeBuilder")
            .field("voices", &self.voices.len())
            .field("noises", &self.noises.len())
            .field("locator", &self.locator)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// One step of an audio recipe
#[derive(Clone)]
pub enum AudioStage {
    Content(Arc<dyn ContentProducer>),
    Voice(Arc<dyn VoiceProducer>),
    Noise(Arc<dyn AudioNoiseProducer>),
}

impl fmt::Debug for AudioStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Content(_) => "Content",
            Self::Voice(_) => "Voice",
            Self::Noise(_) => "Noise",
        })
    }
}

/// An audio pipeline described up front and replayed in order
#[derive(Debug, Clone, Default)]
pub struct AudioRecipe {
    stages: Vec<AudioStage>,
    locator: Option<ResourceLocator>,
}

impl AudioRecipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locator(mut self, locator: ResourceLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn then(mut self, stage: AudioStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[AudioStage] {
        &self.stages
    }

    pub fn build(&self) -> SphinxResult<AudioChallenge> {
        let mut builder = AudioChallengeBuilder::new();
        if let Some(locator) = &self.locator {
            builder = builder.with_locator(locator.clone());
        }
        for stage in &self.stages {
            builder = match stage {
                AudioStage::Content(producer) => builder.add_content(producer.as_ref())?,
                AudioStage::Voice(producer) => builder.add_voice(Arc::clone(producer)),
                AudioStage::Noise(producer) => builder.add_noise(Arc::clone(producer)),
            };
        }
        builder.build()
    }
}
