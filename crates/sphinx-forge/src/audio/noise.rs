//! Background noise layering for spoken challenges.

use std::fmt;

use rand::seq::IndexedRandom;
use sphinx_common::constants::DEFAULT_NOISE_GAIN;
use sphinx_common::constants::sounds::NOISES;
use sphinx_common::{SphinxError, SphinxResult};

use super::mixer::{concatenate, mix};
use super::sample::Sample;
use crate::resources::ResourceLocator;
use crate::rng::StrategyRng;

/// Joins per-character vocalizations and layers noise over them
pub trait AudioNoiseProducer: Send + Sync {
    fn add_noise(&self, samples: &[Sample]) -> SphinxResult<Sample>;
}

enum NoiseBed {
    Resources {
        locator: ResourceLocator,
        names: Vec<String>,
    },
    Loaded(Vec<Sample>),
}

/// Mixes one randomly chosen noise clip under the spoken content
pub struct RandomNoiseProducer {
    bed: NoiseBed,
    gain: f64,
    rng: StrategyRng,
}

impl RandomNoiseProducer {
    /// Radio tuning, restaurant chatter and swimming pool clips
    pub fn new(locator: ResourceLocator) -> Self {
        let names = NOISES.iter().map(|n| n.to_string()).collect();
        Self::with_resources(locator, names)
    }

    pub fn with_resources(locator: ResourceLocator, names: Vec<String>) -> Self {
        Self::from_bed(NoiseBed::Resources { locator, names })
    }

    /// Noise clips already in memory
    pub fn with_samples(samples: Vec<Sample>) -> Self {
        Self::from_bed(NoiseBed::Loaded(samples))
    }

    fn from_bed(bed: NoiseBed) -> Self {
        Self {
            bed,
            gain: DEFAULT_NOISE_GAIN,
            rng: StrategyRng::default(),
        }
    }

    /// Noise volume relative to the voices (finite, non-negative)
    pub fn with_gain(mut self, gain: f64) -> SphinxResult<Self> {
        if !gain.is_finite() || gain < 0.0 {
            return Err(SphinxError::InvalidArgument(format!(
                "noise gain must be finite and non-negative, got {}",
                gain
            )));
        }
        self.gain = gain;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    fn pick_noise(&self) -> SphinxResult<Sample> {
        match &self.bed {
            NoiseBed::Resources { locator, names } => {
                let name = self
                    .rng
                    .with(|rng| names.choose(rng).cloned())
                    .ok_or_else(|| SphinxError::NotFound("no noise resources configured".into()))?;
                tracing::trace!(noise = %name, "Picked noise clip");
                Sample::from_resource(locator, &name)
            }
            NoiseBed::Loaded(samples) => self
                .rng
                .with(|rng| samples.choose(rng).cloned())
                .ok_or_else(|| SphinxError::NotFound("no noise samples loaded".into())),
        }
    }
}

impl AudioNoiseProducer for RandomNoiseProducer {
    fn add_noise(&self, samples: &[Sample]) -> SphinxResult<Sample> {
        let appended = concatenate(samples);
        let noise = self.pick_noise()?;
        mix(&appended, 1.0, &noise, self.gain)
    }
}

impl fmt::Debug for RandomNoiseProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bed {
            NoiseBed::Resources { names, .. } => {
                write!(f, "[RandomNoiseProducer: noiseFiles={}]", names.join(","))
            }
            NoiseBed::Loaded(samples) => {
                write!(f, "[RandomNoiseProducer: {} loaded clips]", samples.len())
            }
        }
    }
}
