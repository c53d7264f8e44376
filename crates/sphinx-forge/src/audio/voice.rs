//! Per-character vocalization strategies.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use rand::seq::IndexedRandom;
use sphinx_common::constants::sounds::{VOICES, VOICES_PREFIX};
use sphinx_common::{SphinxError, SphinxResult};

use super::sample::Sample;
use crate::resources::ResourceLocator;
use crate::rng::StrategyRng;

/// Produces a spoken rendition of one character
pub trait VoiceProducer: Send + Sync {
    /// Fails with `InvalidArgument` for characters outside the supported alphabet
    fn vocalize(&self, character: char) -> SphinxResult<Sample>;
}

/// Digit -> resource names of the bundled voices
fn builtin_voices() -> &'static BTreeMap<u32, Vec<String>> {
    static VOICE_MAP: OnceLock<BTreeMap<u32, Vec<String>>> = OnceLock::new();
    VOICE_MAP.get_or_init(|| {
        (0..10)
            .map(|digit| {
                let names = VOICES
                    .iter()
                    .map(|voice| format!("{}{}-{}.wav", VOICES_PREFIX, digit, voice))
                    .collect();
                (digit, names)
            })
            .collect()
    })
}

/// Speaks digits in a voice picked at random for every call
pub struct RandomNumberVoiceProducer {
    locator: ResourceLocator,
    voices: BTreeMap<u32, Vec<String>>,
    rng: StrategyRng,
}

impl RandomNumberVoiceProducer {
    /// Use the bundled voices
    pub fn new(locator: ResourceLocator) -> Self {
        Self::with_voices(locator, builtin_voices().clone())
    }

    /// Use a custom map such as `{1: ["my/1-quiet.wav", "my/1-loud.wav"]}`
    pub fn with_voices(locator: ResourceLocator, voices: BTreeMap<u32, Vec<String>>) -> Self {
        Self {
            locator,
            voices,
            rng: StrategyRng::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }

    pub fn voices(&self) -> &BTreeMap<u32, Vec<String>> {
        &self.voices
    }
}

impl VoiceProducer for RandomNumberVoiceProducer {
    fn vocalize(&self, character: char) -> SphinxResult<Sample> {
        let digit = character.to_digit(10).ok_or_else(|| {
            SphinxError::InvalidArgument(format!(
                "expected a digit to vocalize, got '{}'",
                character
            ))
        })?;

        let name = self
            .voices
            .get(&digit)
            .and_then(|names| self.rng.with(|rng| names.choose(rng).cloned()))
            .ok_or_else(|| SphinxError::NotFound(format!("no vocalization for digit {}", digit)))?;

        tracing::trace!(digit, voice = %name, "Vocalizing digit");
        Sample::from_resource(&self.locator, &name)
    }
}

/// In-memory vocalizations keyed by character
#[derive(Default)]
pub struct VoiceBank {
    samples: HashMap<char, Vec<Sample>>,
    rng: StrategyRng,
}

impl VoiceBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one more rendition of `character`
    pub fn with_vocalization(mut self, character: char, sample: Sample) -> Self {
        self.samples.entry(character).or_default().push(sample);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }

    pub fn supports(&self, character: char) -> bool {
        self.samples.get(&character).is_some_and(|s| !s.is_empty())
    }
}

impl VoiceProducer for VoiceBank {
    fn vocalize(&self, character: char) -> SphinxResult<Sample> {
        self.samples
            .get(&character)
            .and_then(|renditions| self.rng.with(|rng| renditions.choose(rng).cloned()))
            .ok_or_else(|| {
                SphinxError::InvalidArgument(format!("no voice for character '{}'", character))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sample::tests::{fixed_spec, raw_sample, wav_bytes};

    fn write_voice(dir: &std::path::Path, name: &str, samples: &[i16]) {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, wav_bytes(fixed_spec(), samples)).unwrap();
    }

    #[test]
    fn test_builtin_voice_names() {
        let voices = builtin_voices();
        assert_eq!(voices.len(), 10);
        assert!(voices.values().all(|names| names.len() == 7));
        assert!(voices[&4].contains(&"sounds/en/numbers/4-alex.wav".to_string()));
        assert!(voices[&0].contains(&"sounds/en/numbers/0-victoria.wav".to_string()));
    }

    #[test]
    fn test_vocalize_digit_from_resources() {
        let dir = tempfile::tempdir().unwrap();
        write_voice(dir.path(), "voices/7-a.wav", &[1, 2, 3]);
        write_voice(dir.path(), "voices/7-b.wav", &[4, 5, 6]);

        let mut map = BTreeMap::new();
        map.insert(7, vec!["voices/7-a.wav".to_string(), "voices/7-b.wav".to_string()]);
        let producer =
            RandomNumberVoiceProducer::with_voices(ResourceLocator::new(dir.path()), map)
                .with_seed(3);

        for _ in 0..10 {
            assert_eq!(producer.vocalize('7').unwrap().sample_count(), 3);
        }
    }

    #[test]
    fn test_non_digit_is_invalid() {
        let producer = RandomNumberVoiceProducer::new(ResourceLocator::default());
        assert!(matches!(producer.vocalize('x'), Err(SphinxError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_digit_or_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = BTreeMap::new();
        map.insert(1, vec!["voices/1-gone.wav".to_string()]);
        let producer =
            RandomNumberVoiceProducer::with_voices(ResourceLocator::new(dir.path()), map);

        assert!(matches!(producer.vocalize('2'), Err(SphinxError::NotFound(_))));
        assert!(matches!(producer.vocalize('1'), Err(SphinxError::NotFound(_))));
    }

    #[test]
    fn test_voice_bank() {
        let bank = VoiceBank::new()
            .with_vocalization('a', raw_sample(&[1, 1]))
            .with_vocalization('a', raw_sample(&[2, 2]))
            .with_seed(11);

        assert!(bank.supports('a'));
        assert!(!bank.supports('b'));
        assert_eq!(bank.vocalize('a').unwrap().sample_count(), 2);
        assert!(matches!(bank.vocalize('b'), Err(SphinxError::InvalidArgument(_))));
    }
}
