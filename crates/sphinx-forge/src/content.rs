//! Secret text producers.

use rand::seq::IndexedRandom;
use sphinx_common::constants::DEFAULT_CONTENT_LENGTH;
use sphinx_common::{Alphabet, SphinxError, SphinxResult};

use crate::rng::StrategyRng;

/// Supplies the secret text for a challenge
pub trait ContentProducer: Send + Sync {
    fn content(&self) -> SphinxResult<String>;
}

const NUMBER_CHARS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

// No i/j/l/o/q/s/t/u/v/z and no 0/1/9: easily confused when distorted
const LATIN_CHARS: [char; 23] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'k', 'm', 'n', 'p', 'r', 'w', 'x', 'y', '2', '3', '4',
    '5', '6', '7', '8',
];

const ARABIC_CHARS: [char; 28] = [
    '\u{0627}', '\u{0628}', '\u{062a}', '\u{062b}', '\u{062c}', '\u{062d}', '\u{062e}', '\u{062f}',
    '\u{0630}', '\u{0631}', '\u{0632}', '\u{0633}', '\u{0634}', '\u{0635}', '\u{0636}', '\u{0637}',
    '\u{0638}', '\u{0639}', '\u{063a}', '\u{0641}', '\u{0642}', '\u{0643}', '\u{0644}', '\u{0645}',
    '\u{0646}', '\u{0647}', '\u{0648}', '\u{064a}',
];

/// CJK ideographs U+4E00 up to and including U+4F6E
const CHINESE_RANGE: std::ops::Range<u32> = 0x4E00..0x4F6F;

impl ContentProducer for Box<dyn ContentProducer> {
    fn content(&self) -> SphinxResult<String> {
        (**self).content()
    }
}

/// Characters drawn uniformly, with replacement, from a source set
#[derive(Debug)]
pub struct AlphabetContentProducer {
    chars: Vec<char>,
    length: usize,
    rng: StrategyRng,
}

impl AlphabetContentProducer {
    pub fn new(alphabet: Alphabet, length: usize) -> SphinxResult<Self> {
        Self::from_chars(alphabet_chars(alphabet), length)
    }

    /// Custom source set; duplicates weight the draw
    pub fn from_chars(chars: Vec<char>, length: usize) -> SphinxResult<Self> {
        if chars.is_empty() {
            return Err(SphinxError::InvalidArgument(
                "content source set is empty".into(),
            ));
        }
        if length == 0 {
            return Err(SphinxError::InvalidArgument(
                "content length must be positive".into(),
            ));
        }
        Ok(Self {
            chars,
            length,
            rng: StrategyRng::default(),
        })
    }

    /// Five digits
    pub fn numbers() -> Self {
        Self::with_default_length(Alphabet::Numbers)
    }

    /// Five characters from the unambiguous Latin set
    pub fn latin() -> Self {
        Self::with_default_length(Alphabet::Latin)
    }

    pub fn arabic() -> Self {
        Self::with_default_length(Alphabet::Arabic)
    }

    pub fn chinese() -> Self {
        Self::with_default_length(Alphabet::Chinese)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StrategyRng::seeded(seed);
        self
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    fn with_default_length(alphabet: Alphabet) -> Self {
        Self {
            chars: alphabet_chars(alphabet),
            length: DEFAULT_CONTENT_LENGTH,
            rng: StrategyRng::default(),
        }
    }
}

impl Default for AlphabetContentProducer {
    fn default() -> Self {
        Self::with_default_length(Alphabet::default())
    }
}

impl ContentProducer for AlphabetContentProducer {
    fn content(&self) -> SphinxResult<String> {
        self.rng.with(|rng| {
            (0..self.length)
                .map(|_| {
                    self.chars
                        .choose(rng)
                        .copied()
                        .ok_or_else(|| SphinxError::InvalidArgument("content source set is empty".into()))
                })
                .collect()
        })
    }
}

/// Always the same text; for callers that pick the secret themselves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedContentProducer {
    text: String,
}

impl FixedContentProducer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ContentProducer for FixedContentProducer {
    fn content(&self) -> SphinxResult<String> {
        Ok(self.text.clone())
    }
}

/// Source characters of a built-in alphabet
pub fn alphabet_chars(alphabet: Alphabet) -> Vec<char> {
    match alphabet {
        Alphabet::Numbers => NUMBER_CHARS.to_vec(),
        Alphabet::Latin => LATIN_CHARS.to_vec(),
        Alphabet::Arabic => ARABIC_CHARS.to_vec(),
        Alphabet::Chinese => CHINESE_RANGE.filter_map(char::from_u32).collect(),
    }
}
