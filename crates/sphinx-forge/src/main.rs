//! # Sphinx Forge CLI
//!
//! Builds one image or audio challenge, writes the artifact to disk and
//! prints its JSON envelope.
//!
//! ```text
//! sphinx-forge image --output challenge.png
//! sphinx-forge --seed demo audio --output challenge.wav --include-answer
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use crate::config::{BackgroundKind, ForgeConfig, ImageConfig};
use sphinx_forge::audio::{AudioNoiseProducer, RandomNoiseProducer, RandomNumberVoiceProducer};
use sphinx_forge::builder::{AudioRecipe, AudioStage, ImageRecipe, ImageStage};
use sphinx_forge::visual::{
    BackgroundProducer, CurvedLineNoise, DisplacementField, FlatColorBackground,
    GlyphWordRenderer, GradientBackground, NoiseLattice, PixelWordRenderer, RippleFilter,
    TransformFilter, WordRenderer,
};
use sphinx_forge::{AlphabetContentProducer, ResourceLocator, SphinxError};
use sphinx_common::{Alphabet, ChallengeEnvelope};

/// Sphinx Forge - CAPTCHA challenge generator
#[derive(Parser, Debug)]
#[command(name = "sphinx-forge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/forge.toml", env = "SPHINX_CONFIG")]
    config: String,

    /// Assets directory (overrides config)
    #[arg(long, env = "SPHINX_ASSETS_DIR")]
    assets_dir: Option<String>,

    /// Seed string for reproducible challenges
    #[arg(long, env = "SPHINX_SEED")]
    seed: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Distorted text image (PNG)
    Image {
        /// Output file
        #[arg(short, long, default_value = "challenge.png")]
        output: PathBuf,

        /// Image width in pixels (overrides config)
        #[arg(long)]
        width: Option<u32>,

        /// Image height in pixels (overrides config)
        #[arg(long)]
        height: Option<u32>,

        /// Number of characters (overrides config)
        #[arg(long)]
        length: Option<usize>,

        /// Content alphabet: numbers, latin, arabic, chinese (overrides config)
        #[arg(long)]
        alphabet: Option<String>,

        /// Include the answer in the printed envelope
        #[arg(long, default_value = "false")]
        include_answer: bool,
    },

    /// Spoken digits over background noise (WAV)
    Audio {
        /// Output file
        #[arg(short, long, default_value = "challenge.wav")]
        output: PathBuf,

        /// Number of digits (overrides config)
        #[arg(long)]
        length: Option<usize>,

        /// Include the answer in the printed envelope
        #[arg(long, default_value = "false")]
        include_answer: bool,
    },
}

fn main() -> ExitCode {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level, args.json_logs) {
        eprintln!("failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Challenge generation failed");
            let code = e
                .downcast_ref::<SphinxError>()
                .map(SphinxError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

fn run(args: Args) -> Result<()> {
    info!("🦁 Starting Sphinx Forge v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ForgeConfig::load(&args.config, &args)?;
    let locator = ResourceLocator::new(&config.assets_dir);
    let seeds = Seeds::new(args.seed.as_deref());

    match args.command {
        Command::Image {
            output,
            width,
            height,
            length,
            alphabet,
            include_answer,
        } => {
            let image = &mut config.image;
            image.width = width.unwrap_or(image.width);
            image.height = height.unwrap_or(image.height);
            image.content_length = length.unwrap_or(image.content_length);
            if let Some(alphabet) = alphabet {
                image.alphabet = parse_alphabet(&alphabet)?;
            }

            let challenge = image_recipe(&config.image, &locator, &seeds)?.build()?;
            let png = challenge.to_png()?;
            std::fs::write(&output, &png)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(path = %output.display(), bytes = png.len(), "🖼️ Image challenge written");

            print_envelope(&challenge.envelope(include_answer)?)
        }
        Command::Audio {
            output,
            length,
            include_answer,
        } => {
            let audio = &mut config.audio;
            audio.content_length = length.unwrap_or(audio.content_length);

            let challenge = audio_recipe(&config, &locator, &seeds)?.build()?;
            let wav = challenge.to_wav()?;
            std::fs::write(&output, &wav)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                path = %output.display(),
                duration_secs = challenge.audio().duration_secs(),
                "🔊 Audio challenge written"
            );

            print_envelope(&challenge.envelope(include_answer)?)
        }
    }
}

/// Per-strategy seeds derived from one seed string
struct Seeds {
    root: Option<String>,
}

impl Seeds {
    fn new(root: Option<&str>) -> Self {
        Self {
            root: root.map(str::to_string),
        }
    }

    /// SHA-256 of `root:label`, first eight bytes
    fn derive(&self, label: &str) -> Option<u64> {
        let root = self.root.as_ref()?;
        let digest = Sha256::digest(format!("{}:{}", root, label).as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Some(u64::from_le_bytes(bytes))
    }
}

fn image_recipe(
    config: &ImageConfig,
    locator: &ResourceLocator,
    seeds: &Seeds,
) -> Result<ImageRecipe> {
    let mut content = AlphabetContentProducer::new(config.alphabet, config.content_length)?;
    if let Some(seed) = seeds.derive("content") {
        content = content.with_seed(seed);
    }

    let renderer: Arc<dyn WordRenderer> = if config.fonts.is_empty() {
        let drawable = content.chars().iter().all(|&c| PixelWordRenderer::can_draw(c));
        if !drawable {
            return Err(SphinxError::InvalidArgument(format!(
                "alphabet {:?} needs [image] fonts; the bitmap renderer only draws 0-9 and A-Z",
                config.alphabet
            ))
            .into());
        }
        let mut renderer = PixelWordRenderer::new().with_colors(config.colors.text.clone());
        if let Some(seed) = seeds.derive("renderer") {
            renderer = renderer.with_seed(seed);
        }
        Arc::new(renderer)
    } else {
        let names: Vec<&str> = config.fonts.iter().map(String::as_str).collect();
        let mut renderer = GlyphWordRenderer::from_resources(locator, &names)?
            .with_colors(config.colors.text.clone());
        if let Some(seed) = seeds.derive("renderer") {
            renderer = renderer.with_seed(seed);
        }
        Arc::new(renderer)
    };

    let mut recipe = ImageRecipe::new(config.width, config.height)
        .then(ImageStage::ContentWith(Arc::new(content), renderer));

    if config.noise {
        let mut noise = CurvedLineNoise::new(config.colors.noise, CurvedLineNoise::DEFAULT_WIDTH);
        if let Some(seed) = seeds.derive("noise") {
            noise = noise.with_seed(seed);
        }
        recipe = recipe.then(ImageStage::Noise(Arc::new(noise)));
    }

    let ripple = &config.ripple;
    if ripple.enabled {
        let mut field = DisplacementField::new(
            ripple.wave,
            ripple.x_amplitude,
            ripple.y_amplitude,
            ripple.x_wavelength,
            ripple.y_wavelength,
        )?;
        if let Some(seed) = seeds.derive("lattice") {
            field = field.with_lattice(Arc::new(NoiseLattice::from_seed(seed)));
        }
        let transform = TransformFilter::new(field)
            .with_edge_policy(ripple.edge_policy)
            .with_interpolation(ripple.interpolation);
        let filter = RippleFilter::from_transform(transform);
        recipe = recipe.then(ImageStage::Filter(Arc::new(filter)));
    }

    let background: Option<Arc<dyn BackgroundProducer>> = match config.background {
        BackgroundKind::None => None,
        BackgroundKind::Flat => Some(Arc::new(FlatColorBackground::new(config.colors.flat))),
        BackgroundKind::Gradient => Some(Arc::new(GradientBackground::new(
            config.colors.gradient_from,
            config.colors.gradient_to,
        ))),
    };
    if let Some(background) = background {
        recipe = recipe.then(ImageStage::Background(background));
    }

    if config.border {
        recipe = recipe.then(ImageStage::Border);
    }

    tracing::debug!(stages = ?recipe.stages(), "Image recipe ready");
    Ok(recipe)
}

fn audio_recipe(
    config: &ForgeConfig,
    locator: &ResourceLocator,
    seeds: &Seeds,
) -> Result<AudioRecipe> {
    let mut content =
        AlphabetContentProducer::new(Alphabet::Numbers, config.audio.content_length)?;
    if let Some(seed) = seeds.derive("content") {
        content = content.with_seed(seed);
    }

    let mut voice = RandomNumberVoiceProducer::new(locator.clone());
    if let Some(seed) = seeds.derive("voice") {
        voice = voice.with_seed(seed);
    }

    let mut recipe = AudioRecipe::new()
        .with_locator(locator.clone())
        .then(AudioStage::Content(Arc::new(content)))
        .then(AudioStage::Voice(Arc::new(voice)));

    if config.audio.noise {
        let mut noise =
            RandomNoiseProducer::new(locator.clone()).with_gain(config.audio.noise_gain)?;
        if let Some(seed) = seeds.derive("noise") {
            noise = noise.with_seed(seed);
        }
        let noise: Arc<dyn AudioNoiseProducer> = Arc::new(noise);
        recipe = recipe.then(AudioStage::Noise(noise));
    }

    tracing::debug!(stages = ?recipe.stages(), "Audio recipe ready");
    Ok(recipe)
}

fn parse_alphabet(name: &str) -> Result<Alphabet> {
    serde_json::from_value(serde_json::Value::String(name.to_lowercase()))
        .map_err(|_| SphinxError::InvalidArgument(format!("unknown alphabet '{}'", name)).into())
}

fn print_envelope(envelope: &ChallengeEnvelope) -> Result<()> {
    let json = serde_json::to_string_pretty(envelope).context("Failed to serialize envelope")?;
    println!("{}", json);
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr; stdout carries the envelope
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_are_stable_and_labelled() {
        let seeds = Seeds::new(Some("demo"));
        assert_eq!(seeds.derive("content"), seeds.derive("content"));
        assert_ne!(seeds.derive("content"), seeds.derive("noise"));
        assert_eq!(Seeds::new(None).derive("content"), None);
    }

    #[test]
    fn test_parse_alphabet() {
        assert_eq!(parse_alphabet("Numbers").unwrap(), Alphabet::Numbers);
        assert_eq!(parse_alphabet("chinese").unwrap(), Alphabet::Chinese);
        assert!(parse_alphabet("klingon").is_err());
    }

    #[test]
    fn test_bitmap_renderer_rejects_unsupported_alphabet() {
        let locator = ResourceLocator::default();
        let seeds = Seeds::new(None);
        for alphabet in [Alphabet::Chinese, Alphabet::Arabic] {
            let config = ImageConfig {
                alphabet,
                ..ImageConfig::default()
            };
            let err = image_recipe(&config, &locator, &seeds).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<SphinxError>(),
                Some(SphinxError::InvalidArgument(_))
            ));
        }

        let latin = ImageConfig {
            alphabet: Alphabet::Latin,
            ..ImageConfig::default()
        };
        assert!(image_recipe(&latin, &locator, &seeds).is_ok());
    }

    #[test]
    fn test_seeded_image_recipe_is_reproducible() {
        let config = ImageConfig {
            background: BackgroundKind::Gradient,
            ..ImageConfig::default()
        };
        let locator = ResourceLocator::default();
        let seeds = Seeds::new(Some("fixed"));

        let first = image_recipe(&config, &locator, &seeds).unwrap().build().unwrap();
        let second = image_recipe(&config, &locator, &seeds).unwrap().build().unwrap();
        assert_eq!(first.content(), second.content());
        assert_eq!(first.image(), second.image());
        assert_eq!(first.image().dimensions(), (200, 50));
    }
}
