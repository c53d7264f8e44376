use std::fmt;
use std::sync::Arc;

use sphinx_common::{Argb, SphinxResult};

use crate::challenge::ImageChallenge;
use crate::content::ContentProducer;
use crate::visual::{
    BackgroundProducer, ImageFilter, ImageNoiseProducer, PixelCanvas, PixelWordRenderer,
    TransparentBackground, WordRenderer,
};

/// Journal entry for one image builder step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStep {
    /// A fragment of `chars` characters drawn from cursor `from` to `to`
    Content { chars: usize, from: i32, to: i32 },
    Background,
    Noise,
    Filter,
    Border,
}

/// Accumulates an image challenge on a working canvas
pub struct ImageChallengeBuilder {
    content: String,
    canvas: PixelCanvas,
    cursor: Option<i32>,
    background: Option<Arc<dyn BackgroundProducer>>,
    border: bool,
    steps: Vec<ImageStep>,
}

impl ImageChallengeBuilder {
    /// Transparent working canvas; zero dimensions are a construction error
    pub fn new(width: u32, height: u32) -> SphinxResult<Self> {
        Ok(Self {
            content: String::new(),
            canvas: PixelCanvas::new(width, height)?,
            cursor: None,
            background: None,
            border: false,
            steps: Vec::new(),
        })
    }

    /// Append a fragment and draw it with the bitmap renderer
    pub fn add_content(self, producer: &dyn ContentProducer) -> SphinxResult<Self> {
        self.add_content_with(producer, &PixelWordRenderer::default())
    }

    /// Append a fragment and draw it right after the previous one
    pub fn add_content_with(
        mut self,
        producer: &dyn ContentProducer,
        renderer: &dyn WordRenderer,
    ) -> SphinxResult<Self> {
        let fragment = producer.content()?;
        let from = self.cursor.unwrap_or_else(|| renderer.start_x(&self.canvas));
        let to = renderer.render(&fragment, &mut self.canvas, from)?;

        self.steps.push(ImageStep::Content {
            chars: fragment.chars().count(),
            from,
            to,
        });
        self.content.push_str(&fragment);
        self.cursor = Some(to);
        Ok(self)
    }

    /// Composited under the text at build time; replaces any earlier background
    pub fn add_background(mut self, producer: Arc<dyn BackgroundProducer>) -> Self {
        self.background = Some(producer);
        self.steps.push(ImageStep::Background);
        self
    }

    pub fn add_noise(mut self, producer: &dyn ImageNoiseProducer) -> SphinxResult<Self> {
        producer.make_noise(&mut self.canvas)?;
        self.steps.push(ImageStep::Noise);
        Ok(self)
    }

    pub fn add_filter(mut self, filter: &dyn ImageFilter) -> SphinxResult<Self> {
        filter.filter(&mut self.canvas)?;
        self.steps.push(ImageStep::Filter);
        Ok(self)
    }

    /// One-pixel black frame, drawn after the background is composited
    pub fn add_border(mut self) -> Self {
        self.border = true;
        self.steps.push(ImageStep::Border);
        self
    }

    pub fn steps(&self) -> &[ImageStep] {
        &self.steps
    }

    /// Secret accumulated so far
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn build(self) -> SphinxResult<ImageChallenge> {
        let (width, height) = self.canvas.dimensions();
        let mut image = match &self.background {
            Some(producer) => producer.background(width, height)?,
            None => TransparentBackground.background(width, height)?,
        };
        image.overlay(&self.canvas);
        if self.border {
            image.draw_border(Argb::BLACK);
        }

        tracing::debug!(
            width,
            height,
            chars = self.content.chars().count(),
            steps = self.steps.len(),
            "Built image challenge"
        );
        Ok(ImageChallenge::new(self.content, image))
    }
}

impl fmt::Debug for ImageChallengeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageChallengeBuilder")
            .field("canvas", &self.canvas)
            .field("cursor", &self.cursor)
            .field("background", &self.background.is_some())
            .field("border", &self.border)
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// One step of an image recipe
#[derive(Clone)]
pub enum ImageStage {
    Content(Arc<dyn ContentProducer>),
    ContentWith(Arc<dyn ContentProducer>, Arc<dyn WordRenderer>),
    Background(Arc<dyn BackgroundProducer>),
    Noise(Arc<dyn ImageNoiseProducer>),
    Filter(Arc<dyn ImageFilter>),
    Border,
}

impl fmt::Debug for ImageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Content(_) => "Content",
            Self::ContentWith(..) => "ContentWith",
            Self::Background(_) => "Background",
            Self::Noise(_) => "Noise",
            Self::Filter(_) => "Filter",
            Self::Border => "Border",
        };
        f.write_str(name)
    }
}

/// An image pipeline described up front and replayed in order
#[derive(Debug, Clone)]
pub struct ImageRecipe {
    width: u32,
    height: u32,
    stages: Vec<ImageStage>,
}

impl ImageRecipe {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stages: Vec::new(),
        }
    }

    pub fn then(mut self, stage: ImageStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[ImageStage] {
        &self.stages
    }

    pub fn build(&self) -> SphinxResult<ImageChallenge> {
        let mut builder = ImageChallengeBuilder::new(self.width, self.height)?;
        for stage in &self.stages {
            builder = match stage {
                ImageStage::Content(producer) => builder.add_content(producer.as_ref())?,
                ImageStage::ContentWith(producer, renderer) => {
                    builder.add_content_with(producer.as_ref(), renderer.as_ref())?
                }
                ImageStage::Background(producer) => builder.add_background(Arc::clone(producer)),
                ImageStage::Noise(producer) => builder.add_noise(producer.as_ref())?,
                ImageStage::Filter(filter) => builder.add_filter(filter.as_ref())?,
                ImageStage::Border => builder.add_border(),
            };
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AlphabetContentProducer, FixedContentProducer};
    use crate::visual::{FlatColorBackground, RippleFilter, StraightLineNoise};
    use sphinx_common::SphinxError;

    struct BrokenNoise;

    impl ImageNoiseProducer for BrokenNoise {
        fn make_noise(&self, _canvas: &mut PixelCanvas) -> SphinxResult<()> {
            Err(SphinxError::InvalidArgument("broken".into()))
        }
    }

    #[test]
    fn test_five_digit_numeric_challenge() {
        let challenge = ImageChallengeBuilder::new(200, 50)
            .unwrap()
            .add_content(&AlphabetContentProducer::numbers())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(challenge.content().chars().count(), 5);
        assert!(challenge.content().chars().all(|c| c.is_ascii_digit()));
        assert_eq!(challenge.image().dimensions(), (200, 50));
        assert!(challenge.is_correct(&challenge.content().to_string()));
    }

    #[test]
    fn test_default_renderer_refuses_undrawable_content() {
        let result = ImageChallengeBuilder::new(200, 50)
            .unwrap()
            .add_content(&AlphabetContentProducer::chinese());
        assert!(matches!(result, Err(SphinxError::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            ImageChallengeBuilder::new(0, 50),
            Err(SphinxError::Construction(_))
        ));
        assert!(ImageChallengeBuilder::new(200, 0).is_err());
    }

    #[test]
    fn test_fragments_follow_the_cursor() {
        let builder = ImageChallengeBuilder::new(200, 50)
            .unwrap()
            .add_content(&FixedContentProducer::new("12"))
            .unwrap()
            .add_content(&FixedContentProducer::new("345"))
            .unwrap();

        assert_eq!(builder.content(), "12345");
        let advance = PixelWordRenderer::default().advance();
        assert_eq!(
            builder.steps(),
            &[
                ImageStep::Content { chars: 2, from: 10, to: 10 + 2 * advance },
                ImageStep::Content {
                    chars: 3,
                    from: 10 + 2 * advance,
                    to: 10 + 5 * advance
                },
            ]
        );
    }

    #[test]
    fn test_last_background_wins_and_border_is_black() {
        let challenge = ImageChallengeBuilder::new(40, 20)
            .unwrap()
            .add_background(Arc::new(FlatColorBackground::new(Argb::RED)))
            .add_background(Arc::new(FlatColorBackground::new(Argb::WHITE)))
            .add_border()
            .build()
            .unwrap();

        let image = challenge.image();
        assert_eq!(image.pixel(0, 0), Argb::BLACK);
        assert_eq!(image.pixel(39, 19), Argb::BLACK);
        assert_eq!(image.pixel(20, 10), Argb::WHITE);
    }

    #[test]
    fn test_without_background_stays_transparent() {
        let challenge = ImageChallengeBuilder::new(30, 10).unwrap().build().unwrap();
        assert!(challenge.image().argb_pixels().iter().all(|p| *p == Argb::TRANSPARENT));
        assert_eq!(challenge.content(), "");
    }

    #[test]
    fn test_text_is_composited_over_background() {
        let challenge = ImageChallengeBuilder::new(200, 50)
            .unwrap()
            .add_content(&FixedContentProducer::new("8"))
            .unwrap()
            .add_background(Arc::new(FlatColorBackground::new(Argb::WHITE)))
            .build()
            .unwrap();

        let pixels = challenge.image().argb_pixels();
        assert!(pixels.contains(&Argb::BLACK));
        assert!(pixels.iter().all(|p| p.alpha() == 255));
    }

    #[test]
    fn test_strategy_failure_propagates() {
        let result = ImageChallengeBuilder::new(20, 20).unwrap().add_noise(&BrokenNoise);
        assert!(matches!(result, Err(SphinxError::InvalidArgument(_))));
    }

    #[test]
    fn test_journal_records_order() {
        let builder = ImageChallengeBuilder::new(60, 30)
            .unwrap()
            .add_noise(&StraightLineNoise::default().with_seed(1))
            .unwrap()
            .add_filter(&RippleFilter::new())
            .unwrap()
            .add_border();
        assert_eq!(
            builder.steps(),
            &[ImageStep::Noise, ImageStep::Filter, ImageStep::Border]
        );
    }

    #[test]
    fn test_recipe_replays() {
        let recipe = ImageRecipe::new(200, 50)
            .then(ImageStage::Content(Arc::new(FixedContentProducer::new("77"))))
            .then(ImageStage::Background(Arc::new(FlatColorBackground::default())))
            .then(ImageStage::Filter(Arc::new(RippleFilter::new())))
            .then(ImageStage::Border);

        let first = recipe.build().unwrap();
        let second = recipe.build().unwrap();
        assert_eq!(first.content(), "77");
        assert_eq!(first.image(), second.image());
        assert_eq!(recipe.stages().len(), 4);
    }
}
