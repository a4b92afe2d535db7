//! Garment color naming
//!
//! Derives one color name per photo:
//! - Averages a strided sample of the central region (where the garment usually is)
//! - Calls near-black, gray and white directly from the average's HSV
//! - Otherwise asks the swatch extractor for a dominant color, falling back to
//!   the average, and resolves it against the named palette

use std::sync::Arc;

use image::RgbImage;
use tracing::debug;

use crate::color::conversion::HsvColor;
use crate::color::{ColorConverter, NamedColorTable};
use crate::config::ColorExtractionConfig;
use crate::detection::SwatchExtractor;

/// Where the final color name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSource {
    /// Neutral short-circuit on the sampled average
    Neutral,
    /// Dominant swatch from the swatch extractor
    Swatch,
    /// Sampled average (no swatch available)
    Average,
}

/// Color extraction outcome with the intermediate values
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSample {
    /// Mean RGB of the sampled center region
    pub average: [u8; 3],
    /// HSV of `average`
    pub hsv: HsvColor,
    /// Dominant swatch, when one was requested and found
    pub swatch: Option<[u8; 3]>,
    pub source: ColorSource,
    pub name: &'static str,
}

/// Axis-aligned pixel rectangle, end-exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleRegion {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl SampleRegion {
    pub fn is_degenerate(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Color extractor naming the dominant garment color of an image
pub struct ColorExtractor {
    config: ColorExtractionConfig,
    converter: ColorConverter,
    table: NamedColorTable,
    swatches: Arc<dyn SwatchExtractor>,
}

impl ColorExtractor {
    pub fn new(config: ColorExtractionConfig, swatches: Arc<dyn SwatchExtractor>) -> Self {
        Self {
            config,
            converter: ColorConverter::new(),
            table: NamedColorTable::basic(),
            swatches,
        }
    }

    pub fn config(&self) -> &ColorExtractionConfig {
        &self.config
    }

    /// Central sampling rectangle for a `width` × `height` image
    pub fn sample_region(&self, width: u32, height: u32) -> SampleRegion {
        let at = |extent: u32, fraction: f32| (extent as f32 * fraction) as u32;
        SampleRegion {
            x0: at(width, self.config.region_start),
            y0: at(height, self.config.region_start),
            x1: at(width, self.config.region_end),
            y1: at(height, self.config.region_end),
        }
    }

    /// Strided mean color of the central region
    ///
    /// Falls back to the configured fallback color when the region is
    /// degenerate or no pixel was sampled.
    pub fn center_average(&self, image: &RgbImage) -> [u8; 3] {
        let region = self.sample_region(image.width(), image.height());
        if region.is_degenerate() {
            return self.config.fallback_rgb;
        }

        let stride = self.config.sample_stride.max(1) as usize;
        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for y in (region.y0..region.y1).step_by(stride) {
            for x in (region.x0..region.x1).step_by(stride) {
                let pixel = image.get_pixel(x, y).0;
                for (acc, channel) in sum.iter_mut().zip(pixel) {
                    *acc += u64::from(channel);
                }
                count += 1;
            }
        }

        if count == 0 {
            return self.config.fallback_rgb;
        }
        sum.map(|s| (s / count) as u8)
    }

    /// Neutral name for an HSV color, if it falls in a black/gray/white band
    pub fn neutral_name(&self, hsv: HsvColor) -> Option<&'static str> {
        let c = &self.config;
        if hsv.value < c.black_value_max {
            Some("black")
        } else if hsv.saturation < c.neutral_saturation_max && hsv.value < c.gray_value_max {
            Some("gray")
        } else if hsv.saturation < c.neutral_saturation_max && hsv.value > c.white_value_min {
            Some("white")
        } else {
            None
        }
    }

    /// Run the full extraction and keep the intermediate values
    pub async fn analyze(&self, image: &RgbImage) -> ColorSample {
        let average = self.center_average(image);
        let hsv = self.converter.rgb_to_hsv(average);

        let sample = if let Some(name) = self.neutral_name(hsv) {
            ColorSample {
                average,
                hsv,
                swatch: None,
                source: ColorSource::Neutral,
                name,
            }
        } else {
            let swatch = self.swatches.dominant_swatch(image).await;
            let (rgb, source) = match swatch {
                Some(rgb) => (rgb, ColorSource::Swatch),
                None => (average, ColorSource::Average),
            };
            ColorSample {
                average,
                hsv,
                swatch,
                source,
                name: self.table.nearest(rgb),
            }
        };

        debug!(
            average = %self.converter.rgb_to_hex(sample.average),
            saturation = sample.hsv.saturation,
            value = sample.hsv.value,
            source = ?sample.source,
            name = sample.name,
            "Garment color resolved"
        );
        sample
    }

    /// Name of the garment's dominant color
    pub async fn extract(&self, image: &RgbImage) -> &'static str {
        self.analyze(image).await.name
    }
}
