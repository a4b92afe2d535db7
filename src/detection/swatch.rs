//! Dominant swatch extraction
//!
//! A dominant swatch is one representative color for the whole image, chosen
//! from the overall pixel population rather than a region average:
//! - Pixels are quantized to a few bits per channel
//! - Near-black and near-white pixels are ignored
//! - The most populous bucket wins and its mean color is returned

use std::collections::HashMap;

use async_trait::async_trait;
use image::RgbImage;
use tracing::{debug, warn};

use crate::color::ColorConverter;
use crate::config::SwatchConfig;
use crate::constants::{sampling, thresholds};
use crate::{QueryError, Result};

/// Source of a single representative color for an image
///
/// Returning `None` is a normal outcome; callers fall back to their own estimate.
#[async_trait]
pub trait SwatchExtractor: Send + Sync {
    async fn dominant_swatch(&self, image: &RgbImage) -> Option<[u8; 3]>;
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    count: u64,
    sum: [u64; 3],
    first_seen: usize,
}

/// Swatch extractor picking the most populous quantized color
#[derive(Debug, Clone)]
pub struct PopulationSwatchExtractor {
    converter: ColorConverter,
    quantize_bits: u8,
    min_lightness: f32,
    max_lightness: f32,
    max_pixels: u32,
}

impl Default for PopulationSwatchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulationSwatchExtractor {
    /// Create an extractor with default parameters
    pub fn new() -> Self {
        Self {
            converter: ColorConverter::new(),
            quantize_bits: thresholds::SWATCH_QUANTIZE_BITS,
            min_lightness: thresholds::SWATCH_MIN_LIGHTNESS,
            max_lightness: thresholds::SWATCH_MAX_LIGHTNESS,
            max_pixels: sampling::SWATCH_MAX_PIXELS,
        }
    }

    /// Create an extractor with custom parameters
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidParameter` if `quantize_bits` is outside 1..=8,
    /// the lightness window is empty, or `max_pixels` is zero.
    pub fn with_params(
        quantize_bits: u8,
        min_lightness: f32,
        max_lightness: f32,
        max_pixels: u32,
    ) -> Result<Self> {
        if !(1..=8).contains(&quantize_bits) {
            return Err(QueryError::invalid("quantize_bits", quantize_bits));
        }
        if min_lightness >= max_lightness {
            return Err(QueryError::invalid(
                "lightness_window",
                format!("{min_lightness}..{max_lightness}"),
            ));
        }
        if max_pixels == 0 {
            return Err(QueryError::invalid("max_pixels", max_pixels));
        }
        Ok(Self {
            converter: ColorConverter::new(),
            quantize_bits,
            min_lightness,
            max_lightness,
            max_pixels,
        })
    }

    /// Create an extractor from the `swatch` configuration section
    pub fn from_config(config: &SwatchConfig) -> Result<Self> {
        Self::with_params(
            config.quantize_bits,
            config.min_lightness,
            config.max_lightness,
            config.max_pixels,
        )
    }

    /// Sampling stride keeping the visited pixel count near `max_pixels`
    fn stride_for(&self, image: &RgbImage) -> u32 {
        let total = u64::from(image.width()) * u64::from(image.height());
        let ratio = total as f64 / f64::from(self.max_pixels);
        if ratio <= 1.0 {
            1
        } else {
            ratio.sqrt().ceil() as u32
        }
    }

    /// Compute the dominant swatch synchronously
    pub fn dominant(&self, image: &RgbImage) -> Option<[u8; 3]> {
        let shift = 8 - self.quantize_bits;
        let stride = self.stride_for(image) as usize;
        let mut buckets: HashMap<u32, Bucket> = HashMap::new();

        for y in (0..image.height()).step_by(stride) {
            for x in (0..image.width()).step_by(stride) {
                let rgb = image.get_pixel(x, y).0;
                let lightness = self.converter.lightness(rgb);
                if lightness <= self.min_lightness || lightness >= self.max_lightness {
                    continue;
                }

                let key = (u32::from(rgb[0] >> shift) << 16)
                    | (u32::from(rgb[1] >> shift) << 8)
                    | u32::from(rgb[2] >> shift);
                let seen = buckets.len();
                let bucket = buckets.entry(key).or_insert(Bucket {
                    first_seen: seen,
                    ..Bucket::default()
                });
                bucket.count += 1;
                for (sum, channel) in bucket.sum.iter_mut().zip(rgb) {
                    *sum += u64::from(channel);
                }
            }
        }

        let best = buckets
            .values()
            .max_by(|a, b| a.count.cmp(&b.count).then(b.first_seen.cmp(&a.first_seen)))?;

        let mean = best.sum.map(|s| (s / best.count) as u8);
        debug!(
            buckets = buckets.len(),
            population = best.count,
            swatch = %self.converter.rgb_to_hex(mean),
            "Dominant swatch selected"
        );
        Some(mean)
    }
}

#[async_trait]
impl SwatchExtractor for PopulationSwatchExtractor {
    /// Runs [`PopulationSwatchExtractor::dominant`] on the blocking pool
    async fn dominant_swatch(&self, image: &RgbImage) -> Option<[u8; 3]> {
        let extractor = self.clone();
        let image = image.clone();
        match tokio::task::spawn_blocking(move || extractor.dominant(&image)).await {
            Ok(swatch) => swatch,
            Err(e) => {
                warn!(error = %e, "Swatch task failed");
                None
            }
        }
    }
}
