//! Configuration structures for the photo-to-query pipeline.
//!
//! This module defines the tunable parameters for color naming, swatch
//! extraction, category normalization and history persistence.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use garment_query::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), garment_query::QueryError>(())
//! ```
//!
//! Every section is optional in JSON; missing sections and fields take the
//! compiled defaults from [`crate::constants`].
//!
//! # Configuration Sections
//!
//! - [`ColorExtractionConfig`]: Center sampling and neutral thresholds
//! - [`SwatchConfig`]: Dominant swatch quantization
//! - [`CategoryConfig`]: Clothing vocabulary, aliases and fallbacks
//! - [`HistoryConfig`]: Saved search database location

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{sampling, thresholds, vocabulary};
use crate::{QueryError, Result};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub color_extraction: ColorExtractionConfig,
    pub swatch: SwatchConfig,
    pub category: CategoryConfig,
    pub history: HistoryConfig,
}

/// Color extraction parameters.
///
/// The sampled region spans `region_start..region_end` of both image axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorExtractionConfig {
    /// Start of the sampled region as a fraction of width/height
    pub region_start: f32,

    /// End (exclusive) of the sampled region as a fraction of width/height
    pub region_end: f32,

    /// Sample every Nth pixel along both axes
    pub sample_stride: u32,

    /// Color used when the region yields no samples
    pub fallback_rgb: [u8; 3],

    /// HSV value below which the color is black
    pub black_value_max: f32,

    /// HSV saturation below which the color is neutral
    pub neutral_saturation_max: f32,

    /// Neutral colors darker than this are gray
    pub gray_value_max: f32,

    /// Neutral colors brighter than this are white
    pub white_value_min: f32,
}

impl Default for ColorExtractionConfig {
    fn default() -> Self {
        Self {
            region_start: sampling::REGION_START,
            region_end: sampling::REGION_END,
            sample_stride: sampling::SAMPLE_STRIDE,
            fallback_rgb: sampling::FALLBACK_RGB,
            black_value_max: thresholds::BLACK_VALUE_MAX,
            neutral_saturation_max: thresholds::NEUTRAL_SATURATION_MAX,
            gray_value_max: thresholds::GRAY_VALUE_MAX,
            white_value_min: thresholds::WHITE_VALUE_MIN,
        }
    }
}

/// Dominant swatch extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwatchConfig {
    /// Bits kept per channel when bucketing (1-8)
    pub quantize_bits: u8,

    /// Pixels at or below this HSL lightness are ignored
    pub min_lightness: f32,

    /// Pixels at or above this HSL lightness are ignored
    pub max_lightness: f32,

    /// Images above this pixel count are subsampled
    pub max_pixels: u32,
}

impl Default for SwatchConfig {
    fn default() -> Self {
        Self {
            quantize_bits: thresholds::SWATCH_QUANTIZE_BITS,
            min_lightness: thresholds::SWATCH_MIN_LIGHTNESS,
            max_lightness: thresholds::SWATCH_MAX_LIGHTNESS,
            max_pixels: sampling::SWATCH_MAX_PIXELS,
        }
    }
}

/// Which rule wins when the top label is outside the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPrecedence {
    /// A non-generic top label outside the vocabulary is returned verbatim,
    /// even when a lower-ranked label is in the vocabulary.
    #[default]
    TopLabelFirst,
    /// The vocabulary scan runs first; the top label is only a fallback.
    ///
    /// Reproduces the label handling of the Android ML Kit client:
    /// `[Backpack 0.95, Jeans 0.40]` gives "jeans" here and "backpack" under
    /// [`LabelPrecedence::TopLabelFirst`].
    VocabularyFirst,
}

/// Category normalization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    /// Recognized clothing terms (lower case)
    pub allowed: Vec<String>,

    /// Synonym → canonical term
    pub aliases: BTreeMap<String, String>,

    /// Terms too unspecific to search for
    pub generic: Vec<String>,

    /// Category used when nothing usable was labeled
    pub default_category: String,

    pub precedence: LabelPrecedence,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            allowed: vocabulary::ALLOWED.iter().map(|s| s.to_string()).collect(),
            aliases: vocabulary::ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            generic: vocabulary::GENERIC.iter().map(|s| s.to_string()).collect(),
            default_category: vocabulary::DEFAULT_CATEGORY.to_string(),
            precedence: LabelPrecedence::default(),
        }
    }
}

/// History persistence parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// SQLite database file for saved searches
    pub database_path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("saved_searches.db"),
        }
    }
}

impl PipelineConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let c = &self.color_extraction;
        if !(0.0..=1.0).contains(&c.region_start) || !(0.0..=1.0).contains(&c.region_end) {
            return Err(QueryError::invalid(
                "color_extraction.region",
                format!("{}..{}", c.region_start, c.region_end),
            ));
        }
        if c.region_start >= c.region_end {
            return Err(QueryError::invalid(
                "color_extraction.region",
                format!("{}..{}", c.region_start, c.region_end),
            ));
        }
        if c.sample_stride == 0 {
            return Err(QueryError::invalid("color_extraction.sample_stride", 0));
        }
        if c.gray_value_max > c.white_value_min {
            return Err(QueryError::invalid(
                "color_extraction.gray_value_max",
                c.gray_value_max,
            ));
        }

        let s = &self.swatch;
        if !(1..=8).contains(&s.quantize_bits) {
            return Err(QueryError::invalid("swatch.quantize_bits", s.quantize_bits));
        }
        if s.min_lightness >= s.max_lightness {
            return Err(QueryError::invalid(
                "swatch.lightness",
                format!("{}..{}", s.min_lightness, s.max_lightness),
            ));
        }
        if s.max_pixels == 0 {
            return Err(QueryError::invalid("swatch.max_pixels", 0));
        }

        if self.category.default_category.trim().is_empty() {
            return Err(QueryError::invalid("category.default_category", "\"\""));
        }
        if let Some(term) = self.category.allowed.iter().find(|t| t.trim().is_empty()) {
            return Err(QueryError::invalid("category.allowed", format!("{term:?}")));
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| QueryError::config(format!("cannot read {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| QueryError::config(format!("cannot parse {}", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| QueryError::config("cannot serialize configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| QueryError::config(format!("cannot write {}", path.display()), e))?;
        Ok(())
    }
}
