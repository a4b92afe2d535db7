//! Dominant swatch detection module
//!
//! This module defines the dominant-swatch collaborator used by the color
//! extractor for chromatic garments, plus a population-based default.

pub mod swatch;

pub use swatch::{PopulationSwatchExtractor, SwatchExtractor};
