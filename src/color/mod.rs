//! Color naming module
//!
//! This module samples the garment region of a photo, converts the sampled
//! color to HSV for neutral short-circuits, and resolves everything else to
//! the nearest entry of a small named palette.

pub mod conversion;
pub mod extractor;
pub mod named;

pub use conversion::ColorConverter;
pub use extractor::ColorExtractor;
pub use named::{NamedColor, NamedColorTable};
