//! Reference palette, thresholds and vocabulary for query derivation
//!
//! Compile-time defaults. Everything here except the palette can be overridden
//! at runtime through [`crate::config::PipelineConfig`].

/// Basic named color palette
///
/// Declaration order matters: nearest-color ties resolve to the earlier entry.
pub mod palette {
    use crate::color::NamedColor;

    pub const BASIC_COLORS: [NamedColor; 12] = [
        NamedColor::new("black", [0, 0, 0]),
        NamedColor::new("white", [255, 255, 255]),
        NamedColor::new("gray", [128, 128, 128]),
        NamedColor::new("red", [220, 20, 60]),
        NamedColor::new("orange", [255, 140, 0]),
        NamedColor::new("yellow", [255, 215, 0]),
        NamedColor::new("green", [34, 139, 34]),
        NamedColor::new("blue", [30, 144, 255]),
        NamedColor::new("navy", [0, 0, 128]),
        NamedColor::new("purple", [128, 0, 128]),
        NamedColor::new("brown", [139, 69, 19]),
        NamedColor::new("beige", [245, 245, 220]),
    ];
}

/// Center-region sampling parameters
pub mod sampling {
    /// Sampled region starts at this fraction of width/height
    pub const REGION_START: f32 = 0.25;

    /// Sampled region ends (exclusive) at this fraction of width/height
    pub const REGION_END: f32 = 0.75;

    /// Every Nth pixel is sampled along both axes
    pub const SAMPLE_STRIDE: u32 = 4;

    /// Used when the region is degenerate or yields no samples (#444444)
    pub const FALLBACK_RGB: [u8; 3] = [68, 68, 68];

    /// Swatch extraction subsamples images larger than this many pixels
    pub const SWATCH_MAX_PIXELS: u32 = 160_000;
}

/// HSV short-circuit thresholds applied to the sampled average
pub mod thresholds {
    /// Below this value (brightness) the garment is called black
    pub const BLACK_VALUE_MAX: f32 = 0.25;

    /// Below this saturation a color counts as neutral
    pub const NEUTRAL_SATURATION_MAX: f32 = 0.08;

    /// Neutral and darker than this → gray
    pub const GRAY_VALUE_MAX: f32 = 0.40;

    /// Neutral and brighter than this → white
    pub const WHITE_VALUE_MIN: f32 = 0.85;

    /// Swatch extraction ignores pixels with HSL lightness at or below this
    pub const SWATCH_MIN_LIGHTNESS: f32 = 0.05;

    /// Swatch extraction ignores pixels with HSL lightness at or above this
    pub const SWATCH_MAX_LIGHTNESS: f32 = 0.95;

    /// Bits kept per channel when bucketing swatch colors
    pub const SWATCH_QUANTIZE_BITS: u8 = 5;
}

/// Clothing vocabulary used to normalize classifier labels
pub mod vocabulary {
    /// Recognized clothing terms
    pub const ALLOWED: &[&str] = &[
        "shirt",
        "t-shirt",
        "t shirt",
        "tee",
        "top",
        "hoodie",
        "sweatshirt",
        "sweater",
        "jumper",
        "pullover",
        "cap",
        "hat",
        "beanie",
        "pants",
        "trousers",
        "jeans",
        "shorts",
        "skirt",
        "dress",
        "jacket",
        "coat",
        "blazer",
        "shoe",
        "sneaker",
        "boots",
        "boot",
        "sandals",
    ];

    /// Synonym → canonical term
    pub const ALIASES: &[(&str, &str)] = &[
        ("t shirt", "t-shirt"),
        ("tee", "t-shirt"),
        ("top", "shirt"),
        ("jumper", "sweater"),
        ("pullover", "sweater"),
        ("boot", "boots"),
        ("beanie", "hat"),
    ];

    /// Labels too unspecific to be used as a search term
    pub const GENERIC: &[&str] = &["clothing", "apparel", "garment", "clothes", "wear"];

    pub const DEFAULT_CATEGORY: &str = "shirt";
}
