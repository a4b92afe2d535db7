//! Color space conversion utilities
//!
//! Thin wrappers over `palette` for the conversions the extractor needs:
//! - 8-bit RGB to HSV (hue in degrees, saturation and value in 0..=1)
//! - 8-bit RGB to HSL lightness
//! - Hex color representation

use palette::{FromColor, Hsl, Hsv, Srgb};
use crate::{QueryError, Result};

/// HSV triple with hue in degrees and saturation/value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvColor {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

/// Stateless color converter
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    pub fn new() -> Self {
        Self
    }

    fn to_srgb(rgb: [u8; 3]) -> Srgb {
        Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>()
    }

    /// Convert RGB (0-255) to HSV
    ///
    /// Saturation is `(max - min) / max` and value is `max / 255`; a black
    /// input yields zero saturation.
    pub fn rgb_to_hsv(&self, rgb: [u8; 3]) -> HsvColor {
        let hsv = Hsv::from_color(Self::to_srgb(rgb));
        HsvColor {
            hue: hsv.hue.into_positive_degrees(),
            saturation: hsv.saturation,
            value: hsv.value,
        }
    }

    /// HSL lightness of an RGB (0-255) color
    pub fn lightness(&self, rgb: [u8; 3]) -> f32 {
        Hsl::from_color(Self::to_srgb(rgb)).lightness
    }

    /// Convert RGB to hexadecimal color string (e.g., "#FF0000")
    pub fn rgb_to_hex(&self, rgb: [u8; 3]) -> String {
        format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
    }

    /// Parse hexadecimal color string ("#FF0000" or "FF0000")
    pub fn hex_to_rgb(&self, hex: &str) -> Result<[u8; 3]> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(QueryError::invalid("hex_color", hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| QueryError::invalid("hex_color", hex))
        };

        Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_hsv_primaries() {
        let converter = ColorConverter::new();

        let red = converter.rgb_to_hsv([255, 0, 0]);
        assert!(red.hue.abs() < 0.01 || (red.hue - 360.0).abs() < 0.01);
        assert!((red.saturation - 1.0).abs() < 1e-5);
        assert!((red.value - 1.0).abs() < 1e-5);

        let blue = converter.rgb_to_hsv([0, 0, 255]);
        assert!((blue.hue - 240.0).abs() < 0.01);
    }

    #[test]
    fn test_rgb_to_hsv_neutrals() {
        let converter = ColorConverter::new();

        let black = converter.rgb_to_hsv([0, 0, 0]);
        assert_eq!(black.saturation, 0.0);
        assert_eq!(black.value, 0.0);

        let gray = converter.rgb_to_hsv([68, 68, 68]);
        assert!(gray.saturation.abs() < 1e-6);
        assert!((gray.value - 68.0 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn test_saturation_matches_max_min_formula() {
        let converter = ColorConverter::new();
        let hsv = converter.rgb_to_hsv([200, 100, 50]);
        assert!((hsv.saturation - 150.0 / 200.0).abs() < 1e-5);
        assert!((hsv.value - 200.0 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn test_lightness() {
        let converter = ColorConverter::new();
        assert!(converter.lightness([0, 0, 0]) < 1e-6);
        assert!((converter.lightness([255, 255, 255]) - 1.0).abs() < 1e-5);
        assert!((converter.lightness([255, 0, 0]) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_rgb_to_hex() {
        let converter = ColorConverter::new();
        assert_eq!(converter.rgb_to_hex([255, 0, 0]), "#FF0000");
        assert_eq!(converter.rgb_to_hex([68, 68, 68]), "#444444");
    }

    #[test]
    fn test_hex_to_rgb() {
        let converter = ColorConverter::new();
        assert_eq!(converter.hex_to_rgb("#1E90FF").unwrap(), [30, 144, 255]);
        assert_eq!(converter.hex_to_rgb("00ff00").unwrap(), [0, 255, 0]);
    }

    #[test]
    fn test_hex_to_rgb_invalid() {
        let converter = ColorConverter::new();
        assert!(converter.hex_to_rgb("#FF").is_err());
        assert!(converter.hex_to_rgb("#GGGGGG").is_err());
    }
}
