//! Named reference palette with nearest-color lookup

use serde::Serialize;

use crate::color::ColorConverter;
use crate::constants::palette::BASIC_COLORS;

/// A reference color with a human-readable name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

impl NamedColor {
    pub const fn new(name: &'static str, rgb: [u8; 3]) -> Self {
        Self { name, rgb }
    }

    /// Reference color as "#RRGGBB"
    pub fn hex(&self) -> String {
        ColorConverter::new().rgb_to_hex(self.rgb)
    }

    /// Squared Euclidean distance in RGB space
    ///
    /// Ordering by squared distance is identical to ordering by distance,
    /// and stays in exact integer arithmetic.
    pub fn distance_sq(&self, rgb: [u8; 3]) -> u32 {
        self.rgb
            .iter()
            .zip(rgb.iter())
            .map(|(&a, &b)| {
                let d = i32::from(a) - i32::from(b);
                (d * d) as u32
            })
            .sum()
    }
}

/// Immutable table of named colors
#[derive(Debug, Clone, Copy)]
pub struct NamedColorTable {
    entries: &'static [NamedColor],
}

impl Default for NamedColorTable {
    fn default() -> Self {
        Self::basic()
    }
}

impl NamedColorTable {
    /// The fixed twelve-color clothing palette
    pub const fn basic() -> Self {
        Self {
            entries: &BASIC_COLORS,
        }
    }

    pub fn entries(&self) -> &'static [NamedColor] {
        self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|c| c.name)
    }

    /// Look up an entry by name
    pub fn get(&self, name: &str) -> Option<&'static NamedColor> {
        self.entries.iter().find(|c| c.name == name)
    }

    /// Name of the entry closest to `rgb`
    ///
    /// Ties resolve to the earliest entry in declaration order.
    pub fn nearest(&self, rgb: [u8; 3]) -> &'static str {
        let mut best = &self.entries[0];
        let mut best_d = best.distance_sq(rgb);
        for entry in &self.entries[1..] {
            let d = entry.distance_sq(rgb);
            if d < best_d {
                best = entry;
                best_d = d;
            }
        }
        best.name
    }
}
