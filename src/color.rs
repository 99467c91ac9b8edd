//! Color formatting helpers: hex text and on-color contrast selection.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a hex color string fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3 or 6 characters after stripping '#')
    #[error("invalid hex color length (expected 3 or 6 characters)")]
    InvalidLength,
    #[error("invalid hex character: {0}")]
    InvalidHex(#[from] ParseIntError),
}

/// An 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert floating channels on the 0-255 scale, clamping and truncating.
    pub fn from_f32(rgb: [f32; 3]) -> Self {
        let [r, g, b] = rgb.map(|c| c.clamp(0.0, 255.0) as u8);
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb8> for image::Rgb<u8> {
    fn from(c: Rgb8) -> Self {
        image::Rgb(c.to_array())
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb8 {
    type Err = ParseColorError;

    /// Accepts `#rrggbb`, `rrggbb`, `#rgb` and `rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ParseColorError::InvalidLength);
        }
        match hex.len() {
            6 => Ok(Self::new(
                u8::from_str_radix(&hex[0..2], 16)?,
                u8::from_str_radix(&hex[2..4], 16)?,
                u8::from_str_radix(&hex[4..6], 16)?,
            )),
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            _ => Err(ParseColorError::InvalidLength),
        }
    }
}

/// Hex text for a floating-point color (channels truncated to integers).
pub fn to_hex(rgb: [f32; 3]) -> String {
    Rgb8::from_f32(rgb).to_hex()
}

/// Text color placed on top of a swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    pub fn as_str(self) -> &'static str {
        match self {
            TextColor::Black => "black",
            TextColor::White => "white",
        }
    }

    pub fn rgb(self) -> Rgb8 {
        match self {
            TextColor::Black => Rgb8::BLACK,
            TextColor::White => Rgb8::WHITE,
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Perceptual brightness formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Brightness {
    /// `0.299R + 0.587G + 0.114B` on the floating channels
    Weighted,
    /// `(299R + 587G + 114B) / 1000` on truncated channels, integer division
    Integer,
}

impl Brightness {
    pub fn of(self, rgb: [f32; 3]) -> f32 {
        match self {
            Brightness::Weighted => 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2],
            Brightness::Integer => {
                let c = Rgb8::from_f32(rgb);
                let sum = 299 * c.r as u32 + 587 * c.g as u32 + 114 * c.b as u32;
                (sum / 1000) as f32
            }
        }
    }
}

/// Chooses black or white text for a background color.
///
/// Brightness strictly above `threshold` gets black text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastRule {
    pub formula: Brightness,
    pub threshold: f32,
}

impl ContrastRule {
    pub const fn weighted() -> Self {
        Self {
            formula: Brightness::Weighted,
            threshold: 160.0,
        }
    }

    pub const fn integer() -> Self {
        Self {
            formula: Brightness::Integer,
            threshold: 128.0,
        }
    }

    pub fn text_color(&self, rgb: [f32; 3]) -> TextColor {
        if self.formula.of(rgb) > self.threshold {
            TextColor::Black
        } else {
            TextColor::White
        }
    }
}

impl Default for ContrastRule {
    fn default() -> Self {
        Self::weighted()
    }
}

pub fn contrast_text(rgb: [f32; 3], rule: &ContrastRule) -> TextColor {
    rule.text_color(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex_truncates() {
        assert_eq!(to_hex([255.0, 0.0, 127.9]), "#ff007f");
        assert_eq!(to_hex([-3.0, 300.0, 16.5]), "#00ff10");
    }

    #[test]
    fn test_hex_round_trip() {
        let centroid = [12.7, 200.2, 99.99];
        let parsed: Rgb8 = to_hex(centroid).parse().unwrap();
        assert_eq!(parsed, Rgb8::new(12, 200, 99));
    }

    #[test]
    fn test_parse_short_and_bare_hex() {
        assert_eq!("#fff".parse::<Rgb8>().unwrap(), Rgb8::WHITE);
        assert_eq!("0A0b0C".parse::<Rgb8>().unwrap(), Rgb8::new(10, 11, 12));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("#abcd".parse::<Rgb8>(), Err(ParseColorError::InvalidLength));
        assert!(matches!("zz0000".parse::<Rgb8>(), Err(ParseColorError::InvalidHex(_))));
    }

    #[test]
    fn test_contrast_extremes_both_rules() {
        for rule in [ContrastRule::weighted(), ContrastRule::integer()] {
            assert_eq!(contrast_text([255.0, 255.0, 255.0], &rule), TextColor::Black);
            assert_eq!(contrast_text([0.0, 0.0, 0.0], &rule), TextColor::White);
        }
    }

    #[test]
    fn test_contrast_threshold_is_exclusive() {
        // mid grey: 150 under both formulas
        let grey = [150.0, 150.0, 150.0];
        assert_eq!(ContrastRule::weighted().text_color(grey), TextColor::White);
        assert_eq!(ContrastRule::integer().text_color(grey), TextColor::Black);

        let rule = ContrastRule {
            formula: Brightness::Integer,
            threshold: 150.0,
        };
        assert_eq!(rule.text_color(grey), TextColor::White);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgb8::new(1, 2, 3).to_string(), "RGB(1, 2, 3)");
        assert_eq!(TextColor::Black.to_string(), "black");
    }
}
