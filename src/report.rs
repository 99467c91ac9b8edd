//! Text and JSON exports of an extracted palette.

use serde::{Deserialize, Serialize};

use crate::color::{ContrastRule, TextColor};
use crate::error::{ExtractError, Result};
use crate::extract::{Palette, PaletteEntry};

/// One palette entry as shown to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSummary {
    /// 1-based position in the palette
    pub index: usize,
    pub hex: String,
    pub rgb: [u8; 3],
    pub percentage: f32,
    pub text_color: TextColor,
}

impl ColorSummary {
    pub fn new(index: usize, entry: &PaletteEntry, rule: &ContrastRule) -> Self {
        Self {
            index,
            hex: entry.hex(),
            rgb: entry.rgb8().to_array(),
            percentage: entry.percentage,
            text_color: entry.text_color(rule),
        }
    }

    /// `Color 1: #1f2a3b | RGB(31, 42, 59) | 42.5%`
    pub fn line(&self) -> String {
        let [r, g, b] = self.rgb;
        format!(
            "Color {}: {} | RGB({r}, {g}, {b}) | {:.1}%",
            self.index, self.hex, self.percentage
        )
    }
}

pub fn summaries(palette: &Palette, rule: &ContrastRule) -> Vec<ColorSummary> {
    palette
        .iter()
        .enumerate()
        .map(|(i, entry)| ColorSummary::new(i + 1, entry, rule))
        .collect()
}

/// Plain-text report, one line per color, no trailing newline.
pub fn text_report(palette: &Palette) -> String {
    // text color is not part of the line
    let rule = ContrastRule::default();
    summaries(palette, &rule)
        .iter()
        .map(ColorSummary::line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport {
    pub sampled_pixels: usize,
    pub used_fallback: bool,
    pub colors: Vec<ColorSummary>,
}

impl JsonReport {
    pub fn new(palette: &Palette, rule: &ContrastRule) -> Self {
        Self {
            sampled_pixels: palette.sampled_pixels,
            used_fallback: palette.used_fallback,
            colors: summaries(palette, rule),
        }
    }
}

pub fn json_report(palette: &Palette, rule: &ContrastRule) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport::new(palette, rule))
        .map_err(|e| ExtractError::encode("JSON report serialization failed", e))
}
