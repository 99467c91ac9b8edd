//! Palette visualisation rendered to PNG.
//!
//! Three chart kinds are supported:
//!
//! - [`ChartKind::Strip`]: equal-width swatches side by side, one per color.
//! - [`ChartKind::Bar`]: one horizontal bar, segment widths proportional to
//!   coverage.
//! - [`ChartKind::Pie`]: slices proportional to coverage, first slice starting
//!   at twelve o'clock, going clockwise.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use crate::color::Rgb8;
use crate::error::{ExtractError, Result};
use crate::extract::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Strip,
    Bar,
    Pie,
}

impl FromStr for ChartKind {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strip" => Ok(ChartKind::Strip),
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            other => Err(ExtractError::invalid_parameter("chart", other)),
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Strip => "strip",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub kind: ChartKind,
    pub width: u32,
    pub height: u32,
    /// Fill outside the pie
    pub background: Rgb8,
}

impl RenderOptions {
    /// 600x100 for strips and bars, 400x400 for pies.
    pub fn for_kind(kind: ChartKind) -> Self {
        let (width, height) = match kind {
            ChartKind::Strip | ChartKind::Bar => (600, 100),
            ChartKind::Pie => (400, 400),
        };
        Self {
            kind,
            width,
            height,
            background: Rgb8::WHITE,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_kind(ChartKind::default())
    }
}

pub fn render(palette: &Palette, options: &RenderOptions) -> Result<RgbImage> {
    if options.width == 0 || options.height == 0 {
        return Err(ExtractError::invalid_parameter(
            "size",
            format!("{}x{}", options.width, options.height),
        ));
    }
    if palette.is_empty() {
        return Err(ExtractError::invalid_input("palette has no colors"));
    }

    let colors: Vec<Rgb8> = palette.iter().map(|e| e.rgb8()).collect();
    let img = match options.kind {
        ChartKind::Strip => render_strip(&colors, options),
        ChartKind::Bar => render_bar(&colors, &cumulative(palette), options),
        ChartKind::Pie => render_pie(&colors, &cumulative(palette), options),
    };
    Ok(img)
}

/// Render and encode as PNG.
pub fn render_png(palette: &Palette, options: &RenderOptions) -> Result<Vec<u8>> {
    let img = render(palette, options)?;
    let mut buf = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buf);
        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ExtractError::encode("PNG encode error", e))?;
    }
    Ok(buf)
}

/// Running coverage fractions in `[0, 1]`; the last one is forced to 1.
fn cumulative(palette: &Palette) -> Vec<f32> {
    let total: f32 = palette.iter().map(|e| e.percentage).sum();
    let mut acc = 0.0;
    let mut ends: Vec<f32> = palette
        .iter()
        .map(|e| {
            acc += e.percentage;
            acc / total
        })
        .collect();
    if let Some(last) = ends.last_mut() {
        *last = 1.0;
    }
    ends
}

/// First slot whose end lies beyond `fraction`.
fn slot(ends: &[f32], fraction: f32) -> usize {
    ends.iter()
        .position(|&end| fraction < end)
        .unwrap_or(ends.len() - 1)
}

fn render_strip(colors: &[Rgb8], options: &RenderOptions) -> RgbImage {
    let n = colors.len() as u64;
    let width = options.width as u64;
    RgbImage::from_fn(options.width, options.height, |x, _| {
        let i = (x as u64 * n / width) as usize;
        colors[i].into()
    })
}

fn render_bar(colors: &[Rgb8], ends: &[f32], options: &RenderOptions) -> RgbImage {
    let width = options.width as f32;
    let column: Vec<Rgb8> = (0..options.width)
        .map(|x| colors[slot(ends, (x as f32 + 0.5) / width)])
        .collect();
    RgbImage::from_fn(options.width, options.height, |x, _| column[x as usize].into())
}

fn render_pie(colors: &[Rgb8], ends: &[f32], options: &RenderOptions) -> RgbImage {
    let cx = options.width as f32 / 2.0;
    let cy = options.height as f32 / 2.0;
    let radius = (cx.min(cy) - 1.0).max(0.5);

    RgbImage::from_fn(options.width, options.height, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        if dx * dx + dy * dy > radius * radius {
            return options.background.into();
        }
        // clockwise from twelve o'clock, y grows downwards
        let angle = dx.atan2(-dy).rem_euclid(TAU);
        colors[slot(ends, angle / TAU)].into()
    })
}
