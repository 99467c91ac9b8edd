//! # Palette Extractor
//!
//! Finds the dominant colors of an image with k-means clustering and reports
//! each one with the share of the image it covers.
//!
//! Near-black and near-white pixels are left out before clustering so that
//! backgrounds and letterboxing do not drag the centroids; when nothing is
//! left after filtering the unfiltered pixels are clustered instead.
//!
//! ## Example
//!
//! ```rust,no_run
//! use palette_extractor::{PaletteExtractor, ExtractorConfig, text_report};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let extractor = PaletteExtractor::new(ExtractorConfig::default())?;
//! let palette = extractor.extract_bytes(&bytes, 5)?;
//! println!("{}", text_report(&palette));
//! # Ok::<(), palette_extractor::ExtractError>(())
//! ```
//!
//! The `native-bin` feature builds the `palette-cli` binary; the
//! [`web`] module exposes the same pipeline to JavaScript through
//! `wasm-bindgen`.

pub mod color;
pub mod config;
pub mod error;
pub mod extract;
pub mod render;
pub mod report;
pub mod sample;
pub mod web;

pub use color::{Brightness, ContrastRule, ParseColorError, Rgb8, TextColor, contrast_text, to_hex};
pub use config::{ClusterSpace, ExtractorConfig, FilterThresholds};
pub use error::{ExtractError, Result};
pub use extract::{MAX_COLORS, Palette, PaletteEntry, PaletteExtractor, extract_palette};
pub use render::{ChartKind, RenderOptions, render, render_png};
pub use report::{ColorSummary, JsonReport, json_report, text_report};
