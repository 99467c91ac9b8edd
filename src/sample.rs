//! Pixel sampling: decode, flatten to RGB triples, drop near-black and
//! near-white pixels.

use std::borrow::Cow;

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use tracing::debug;

use crate::config::FilterThresholds;
use crate::error::{ExtractError, Result};

/// Decode an encoded image (PNG, JPEG, ...) held in memory.
pub fn decode(input: &[u8]) -> Result<DynamicImage> {
    if input.is_empty() {
        return Err(ExtractError::invalid_input("image data is empty"));
    }
    image::load_from_memory(input).map_err(|e| ExtractError::decode("Unable to decode image", e))
}

/// Split interleaved `RGBRGB...` bytes into triples.
pub fn pixels_from_flat(bytes: &[u8]) -> Result<Vec<[u8; 3]>> {
    if bytes.is_empty() {
        return Err(ExtractError::invalid_input("pixel buffer is empty"));
    }
    if bytes.len() % 3 != 0 {
        return Err(ExtractError::invalid_input(format!(
            "pixel buffer length {} is not a multiple of 3",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

/// Flatten an image into RGB triples, dropping alpha.
///
/// With `max_side` the image is first shrunk (nearest neighbour, aspect kept)
/// so its longest side fits. With `skip_transparent` fully transparent pixels
/// are left out.
pub fn pixels_from_image(
    img: &DynamicImage,
    max_side: Option<u32>,
    skip_transparent: bool,
) -> Result<Vec<[u8; 3]>> {
    let (orig_w, orig_h) = img.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(ExtractError::invalid_input(format!(
            "image has no pixels ({orig_w}x{orig_h})"
        )));
    }

    let working: Cow<'_, DynamicImage> = match max_side {
        Some(limit) if orig_w.max(orig_h) > limit => {
            let ratio = limit as f32 / orig_w.max(orig_h) as f32;
            let w = ((orig_w as f32) * ratio).round().max(1.0) as u32;
            let h = ((orig_h as f32) * ratio).round().max(1.0) as u32;
            debug!(orig_w, orig_h, w, h, "downscaling before sampling");
            Cow::Owned(DynamicImage::ImageRgba8(image::imageops::resize(
                img,
                w,
                h,
                FilterType::Nearest,
            )))
        }
        _ => Cow::Borrowed(img),
    };

    let pixels: Vec<[u8; 3]> = if skip_transparent {
        working
            .to_rgba8()
            .pixels()
            .filter(|p| p[3] != 0)
            .map(|p| [p[0], p[1], p[2]])
            .collect()
    } else {
        working.to_rgb8().pixels().map(|p| p.0).collect()
    };

    if pixels.is_empty() {
        return Err(ExtractError::invalid_input("image is fully transparent"));
    }
    Ok(pixels)
}

/// Pixels handed to clustering, after filtering.
#[derive(Debug, Clone)]
pub struct Sample<'a> {
    pub pixels: Cow<'a, [[u8; 3]]>,
    /// Filtering removed everything and the unfiltered pixels were used
    pub used_fallback: bool,
}

impl<'a> Sample<'a> {
    /// Apply near-black/near-white filtering, falling back to the
    /// unfiltered pixels when nothing survives.
    pub fn select(pixels: &'a [[u8; 3]], filter: Option<FilterThresholds>) -> Self {
        let Some(filter) = filter else {
            return Self {
                pixels: Cow::Borrowed(pixels),
                used_fallback: false,
            };
        };

        let kept: Vec<[u8; 3]> = pixels.iter().copied().filter(|p| !filter.rejects(*p)).collect();
        debug!(
            total = pixels.len(),
            kept = kept.len(),
            low = filter.low,
            high = filter.high,
            "filtered near-black/near-white pixels"
        );

        if kept.is_empty() {
            debug!("filter removed every pixel, using unfiltered sample");
            Self {
                pixels: Cow::Borrowed(pixels),
                used_fallback: true,
            }
        } else {
            Self {
                pixels: Cow::Owned(kept),
                used_fallback: false,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}
