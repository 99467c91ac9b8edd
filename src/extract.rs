//! Dominant color extraction.
//!
//! Pixels are filtered (see [`Sample::select`]), clustered with k-means and
//! each cluster becomes a [`PaletteEntry`] carrying its mean color and the
//! share of sampled pixels assigned to it. Entries come back sorted by
//! coverage, largest first.

use image::DynamicImage;
use kmeans_colors::{Calculate, Kmeans, get_kmeans};
use palette::{FromColor, Lab, Srgb};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::color::{ContrastRule, Rgb8, TextColor};
use crate::config::{ClusterSpace, ExtractorConfig};
use crate::error::{ExtractError, Result};
use crate::sample::{self, Sample};

/// Cluster indices are stored as `u8` by the k-means implementation.
pub const MAX_COLORS: usize = u8::MAX as usize;

/// A representative color and the share of sampled pixels it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Mean color of the cluster, sRGB channels on the 0-255 scale
    pub rgb: [f32; 3],
    /// Coverage in percent, 0-100
    pub percentage: f32,
    pub pixel_count: usize,
}

impl PaletteEntry {
    pub fn rgb8(&self) -> Rgb8 {
        Rgb8::from_f32(self.rgb)
    }

    pub fn hex(&self) -> String {
        self.rgb8().to_hex()
    }

    pub fn text_color(&self, rule: &ContrastRule) -> TextColor {
        rule.text_color(self.rgb)
    }
}

/// Extraction result: exactly k entries in descending coverage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub entries: Vec<PaletteEntry>,
    /// Pixels that took part in clustering (after filtering)
    pub sampled_pixels: usize,
    /// Filtering removed every pixel and the unfiltered set was clustered
    pub used_fallback: bool,
}

impl Palette {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.entries.iter()
    }

    pub fn dominant(&self) -> Option<&PaletteEntry> {
        self.entries.first()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

struct Cluster {
    centroid: [f32; 3],
    count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PaletteExtractor {
    config: ExtractorConfig,
}

impl PaletteExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract `n_colors` dominant colors from RGB triples.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `pixels` is empty, `InvalidParameter` when
    /// `n_colors` is zero, above [`MAX_COLORS`] or above the pixel count.
    pub fn extract(&self, pixels: &[[u8; 3]], n_colors: usize) -> Result<Palette> {
        if pixels.is_empty() {
            return Err(ExtractError::invalid_input("image has no pixels"));
        }
        check_n_colors(n_colors, pixels.len())?;

        let sample = Sample::select(pixels, self.config.filter);
        let clusters = self.cluster(&sample.pixels, n_colors)?;

        let total = sample.len() as f64;
        let mut entries: Vec<PaletteEntry> = clusters
            .into_iter()
            .map(|c| PaletteEntry {
                rgb: c.centroid,
                percentage: (c.count as f64 / total * 100.0) as f32,
                pixel_count: c.count,
            })
            .collect();
        // stable: equal coverage keeps cluster order
        entries.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));

        debug!(
            n_colors,
            sampled = sample.len(),
            fallback = sample.used_fallback,
            "palette extracted"
        );

        Ok(Palette {
            entries,
            sampled_pixels: sample.len(),
            used_fallback: sample.used_fallback,
        })
    }

    /// Extract from interleaved `RGBRGB...` bytes.
    pub fn extract_flat(&self, bytes: &[u8], n_colors: usize) -> Result<Palette> {
        let pixels = sample::pixels_from_flat(bytes)?;
        self.extract(&pixels, n_colors)
    }

    pub fn extract_image(&self, img: &DynamicImage, n_colors: usize) -> Result<Palette> {
        let pixels =
            sample::pixels_from_image(img, self.config.max_side, self.config.skip_transparent)?;
        self.extract(&pixels, n_colors)
    }

    /// Decode an encoded image (PNG, JPEG, ...) and extract from it.
    pub fn extract_bytes(&self, input: &[u8], n_colors: usize) -> Result<Palette> {
        let img = sample::decode(input)?;
        self.extract_image(&img, n_colors)
    }

    fn cluster(&self, pixels: &[[u8; 3]], k: usize) -> Result<Vec<Cluster>> {
        if let Some(clusters) = exact_clusters(pixels, k) {
            debug!(
                distinct = clusters.iter().filter(|c| c.count > 0).count(),
                k,
                "few distinct colors, skipping k-means"
            );
            return Ok(clusters);
        }

        let (centroids, indices) = match self.config.space {
            ClusterSpace::Rgb => {
                let buf: Vec<Srgb> = pixels
                    .iter()
                    .map(|&[r, g, b]| Srgb::new(r, g, b).into_format())
                    .collect();
                let result = self.best_of_runs(&buf, k)?;
                let centroids: Vec<[f32; 3]> = result
                    .centroids
                    .iter()
                    .map(|c| to_channels(*c))
                    .collect();
                (centroids, result.indices)
            }
            ClusterSpace::Lab => {
                let buf: Vec<Lab> = pixels
                    .iter()
                    .map(|&[r, g, b]| Lab::from_color(Srgb::new(r, g, b).into_format::<f32>()))
                    .collect();
                let result = self.best_of_runs(&buf, k)?;
                let centroids: Vec<[f32; 3]> = result
                    .centroids
                    .iter()
                    .map(|&lab| to_channels(Srgb::from_color(lab)))
                    .collect();
                (centroids, result.indices)
            }
        };

        let mut counts = vec![0usize; centroids.len()];
        for &idx in &indices {
            counts[idx as usize] += 1;
        }

        Ok(centroids
            .into_iter()
            .zip(counts)
            .map(|(centroid, count)| Cluster { centroid, count })
            .collect())
    }

    /// Run k-means `runs` times with consecutive seeds, keep the lowest score.
    fn best_of_runs<C: Calculate + Clone>(&self, buf: &[C], k: usize) -> Result<Kmeans<C>> {
        (0..self.config.runs)
            .map(|run| {
                let seed = self.config.seed.wrapping_add(run as u64);
                let result = get_kmeans(
                    k,
                    self.config.max_iterations,
                    self.config.converge,
                    false,
                    buf,
                    seed,
                );
                trace!(run, seed, score = result.score, "k-means run finished");
                result
            })
            .min_by(|a, b| a.score.total_cmp(&b.score))
            .ok_or_else(|| ExtractError::invalid_parameter("runs", self.config.runs))
    }
}

/// Extract with the default configuration.
pub fn extract_palette(pixels: &[[u8; 3]], n_colors: usize) -> Result<Palette> {
    PaletteExtractor::default().extract(pixels, n_colors)
}

fn check_n_colors(n_colors: usize, pixel_count: usize) -> Result<()> {
    if n_colors == 0 || n_colors > MAX_COLORS {
        return Err(ExtractError::invalid_parameter("n_colors", n_colors));
    }
    if n_colors > pixel_count {
        return Err(ExtractError::invalid_parameter(
            "n_colors",
            format!("{n_colors} (image has {pixel_count} pixels)"),
        ));
    }
    Ok(())
}

/// When the sample holds at most `k` distinct colors each one is its own
/// cluster; the rest of the k slots are zero-coverage repeats.
fn exact_clusters(pixels: &[[u8; 3]], k: usize) -> Option<Vec<Cluster>> {
    let mut distinct: Vec<([u8; 3], usize)> = Vec::with_capacity(k);
    for &px in pixels {
        match distinct.iter().position(|(c, _)| *c == px) {
            Some(i) => distinct[i].1 += 1,
            None if distinct.len() < k => distinct.push((px, 1)),
            None => return None,
        }
    }

    let mut clusters: Vec<Cluster> = distinct
        .iter()
        .map(|&(c, count)| Cluster {
            centroid: c.map(f32::from),
            count,
        })
        .collect();
    for i in 0..k - distinct.len() {
        let (c, _) = distinct[i % distinct.len()];
        clusters.push(Cluster {
            centroid: c.map(f32::from),
            count: 0,
        });
    }
    Some(clusters)
}

fn to_channels(c: Srgb) -> [f32; 3] {
    [c.red, c.green, c.blue].map(|v| {
        if v.is_finite() { (v * 255.0).clamp(0.0, 255.0) } else { 0.0 }
    })
}
