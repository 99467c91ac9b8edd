//! Extractor configuration.
//!
//! Defaults: filter thresholds `(20, 245)`, seed 42, ten k-means runs,
//! clustering on raw RGB. Configs can be built in code or loaded from JSON:
//!
//! ```no_run
//! use palette_extractor::ExtractorConfig;
//! use std::path::Path;
//!
//! let config = ExtractorConfig::from_json_file(Path::new("extractor.json"))?;
//! # Ok::<(), palette_extractor::ExtractError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::ContrastRule;
use crate::error::{ExtractError, Result};

/// Near-black / near-white cutoffs.
///
/// A pixel is dropped when all three channels are below `low` or all three
/// are above `high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterThresholds {
    pub low: u8,
    pub high: u8,
}

impl FilterThresholds {
    /// Tight cutoffs, only removes almost pure black and white.
    pub const NARROW: FilterThresholds = FilterThresholds { low: 20, high: 245 };
    /// Wider cutoffs, also removes dark greys and off-whites.
    pub const WIDE: FilterThresholds = FilterThresholds { low: 30, high: 225 };

    pub fn rejects(&self, [r, g, b]: [u8; 3]) -> bool {
        let near_black = r < self.low && g < self.low && b < self.low;
        let near_white = r > self.high && g > self.high && b > self.high;
        near_black || near_white
    }
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self::NARROW
    }
}

/// Color space the clustering runs in. Centroids are always reported in sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "native-bin", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ClusterSpace {
    #[default]
    Rgb,
    Lab,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// `None` disables near-black/near-white filtering
    pub filter: Option<FilterThresholds>,

    /// Seed of the first k-means run; run `i` uses `seed + i`
    pub seed: u64,

    /// Number of k-means restarts, the lowest score wins
    pub runs: usize,

    pub max_iterations: usize,

    /// Convergence threshold passed to k-means, in units of the cluster space
    pub converge: f32,

    pub space: ClusterSpace,

    /// Downscale so the longest side is at most this many pixels before sampling
    pub max_side: Option<u32>,

    /// Drop fully transparent pixels before filtering
    pub skip_transparent: bool,

    pub contrast: ContrastRule,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            filter: Some(FilterThresholds::NARROW),
            seed: 42,
            runs: 10,
            max_iterations: 300,
            converge: 1e-4,
            space: ClusterSpace::Rgb,
            max_side: None,
            skip_transparent: false,
            contrast: ContrastRule::default(),
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(ExtractError::invalid_parameter("runs", self.runs));
        }
        if self.max_iterations == 0 {
            return Err(ExtractError::invalid_parameter(
                "max_iterations",
                self.max_iterations,
            ));
        }
        if !self.converge.is_finite() || self.converge < 0.0 {
            return Err(ExtractError::invalid_parameter("converge", self.converge));
        }
        if let Some(filter) = self.filter {
            if filter.low >= filter.high {
                return Err(ExtractError::invalid_parameter(
                    "filter",
                    format!("low {} >= high {}", filter.low, filter.high),
                ));
            }
        }
        if self.max_side == Some(0) {
            return Err(ExtractError::invalid_parameter("max_side", 0));
        }
        if !self.contrast.threshold.is_finite() {
            return Err(ExtractError::invalid_parameter(
                "contrast.threshold",
                self.contrast.threshold,
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::config(format!("cannot read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ExtractError::config(format!("cannot parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ExtractError::encode("config serialization failed", e))?;
        std::fs::write(path, json).map_err(|e| {
            ExtractError::config(format!("cannot write {}", path.display()), e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Brightness;

    #[test]
    fn test_filter_rejects_extremes_only() {
        let f = FilterThresholds::NARROW;
        assert!(f.rejects([0, 0, 0]));
        assert!(f.rejects([19, 19, 19]));
        assert!(!f.rejects([20, 19, 19]));
        assert!(f.rejects([250, 246, 255]));
        assert!(!f.rejects([245, 250, 250]));
        assert!(!f.rejects([0, 255, 0]));

        let wide = FilterThresholds::WIDE;
        assert!(wide.rejects([25, 25, 25]));
        assert!(wide.rejects([230, 230, 230]));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            ExtractorConfig { runs: 0, ..Default::default() },
            ExtractorConfig { max_iterations: 0, ..Default::default() },
            ExtractorConfig { converge: f32::NAN, ..Default::default() },
            ExtractorConfig {
                filter: Some(FilterThresholds { low: 200, high: 100 }),
                ..Default::default()
            },
            ExtractorConfig { max_side: Some(0), ..Default::default() },
        ];
        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(ExtractError::InvalidParameter { .. })
            ));
        }
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "seed": 7, "filter": { "low": 30, "high": 225 }, "space": "lab" }"#;
        let config: ExtractorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.filter, Some(FilterThresholds::WIDE));
        assert_eq!(config.space, ClusterSpace::Lab);
        assert_eq!(config.runs, 10);
        assert_eq!(config.contrast.formula, Brightness::Weighted);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = ExtractorConfig {
            filter: None,
            contrast: ContrastRule::integer(),
            max_side: Some(256),
            ..Default::default()
        };
        config.to_json_file(&path).unwrap();
        assert_eq!(ExtractorConfig::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ExtractorConfig::from_json_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ExtractError::Config { .. }));
    }
}
