//! Sampler and transform configuration, deserializable from TOML.

use identity_index::SuffixRewrite;
use serde::Deserialize;

use crate::transform::{CenterCrop, Compose, RandomHorizontalFlip, Resize};

/// Tuning knobs for [`TripletSampler`](crate::TripletSampler).
#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    /// Upper bound on draws per sample, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Whether filenames from the identity file get their suffix rewritten.
    #[serde(default = "default_rewrite_suffix")]
    pub rewrite_suffix: bool,

    /// Suffix mapping used when `rewrite_suffix` is set.
    #[serde(default)]
    pub suffix_rewrite: SuffixRewrite,
}

fn default_max_attempts() -> usize {
    64
}
fn default_rewrite_suffix() -> bool {
    true
}

impl SamplerConfig {
    /// The active suffix rewrite, if any.
    pub fn rewrite(&self) -> Option<&SuffixRewrite> {
        self.rewrite_suffix.then_some(&self.suffix_rewrite)
    }

    /// Log a warning for settings that make sampling impossible.
    pub fn validate(&self) {
        if self.max_attempts == 0 {
            tracing::warn!("max_attempts = 0; every sample request will fail");
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            rewrite_suffix: default_rewrite_suffix(),
            suffix_rewrite: SuffixRewrite::default(),
        }
    }
}

/// Preprocessing pipeline description: crop, then resize, then random flip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformConfig {
    /// `[width, height]` of a centered crop.
    #[serde(default)]
    pub center_crop: Option<[u32; 2]>,

    /// `[width, height]` to resize to.
    #[serde(default)]
    pub resize: Option<[u32; 2]>,

    /// Probability of a horizontal flip per image.
    #[serde(default)]
    pub hflip_probability: f64,
}

impl TransformConfig {
    /// True when the pipeline would leave images untouched.
    pub fn is_identity(&self) -> bool {
        self.center_crop.is_none() && self.resize.is_none() && self.hflip_probability <= 0.0
    }

    /// Build the configured pipeline.
    pub fn build(&self) -> Compose {
        let mut compose = Compose::default();
        if let Some([width, height]) = self.center_crop {
            compose = compose.then(CenterCrop::new(width, height));
        }
        if let Some([width, height]) = self.resize {
            compose = compose.then(Resize::new(width, height));
        }
        if self.hflip_probability > 0.0 {
            compose = compose.then(RandomHorizontalFlip::new(self.hflip_probability));
        }
        compose
    }
}
