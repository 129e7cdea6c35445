//! TOML config loading for the triplet CLI.
//!
//! Deserializes `configs/triplet.toml` which has `[dataset]`, `[sampler]` and
//! `[transform]` sections, then merges dataset paths with CLI overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use triplet::{SamplerConfig, TransformConfig};

/// Top-level structure matching `configs/triplet.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct TripletToml {
    /// Where the identity file and images live.
    #[serde(default)]
    pub dataset: DatasetPaths,
    /// Sampler tuning (retry bound, suffix rewrite).
    #[serde(default)]
    pub sampler: SamplerConfig,
    /// Per-image preprocessing.
    #[serde(default)]
    pub transform: TransformConfig,
}

/// Dataset locations. Either may be supplied on the command line instead.
#[derive(Debug, Default, Deserialize)]
pub struct DatasetPaths {
    pub image_dir: Option<PathBuf>,
    pub identity_file: Option<PathBuf>,
}

/// Load and deserialize a `TripletToml` from a TOML file.
pub fn load_triplet_toml(path: &Path) -> anyhow::Result<TripletToml> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
    let config: TripletToml = toml::from_str(&contents)?;
    tracing::info!(path = %path.display(), "Loaded triplet config");
    Ok(config)
}

/// Load the config file if one was given, otherwise use defaults.
pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<TripletToml> {
    match path {
        Some(path) => load_triplet_toml(path),
        None => Ok(TripletToml::default()),
    }
}

/// Resolve `(image_dir, identity_file)` from TOML values and CLI flags.
///
/// Priority chain: TOML values < CLI flags. Both paths must end up set.
pub fn resolve_dataset(
    paths: &DatasetPaths,
    image_dir_cli: Option<PathBuf>,
    identity_file_cli: Option<PathBuf>,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let image_dir = image_dir_cli
        .or_else(|| paths.image_dir.clone())
        .ok_or_else(|| anyhow::anyhow!("No image directory: pass --image-dir or set dataset.image_dir"))?;
    let identity_file = identity_file_cli
        .or_else(|| paths.identity_file.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("No identity file: pass --identity-file or set dataset.identity_file")
        })?;
    Ok((image_dir, identity_file))
}
