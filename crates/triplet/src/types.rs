use std::path::PathBuf;

use identity_index::{IndexError, PersonId};
use image::RgbImage;

/// Errors produced while building a sampler or drawing a triplet.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// The identity file could not be read or parsed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Requested index is outside `[0, len)`.
    #[error("Index {index} out of range for dataset of {len} persons")]
    IndexOutOfRange { index: usize, len: usize },

    /// Fewer than two persons exist, so no negative can be drawn.
    #[error("Need at least 2 persons to draw a negative, dataset has {persons}")]
    NoNegativeCandidate { persons: usize },

    /// Every attempt hit a single-image person or a missing file.
    #[error("No valid triplet found after {attempts} attempts")]
    Exhausted { attempts: usize },

    /// An existing image file failed to decode.
    #[error("Failed to decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// One anchor/positive/negative triplet with its source paths.
#[derive(Debug, Clone)]
pub struct TripletSample {
    /// Identity shared by anchor and positive.
    pub person_id: PersonId,
    /// Identity of the negative image.
    pub negative_person_id: PersonId,
    pub anchor: RgbImage,
    pub positive: RgbImage,
    pub negative: RgbImage,
    pub anchor_path: PathBuf,
    pub positive_path: PathBuf,
    pub negative_path: PathBuf,
    /// Number of draws it took to produce this sample (1 = no resampling).
    pub attempts: usize,
}

impl TripletSample {
    /// The three resolved paths in anchor, positive, negative order.
    pub fn paths(&self) -> [&PathBuf; 3] {
        [&self.anchor_path, &self.positive_path, &self.negative_path]
    }
}
