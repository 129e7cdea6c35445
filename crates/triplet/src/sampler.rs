//! Triplet sampler over an identity index and an image directory.
//!
//! Addressing is by person, not by image: `sample_at(i)` targets the i-th
//! unique person. When that person cannot anchor a triplet (a single image) or
//! one of the drawn files is missing on disk, the sampler redraws with a fresh
//! uniform index, so the requested index is a starting point rather than a
//! guarantee of the returned identity.

use std::path::{Path, PathBuf};

use identity_index::{IdentityIndex, PersonId};
use image::RgbImage;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SamplerConfig;
use crate::transform::ImageTransform;
use crate::types::{SampleError, TripletSample};

/// Filenames drawn for one attempt, before touching the filesystem.
struct Draw<'a> {
    person_id: PersonId,
    negative_person_id: PersonId,
    anchor: &'a str,
    positive: &'a str,
    negative: &'a str,
}

/// Produces (anchor, positive, negative) image triplets.
///
/// Holds only immutable state. Randomness comes from the caller, so a seeded
/// RNG yields reproducible triplets (given the same files on disk).
pub struct TripletSampler {
    image_dir: PathBuf,
    index: IdentityIndex,
    transform: Option<Box<dyn ImageTransform>>,
    config: SamplerConfig,
}

impl TripletSampler {
    /// Build a sampler from an identity file with the default configuration.
    ///
    /// Only the identity file is read; the image directory is not touched.
    ///
    /// # Errors
    /// Returns an error if the identity file cannot be read or has a malformed line.
    pub fn new(
        image_dir: impl Into<PathBuf>,
        identity_file: &Path,
        transform: Option<Box<dyn ImageTransform>>,
    ) -> Result<Self, SampleError> {
        Self::with_config(image_dir, identity_file, transform, SamplerConfig::default())
    }

    /// Build a sampler from an identity file with an explicit configuration.
    pub fn with_config(
        image_dir: impl Into<PathBuf>,
        identity_file: &Path,
        transform: Option<Box<dyn ImageTransform>>,
        config: SamplerConfig,
    ) -> Result<Self, SampleError> {
        let index = IdentityIndex::from_file(identity_file, config.rewrite())?;
        Ok(Self::from_index(image_dir, index, config).with_transform(transform))
    }

    /// Build a sampler from an already parsed index.
    pub fn from_index(
        image_dir: impl Into<PathBuf>,
        index: IdentityIndex,
        config: SamplerConfig,
    ) -> Self {
        config.validate();
        let summary = index.summary();
        tracing::info!(
            persons = summary.persons,
            images = summary.images,
            single_image_persons = summary.single_image_persons,
            max_attempts = config.max_attempts,
            "TripletSampler initialized"
        );
        Self {
            image_dir: image_dir.into(),
            index,
            transform: None,
            config,
        }
    }

    /// Replace the per-image transform.
    pub fn with_transform(mut self, transform: Option<Box<dyn ImageTransform>>) -> Self {
        self.transform = transform;
        self
    }

    /// Number of unique persons; the addressable range is `[0, len)`.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &IdentityIndex {
        &self.index
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Draw a triplet starting from a uniformly random person.
    pub fn sample(&self, rng: &mut impl Rng) -> Result<TripletSample, SampleError> {
        if self.is_empty() {
            return Err(SampleError::IndexOutOfRange { index: 0, len: 0 });
        }
        let index = rng.gen_range(0..self.len());
        self.sample_at(index, rng)
    }

    /// Draw a triplet starting from the person at `index`.
    ///
    /// Single-image persons and missing files trigger a redraw with a fresh
    /// random index, up to `max_attempts` draws in total.
    ///
    /// # Errors
    /// - `IndexOutOfRange` if `index >= len()`.
    /// - `NoNegativeCandidate` if the dataset has fewer than two persons.
    /// - `Exhausted` if no draw succeeded within `max_attempts`.
    /// - `Decode` if an existing file is not a decodable image.
    pub fn sample_at(
        &self,
        index: usize,
        rng: &mut impl Rng,
    ) -> Result<TripletSample, SampleError> {
        let len = self.len();
        if index >= len {
            return Err(SampleError::IndexOutOfRange { index, len });
        }
        if len < 2 {
            return Err(SampleError::NoNegativeCandidate { persons: len });
        }

        let mut current = index;
        for attempt in 1..=self.config.max_attempts {
            if let Some(draw) = self.draw(current, rng) {
                let paths = [
                    self.image_dir.join(draw.anchor),
                    self.image_dir.join(draw.positive),
                    self.image_dir.join(draw.negative),
                ];
                match paths.iter().position(|p| !p.exists()) {
                    None => return self.load(draw, paths, attempt, rng),
                    Some(i) => {
                        tracing::warn!(path = %paths[i].display(), "Image file missing, resampling");
                    }
                }
            } else {
                tracing::debug!(
                    index = current,
                    person_id = self.index.person_ids()[current],
                    "Person has fewer than 2 images, resampling"
                );
            }
            current = rng.gen_range(0..len);
        }

        Err(SampleError::Exhausted {
            attempts: self.config.max_attempts,
        })
    }

    /// Pick filenames for the person at `index`, or `None` if that person has
    /// fewer than two images.
    fn draw(&self, index: usize, rng: &mut impl Rng) -> Option<Draw<'_>> {
        let person_ids = self.index.person_ids();
        let person_id = person_ids[index];
        let images = self.index.images_of(person_id)?;
        if images.len() < 2 {
            return None;
        }

        // Two distinct positions, uniform over ordered pairs.
        let a = rng.gen_range(0..images.len());
        let mut p = rng.gen_range(0..images.len() - 1);
        if p >= a {
            p += 1;
        }

        // Uniform over every other person: skip our own slot.
        let mut n = rng.gen_range(0..person_ids.len() - 1);
        if n >= index {
            n += 1;
        }
        let negative_person_id = person_ids[n];
        let negative: &str = self
            .index
            .images_of(negative_person_id)?
            .choose(rng)?;

        Some(Draw {
            person_id,
            negative_person_id,
            anchor: &images[a],
            positive: &images[p],
            negative,
        })
    }

    /// Decode and transform the three images of a successful draw.
    fn load(
        &self,
        draw: Draw<'_>,
        paths: [PathBuf; 3],
        attempts: usize,
        rng: &mut impl Rng,
    ) -> Result<TripletSample, SampleError> {
        let [anchor_path, positive_path, negative_path] = paths;
        let anchor = self.load_image(&anchor_path, rng)?;
        let positive = self.load_image(&positive_path, rng)?;
        let negative = self.load_image(&negative_path, rng)?;

        tracing::trace!(
            person_id = draw.person_id,
            negative_person_id = draw.negative_person_id,
            anchor = draw.anchor,
            positive = draw.positive,
            negative = draw.negative,
            attempts,
            "Sampled triplet"
        );

        Ok(TripletSample {
            person_id: draw.person_id,
            negative_person_id: draw.negative_person_id,
            anchor,
            positive,
            negative,
            anchor_path,
            positive_path,
            negative_path,
            attempts,
        })
    }

    fn load_image(&self, path: &Path, rng: &mut impl Rng) -> Result<RgbImage, SampleError> {
        let image = load_rgb(path)?;
        Ok(match &self.transform {
            Some(transform) => transform.apply(image, rng),
            None => image,
        })
    }
}

/// Decode an image file and convert it to 8-bit RGB.
fn load_rgb(path: &Path) -> Result<RgbImage, SampleError> {
    image::open(path)
        .map(|image| image.to_rgb8())
        .map_err(|source| SampleError::Decode {
            path: path.to_path_buf(),
            source,
        })
}
