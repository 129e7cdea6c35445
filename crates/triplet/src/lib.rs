//! Triplet sampling for face metric learning.
//!
//! Draws (anchor, positive, negative) image triplets from an identity index:
//! anchor and positive are two distinct images of one person, the negative is
//! an image of someone else. Images are decoded to RGB and optionally passed
//! through an [`ImageTransform`] before being handed to the caller.

pub mod config;
pub mod sampler;
pub mod transform;
pub mod types;

pub use config::{SamplerConfig, TransformConfig};
pub use sampler::TripletSampler;
pub use transform::{CenterCrop, Compose, ImageTransform, RandomHorizontalFlip, Resize};
pub use types::{SampleError, TripletSample};
