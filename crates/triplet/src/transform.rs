//! Image transforms applied to each image of a triplet.
//!
//! A transform may be random (e.g. flips). It receives the sampler's RNG so that
//! anchor, positive and negative draw independent parameters while a seeded RNG
//! still reproduces the whole triplet.

use image::imageops::{self, FilterType};
use image::RgbImage;
use rand::{Rng, RngCore};

/// An opaque image → image operation.
pub trait ImageTransform: Send + Sync {
    fn apply(&self, image: RgbImage, rng: &mut dyn RngCore) -> RgbImage;
}

impl<F> ImageTransform for F
where
    F: Fn(RgbImage) -> RgbImage + Send + Sync,
{
    fn apply(&self, image: RgbImage, _rng: &mut dyn RngCore) -> RgbImage {
        self(image)
    }
}

/// Resize to a fixed size, ignoring aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
    pub filter: FilterType,
}

impl Resize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: FilterType::Triangle,
        }
    }
}

impl ImageTransform for Resize {
    fn apply(&self, image: RgbImage, _rng: &mut dyn RngCore) -> RgbImage {
        if image.dimensions() == (self.width, self.height) {
            return image;
        }
        imageops::resize(&image, self.width, self.height, self.filter)
    }
}

/// Crop a centered window. The window is clamped to the image bounds.
#[derive(Debug, Clone, Copy)]
pub struct CenterCrop {
    pub width: u32,
    pub height: u32,
}

impl CenterCrop {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ImageTransform for CenterCrop {
    fn apply(&self, image: RgbImage, _rng: &mut dyn RngCore) -> RgbImage {
        let (w, h) = image.dimensions();
        let crop_w = self.width.min(w);
        let crop_h = self.height.min(h);
        if (crop_w, crop_h) == (w, h) {
            return image;
        }
        let x = (w - crop_w) / 2;
        let y = (h - crop_h) / 2;
        imageops::crop_imm(&image, x, y, crop_w, crop_h).to_image()
    }
}

/// Mirror the image left-right with probability `p`.
#[derive(Debug, Clone, Copy)]
pub struct RandomHorizontalFlip {
    pub p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Self {
        Self { p: p.clamp(0.0, 1.0) }
    }
}

impl ImageTransform for RandomHorizontalFlip {
    fn apply(&self, image: RgbImage, rng: &mut dyn RngCore) -> RgbImage {
        if rng.gen_bool(self.p) {
            imageops::flip_horizontal(&image)
        } else {
            image
        }
    }
}

/// Apply a sequence of transforms in order.
#[derive(Default)]
pub struct Compose {
    steps: Vec<Box<dyn ImageTransform>>,
}

impl Compose {
    pub fn new(steps: Vec<Box<dyn ImageTransform>>) -> Self {
        Self { steps }
    }

    /// Append a step.
    pub fn then(mut self, step: impl ImageTransform + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl ImageTransform for Compose {
    fn apply(&self, image: RgbImage, rng: &mut dyn RngCore) -> RgbImage {
        self.steps
            .iter()
            .fold(image, |image, step| step.apply(image, rng))
    }
}
