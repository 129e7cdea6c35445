//! Subcommand implementations: index summary, triplet sampling and preview.

use std::path::PathBuf;

use identity_index::{IdentityIndex, SuffixRewrite};
use image::{imageops, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use triplet::{ImageTransform, TripletSample, TripletSampler};

use crate::config::{load_or_default, resolve_dataset};

/// Pixels of white space between images in a preview strip.
const STRIP_GAP: u32 = 4;

/// Arguments for the `summary` subcommand.
#[derive(Debug)]
pub struct SummaryArgs {
    /// Path to the identity file.
    pub identity_file: PathBuf,
    /// Skip the `.jpg` → `.png` suffix rewrite.
    pub no_rewrite: bool,
    /// Emit JSON instead of text.
    pub json: bool,
}

/// Dataset/sampler arguments shared by `sample` and `preview`.
#[derive(Debug)]
pub struct SamplerArgs {
    /// Optional TOML config.
    pub config: Option<PathBuf>,
    /// CLI override for the image directory.
    pub image_dir: Option<PathBuf>,
    /// CLI override for the identity file.
    pub identity_file: Option<PathBuf>,
    /// Person index to start from; random when absent.
    pub index: Option<usize>,
    /// RNG seed for reproducible draws.
    pub seed: Option<u64>,
}

/// Arguments for the `sample` subcommand.
#[derive(Debug)]
pub struct SampleArgs {
    pub sampler: SamplerArgs,
    /// Number of triplets to draw.
    pub count: usize,
}

/// Arguments for the `preview` subcommand.
#[derive(Debug)]
pub struct PreviewArgs {
    pub sampler: SamplerArgs,
    /// Output PNG path for the anchor | positive | negative strip.
    pub output: PathBuf,
}

/// Print statistics about an identity file.
pub fn run_summary(args: SummaryArgs) -> anyhow::Result<()> {
    let rewrite = SuffixRewrite::default();
    let rewrite = (!args.no_rewrite).then_some(&rewrite);
    let summary = IdentityIndex::from_file(&args.identity_file, rewrite)?.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("--- Identity Index Summary ---");
    println!("File: {}", args.identity_file.display());
    println!("Persons: {}", summary.persons);
    println!("Images: {}", summary.images);
    println!(
        "Persons usable as anchor: {} ({} with a single image)",
        summary.eligible_persons(),
        summary.single_image_persons
    );
    println!(
        "Images per person: min {}, max {}",
        summary.min_images_per_person, summary.max_images_per_person
    );
    Ok(())
}

/// Draw one or more triplets and print their identities and paths.
pub fn run_sample(args: SampleArgs) -> anyhow::Result<()> {
    let sampler = build_sampler(&args.sampler)?;
    let mut rng = make_rng(args.sampler.seed);

    for i in 0..args.count {
        // Only the first draw honours --index; later ones start from a random person.
        let sample = match (i, args.sampler.index) {
            (0, Some(index)) => sampler.sample_at(index, &mut rng)?,
            _ => sampler.sample(&mut rng)?,
        };
        print_sample(&sample);
    }
    Ok(())
}

/// Draw one triplet and write it as a side-by-side PNG strip.
pub fn run_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let sampler = build_sampler(&args.sampler)?;
    let mut rng = make_rng(args.sampler.seed);

    let sample = match args.sampler.index {
        Some(index) => sampler.sample_at(index, &mut rng)?,
        None => sampler.sample(&mut rng)?,
    };
    print_sample(&sample);

    let strip = compose_strip(&[&sample.anchor, &sample.positive, &sample.negative], STRIP_GAP);
    strip.save(&args.output)?;
    println!("Preview: {}", args.output.display());
    Ok(())
}

fn build_sampler(args: &SamplerArgs) -> anyhow::Result<TripletSampler> {
    let toml = load_or_default(args.config.as_deref())?;
    let (image_dir, identity_file) =
        resolve_dataset(&toml.dataset, args.image_dir.clone(), args.identity_file.clone())?;

    let transform: Option<Box<dyn ImageTransform>> = if toml.transform.is_identity() {
        None
    } else {
        Some(Box::new(toml.transform.build()))
    };

    tracing::info!(
        image_dir = %image_dir.display(),
        identity_file = %identity_file.display(),
        "Building triplet sampler"
    );
    Ok(TripletSampler::with_config(
        image_dir,
        &identity_file,
        transform,
        toml.sampler,
    )?)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_sample(sample: &TripletSample) {
    println!("Person ID: {}", sample.person_id);
    println!("Anchor:   {}", sample.anchor_path.display());
    println!("Positive: {}", sample.positive_path.display());
    println!(
        "Negative: {} (person {})",
        sample.negative_path.display(),
        sample.negative_person_id
    );
    if sample.attempts > 1 {
        println!("Attempts: {}", sample.attempts);
    }
}

/// Lay images out left to right on a white canvas, top-aligned.
fn compose_strip(images: &[&RgbImage], gap: u32) -> RgbImage {
    let gaps = gap * images.len().saturating_sub(1) as u32;
    let width = images.iter().map(|img| img.width()).sum::<u32>() + gaps;
    let height = images.iter().map(|img| img.height()).max().unwrap_or(0);

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let mut x = 0i64;
    for img in images {
        imageops::replace(&mut canvas, *img, x, 0);
        x += (img.width() + gap) as i64;
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_strip_layout() {
        let a = RgbImage::from_pixel(2, 3, Rgb([1, 0, 0]));
        let b = RgbImage::from_pixel(3, 1, Rgb([2, 0, 0]));
        let c = RgbImage::from_pixel(1, 2, Rgb([3, 0, 0]));

        let strip = compose_strip(&[&a, &b, &c], 1);
        assert_eq!(strip.dimensions(), (2 + 1 + 3 + 1 + 1, 3));
        assert_eq!(strip.get_pixel(0, 0), &Rgb([1, 0, 0]));
        assert_eq!(strip.get_pixel(2, 0), &Rgb([255, 255, 255]));
        assert_eq!(strip.get_pixel(3, 0), &Rgb([2, 0, 0]));
        assert_eq!(strip.get_pixel(3, 1), &Rgb([255, 255, 255]));
        assert_eq!(strip.get_pixel(7, 1), &Rgb([3, 0, 0]));
    }

    #[test]
    fn test_compose_strip_empty() {
        assert_eq!(compose_strip(&[], STRIP_GAP).dimensions(), (0, 0));
    }

    #[test]
    fn test_seeded_rng_repeats() {
        use rand::Rng;
        let a: u64 = make_rng(Some(3)).gen();
        let b: u64 = make_rng(Some(3)).gen();
        assert_eq!(a, b);
    }

    fn write_dataset(dir: &std::path::Path) -> (PathBuf, PathBuf) {
        let image_dir = dir.join("images");
        std::fs::create_dir(&image_dir).unwrap();
        let mut identity = String::new();
        for (i, (name, person)) in [("a", 1), ("b", 1), ("c", 2), ("d", 2)].iter().enumerate() {
            identity.push_str(&format!("{name}.jpg {person}\n"));
            RgbImage::from_pixel(5, 4, Rgb([i as u8, 0, 0]))
                .save(image_dir.join(format!("{name}.png")))
                .unwrap();
        }
        let identity_file = dir.join("identity.txt");
        std::fs::write(&identity_file, identity).unwrap();
        (image_dir, identity_file)
    }

    #[test]
    fn test_run_preview_writes_strip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (image_dir, identity_file) = write_dataset(tmp.path());
        let output = tmp.path().join("preview.png");

        run_preview(PreviewArgs {
            sampler: SamplerArgs {
                config: None,
                image_dir: Some(image_dir),
                identity_file: Some(identity_file),
                index: Some(1),
                seed: Some(0),
            },
            output: output.clone(),
        })
        .unwrap();

        let strip = image::open(&output).unwrap().to_rgb8();
        assert_eq!(strip.dimensions(), (5 * 3 + STRIP_GAP * 2, 4));
    }

    #[test]
    fn test_run_sample_with_config_transform() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (image_dir, identity_file) = write_dataset(tmp.path());
        let config = tmp.path().join("triplet.toml");
        std::fs::write(
            &config,
            format!(
                "[dataset]\nimage_dir = {:?}\nidentity_file = {:?}\n\n[transform]\nresize = [8, 8]\n",
                image_dir.display().to_string(),
                identity_file.display().to_string()
            ),
        )
        .unwrap();

        run_sample(SampleArgs {
            sampler: SamplerArgs {
                config: Some(config),
                image_dir: None,
                identity_file: None,
                index: None,
                seed: Some(1),
            },
            count: 3,
        })
        .unwrap();
    }

    #[test]
    fn test_run_sample_out_of_range() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (image_dir, identity_file) = write_dataset(tmp.path());

        let err = run_sample(SampleArgs {
            sampler: SamplerArgs {
                config: None,
                image_dir: Some(image_dir),
                identity_file: Some(identity_file),
                index: Some(10),
                seed: None,
            },
            count: 1,
        })
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_run_summary() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (_, identity_file) = write_dataset(tmp.path());
        run_summary(SummaryArgs {
            identity_file,
            no_rewrite: false,
            json: true,
        })
        .unwrap();
    }
}
