mod config;
mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pipeline::{PreviewArgs, SampleArgs, SamplerArgs, SummaryArgs};

/// celeba-triplets: inspect anchor/positive/negative sampling over CelebA.
#[derive(Parser)]
#[command(name = "celeba-triplets", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Dataset location and sampling options shared by `sample` and `preview`.
#[derive(Args)]
struct DatasetOpts {
    /// Path to a triplet config TOML file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the (suffix-rewritten) image files.
    #[arg(long)]
    image_dir: Option<PathBuf>,
    /// Path to the identity file (`<filename> <person_id>` per line).
    #[arg(long)]
    identity_file: Option<PathBuf>,
    /// Person index to start sampling from. Random when omitted.
    #[arg(long)]
    index: Option<usize>,
    /// Seed for reproducible sampling.
    #[arg(long)]
    seed: Option<u64>,
}

impl From<DatasetOpts> for SamplerArgs {
    fn from(opts: DatasetOpts) -> Self {
        SamplerArgs {
            config: opts.config,
            image_dir: opts.image_dir,
            identity_file: opts.identity_file,
            index: opts.index,
            seed: opts.seed,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Print statistics about an identity file.
    Summary {
        /// Path to the identity file.
        #[arg(long)]
        identity_file: PathBuf,
        /// Keep filenames as listed instead of rewriting `.jpg` to `.png`.
        #[arg(long)]
        no_rewrite: bool,
        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
    /// Draw triplets and print person ids and file paths.
    Sample {
        #[command(flatten)]
        dataset: DatasetOpts,
        /// Number of triplets to draw.
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Draw one triplet and save anchor | positive | negative as a PNG strip.
    Preview {
        #[command(flatten)]
        dataset: DatasetOpts,
        /// Output PNG path.
        #[arg(long, default_value = "triplet_preview.png")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Summary {
            identity_file,
            no_rewrite,
            json,
        } => pipeline::run_summary(SummaryArgs {
            identity_file,
            no_rewrite,
            json,
        }),
        Command::Sample { dataset, count } => pipeline::run_sample(SampleArgs {
            sampler: dataset.into(),
            count,
        }),
        Command::Preview { dataset, output } => pipeline::run_preview(PreviewArgs {
            sampler: dataset.into(),
            output,
        }),
    }
}
