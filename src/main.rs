use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use supix::{
    create_default_segmenter, run_batch, ChannelSet, FloodRelabeler, RunConfig, SegmenterOptions,
};

/// Multi-scale superpixel segmentation over a directory of images.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of images to process
    input: PathBuf,

    /// Target superpixel counts, one label map per value
    #[arg(short = 's', long = "superpixels", value_delimiter = ',', num_args = 1..)]
    superpixels: Vec<u32>,

    /// Minimum separation score (stddev times value range) for a split
    #[arg(short = 't', long, default_value_t = 0.0)]
    split_threshold: f64,

    /// Histogram bins used to score candidate splits
    #[arg(short, long, default_value_t = 32)]
    bins: u32,

    /// Minimum segment size in pixels
    #[arg(short = 'm', long = "min-size", default_value_t = 64)]
    min_size: u32,

    /// Disable the RGB channel family
    #[arg(long)]
    nrgb: bool,

    /// Disable the HSV channel family
    #[arg(long)]
    nhsv: bool,

    /// Disable the LAB channel family
    #[arg(long)]
    nlab: bool,

    /// Box-blur the channel planes before splitting
    #[arg(long)]
    blur: bool,

    /// Label CSV output directory (omit to disable)
    #[arg(short = 'o', long = "csv")]
    csv: Option<PathBuf>,

    /// Contour visualization output directory (omit to disable)
    #[arg(short = 'v', long = "vis")]
    vis: Option<PathBuf>,

    /// Prefix prepended to every output filename
    #[arg(short = 'x', long, default_value = "")]
    prefix: String,

    /// Verbose per-image and per-scale diagnostics
    #[arg(short, long)]
    wordy: bool,

    /// Treat artifact write failures as fatal
    #[arg(long)]
    strict: bool,
}

/// An empty path means the same as an omitted one: disabled.
fn dir_option(dir: Option<PathBuf>) -> Option<PathBuf> {
    dir.filter(|d| !d.as_os_str().is_empty())
}

fn build_config(args: Args) -> RunConfig {
    RunConfig {
        input_dir: args.input,
        output_dir: dir_option(args.csv),
        vis_dir: dir_option(args.vis),
        prefix: args.prefix,
        scales: args.superpixels,
        split_threshold: args.split_threshold,
        bins: args.bins,
        min_segment_size: args.min_size,
        channels: ChannelSet {
            rgb: !args.nrgb,
            hsv: !args.nhsv,
            lab: !args.nlab,
        },
        blur: args.blur,
        wordy: args.wordy,
        strict_writes: args.strict,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(args);

    // Initialize logging
    let log_level = if config.wordy {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("supix starting");
    tracing::info!("input: {}", config.input_dir.display());
    tracing::info!("scales: {:?}", config.scales);
    if let Some(dir) = &config.output_dir {
        tracing::info!("label output: {}", dir.display());
    }
    if let Some(dir) = &config.vis_dir {
        tracing::info!("visualizations: {}", dir.display());
    }

    let opts = SegmenterOptions {
        split_threshold: config.split_threshold,
        bins: config.bins,
        min_segment_size: config.min_segment_size,
        channels: config.channels,
        blur: config.blur,
    };
    let segmenter =
        create_default_segmenter(opts).context("invalid segmentation options")?;

    let summary = run_batch(&config, segmenter.as_ref(), &FloodRelabeler)
        .context("batch run failed")?;

    tracing::info!(
        "done: {} images, {} processed, {} skipped, {} write failures",
        summary.images,
        summary.processed,
        summary.skipped,
        summary.write_failures
    );

    Ok(())
}
