use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use palette_extractor::{
    ChartKind, ClusterSpace, ExtractorConfig, FilterThresholds, PaletteExtractor, RenderOptions,
    json_report, render_png, text_report,
};

/// Extract the dominant colors of images with k-means.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors to extract
    #[arg(short = 'k', long, default_value_t = 5)]
    n_colors: usize,

    /// JSON extractor configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed of the first k-means run
    #[arg(long)]
    seed: Option<u64>,

    /// Near-black cutoff: pixels with every channel below it are ignored
    #[arg(long)]
    low: Option<u8>,

    /// Near-white cutoff: pixels with every channel above it are ignored
    #[arg(long)]
    high: Option<u8>,

    /// Keep near-black and near-white pixels
    #[arg(long, conflicts_with_all = ["low", "high"])]
    no_filter: bool,

    /// Color space to cluster in
    #[arg(long, value_enum)]
    space: Option<ClusterSpace>,

    /// Shrink images so the longest side is at most this before clustering
    #[arg(long)]
    max_side: Option<u32>,

    /// Palette image layout
    #[arg(long, value_enum, default_value_t = ChartKind::Strip)]
    chart: ChartKind,

    /// Palette image width (defaults depend on the chart kind)
    #[arg(long)]
    width: Option<u32>,

    /// Palette image height (defaults depend on the chart kind)
    #[arg(long)]
    height: Option<u32>,

    /// Output directory (defaults to each input's directory)
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Print a JSON document instead of the text report
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn extractor_config(&self) -> Result<ExtractorConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractorConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ExtractorConfig::default(),
        };

        if self.no_filter {
            config.filter = None;
        } else if self.low.is_some() || self.high.is_some() {
            let base = config.filter.unwrap_or_default();
            config.filter = Some(FilterThresholds {
                low: self.low.unwrap_or(base.low),
                high: self.high.unwrap_or(base.high),
            });
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(space) = self.space {
            config.space = space;
        }
        if self.max_side.is_some() {
            config.max_side = self.max_side;
        }
        Ok(config)
    }

    fn render_options(&self) -> RenderOptions {
        let defaults = RenderOptions::for_kind(self.chart);
        RenderOptions {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            ..defaults
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "palette_extractor=warn",
        1 => "palette_extractor=info",
        2 => "palette_extractor=debug",
        _ => "palette_extractor=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn output_path(input: &Path, out_dir: Option<&Path>, extension: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let dir = out_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{stem}_palette.{extension}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let extractor = PaletteExtractor::new(args.extractor_config()?)
        .context("invalid extractor configuration")?;
    let render_options = args.render_options();

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let palette = extractor
            .extract_bytes(&bytes, args.n_colors)
            .with_context(|| format!("extracting palette from {}", input.display()))?;
        tracing::info!(
            input = %input.display(),
            colors = palette.len(),
            sampled = palette.sampled_pixels,
            "palette extracted"
        );

        let report = text_report(&palette);
        if args.json {
            println!("{}", json_report(&palette, &extractor.config().contrast)?);
        } else {
            if args.inputs.len() > 1 {
                println!("{}:", input.display());
            }
            println!("{report}");
        }

        let png = render_png(&palette, &render_options).context("rendering palette image")?;
        let png_path = output_path(input, args.out_dir.as_deref(), "png");
        fs::write(&png_path, png).with_context(|| format!("writing {}", png_path.display()))?;

        let txt_path = output_path(input, args.out_dir.as_deref(), "txt");
        fs::write(&txt_path, report).with_context(|| format!("writing {}", txt_path.display()))?;

        tracing::info!(png = %png_path.display(), txt = %txt_path.display(), "saved");
    }

    Ok(())
}
