use anyhow::{Context, bail};
use blob_poster::parallel_pipeline::ParallelPosterRenderer;
use blob_poster::{LayoutStyle, OutputFormat, PosterConfig, PosterParams, PosterPipeline, Wobble};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Renders generative blob posters to PNG or SVG files.
#[derive(Debug, Parser)]
#[command(name = "poster_render", version)]
struct Args {
    /// Seed for the render pass. Omit for a different poster every run.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of blob layers.
    #[arg(long, default_value_t = 8)]
    layers: usize,

    /// Fixed wobble for every layer. Omit to draw 0.05..0.25 per layer.
    #[arg(long)]
    wobble: Option<f64>,

    /// Layer styling.
    #[arg(long, value_enum, default_value_t = Style::Flat)]
    style: Style,

    /// Colors per palette. Overrides the config file.
    #[arg(long)]
    palette_size: Option<usize>,

    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,

    /// Output file. With --count, used as the stem for numbered files.
    #[arg(long, short, default_value = "poster.png")]
    out: PathBuf,

    /// Render this many consecutive seeds in parallel, starting at --seed.
    #[arg(long, default_value_t = 1)]
    count: u64,

    /// JSON poster config.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Style {
    /// Random opacity per layer.
    Flat,
    /// Opacity fading with depth.
    Depth,
    /// Fading opacity plus a drop shadow per layer.
    Shadow,
}

impl Style {
    fn layout(self, base: LayoutStyle) -> LayoutStyle {
        let styled = match self {
            Style::Flat => return base,
            Style::Depth => LayoutStyle::depth(),
            Style::Shadow => LayoutStyle::shadowed(),
        };
        LayoutStyle {
            alpha: styled.alpha,
            shadow: styled.shadow,
            ..base
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Png => OutputFormat::Png,
            Format::Svg => OutputFormat::Svg,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let format = OutputFormat::from(args.format);

    // --- 1. Configuration ---
    let mut config = match &args.config {
        Some(path) => PosterConfig::from_json_file(path)
            .with_context(|| format!("loading poster config from {}", path.display()))?,
        None => PosterConfig::default(),
    };
    config.layout = args.style.layout(config.layout);
    if let Some(size) = args.palette_size {
        config.palette_size = size;
    }

    let wobble = args.wobble.map(Wobble::Fixed).unwrap_or_default();
    let params = PosterParams {
        seed: args.seed,
        layer_count: args.layers,
        wobble,
    };

    // --- 2. Rendering ---
    match args.count {
        0 => bail!("--count must be at least 1"),
        1 => render_one(config, &params, format, &args.out),
        count => render_many(config, params, format, &args.out, count).await,
    }
}

fn render_one(config: PosterConfig, params: &PosterParams, format: OutputFormat, out: &Path) -> anyhow::Result<()> {
    let out = with_extension(out, format);
    let bytes = PosterPipeline::new(config)
        .render_bytes(params, None, format)
        .context("rendering poster")?;
    std::fs::write(&out, bytes).with_context(|| format!("writing {}", out.display()))?;
    info!("poster written to {}", out.display());
    Ok(())
}

async fn render_many(
    config: PosterConfig,
    params: PosterParams,
    format: OutputFormat,
    out: &Path,
    count: u64,
) -> anyhow::Result<()> {
    let first_seed = match params.seed {
        Some(seed) => seed,
        None => {
            warn!("no --seed given for a batch, starting at 1");
            1
        }
    };
    let batch: Vec<PosterParams> = (first_seed..first_seed.saturating_add(count))
        .map(|seed| PosterParams {
            seed: Some(seed),
            ..params.clone()
        })
        .collect();

    let renderer = ParallelPosterRenderer::new(config);
    let mut written = 0usize;
    for result in renderer.render_batch(batch, format).await {
        let poster = result.context("rendering poster batch")?;
        let seed = poster.params.seed.unwrap_or(first_seed);
        let path = numbered(out, seed, format);
        std::fs::write(&path, &poster.bytes).with_context(|| format!("writing {}", path.display()))?;
        written += 1;
    }
    info!("{written} posters written next to {}", out.display());
    Ok(())
}

fn with_extension(out: &Path, format: OutputFormat) -> PathBuf {
    out.with_extension(format.extension())
}

/// `dir/poster.png` + seed 7 -> `dir/poster-7.png`.
fn numbered(out: &Path, seed: u64, format: OutputFormat) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "poster".to_string());
    out.with_file_name(format!("{stem}-{seed}.{}", format.extension()))
}
