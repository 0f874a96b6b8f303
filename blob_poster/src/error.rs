use thiserror::Error;

/// Failures at the edges of the crate: canvases, encoding, files and workers.
/// Generating palettes, contours and layouts never fails.
#[derive(Debug, Error)]
pub enum PosterError {
    #[error("canvas must have a non-zero size, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("could not allocate a {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("svg document rejected by the rasterizer: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid poster config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("render worker pool: {0}")]
    WorkerPool(&'static str),
}

pub type Result<T> = std::result::Result<T, PosterError>;
