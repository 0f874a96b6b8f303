// THEORY:
// This file is the main entry point for the `blob_poster` library crate.
//
// The public surface is the `PosterPipeline` (one render pass: params and an
// optional session in, draw instructions out) together with the canvases that
// turn instructions into PNG or SVG output, and the `ParallelPosterRenderer`
// for rendering batches. The generator stages themselves (palette, contour,
// layout, session) live in `core_modules` and are public too, so hosts can use
// them piecemeal.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::canvas::{Canvas, CanvasSize, Label, TextStyle};
pub use core_modules::contour::{AngularSampling, generate_contour, generate_contour_with};
pub use core_modules::geometry::{Contour, Point2D};
pub use core_modules::layout::{Blob, BlobKind, layout_poster, layout_poster_seeded};
pub use core_modules::palette::{Color, Palette, generate_palette};
pub use core_modules::raster::RasterCanvas;
pub use core_modules::rng::{PosterRng, poster_rng};
pub use core_modules::session::{PosterSession, SessionBlob};
pub use core_modules::svg::SvgCanvas;
pub use error::PosterError;
pub use pipeline::{
    AlphaMode, DrawInstructions, LayoutStyle, OutputFormat, PosterConfig, PosterParams, PosterPipeline,
    ShadowStyle, Wobble,
};
