// THEORY:
// The `pipeline` module is the top-level API of the poster engine. It wires the
// generator stages together into a single render pass:
//
//     params + session  ->  palette  ->  layout  ->  session blobs  ->  labels
//
// and produces `DrawInstructions`, a plain description of what to paint. A
// second, separate step hands those instructions to a `Canvas`.
//
// A render pass owns no lifecycle and keeps no state between calls. Hosts call
// `render` once per interaction with whatever the user's controls currently
// say; the only state that survives is the `PosterSession` the host passes in.

use crate::core_modules::canvas::{Canvas, CanvasSize, Label, TextStyle};
use crate::core_modules::contour::generate_contour_with;
use crate::core_modules::geometry::Point2D;
use crate::core_modules::layout::{Blob, BlobKind, layout_poster};
use crate::core_modules::palette::{Color, generate_palette};
use crate::core_modules::raster::RasterCanvas;
use crate::core_modules::rng::poster_rng;
use crate::core_modules::session::PosterSession;
use crate::core_modules::svg::SvgCanvas;
use crate::core_modules::utils::image_helper;
use crate::error::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export the types hosts need to drive a render pass.
pub use crate::core_modules::layout::{AlphaMode, LayoutStyle, ShadowStyle, Wobble};

const DEFAULT_LAYER_COUNT: usize = 8;
const DEFAULT_PALETTE_SIZE: usize = 6;

/// The control values for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterParams {
    /// Seed for the whole pass. `None` draws a fresh poster every time.
    pub seed: Option<u64>,
    pub layer_count: usize,
    pub wobble: Wobble,
}

impl Default for PosterParams {
    fn default() -> Self {
        Self {
            seed: None,
            layer_count: DEFAULT_LAYER_COUNT,
            wobble: Wobble::default(),
        }
    }
}

/// Configuration for the PosterPipeline. Every field has a default, so a JSON
/// file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    pub canvas: CanvasSize,
    pub background: Color,
    /// Colors generated per pass when no session supplies a palette.
    pub palette_size: usize,
    pub layout: LayoutStyle,
    pub session_blob_radius: f64,
    pub session_blob_alpha: f64,
    pub labels: Vec<Label>,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            background: Color::PAPER,
            palette_size: DEFAULT_PALETTE_SIZE,
            layout: LayoutStyle::default(),
            session_blob_radius: 0.12,
            session_blob_alpha: 0.8,
            labels: vec![
                Label {
                    position: Point2D::new(0.05, 0.95),
                    text: "Generative Poster".to_string(),
                    style: TextStyle { size: 18.0, bold: true },
                },
                Label {
                    position: Point2D::new(0.05, 0.91),
                    text: "Week 2 \u{2022} Arts & Advanced Big Data".to_string(),
                    style: TextStyle { size: 11.0, bold: false },
                },
            ],
        }
    }
}

impl PosterConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Everything a canvas needs to paint one poster, blobs in painter's order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawInstructions {
    pub canvas: CanvasSize,
    pub background: Color,
    pub blobs: Vec<Blob>,
    pub labels: Vec<Label>,
}

/// Encoded output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Svg => "image/svg+xml",
        }
    }
}

/// The main, top-level struct for the poster engine.
#[derive(Debug, Clone, Default)]
pub struct PosterPipeline {
    config: PosterConfig,
}

impl PosterPipeline {
    pub fn new(config: PosterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    /// Runs one render pass.
    pub fn render(&self, params: &PosterParams, session: Option<&PosterSession>) -> DrawInstructions {
        let mut rng = poster_rng(params.seed);

        // Stage 1: Palette
        let generated;
        let palette = match session {
            Some(session) => session.palette(),
            None => {
                generated = generate_palette(self.config.palette_size, None, &mut rng);
                &generated
            }
        };

        // Stage 2: Layers
        let mut blobs = layout_poster(
            params.layer_count,
            params.wobble,
            palette,
            &self.config.layout,
            &mut rng,
        );

        // Stage 3: Session blobs, always above the generated layers
        if let Some(session) = session {
            let base_z = self.config.layout.z_ceiling(params.layer_count);
            for (i, stored) in session.blobs().iter().enumerate() {
                let contour = generate_contour_with(
                    Point2D::new(stored.center_x, stored.center_y),
                    self.config.session_blob_radius,
                    self.config.layout.point_count,
                    params.wobble.sample(&mut rng),
                    self.config.layout.sampling,
                    &mut rng,
                );
                blobs.push(Blob {
                    contour,
                    color: stored.color,
                    alpha: self.config.session_blob_alpha,
                    z_order: base_z + i as i32,
                    layer: i,
                    kind: BlobKind::Session,
                });
            }
        }

        debug!(
            "render pass: seed={:?} layers={} blobs={}",
            params.seed,
            params.layer_count,
            blobs.len()
        );

        DrawInstructions {
            canvas: self.config.canvas,
            background: self.config.background,
            blobs,
            labels: self.config.labels.clone(),
        }
    }

    /// Paints instructions onto a fresh canvas: fills in ascending z-order,
    /// then labels on top.
    pub fn paint<C: Canvas>(&self, instructions: &DrawInstructions) -> Result<C::Output> {
        let mut canvas = C::begin(instructions.canvas, instructions.background)?;

        let mut ordered: Vec<&Blob> = instructions.blobs.iter().collect();
        ordered.sort_by_key(|blob| blob.z_order);
        for blob in ordered {
            canvas.fill_polygon(&blob.contour, blob.color, blob.alpha, blob.z_order)?;
        }
        for label in &instructions.labels {
            canvas.draw_text(label)?;
        }

        canvas.finalize()
    }

    pub fn render_png(&self, params: &PosterParams, session: Option<&PosterSession>) -> Result<Vec<u8>> {
        let instructions = self.render(params, session);
        let image = self.paint::<RasterCanvas>(&instructions)?;
        image_helper::encode_image(&image)
    }

    pub fn render_svg(&self, params: &PosterParams, session: Option<&PosterSession>) -> Result<String> {
        let instructions = self.render(params, session);
        self.paint::<SvgCanvas>(&instructions)
    }

    pub fn render_bytes(
        &self,
        params: &PosterParams,
        session: Option<&PosterSession>,
        format: OutputFormat,
    ) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Png => self.render_png(params, session),
            OutputFormat::Svg => self.render_svg(params, session).map(String::into_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn seeded(seed: u64, layer_count: usize) -> PosterParams {
        PosterParams {
            seed: Some(seed),
            layer_count,
            wobble: Wobble::Fixed(0.2),
        }
    }

    #[test]
    fn seeded_pass_is_reproducible() {
        let pipeline = PosterPipeline::default();
        let a = pipeline.render(&seeded(42, 8), None);
        let b = pipeline.render(&seeded(42, 8), None);
        assert_eq!(a, b);
        assert_ne!(a, pipeline.render(&seeded(43, 8), None));
    }

    #[test]
    fn session_blobs_sit_above_every_layer() {
        let pipeline = PosterPipeline::new(PosterConfig {
            layout: LayoutStyle::shadowed(),
            ..PosterConfig::default()
        });
        let mut rng = poster_rng(Some(1));
        let mut session = PosterSession::new(5, &mut rng);
        for _ in 0..3 {
            session.add_random_blob(&mut rng);
        }

        let out = pipeline.render(&seeded(7, 4), Some(&session));

        assert_eq!(out.blobs.len(), 4 * 2 + 3);
        assert!(out.blobs.windows(2).all(|w| w[0].z_order < w[1].z_order));
        let session_blobs: Vec<&Blob> = out.blobs.iter().filter(|b| b.kind == BlobKind::Session).collect();
        assert_eq!(session_blobs.len(), 3);
        for (blob, stored) in session_blobs.iter().zip(session.blobs()) {
            assert_eq!(blob.color, stored.color);
            assert_eq!(blob.alpha, 0.8);
        }
        let fills_use_session_palette = out
            .blobs
            .iter()
            .filter(|b| b.kind == BlobKind::Fill)
            .all(|b| session.palette().colors().contains(&b.color));
        assert!(fills_use_session_palette);
    }

    #[test]
    fn paint_orders_by_z_even_if_instructions_are_shuffled() {
        let pipeline = PosterPipeline::default();
        let mut out = pipeline.render(&seeded(3, 5), None);
        out.blobs.reverse();
        let svg = pipeline.paint::<SvgCanvas>(&out).unwrap();
        let zs: Vec<i32> = svg
            .match_indices("data-z=\"")
            .map(|(i, m)| {
                let rest = &svg[i + m.len()..];
                rest[..rest.find('"').unwrap()].parse().unwrap()
            })
            .collect();
        assert_eq!(zs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn png_has_configured_size() {
        let pipeline = PosterPipeline::new(PosterConfig {
            canvas: CanvasSize::new(140, 200),
            ..PosterConfig::default()
        });
        let bytes = pipeline.render_png(&seeded(9, 3), None).unwrap();
        let image = image::load_from_memory(&bytes).unwrap();
        assert_eq!((image.width(), image.height()), (140, 200));
    }

    #[test]
    fn config_from_partial_json() {
        let config = PosterConfig::from_json_str(
            r#"{ "palette_size": 8, "canvas": { "width": 350, "height": 500 },
                 "layout": { "radius_band": [0.2, 0.5], "shadow": { "offset": [0.01, -0.01],
                 "color": { "r": 0.0, "g": 0.0, "b": 0.0 }, "alpha": 0.3 } } }"#,
        )
        .unwrap();
        assert_eq!(config.palette_size, 8);
        assert_eq!(config.canvas, CanvasSize::new(350, 500));
        assert_eq!(config.layout.radius_band, (0.2, 0.5));
        assert_eq!(config.layout.point_count, 500);
        assert!(config.layout.shadow.is_some());
        assert_eq!(config.labels.len(), 2);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(PosterConfig::from_json_str("{ palette_size: }").is_err());
    }

    #[test]
    fn zero_layers_without_session_is_blank() {
        let out = PosterPipeline::default().render(&seeded(1, 0), None);
        assert!(out.blobs.is_empty());
        assert_eq!(out.labels.len(), 2);
    }
}
