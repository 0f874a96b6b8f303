// THEORY:
// The layout stage turns a palette and a handful of knobs into an ordered list
// of draw instructions. It is the poster's composition step: every layer gets a
// random center, a random radius from a fixed band, a wobbly outline, a color
// picked from the palette and an opacity.
//
// Key principles:
// 1.  **Painter's order**: blobs come out sorted by ascending z-order. Later
//     entries are drawn on top of earlier ones.
// 2.  **Optional depth**: opacity can fade with the layer index, and every
//     layer can be preceded by a dark, offset copy of itself acting as a drop
//     shadow.
// 3.  **Ephemeral output**: a `Blob` is regenerated on every render pass and is
//     never stored.

use crate::core_modules::contour::{AngularSampling, generate_contour_with};
use crate::core_modules::geometry::{Contour, Point2D};
use crate::core_modules::palette::{Color, Palette};
use crate::core_modules::rng::poster_rng;
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a blob represents on the poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobKind {
    /// The main fill of a generated layer.
    Fill,
    /// The offset, near-black duplicate drawn under a fill.
    Shadow,
    /// A blob the user added to their session.
    Session,
}

/// A single draw instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub contour: Contour,
    pub color: Color,
    pub alpha: f64,
    pub z_order: i32,
    /// Index of the layer (or session entry) this blob belongs to.
    pub layer: usize,
    pub kind: BlobKind,
}

/// The wobble amplitude applied to each layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wobble {
    Fixed(f64),
    /// Drawn uniformly per layer.
    Random { min: f64, max: f64 },
}

impl Default for Wobble {
    fn default() -> Self {
        Wobble::Random { min: 0.05, max: 0.25 }
    }
}

impl From<f64> for Wobble {
    fn from(value: f64) -> Self {
        Wobble::Fixed(value)
    }
}

impl Wobble {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            Wobble::Fixed(value) => value,
            Wobble::Random { min, max } => uniform(rng, min, max),
        }
    }
}

/// How opacity is assigned to layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlphaMode {
    Fixed(f64),
    Random { min: f64, max: f64 },
    /// `max(base - layer * step, floor)`: earlier layers are more opaque.
    Depth { base: f64, step: f64, floor: f64 },
}

impl Default for AlphaMode {
    fn default() -> Self {
        AlphaMode::Random { min: 0.25, max: 0.6 }
    }
}

impl AlphaMode {
    pub const DEPTH: AlphaMode = AlphaMode::Depth {
        base: 0.85,
        step: 0.06,
        floor: 0.1,
    };

    pub fn alpha_for<R: Rng>(&self, layer: usize, rng: &mut R) -> f64 {
        match *self {
            AlphaMode::Fixed(alpha) => alpha,
            AlphaMode::Random { min, max } => uniform(rng, min, max),
            AlphaMode::Depth { base, step, floor } => (base - layer as f64 * step).max(floor),
        }
    }
}

/// A dark duplicate drawn under every fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowStyle {
    /// Translation in poster space (y up).
    pub offset: (f64, f64),
    pub color: Color,
    pub alpha: f64,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            offset: (0.012, -0.012),
            color: Color::NEAR_BLACK,
            alpha: 0.22,
        }
    }
}

/// Tunable composition parameters shared by every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    /// Inclusive band the base radius is drawn from.
    pub radius_band: (f64, f64),
    pub point_count: usize,
    pub sampling: AngularSampling,
    pub alpha: AlphaMode,
    pub shadow: Option<ShadowStyle>,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            radius_band: (0.15, 0.45),
            point_count: 500,
            sampling: AngularSampling::default(),
            alpha: AlphaMode::default(),
            shadow: None,
        }
    }
}

impl LayoutStyle {
    /// Fading opacity by layer index.
    pub fn depth() -> Self {
        Self {
            alpha: AlphaMode::DEPTH,
            ..Self::default()
        }
    }

    /// Fading opacity plus a drop shadow under every layer.
    pub fn shadowed() -> Self {
        Self {
            alpha: AlphaMode::DEPTH,
            shadow: Some(ShadowStyle::default()),
            ..Self::default()
        }
    }

    /// Z-order of the fill of layer `i`.
    pub fn fill_z(&self, layer: usize) -> i32 {
        match self.shadow {
            Some(_) => 2 * layer as i32 + 1,
            None => layer as i32,
        }
    }

    /// One past the highest z-order `layer_count` layers can occupy.
    pub fn z_ceiling(&self, layer_count: usize) -> i32 {
        match layer_count {
            0 => 0,
            n => self.fill_z(n - 1) + 1,
        }
    }
}

/// Lays out `layer_count` blobs, ordered by ascending z-order.
///
/// Layers are skipped when the palette is empty, since there is no color to
/// fill them with.
pub fn layout_poster<R: Rng>(
    layer_count: usize,
    wobble: Wobble,
    palette: &Palette,
    style: &LayoutStyle,
    rng: &mut R,
) -> Vec<Blob> {
    if palette.is_empty() && layer_count > 0 {
        warn!("empty palette, skipping {layer_count} layers");
        return Vec::new();
    }

    let per_layer = if style.shadow.is_some() { 2 } else { 1 };
    let mut blobs = Vec::with_capacity(layer_count * per_layer);

    for layer in 0..layer_count {
        let center = Point2D::new(rng.random(), rng.random());
        let (lo, hi) = style.radius_band;
        let radius = uniform(rng, lo, hi);
        let layer_wobble = wobble.sample(rng);
        let contour = generate_contour_with(
            center,
            radius,
            style.point_count,
            layer_wobble,
            style.sampling,
            rng,
        );
        let Some(color) = palette.choose(rng) else {
            break;
        };
        let alpha = style.alpha.alpha_for(layer, rng);
        let z_order = style.fill_z(layer);

        if let Some(shadow) = &style.shadow {
            blobs.push(Blob {
                contour: contour.translated(shadow.offset.0, shadow.offset.1),
                color: shadow.color,
                alpha: shadow.alpha,
                z_order: z_order - 1,
                layer,
                kind: BlobKind::Shadow,
            });
        }

        blobs.push(Blob {
            contour,
            color,
            alpha,
            z_order,
            layer,
            kind: BlobKind::Fill,
        });
    }

    blobs
}

/// [`layout_poster`] with its own generator, seeded from `rng_seed` or from
/// entropy when absent.
pub fn layout_poster_seeded(
    layer_count: usize,
    wobble: Wobble,
    palette: &Palette,
    style: &LayoutStyle,
    rng_seed: Option<u64>,
) -> Vec<Blob> {
    layout_poster(layer_count, wobble, palette, style, &mut poster_rng(rng_seed))
}

/// Uniform in `[min, max]`, tolerating reversed or empty bounds.
fn uniform<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + (max - min) * rng.random::<f64>()
}
