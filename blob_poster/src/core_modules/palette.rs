// THEORY:
// A palette is the small, fixed-size set of candidate colors a poster draws
// its fills from. Colors are plain RGB triples; opacity is not part of a color
// and is decided per draw call by the layout.
//
// Generation is deliberately naive: every channel is an independent uniform
// draw in [0,1). A seed, when given, makes the palette reproducible without
// disturbing the caller's generator.

use crate::core_modules::rng::poster_rng;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// An RGB color with channels in [0,1]. Alpha is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const NEAR_BLACK: Color = Color::new(0.05, 0.05, 0.05);
    pub const PAPER: Color = Color::new(0.98, 0.98, 0.97);
    pub const NEUTRAL_GREY: Color = Color::new(0.5, 0.5, 0.5);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Draws one color, channels in r, g, b order.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let r = rng.random::<f64>();
        let g = rng.random::<f64>();
        let b = rng.random::<f64>();
        Self { r, g, b }
    }

    /// 8-bit channels, clamped to the displayable range.
    pub fn to_rgb8(&self) -> [u8; 3] {
        [channel_to_u8(self.r), channel_to_u8(self.g), channel_to_u8(self.b)]
    }

    pub fn to_rgba8(&self, alpha: f64) -> [u8; 4] {
        let [r, g, b] = self.to_rgb8();
        [r, g, b, channel_to_u8(alpha)]
    }

    /// CSS functional notation, e.g. `rgb(250,250,247)`.
    pub fn to_css(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("rgb({r},{g},{b})")
    }
}

fn channel_to_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// An ordered set of candidate fill colors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn from_colors(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Picks a color uniformly, with replacement. `None` for an empty palette.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<Color> {
        self.colors.choose(rng).copied()
    }
}

/// Generates `k` random colors.
///
/// With `Some(seed)` a freshly seeded generator is used and `rng` is not
/// advanced, so the same `(k, seed)` always yields the same palette. With
/// `None` the colors are drawn from `rng` in its current state.
pub fn generate_palette<R: Rng>(k: usize, seed: Option<u64>, rng: &mut R) -> Palette {
    match seed {
        Some(seed) => fill_palette(k, &mut poster_rng(Some(seed))),
        None => fill_palette(k, rng),
    }
}

fn fill_palette<R: Rng>(k: usize, rng: &mut R) -> Palette {
    Palette {
        colors: (0..k).map(|_| Color::random(rng)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::rng::poster_rng;

    #[test]
    fn palette_has_exactly_k_colors_in_unit_range() {
        let mut rng = poster_rng(Some(3));
        for k in [0usize, 1, 5, 6, 8, 64] {
            let palette = generate_palette(k, None, &mut rng);
            assert_eq!(palette.len(), k);
            for c in palette.colors() {
                for channel in [c.r, c.g, c.b] {
                    assert!((0.0..1.0).contains(&channel), "channel {channel} out of range");
                }
            }
        }
    }

    #[test]
    fn zero_colors_is_an_empty_palette() {
        let mut rng = poster_rng(Some(3));
        assert!(generate_palette(0, Some(9), &mut rng).is_empty());
    }

    #[test]
    fn seeded_palette_is_reproducible() {
        let mut rng = poster_rng(None);
        let first = generate_palette(3, Some(42), &mut rng);
        let second = generate_palette(3, Some(42), &mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn seeded_palette_leaves_caller_rng_untouched() {
        let mut used = poster_rng(Some(11));
        let mut untouched = poster_rng(Some(11));
        let _ = generate_palette(8, Some(42), &mut used);
        assert_eq!(used.random::<u64>(), untouched.random::<u64>());
    }

    #[test]
    fn unseeded_palette_advances_caller_rng() {
        let mut rng = poster_rng(Some(5));
        let a = generate_palette(4, None, &mut rng);
        let b = generate_palette(4, None, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn choose_from_empty_palette_is_none() {
        let mut rng = poster_rng(Some(1));
        assert!(Palette::default().choose(&mut rng).is_none());
    }

    #[test]
    fn css_and_rgba_conversions_clamp() {
        let color = Color::new(1.2, 0.0, 0.5);
        assert_eq!(color.to_css(), "rgb(255,0,128)");
        assert_eq!(color.to_rgba8(-1.0), [255, 0, 128, 0]);
    }
}
