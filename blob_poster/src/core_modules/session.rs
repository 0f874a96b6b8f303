// THEORY:
// A session is the state a single user accumulates while playing with a poster:
// the palette they are currently working with and the blobs they have pinned.
// It is an explicit value owned by whatever hosts the user (a web handler, a
// test), handed by reference to each render pass. Nothing here is global, so
// independent users each own an independent session.
//
// A session blob freezes a copy of its palette color when it is created.
// Regenerating the palette later leaves existing blobs untouched.

use crate::core_modules::palette::{Color, Palette, generate_palette};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lower and upper bound of a session blob's center on each axis.
pub const SESSION_CENTER_BAND: (f64, f64) = (0.1, 0.9);

/// A blob the user committed to their session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionBlob {
    pub center_x: f64,
    pub center_y: f64,
    pub color: Color,
}

/// Per-user poster state surviving across render passes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PosterSession {
    palette: Palette,
    blobs: Vec<SessionBlob>,
}

impl PosterSession {
    pub fn new<R: Rng>(palette_size: usize, rng: &mut R) -> Self {
        Self::with_palette(generate_palette(palette_size, None, rng))
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self {
            palette,
            blobs: Vec::new(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn blobs(&self) -> &[SessionBlob] {
        &self.blobs
    }

    /// Appends a blob at a random center inside [`SESSION_CENTER_BAND`] with a
    /// color taken from the current palette.
    pub fn add_random_blob<R: Rng>(&mut self, rng: &mut R) -> &SessionBlob {
        let (lo, hi) = SESSION_CENTER_BAND;
        let center_x = rng.random_range(lo..=hi);
        let center_y = rng.random_range(lo..=hi);
        let color = self.palette.choose(rng).unwrap_or(Color::NEUTRAL_GREY);
        self.blobs.push(SessionBlob {
            center_x,
            center_y,
            color,
        });
        debug!("session blob added at ({center_x:.3}, {center_y:.3}), {} total", self.blobs.len());
        &self.blobs[self.blobs.len() - 1]
    }

    /// Drops every stored blob.
    pub fn reset(&mut self) {
        debug!("session reset, dropping {} blobs", self.blobs.len());
        self.blobs.clear();
    }

    /// Replaces the palette. Stored blobs keep the colors they were created with.
    pub fn regenerate_palette<R: Rng>(&mut self, size: usize, rng: &mut R) {
        self.palette = generate_palette(size, None, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::rng::poster_rng;

    #[test]
    fn add_grows_by_one_inside_the_band() {
        let mut rng = poster_rng(Some(10));
        let mut session = PosterSession::new(6, &mut rng);
        assert!(session.blobs().is_empty());
        for expected in 1..=50 {
            let blob = *session.add_random_blob(&mut rng);
            assert_eq!(session.blobs().len(), expected);
            assert!((0.1..=0.9).contains(&blob.center_x));
            assert!((0.1..=0.9).contains(&blob.center_y));
            assert!(session.palette().colors().contains(&blob.color));
        }
    }

    #[test]
    fn reset_empties_regardless_of_length() {
        let mut rng = poster_rng(Some(2));
        let mut session = PosterSession::new(5, &mut rng);
        session.reset();
        assert!(session.blobs().is_empty());
        for _ in 0..17 {
            session.add_random_blob(&mut rng);
        }
        session.reset();
        assert!(session.blobs().is_empty());
    }

    #[test]
    fn regenerating_the_palette_keeps_frozen_colors() {
        let mut rng = poster_rng(Some(3));
        let mut session = PosterSession::new(8, &mut rng);
        let stored = *session.add_random_blob(&mut rng);
        let old_palette = session.palette().clone();
        session.regenerate_palette(8, &mut rng);
        assert_ne!(session.palette(), &old_palette);
        assert_eq!(session.blobs()[0], stored);
    }

    #[test]
    fn empty_palette_falls_back_to_grey() {
        let mut rng = poster_rng(Some(4));
        let mut session = PosterSession::with_palette(Palette::default());
        assert_eq!(session.add_random_blob(&mut rng).color, Color::NEUTRAL_GREY);
    }
}
