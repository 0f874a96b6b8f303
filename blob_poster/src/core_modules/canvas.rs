// THEORY:
// The canvas is the rendering collaborator. The generator and pipeline never
// touch pixels; they hand contours, colors, opacities and labels to something
// implementing `Canvas`, which owns one drawing surface for one render pass and
// turns it into an output (an image, an SVG document) when finalized.
//
// All coordinates handed to a canvas are in poster space (unit square, y up).
// `CanvasSize::to_device` is the single place that maps them to device space.

use crate::core_modules::geometry::{Contour, Point2D};
use crate::core_modules::palette::Color;
use crate::error::{PosterError, Result};
use serde::{Deserialize, Serialize};

/// Output size in device units (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Rejects zero-sized canvases.
    pub fn validate(self) -> Result<Self> {
        if self.width == 0 || self.height == 0 {
            return Err(PosterError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }

    /// Maps a poster-space point to device space, flipping the y axis.
    pub fn to_device(&self, p: Point2D) -> (f64, f64) {
        (p.x * self.width as f64, (1.0 - p.y) * self.height as f64)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        // 7x10 portrait at 100px per unit.
        Self::new(700, 1000)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points, relative to a 1000px tall canvas.
    pub size: f64,
    pub bold: bool,
}

/// A line of text anchored at its baseline-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub position: Point2D,
    pub text: String,
    pub style: TextStyle,
}

/// A drawing surface for one render pass.
pub trait Canvas: Sized {
    type Output;

    fn begin(size: CanvasSize, background: Color) -> Result<Self>;

    fn fill_polygon(&mut self, contour: &Contour, color: Color, alpha: f64, z_order: i32) -> Result<()>;

    fn draw_text(&mut self, label: &Label) -> Result<()>;

    fn finalize(self) -> Result<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(
            CanvasSize::new(0, 10).validate(),
            Err(PosterError::EmptyCanvas { width: 0, height: 10 })
        ));
        assert!(CanvasSize::new(1, 1).validate().is_ok());
    }

    #[test]
    fn device_mapping_flips_y() {
        let size = CanvasSize::new(700, 1000);
        assert_eq!(size.to_device(Point2D::new(0.0, 1.0)), (0.0, 0.0));
        assert_eq!(size.to_device(Point2D::new(1.0, 0.0)), (700.0, 1000.0));
        assert_eq!(size.to_device(Point2D::new(0.5, 0.25)), (350.0, 750.0));
    }
}
