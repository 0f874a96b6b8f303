// THEORY:
// `RasterCanvas` produces the PNG side of a poster. It does not rasterize by
// itself: every call is recorded into an `SvgCanvas`, and `finalize` hands the
// finished document to resvg, which parses it, lays out the labels with the
// system fonts and paints the whole thing anti-aliased into a tiny-skia pixmap.
// The pixmap is then unpremultiplied into an `RgbaImage` for `image_helper`.
//
// Going through the SVG keeps both outputs identical by construction: same
// polygons, same opacities, same typography.

use crate::core_modules::canvas::{Canvas, CanvasSize, Label};
use crate::core_modules::geometry::Contour;
use crate::core_modules::palette::Color;
use crate::core_modules::svg::SvgCanvas;
use crate::error::{PosterError, Result};
use image::{Rgba, RgbaImage};
use log::debug;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use std::sync::{Arc, OnceLock};

/// System fonts, scanned once per process.
pub fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            debug!("loaded {} font faces for label rendering", db.len());
            Arc::new(db)
        })
        .clone()
}

pub struct RasterCanvas {
    size: CanvasSize,
    document: SvgCanvas,
}

impl Canvas for RasterCanvas {
    type Output = RgbaImage;

    fn begin(size: CanvasSize, background: Color) -> Result<Self> {
        let document = SvgCanvas::begin(size, background)?;
        Ok(Self { size, document })
    }

    fn fill_polygon(&mut self, contour: &Contour, color: Color, alpha: f64, z_order: i32) -> Result<()> {
        self.document.fill_polygon(contour, color, alpha, z_order)
    }

    fn draw_text(&mut self, label: &Label) -> Result<()> {
        self.document.draw_text(label)
    }

    fn finalize(self) -> Result<RgbaImage> {
        let svg = self.document.finalize()?;
        let options = usvg::Options {
            fontdb: font_database(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &options)?;

        let CanvasSize { width, height } = self.size;
        let mut pixmap = Pixmap::new(width, height).ok_or(PosterError::PixmapAlloc { width, height })?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        let mut image = RgbaImage::new(width, height);
        for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::canvas::TextStyle;
    use crate::core_modules::geometry::Point2D;

    fn square(lo: f64, hi: f64) -> Contour {
        Contour::from_points(vec![
            Point2D::new(lo, lo),
            Point2D::new(hi, lo),
            Point2D::new(hi, hi),
            Point2D::new(lo, hi),
        ])
    }

    #[test]
    fn opaque_fill_covers_inside_only() {
        let mut canvas = RasterCanvas::begin(CanvasSize::new(100, 100), Color::new(1.0, 1.0, 1.0)).unwrap();
        canvas.fill_polygon(&square(0.25, 0.75), Color::new(1.0, 0.0, 0.0), 1.0, 0).unwrap();
        let image = canvas.finalize().unwrap();
        assert_eq!(image.dimensions(), (100, 100));
        assert_eq!(image.get_pixel(50, 50).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(30, 70).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(20, 50).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(80, 50).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(5, 95).0, [255, 255, 255, 255]);
    }

    #[test]
    fn translucent_fill_blends_with_background() {
        let mut canvas = RasterCanvas::begin(CanvasSize::new(10, 10), Color::new(1.0, 1.0, 1.0)).unwrap();
        canvas.fill_polygon(&square(0.0, 1.0), Color::BLACK, 0.5, 0).unwrap();
        let image = canvas.finalize().unwrap();
        let px = image.get_pixel(5, 5).0;
        assert!((125..=130).contains(&px[0]), "{px:?}");
        assert_eq!(px[3], 255);
    }

    #[test]
    fn later_fills_draw_on_top() {
        let mut canvas = RasterCanvas::begin(CanvasSize::new(20, 20), Color::PAPER).unwrap();
        canvas.fill_polygon(&square(0.0, 1.0), Color::new(0.0, 0.0, 1.0), 1.0, 0).unwrap();
        canvas.fill_polygon(&square(0.0, 1.0), Color::new(0.0, 1.0, 0.0), 1.0, 1).unwrap();
        let image = canvas.finalize().unwrap();
        assert_eq!(image.get_pixel(10, 10).0, [0, 255, 0, 255]);
    }

    #[test]
    fn degenerate_and_offscreen_polygons_are_harmless() {
        let mut canvas = RasterCanvas::begin(CanvasSize::new(8, 8), Color::PAPER).unwrap();
        let line = Contour::from_points(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)]);
        canvas.fill_polygon(&line, Color::BLACK, 1.0, 0).unwrap();
        canvas.fill_polygon(&square(3.0, 5.0), Color::BLACK, 1.0, 1).unwrap();
        canvas.fill_polygon(&square(-2.0, 2.0), Color::BLACK, 1.0, 2).unwrap();
        let image = canvas.finalize().unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn labels_reach_the_pixels() {
        if font_database().len() == 0 {
            // Nothing to shape text with on this machine.
            return;
        }
        let size = CanvasSize::new(350, 500);
        let mut canvas = RasterCanvas::begin(size, Color::PAPER).unwrap();
        canvas
            .draw_text(&Label {
                position: Point2D::new(0.05, 0.95),
                text: "Generative Poster".to_string(),
                style: TextStyle { size: 18.0, bold: true },
            })
            .unwrap();
        let image = canvas.finalize().unwrap();
        let paper = Color::PAPER.to_rgba8(1.0);
        let inked = image.pixels().filter(|p| p.0 != paper).count();
        assert!(inked > 0, "title left no ink on the canvas");
    }

    #[test]
    fn zero_sized_canvas_fails() {
        assert!(RasterCanvas::begin(CanvasSize::new(0, 0), Color::PAPER).is_err());
    }
}
