// THEORY:
// `SvgCanvas` writes draw instructions out as a standalone SVG document. Each
// fill becomes one `<polygon>` in call order (SVG has no z-index, document
// order is paint order) and each label a `<text>` element. The raster canvas
// renders this same document, so it is also the PNG's source of truth.

use crate::core_modules::canvas::{Canvas, CanvasSize, Label};
use crate::core_modules::geometry::Contour;
use crate::core_modules::palette::Color;
use crate::error::Result;
use std::fmt::Write;

/// Font sizes are points on a 10in tall poster at 100dpi, scaled to the real
/// canvas height.
const REFERENCE_HEIGHT: f64 = 1000.0;
const PX_PER_POINT: f64 = 100.0 / 72.0;

pub struct SvgCanvas {
    size: CanvasSize,
    body: String,
}

impl Canvas for SvgCanvas {
    type Output = String;

    fn begin(size: CanvasSize, background: Color) -> Result<Self> {
        let size = size.validate()?;
        let mut body = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            body,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = size.width,
            h = size.height,
        );
        let _ = writeln!(
            body,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            background.to_css()
        );
        Ok(Self { size, body })
    }

    fn fill_polygon(&mut self, contour: &Contour, color: Color, alpha: f64, z_order: i32) -> Result<()> {
        if contour.is_empty() {
            return Ok(());
        }
        let points = contour
            .points()
            .iter()
            .map(|&p| {
                let (x, y) = self.size.to_device(p);
                format!("{x:.2},{y:.2}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            self.body,
            r#"<polygon data-z="{z_order}" points="{points}" fill="{}" fill-opacity="{:.3}" stroke="none"/>"#,
            color.to_css(),
            alpha.clamp(0.0, 1.0),
        );
        Ok(())
    }

    fn draw_text(&mut self, label: &Label) -> Result<()> {
        let (x, y) = self.size.to_device(label.position);
        let font_size = label.style.size * PX_PER_POINT * self.size.height as f64 / REFERENCE_HEIGHT;
        let weight = if label.style.bold { "bold" } else { "normal" };
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="DejaVu Sans, Helvetica, Arial, sans-serif" font-size="{font_size:.1}" font-weight="{weight}">{}</text>"#,
            escape_xml(&label.text),
        );
        Ok(())
    }

    fn finalize(mut self) -> Result<String> {
        self.body.push_str("</svg>\n");
        Ok(self.body)
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
