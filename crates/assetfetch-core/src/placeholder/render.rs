//! Raster backend: paints a `CanvasLayout` with the bitmap font and encodes it.

use super::font::glyph;
use super::layout::{CanvasLayout, TextLine, GLYPH_ADVANCE, GLYPH_WIDTH};
use super::{ImageEncoding, RenderError, Renderer};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Built-in renderer backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterRenderer;

fn blend(a: [u8; 3], b: [u8; 3], t: f32) -> Rgb<u8> {
    let mix = |x: u8, y: u8| (x as f32 * (1.0 - t) + y as f32 * t).round() as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}

fn draw_line(img: &mut RgbImage, line: &TextLine) {
    let color = Rgb(line.color);
    for (i, c) in line.text.chars().enumerate() {
        let origin_x = line.x + i as u32 * GLYPH_ADVANCE * line.scale;
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x0 = origin_x + col * line.scale;
                let y0 = line.y + row as u32 * line.scale;
                for dy in 0..line.scale {
                    for dx in 0..line.scale {
                        let (x, y) = (x0 + dx, y0 + dy);
                        if x < img.width() && y < img.height() {
                            img.put_pixel(x, y, color);
                        }
                    }
                }
            }
        }
    }
}

impl RasterRenderer {
    /// Paint without encoding.
    pub fn paint(&self, layout: &CanvasLayout) -> RgbImage {
        let mut img = RgbImage::new(layout.width.max(1), layout.height.max(1));
        let h = img.height() as f32;
        for (_, y, px) in img.enumerate_pixels_mut() {
            let t = (1.0 - y as f32 / h) * 0.3;
            *px = blend(layout.background, layout.accent, t);
        }
        for line in &layout.title {
            draw_line(&mut img, line);
        }
        draw_line(&mut img, &layout.watermark);
        img
    }
}

impl Renderer for RasterRenderer {
    fn render(&self, layout: &CanvasLayout, encoding: ImageEncoding) -> Result<Vec<u8>, RenderError> {
        let img = self.paint(layout);
        let format = match encoding {
            ImageEncoding::Jpeg => ImageFormat::Jpeg,
            ImageEncoding::Png => ImageFormat::Png,
        };
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format)
            .map_err(|e| RenderError::Backend(e.to_string()))?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::layout::compose;

    #[test]
    fn paints_text_in_accent_color() {
        let layout = compose("Office", "wm", 200, 100);
        let img = RasterRenderer.paint(&layout);
        let line = &layout.title[0];
        // Top-left pixel of 'O' is blank, the second column of the first row is lit.
        let lit = img.get_pixel(line.x + line.scale, line.y);
        assert_eq!(lit.0, layout.accent);
        assert_ne!(img.get_pixel(0, 0).0, layout.accent);
    }

    #[test]
    fn encodes_png_and_jpeg() {
        let layout = compose("Team Office 1", "Placeholder asset", 320, 240);
        let png = RasterRenderer.render(&layout, ImageEncoding::Png).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let jpg = RasterRenderer.render(&layout, ImageEncoding::Jpeg).unwrap();
        assert_eq!(&jpg[..2], &[0xFF, 0xD8]);
    }
}
