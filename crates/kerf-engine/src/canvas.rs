//! CPU raster the presentation side composes onto.
//!
//! Pixels are premultiplied RGBA8 in an [`RgbaImage`], top-left origin. Every
//! drawing operation blends with `src + dst * (1 - src.a)` and clips to the
//! canvas.

use image::{ImageBuffer, Rgba, RgbaImage, imageops};

use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::{FontId, FontSystem};

#[derive(Debug, Clone, Default)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The backing image, e.g. for encoding to a file.
    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Resizes the canvas; contents are cleared to transparent when the size changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.image.dimensions() {
            return;
        }
        self.image = RgbaImage::new(width, height);
    }

    pub fn clear(&mut self, color: Color) {
        let px = Rgba(color.to_rgba8());
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    /// Returns the premultiplied RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Copies a tightly packed RGBA8 image to the top-left corner, replacing
    /// existing pixels. Parts outside the canvas are dropped, and so is a
    /// source shorter than its dimensions.
    pub fn blit(&mut self, src: &[u8], src_width: u32, src_height: u32) {
        let Some(src) = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(src_width, src_height, src) else {
            return;
        };
        imageops::replace(&mut self.image, &src, 0, 0);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else { return };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    /// Fills a rounded rectangle with anti-aliased corners.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        let r = rect.normalized();
        let radius = radius.clamp(0.0, r.size.x.min(r.size.y) * 0.5);
        if radius <= 0.0 {
            self.fill_rect(r, color);
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(r) else { return };

        let c = r.center();
        let half = Vec2::new(r.size.x * 0.5 - radius, r.size.y * 0.5 - radius);

        for y in y0..y1 {
            for x in x0..x1 {
                // Signed distance from the pixel center to the rounded box.
                let px = (x as f32 + 0.5 - c.x).abs() - half.x;
                let py = (y as f32 + 0.5 - c.y).abs() - half.y;
                let outside = (px.max(0.0).powi(2) + py.max(0.0).powi(2)).sqrt();
                let inside = px.max(py).min(0.0);
                let dist = outside + inside - radius;
                let coverage = (0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    /// Draws `text` with its layout box top-left at `origin`.
    pub fn draw_text(
        &mut self,
        fonts: &FontSystem,
        font: FontId,
        size: f32,
        origin: Vec2,
        color: Color,
        text: &str,
    ) {
        for glyph in fonts.layout(text, font, size, origin) {
            let Some((w, h, bitmap)) = fonts.rasterize(font, glyph.key) else { continue };
            let gx = glyph.x.round() as i64;
            let gy = glyph.y.round() as i64;

            for row in 0..h {
                let y = gy + row as i64;
                if y < 0 || y >= self.height() as i64 {
                    continue;
                }
                for col in 0..w {
                    let x = gx + col as i64;
                    if x < 0 || x >= self.width() as i64 {
                        continue;
                    }
                    let coverage = bitmap[row * w + col];
                    if coverage > 0 {
                        self.blend(x as u32, y as u32, color, coverage as f32 / 255.0);
                    }
                }
            }
        }
    }

    // ── helpers ───────────────────────────────────────────────────────────

    /// Pixel span covered by `rect` after clipping, as `(x0, y0, x1, y1)` half-open.
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let r = rect.normalized();
        if r.is_empty() || !r.origin.is_finite() || !r.size.is_finite() {
            return None;
        }
        let max = r.max();
        let (w, h) = (self.width() as f32, self.height() as f32);
        let x0 = r.origin.x.round().clamp(0.0, w) as u32;
        let y0 = r.origin.y.round().clamp(0.0, h) as u32;
        let x1 = max.x.round().clamp(0.0, w) as u32;
        let y1 = max.y.round().clamp(0.0, h) as u32;
        (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
    }

    /// `(x, y)` must be inside the canvas.
    #[inline]
    fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let src = [color.r, color.g, color.b, color.a].map(|v| v * coverage);
        let inv = 1.0 - src[3];
        let dst = self.image.get_pixel_mut(x, y);
        for (d, s) in dst.0.iter_mut().zip(src) {
            let out = s + (*d as f32 / 255.0) * inv;
            *d = (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        }
    }
}
