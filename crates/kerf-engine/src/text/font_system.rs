use std::fmt;

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// A glyph positioned by layout, in pixels relative to the layout origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacedGlyph {
    /// Raster cache key (font, glyph index, pixel size).
    pub key: GlyphRasterConfig,
    pub x: f32,
    pub y: f32,
    pub width: usize,
    pub height: usize,
}

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading, so a `FontSystem` is shared between the
/// render thread (ruler labels) and the presentation side (HUD) behind an `Arc`.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    ///
    /// Returns the `FontId` that identifies the font in draw commands.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        Ok(id)
    }

    /// Returns a reference to the underlying `fontdue::Font`, if `id` is valid.
    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// First loaded font, if any.
    pub fn primary(&self) -> Option<FontId> {
        (!self.fonts.is_empty()).then_some(FontId(0))
    }

    /// Lays out `text` (hard line breaks honored) with its top-left at `origin`.
    ///
    /// Only glyphs that produce a bitmap are returned; whitespace is skipped.
    pub fn layout(&self, text: &str, id: FontId, size: f32, origin: Vec2) -> Vec<PlacedGlyph> {
        let Some(font) = self.get(id) else {
            return Vec::new();
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: origin.x,
            y: origin.y,
            ..LayoutSettings::default()
        });
        layout.append(&[font], &TextStyle::new(text, size, 0));

        layout
            .glyphs()
            .iter()
            .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
            .map(|g| PlacedGlyph {
                key: g.key,
                x: g.x,
                y: g.y,
                width: g.width,
                height: g.height,
            })
            .collect()
    }

    /// Rasterizes one glyph into an 8-bit coverage bitmap (`width * height` bytes).
    pub fn rasterize(&self, id: FontId, key: GlyphRasterConfig) -> Option<(usize, usize, Vec<u8>)> {
        let font = self.get(id)?;
        let (metrics, bitmap) = font.rasterize_config(key);
        if metrics.width == 0 || metrics.height == 0 {
            return None;
        }
        Some((metrics.width, metrics.height, bitmap))
    }

    /// Computes the bounding box of a laid-out text string.
    ///
    /// Returns `(width, height)` in pixels. Width uses the pen position after
    /// each glyph so trailing advance is included; height covers every line.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32) -> Vec2 {
        let Some(font) = self.get(id) else {
            return Vec2::new(0.0, size * 1.2);
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, size, 0));

        let glyphs = layout.glyphs();
        if glyphs.is_empty() {
            return Vec2::new(0.0, size * 1.2);
        }

        let w = glyphs
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        let h = layout.height().max(size);
        Vec2::new(w, h)
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_bytes() {
        let mut fonts = FontSystem::new();
        assert!(fonts.load_font(b"definitely not a font").is_err());
        assert!(fonts.primary().is_none());
    }

    #[test]
    fn unknown_font_measures_as_one_line() {
        let fonts = FontSystem::new();
        let size = fonts.measure_text("MCO", FontId(3), 10.0);
        assert_eq!(size.x, 0.0);
        assert!((size.y - 12.0).abs() < 1e-6);
        assert!(fonts.layout("MCO", FontId(3), 10.0, Vec2::zero()).is_empty());
    }
}
