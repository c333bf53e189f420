use kerf_engine::canvas::Canvas;
use kerf_engine::paint::Color;

use crate::config::Padding;
use crate::scene::ColorScheme;

use super::compose::{FixedMeasure, FontMeasure, HudBox, HudInput, TextMeasure, error_box, layout_hud};

const CORNER_RADIUS: f32 = 7.0;
const PANEL_ALPHA: u8 = 100;

/// Paints HUD boxes and error panels onto the presentation canvas.
pub struct HudPainter {
    font: Option<FontMeasure>,
    fallback: FixedMeasure,
}

impl HudPainter {
    /// Without a font, boxes are still laid out and filled but carry no text.
    pub fn new(font: Option<FontMeasure>, size: f32) -> Self {
        Self {
            font,
            fallback: FixedMeasure::for_size(size),
        }
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        match &self.font {
            Some(font) => font as &dyn TextMeasure,
            None => &self.fallback,
        }
    }

    pub fn paint_hud(&self, canvas: &mut Canvas, input: &HudInput, padding: Padding, colors: &ColorScheme) {
        let size = (canvas.width(), canvas.height());
        let panel = colors.ruler_panel.with_alpha_u8(PANEL_ALPHA);
        for b in layout_hud(input, self.measure(), size, padding) {
            self.paint_box(canvas, &b, panel, colors.text);
        }
    }

    /// Red panel with `message`, centred on the canvas.
    pub fn paint_error(&self, canvas: &mut Canvas, message: &str) {
        let size = (canvas.width(), canvas.height());
        let b = error_box(message, self.measure(), size);
        self.paint_box(canvas, &b, Color::from_rgba_u8(255, 0, 0, PANEL_ALPHA), Color::white());
    }

    fn paint_box(&self, canvas: &mut Canvas, b: &HudBox, panel: Color, text: Color) {
        canvas.fill_rounded_rect(b.rect, CORNER_RADIUS, panel);
        if let Some(font) = &self.font {
            canvas.draw_text(&font.fonts, font.id, font.size, b.text_origin, text, &b.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_panel_tints_the_centre() {
        let painter = HudPainter::new(None, 10.0);
        let mut canvas = Canvas::new(200, 100);
        canvas.clear(Color::black());
        painter.paint_error(&mut canvas, "nothing to draw");

        let [r, g, b, a] = canvas.pixel(100, 50).unwrap();
        assert!(r > 0 && g == 0 && b == 0);
        assert_eq!(a, 255);
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 255]));
    }
}
