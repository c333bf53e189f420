use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::FontId;

use super::{DrawList, ZIndex};

/// Solid rectangle in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RectCmd {
    pub rect: Rect,
    pub color: Color,
}

/// Single- or multi-line text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCmd {
    pub text: String,
    pub font: FontId,
    /// Font size in pixels.
    pub size: f32,
    pub color: Color,
    /// Top-left of the text block in pixels.
    pub origin: Vec2,
}

/// Renderer-agnostic draw command stream.
///
/// Extending the scene:
/// - add a variant here with its payload struct
/// - add a push helper on `DrawList`
/// - add a matching renderer under `render::shapes::*`
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Rect(RectCmd),
    Text(TextCmd),
}

impl DrawList {
    /// Records a solid rectangle draw command. Empty rectangles are dropped.
    #[inline]
    pub fn push_rect(&mut self, z: ZIndex, rect: Rect, color: Color) {
        let rect = rect.normalized();
        if rect.is_empty() {
            return;
        }
        self.push(z, DrawCmd::Rect(RectCmd { rect, color }));
    }

    /// Records a text draw command.
    pub fn push_text(
        &mut self,
        z: ZIndex,
        text: impl Into<String>,
        font: FontId,
        size: f32,
        color: Color,
        origin: Vec2,
    ) {
        self.push(
            z,
            DrawCmd::Text(TextCmd {
                text: text.into(),
                font,
                size,
                color,
                origin,
            }),
        );
    }
}
