use std::time::Duration;

use kerf_engine::device::OffscreenInit;
use kerf_engine::logging::LoggingConfig;

/// Pixel insets reserved around the drawing area for rulers and HUD.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    #[inline]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub const fn horizontal(self) -> u32 {
        self.left + self.right
    }

    #[inline]
    pub const fn vertical(self) -> u32 {
        self.top + self.bottom
    }
}

impl Default for Padding {
    /// Y ruler on the left, X ruler at the bottom.
    fn default() -> Self {
        Self::new(50, 0, 0, 30)
    }
}

/// Construction parameters for a `PreviewControl`.
///
/// Everything here is fixed for the control's lifetime; palette and user
/// preferences change through notifications instead.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub padding: Padding,

    /// Sleep between render cycles.
    pub frame_interval: Duration,

    /// Crosshair line width in pixels.
    pub pointer_size: f32,

    /// Line width of non-powered (travel) segments in pixels.
    pub travel_line_width: f32,

    /// TrueType/OpenType bytes for ruler labels and HUD text.
    ///
    /// Without a font the preview still renders; labels and HUD text are omitted
    /// and HUD boxes are sized with a fixed-pitch estimate.
    pub font: Option<Vec<u8>>,

    pub label_font_size: f32,
    pub hud_font_size: f32,

    /// Half-width of the reachable world, in world units, on each axis.
    pub max_extent: f64,

    /// Control size in pixels before the first resize.
    pub initial_size: (u32, u32),

    pub offscreen: OffscreenInit,

    /// Installed once when the control is created; `None` leaves logging to the host.
    pub logging: Option<LoggingConfig>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            frame_interval: Duration::from_millis(30),
            pointer_size: 3.0,
            travel_line_width: 1.0,
            font: None,
            label_font_size: 12.0,
            hud_font_size: 10.0,
            max_extent: 50_000.0,
            initial_size: (800, 600),
            offscreen: OffscreenInit::default(),
            logging: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_padding_reserves_ruler_strips() {
        let p = Padding::default();
        assert_eq!((p.left, p.top, p.right, p.bottom), (50, 0, 0, 30));
        assert_eq!(p.horizontal(), 50);
        assert_eq!(p.vertical(), 30);
    }

    #[test]
    fn default_cadence_is_thirty_ms() {
        assert_eq!(PreviewConfig::default().frame_interval, Duration::from_millis(30));
    }
}
