use kerf_engine::paint::{Color, ColorRamp};

/// Preview palette supplied by the color-scheme collaborator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorScheme {
    pub background: Color,
    pub grid_major: Color,
    pub grid_minor: Color,
    /// Origin axes and ruler labels.
    pub origin: Color,
    pub pointer: Color,
    pub text: Color,
    pub ruler_panel: Color,
    /// Powered segments at zero power.
    pub power_low: Color,
    /// Powered segments at full power.
    pub power_high: Color,
    pub travel: Color,
    pub executed: Color,
}

impl ColorScheme {
    /// Laser-power ramp for powered segments.
    pub fn power_ramp(&self) -> ColorRamp {
        ColorRamp::linear(self.power_low, self.power_high)
    }

    pub fn light() -> Self {
        Self {
            background: Color::from_rgb_u8(250, 250, 250),
            grid_major: Color::from_rgb_u8(200, 200, 200),
            grid_minor: Color::from_rgb_u8(232, 232, 232),
            origin: Color::from_rgb_u8(40, 40, 40),
            pointer: Color::from_rgb_u8(0, 120, 215),
            text: Color::from_rgb_u8(20, 20, 20),
            ruler_panel: Color::from_rgb_u8(225, 225, 225),
            power_low: Color::from_rgb_u8(255, 200, 200),
            power_high: Color::from_rgb_u8(200, 0, 0),
            travel: Color::from_rgb_u8(150, 150, 150),
            executed: Color::from_rgb_u8(0, 160, 60),
        }
    }
}

impl Default for ColorScheme {
    /// Dark scheme.
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(24, 24, 28),
            grid_major: Color::from_rgb_u8(60, 60, 68),
            grid_minor: Color::from_rgb_u8(38, 38, 44),
            origin: Color::from_rgb_u8(170, 170, 180),
            pointer: Color::from_rgb_u8(255, 210, 0),
            text: Color::from_rgb_u8(230, 230, 235),
            ruler_panel: Color::from_rgb_u8(48, 48, 56),
            power_low: Color::from_rgb_u8(90, 40, 40),
            power_high: Color::from_rgb_u8(255, 60, 40),
            travel: Color::from_rgb_u8(90, 110, 140),
            executed: Color::from_rgb_u8(70, 200, 110),
        }
    }
}
