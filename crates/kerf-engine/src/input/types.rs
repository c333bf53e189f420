/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Wheel delta as reported by the host.
///
/// Hosts differ on whether they report notches or pixels; consumers convert
/// with [`MouseWheelDelta::steps`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    /// Notch-based wheels. One notch is `1.0`.
    Lines { x: f32, y: f32 },

    /// Touchpads and smooth-scrolling mice.
    Pixels { x: f64, y: f64 },
}

impl MouseWheelDelta {
    /// Wheel units per notch, matching the classic desktop convention.
    pub const UNITS_PER_LINE: f32 = 120.0;

    /// Vertical delta in wheel units (positive = away from the user).
    pub fn steps(&self) -> f32 {
        match *self {
            MouseWheelDelta::Lines { y, .. } => y * Self::UNITS_PER_LINE,
            MouseWheelDelta::Pixels { y, .. } => y as f32,
        }
    }
}

/// Platform-agnostic pointer events.
///
/// Hosts translate their window system events into these; coordinates are in
/// pixels relative to the top-left corner of the receiving surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved {
        x: f32,
        y: f32,
    },

    PointerButton {
        button: MouseButton,
        state: MouseButtonState,
        x: f32,
        y: f32,
    },

    /// Second press of a double click, reported in addition to the presses.
    DoubleClick {
        button: MouseButton,
        x: f32,
        y: f32,
    },

    MouseWheel {
        delta: MouseWheelDelta,
        x: f32,
        y: f32,
    },

    /// Pointer left the surface.
    PointerLeft,
}
