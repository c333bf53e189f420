use std::collections::HashSet;

use super::types::{InputEvent, MouseButton};

/// Per-event input deltas.
///
/// `InputState` provides the current state (held buttons, pointer position).
/// `InputFrame` collects the transitions produced while applying events.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// Mouse buttons pressed since the last clear.
    pub buttons_pressed: HashSet<MouseButton>,

    /// Mouse buttons released since the last clear.
    pub buttons_released: HashSet<MouseButton>,

    /// Accumulated pointer movement while at least one button was held.
    pub drag_delta: Option<(f32, f32)>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.drag_delta = None;
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    pub(super) fn add_drag(&mut self, dx: f32, dy: f32) {
        let (ax, ay) = self.drag_delta.unwrap_or((0.0, 0.0));
        self.drag_delta = Some((ax + dx, ay + dy));
    }
}
