use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, MouseButton, MouseButtonState};

/// Current pointer state for a single surface.
///
/// Holds "is down" information and the last known pointer position.
/// Per-event transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer position in pixels; `None` when outside the surface or after release.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,

    /// Position of the last press or drag step, used to derive drag deltas.
    drag_anchor: Option<(f32, f32)>,
}

impl InputState {
    /// Applies an input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some((x, y));
                if !self.buttons_down.is_empty() {
                    if let Some((ax, ay)) = self.drag_anchor {
                        frame.add_drag(x - ax, y - ay);
                    }
                    self.drag_anchor = Some((x, y));
                }
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
                self.drag_anchor = None;
                self.buttons_down.clear();
            }

            InputEvent::PointerButton {
                button,
                state,
                x,
                y,
            } => match state {
                MouseButtonState::Pressed => {
                    self.pointer_pos = Some((x, y));
                    self.drag_anchor = Some((x, y));
                    if self.buttons_down.insert(button) {
                        frame.buttons_pressed.insert(button);
                    }
                }
                MouseButtonState::Released => {
                    if self.buttons_down.remove(&button) {
                        frame.buttons_released.insert(button);
                    }
                    // Released pointers stop reporting a coordinate until they move again.
                    self.pointer_pos = None;
                    if self.buttons_down.is_empty() {
                        self.drag_anchor = None;
                    }
                }
            },

            InputEvent::DoubleClick { x, y, .. } | InputEvent::MouseWheel { x, y, .. } => {
                self.pointer_pos = Some((x, y));
            }
        }

        frame.push_event(ev);
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    pub fn dragging(&self) -> bool {
        !self.buttons_down.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(button: MouseButton, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton {
            button,
            state: MouseButtonState::Pressed,
            x,
            y,
        }
    }

    fn release(button: MouseButton, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton {
            button,
            state: MouseButtonState::Released,
            x,
            y,
        }
    }

    #[test]
    fn move_without_button_is_not_a_drag() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 5.0, y: 5.0 });
        assert_eq!(state.pointer_pos, Some((5.0, 5.0)));
        assert!(frame.drag_delta.is_none());
    }

    #[test]
    fn drag_accumulates_from_press_point() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, press(MouseButton::Left, 10.0, 10.0));
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 13.0, y: 8.0 });
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 15.0, y: 9.0 });
        assert_eq!(frame.drag_delta, Some((5.0, -1.0)));
        assert!(frame.buttons_pressed.contains(&MouseButton::Left));
    }

    #[test]
    fn release_clears_pointer_and_anchor() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, press(MouseButton::Left, 1.0, 1.0));
        state.apply_event(&mut frame, release(MouseButton::Left, 1.0, 1.0));
        assert!(state.pointer_pos.is_none());
        assert!(!state.dragging());
        frame.clear();
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 9.0, y: 9.0 });
        assert!(frame.drag_delta.is_none());
    }

    #[test]
    fn leaving_drops_held_buttons() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, press(MouseButton::Right, 1.0, 1.0));
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert!(!state.button_down(MouseButton::Right));
        assert!(state.pointer_pos.is_none());
    }
}
