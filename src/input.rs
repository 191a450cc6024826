//! Window input tracking.
//!
//! [`Input`] folds raw winit events into the state the frame loop reads once
//! per tick: the pointer position in normalized device coordinates, the drag
//! and scroll accumulated since the last tick, and held buttons.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

use crate::pointer::PointerState;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn from_winit(btn: WinitMouseButton) -> Option<Self> {
        match btn {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            WinitMouseButton::Middle => Some(MouseButton::Middle),
            _ => None,
        }
    }
}

/// Convert a cursor position in pixels to normalized device coordinates.
///
/// The window center maps to `(0, 0)`, x grows to the right and y grows
/// upward. Returns `None` for a zero-sized window.
pub fn pixel_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Option<Vec2> {
    if width == 0 || height == 0 {
        return None;
    }
    Some(Vec2::new(
        (x / width as f32) * 2.0 - 1.0,
        1.0 - (y / height as f32) * 2.0,
    ))
}

/// Input state for the frame loop.
#[derive(Debug, Default)]
pub struct Input {
    mouse_held: HashSet<MouseButton>,

    mouse_position: Vec2,
    pointer: PointerState,

    // Accumulated between ticks, cleared by `begin_frame`
    drag_delta: Vec2,
    scroll_delta: f32,

    exit_requested: bool,
    window_size: (u32, u32),
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self {
            window_size: (1280, 720),
            ..Default::default()
        }
    }

    /// Snapshot of the pointer for this tick.
    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// Cursor position in window pixels.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Cursor movement while the left button was held, in pixels, since the
    /// last tick.
    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    /// Scroll since the last tick, in lines. Positive is away from the user.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    /// Whether Escape was pressed.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Clear per-tick accumulators. Call after the tick consumed them.
    pub(crate) fn begin_frame(&mut self) {
        self.drag_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Update window size for NDC calculations.
    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Record a cursor move in window pixels.
    pub(crate) fn cursor_moved(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        if self.mouse_held(MouseButton::Left) {
            self.drag_delta += new_pos - self.mouse_position;
        }
        self.mouse_position = new_pos;

        let (w, h) = self.window_size;
        if let Some(ndc) = pixel_to_ndc(x, y, w, h) {
            self.pointer.ndc = ndc;
        }
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(WinitKeyCode::Escape)
                {
                    self.exit_requested = true;
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(btn) = MouseButton::from_winit(*button) {
                    match state {
                        ElementState::Pressed => {
                            self.mouse_held.insert(btn);
                        }
                        ElementState::Released => {
                            self.mouse_held.remove(&btn);
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
            }

            WindowEvent::Resized(size) => {
                self.set_window_size(size.width, size.height);
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_to_ndc() {
        let center = pixel_to_ndc(400.0, 300.0, 800, 600).unwrap();
        assert!(center.x.abs() < 1e-6);
        assert!(center.y.abs() < 1e-6);

        let top_left = pixel_to_ndc(0.0, 0.0, 800, 600).unwrap();
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));

        let bottom_right = pixel_to_ndc(800.0, 600.0, 800, 600).unwrap();
        assert_eq!(bottom_right, Vec2::new(1.0, -1.0));

        assert!(pixel_to_ndc(1.0, 1.0, 0, 600).is_none());
    }

    #[test]
    fn test_cursor_updates_pointer_last_write_wins() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.cursor_moved(0.0, 0.0);
        input.cursor_moved(600.0, 450.0);
        assert_eq!(input.pointer().ndc, Vec2::new(0.5, -0.5));
        assert_eq!(input.mouse_position(), Vec2::new(600.0, 450.0));
    }

    #[test]
    fn test_drag_only_accumulates_while_held() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.cursor_moved(100.0, 100.0);
        input.cursor_moved(110.0, 100.0);
        assert_eq!(input.drag_delta(), Vec2::ZERO);

        input.mouse_held.insert(MouseButton::Left);
        input.cursor_moved(120.0, 105.0);
        input.cursor_moved(130.0, 110.0);
        assert_eq!(input.drag_delta(), Vec2::new(20.0, 10.0));

        input.begin_frame();
        assert_eq!(input.drag_delta(), Vec2::ZERO);
        assert!(input.mouse_held(MouseButton::Left));
    }
}
