use glam::Vec2;
use rustc_hash::FxHashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::utils::OrbitInput;
use crate::viewer::ViewerLayout;

/// Pointer state accumulated from window events between two frames.
#[derive(Default, Debug, Clone)]
pub struct Input {
    /// Cursor position in physical pixels.
    pub cursor_position: Vec2,
    /// Cursor movement since the previous frame.
    pub cursor_delta: Vec2,
    pub scroll_delta: Vec2,
    pub mouse_buttons: FxHashSet<MouseButton>,
    /// Viewport that owns the current drag, fixed at button press.
    drag_target: Option<usize>,
    has_cursor: bool,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame deltas.
    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Feeds one window event. `layout` decides which viewport a new drag
    /// belongs to.
    pub fn process_window_event(&mut self, event: &WindowEvent, layout: &ViewerLayout) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                if self.has_cursor {
                    self.cursor_delta += new_pos - self.cursor_position;
                }
                self.cursor_position = new_pos;
                self.has_cursor = true;
            }
            WindowEvent::CursorLeft { .. } => {
                self.has_cursor = false;
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    if self.mouse_buttons.is_empty() {
                        self.drag_target = layout.viewport_at(self.cursor_position);
                    }
                    self.mouse_buttons.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons.remove(button);
                    if self.mouse_buttons.is_empty() {
                        self.drag_target = None;
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(x, y) => {
                    self.scroll_delta += Vec2::new(*x, *y);
                }
                MouseScrollDelta::PixelDelta(pos) => {
                    self.scroll_delta += Vec2::new(pos.x as f32, pos.y as f32) * 0.1;
                }
            },
            _ => {}
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Input for viewport `index` this frame. Drags go to the viewport they
    /// started in; the wheel goes to the viewport under the cursor.
    #[must_use]
    pub fn orbit_input(&self, index: usize, layout: &ViewerLayout) -> OrbitInput {
        let viewport_height = layout.viewports.get(index).map_or(1.0, |r| r.height);
        let mut input = OrbitInput {
            viewport_height,
            ..Default::default()
        };

        if self.drag_target == Some(index) {
            input.cursor_delta = self.cursor_delta;
            input.rotating = self.is_button_pressed(MouseButton::Left);
            input.panning = self.is_button_pressed(MouseButton::Right);
        }
        if self.has_cursor && layout.viewport_at(self.cursor_position) == Some(index) {
            input.scroll_delta = self.scroll_delta;
        }
        input
    }
}
