//! winit backend for [`InputSource`]
//!
//! Window and device events are translated into [`InputEvent`]s and queued
//! until the mapper dispatches them on the next frame. Pointer motion is taken
//! from raw device deltas and accumulated into a virtual absolute position, so
//! camera look keeps working while the cursor is grabbed.

use std::collections::{HashSet, VecDeque};

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::{InputEvent, InputObserver, InputSource, Key, KeyState};

/// Pixel-precise scroll deltas are scaled to wheel "lines"
const PIXELS_PER_LINE: f64 = 20.0;

#[derive(Debug, Default)]
pub struct WinitInput {
    held: HashSet<Key>,
    queue: VecDeque<InputEvent>,
    cursor: (f64, f64),
}

impl WinitInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a physical key to the logical key it drives
    pub fn key_for(code: KeyCode) -> Option<Key> {
        match code {
            KeyCode::KeyW => Some(Key::Forward),
            KeyCode::KeyS => Some(Key::Backward),
            KeyCode::KeyA => Some(Key::Left),
            KeyCode::KeyD => Some(Key::Right),
            KeyCode::F1 => Some(Key::ToggleOverlay),
            KeyCode::Escape => Some(Key::Exit),
            _ => None,
        }
    }

    /// Records a window event, returning true if it carried viewer input
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                let Some(key) = Self::key_for(*code) else {
                    return false;
                };
                let state = match state {
                    ElementState::Pressed => {
                        self.held.insert(key);
                        KeyState::Pressed
                    }
                    ElementState::Released => {
                        self.held.remove(&key);
                        KeyState::Released
                    }
                };
                self.queue.push_back(InputEvent::Key { key, state });
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (x_offset, y_offset) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x as f64, *y as f64),
                    MouseScrollDelta::PixelDelta(PhysicalPosition { x, y }) => {
                        (x / PIXELS_PER_LINE, y / PIXELS_PER_LINE)
                    }
                };
                self.queue.push_back(InputEvent::Scroll { x_offset, y_offset });
                true
            }
            WindowEvent::Focused(false) => {
                // Releases are not delivered to an unfocused window
                for key in self.held.drain() {
                    self.queue.push_back(InputEvent::Key {
                        key,
                        state: KeyState::Released,
                    });
                }
                false
            }
            _ => false,
        }
    }

    /// Records raw pointer motion as a new absolute position
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.cursor.0 += delta.0;
            self.cursor.1 += delta.1;
            self.queue.push_back(InputEvent::PointerMotion {
                x: self.cursor.0,
                y: self.cursor.1,
            });
        }
    }
}

impl InputSource for WinitInput {
    fn is_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn dispatch(&mut self, observer: &mut dyn InputObserver) {
        while let Some(event) = self.queue.pop_front() {
            event.deliver(observer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<InputEvent>);

    impl InputObserver for Recorder {
        fn on_pointer_motion(&mut self, x: f64, y: f64) {
            self.0.push(InputEvent::PointerMotion { x, y });
        }

        fn on_scroll(&mut self, x_offset: f64, y_offset: f64) {
            self.0.push(InputEvent::Scroll { x_offset, y_offset });
        }

        fn on_key(&mut self, key: Key, state: KeyState) {
            self.0.push(InputEvent::Key { key, state });
        }
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(WinitInput::key_for(KeyCode::KeyW), Some(Key::Forward));
        assert_eq!(WinitInput::key_for(KeyCode::F1), Some(Key::ToggleOverlay));
        assert_eq!(WinitInput::key_for(KeyCode::Escape), Some(Key::Exit));
        assert_eq!(WinitInput::key_for(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_motion_accumulates_to_absolute_position() {
        let mut input = WinitInput::new();
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -2.0) });
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (1.0, 5.0) });

        let mut recorder = Recorder::default();
        input.dispatch(&mut recorder);
        assert_eq!(
            recorder.0,
            vec![
                InputEvent::PointerMotion { x: 3.0, y: -2.0 },
                InputEvent::PointerMotion { x: 4.0, y: 3.0 },
            ]
        );

        // The queue is drained by dispatch
        let mut empty = Recorder::default();
        input.dispatch(&mut empty);
        assert!(empty.0.is_empty());
    }

    #[test]
    fn test_focus_loss_releases_held_keys() {
        let mut input = WinitInput::new();
        input.held.insert(Key::Forward);
        assert!(input.is_pressed(Key::Forward));

        input.handle_window_event(&WindowEvent::Focused(false));
        assert!(!input.is_pressed(Key::Forward));

        let mut recorder = Recorder::default();
        input.dispatch(&mut recorder);
        assert_eq!(
            recorder.0,
            vec![InputEvent::Key {
                key: Key::Forward,
                state: KeyState::Released
            }]
        );
    }
}
