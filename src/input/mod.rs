//! # Input Mapping
//!
//! Translates keyboard, pointer and scroll input into mutations of
//! [`ViewerState`]. The mapper never sees windowing-library types: input
//! arrives through the [`InputSource`] capability, which polls held keys and
//! delivers queued events to an [`InputObserver`].
//!
//! ## Channels
//!
//! - **Polled every frame**: movement keys translate the camera along its own
//!   axes, scaled by frame time. The exit key raises an exit request.
//! - **Event-delivered**: pointer motion turns the camera (only while camera
//!   mouse control is enabled), scroll adjusts the field of view, and the
//!   overlay key flips the overlay on its press edge.
//!
//! Side effects the mapper cannot perform itself, such as changing the cursor
//! mode or closing the window, are returned as [`InputRequests`].

pub mod winit_source;

pub use winit_source::WinitInput;

use std::collections::HashMap;

use log::debug;

use crate::{gfx::camera::CameraMovement, state::ViewerState};

/// Logical keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    ToggleOverlay,
    Exit,
}

const MOVEMENT_KEYS: [(Key, CameraMovement); 4] = [
    (Key::Forward, CameraMovement::Forward),
    (Key::Backward, CameraMovement::Backward),
    (Key::Left, CameraMovement::Left),
    (Key::Right, CameraMovement::Right),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    pub fn is_pressed(self) -> bool {
        self == KeyState::Pressed
    }
}

/// A single input occurrence, in window coordinates where applicable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Absolute pointer position, y grows downward
    PointerMotion { x: f64, y: f64 },
    Scroll { x_offset: f64, y_offset: f64 },
    Key { key: Key, state: KeyState },
}

impl InputEvent {
    pub fn deliver(self, observer: &mut dyn InputObserver) {
        match self {
            InputEvent::PointerMotion { x, y } => observer.on_pointer_motion(x, y),
            InputEvent::Scroll { x_offset, y_offset } => observer.on_scroll(x_offset, y_offset),
            InputEvent::Key { key, state } => observer.on_key(key, state),
        }
    }
}

/// Receiver of event-style input
pub trait InputObserver {
    fn on_pointer_motion(&mut self, x: f64, y: f64);
    fn on_scroll(&mut self, x_offset: f64, y_offset: f64);
    fn on_key(&mut self, key: Key, state: KeyState);
}

/// Capability interface over a windowing backend's input
pub trait InputSource {
    /// Whether `key` is currently held down
    fn is_pressed(&self, key: Key) -> bool;

    /// Delivers every event received since the previous call, in order
    fn dispatch(&mut self, observer: &mut dyn InputObserver);
}

/// Transition of a tracked key between two observations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Steady,
}

/// Remembers the last observed state of each tracked key
#[derive(Debug, Default)]
pub struct KeyEdgeDetector {
    previous: HashMap<Key, bool>,
}

impl KeyEdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `pressed` for `key` and reports how it changed
    pub fn observe(&mut self, key: Key, pressed: bool) -> Edge {
        let was_pressed = self.previous.insert(key, pressed).unwrap_or(false);
        match (was_pressed, pressed) {
            (false, true) => Edge::Rising,
            (true, false) => Edge::Falling,
            _ => Edge::Steady,
        }
    }
}

/// How the windowing backend should treat the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Hidden and confined to the window, for camera look
    Captured,
    /// Visible and unconstrained, for overlay widgets
    Free,
}

impl CursorMode {
    pub fn for_overlay(overlay_enabled: bool) -> Self {
        if overlay_enabled {
            CursorMode::Free
        } else {
            CursorMode::Captured
        }
    }
}

/// Side effects requested by one frame of input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputRequests {
    pub exit: bool,
    pub cursor_mode: Option<CursorMode>,
}

/// Applies input to the viewer state
#[derive(Debug, Default)]
pub struct InputMapper {
    last_cursor: Option<(f64, f64)>,
    /// Camera mouse control as last seen by the mapper
    mouse_control_seen: bool,
    edges: KeyEdgeDetector,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame of input: queued events first, then held-key polling
    pub fn process_frame(
        &mut self,
        source: &mut impl InputSource,
        state: &mut ViewerState,
        delta_time: f32,
    ) -> InputRequests {
        let mut requests = InputRequests::default();

        // The overlay can flip mouse control between frames without any motion
        self.observe_mouse_control(state.camera_mouse_control_enabled);

        source.dispatch(&mut StateBinding {
            mapper: &mut *self,
            state: &mut *state,
            requests: &mut requests,
        });

        if source.is_pressed(Key::Exit) {
            requests.exit = true;
        }

        for (key, movement) in MOVEMENT_KEYS {
            if source.is_pressed(key) {
                state.camera.process_keyboard(movement, delta_time);
            }
        }

        // Same detector as the key event path, so a press seen there is Steady here
        let held = source.is_pressed(Key::ToggleOverlay);
        self.observe_toggle_key(held, state, &mut requests);

        requests
    }

    /// Turns the camera by the pointer delta since the previous sample.
    ///
    /// The first sample after camera mouse control becomes active only
    /// establishes the origin.
    pub fn on_pointer_motion(&mut self, state: &mut ViewerState, x: f64, y: f64) {
        self.observe_mouse_control(state.camera_mouse_control_enabled);
        if !state.camera_mouse_control_enabled {
            return;
        }

        let Some((last_x, last_y)) = self.last_cursor.replace((x, y)) else {
            return;
        };

        let x_offset = (x - last_x) as f32;
        // Screen y grows downward, pitch grows upward
        let y_offset = (last_y - y) as f32;
        state.camera.process_mouse_movement(x_offset, y_offset, true);
    }

    pub fn on_scroll(&mut self, state: &mut ViewerState, y_offset: f64) {
        state.camera.process_mouse_scroll(y_offset as f32);
    }

    /// Flips the overlay and returns the cursor mode that goes with it.
    ///
    /// Opening the overlay also switches camera mouse control off.
    pub fn toggle_overlay(&mut self, state: &mut ViewerState) -> CursorMode {
        state.overlay_enabled = !state.overlay_enabled;
        if state.overlay_enabled {
            state.camera_mouse_control_enabled = false;
        }
        debug!("Overlay toggled: {}", state.overlay_enabled);
        CursorMode::for_overlay(state.overlay_enabled)
    }

    /// Forgets the cursor origin whenever camera mouse control changes
    fn observe_mouse_control(&mut self, enabled: bool) {
        if enabled != self.mouse_control_seen {
            self.mouse_control_seen = enabled;
            self.last_cursor = None;
        }
    }

    fn observe_toggle_key(
        &mut self,
        pressed: bool,
        state: &mut ViewerState,
        requests: &mut InputRequests,
    ) {
        if self.edges.observe(Key::ToggleOverlay, pressed) == Edge::Rising {
            requests.cursor_mode = Some(self.toggle_overlay(state));
        }
    }
}

/// Routes observer callbacks to the mapper with the state it mutates
struct StateBinding<'a> {
    mapper: &'a mut InputMapper,
    state: &'a mut ViewerState,
    requests: &'a mut InputRequests,
}

impl InputObserver for StateBinding<'_> {
    fn on_pointer_motion(&mut self, x: f64, y: f64) {
        self.mapper.on_pointer_motion(self.state, x, y);
    }

    fn on_scroll(&mut self, _x_offset: f64, y_offset: f64) {
        self.mapper.on_scroll(self.state, y_offset);
    }

    fn on_key(&mut self, key: Key, state: KeyState) {
        match key {
            Key::ToggleOverlay => {
                self.mapper
                    .observe_toggle_key(state.is_pressed(), self.state, self.requests)
            }
            Key::Exit if state.is_pressed() => self.requests.exit = true,
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};
    use rand::Rng;
    use std::collections::{HashSet, VecDeque};

    /// Input source fed from a script, one frame at a time
    #[derive(Default)]
    struct ScriptedInput {
        held: HashSet<Key>,
        queue: VecDeque<InputEvent>,
    }

    impl ScriptedInput {
        fn hold(&mut self, key: Key) {
            self.held.insert(key);
        }

        fn release(&mut self, key: Key) {
            self.held.remove(&key);
        }

        fn push(&mut self, event: InputEvent) {
            self.queue.push_back(event);
        }
    }

    impl InputSource for ScriptedInput {
        fn is_pressed(&self, key: Key) -> bool {
            self.held.contains(&key)
        }

        fn dispatch(&mut self, observer: &mut dyn InputObserver) {
            while let Some(event) = self.queue.pop_front() {
                event.deliver(observer);
            }
        }
    }

    fn motion(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMotion { x, y }
    }

    #[test]
    fn test_edge_detector() {
        let mut edges = KeyEdgeDetector::new();
        assert_eq!(edges.observe(Key::ToggleOverlay, false), Edge::Steady);
        assert_eq!(edges.observe(Key::ToggleOverlay, true), Edge::Rising);
        assert_eq!(edges.observe(Key::ToggleOverlay, true), Edge::Steady);
        assert_eq!(edges.observe(Key::ToggleOverlay, false), Edge::Falling);
        // Keys are tracked independently
        assert_eq!(edges.observe(Key::Exit, true), Edge::Rising);
    }

    #[test]
    fn test_held_toggle_fires_once() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();

        input.hold(Key::ToggleOverlay);
        let mut cursor_switches = Vec::new();
        for _ in 0..3 {
            let requests = mapper.process_frame(&mut input, &mut state, 0.016);
            cursor_switches.extend(requests.cursor_mode);
        }

        assert!(state.overlay_enabled);
        assert_eq!(cursor_switches, vec![CursorMode::Free]);
    }

    #[test]
    fn test_repeated_press_events_toggle_once() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();

        let pressed = InputEvent::Key {
            key: Key::ToggleOverlay,
            state: KeyState::Pressed,
        };
        let mut switches = 0;
        for _ in 0..3 {
            // Auto-repeat delivers a press every frame while held
            input.hold(Key::ToggleOverlay);
            input.push(pressed);
            let requests = mapper.process_frame(&mut input, &mut state, 0.016);
            switches += requests.cursor_mode.iter().count();
        }

        assert!(state.overlay_enabled);
        assert_eq!(switches, 1);
    }

    #[test]
    fn test_tap_within_one_frame_toggles() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();

        input.push(InputEvent::Key {
            key: Key::ToggleOverlay,
            state: KeyState::Pressed,
        });
        input.push(InputEvent::Key {
            key: Key::ToggleOverlay,
            state: KeyState::Released,
        });
        let requests = mapper.process_frame(&mut input, &mut state, 0.016);

        assert!(state.overlay_enabled);
        assert_eq!(requests.cursor_mode, Some(CursorMode::Free));
    }

    #[test]
    fn test_second_press_closes_overlay() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();

        input.hold(Key::ToggleOverlay);
        mapper.process_frame(&mut input, &mut state, 0.016);
        input.release(Key::ToggleOverlay);
        mapper.process_frame(&mut input, &mut state, 0.016);
        input.hold(Key::ToggleOverlay);
        let requests = mapper.process_frame(&mut input, &mut state, 0.016);

        assert!(!state.overlay_enabled);
        assert_eq!(requests.cursor_mode, Some(CursorMode::Captured));
    }

    #[test]
    fn test_opening_overlay_disables_mouse_control() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        state.camera_mouse_control_enabled = true;

        assert_eq!(mapper.toggle_overlay(&mut state), CursorMode::Free);
        assert!(!state.camera_mouse_control_enabled);

        // Closing leaves the flag as the overlay set it
        state.camera_mouse_control_enabled = true;
        assert_eq!(mapper.toggle_overlay(&mut state), CursorMode::Captured);
        assert!(state.camera_mouse_control_enabled);
    }

    #[test]
    fn test_first_pointer_sample_is_suppressed() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        state.camera_mouse_control_enabled = true;
        let (yaw, pitch) = (state.camera.yaw, state.camera.pitch);

        mapper.on_pointer_motion(&mut state, 1234.0, -987.0);
        assert_eq!(state.camera.yaw, yaw);
        assert_eq!(state.camera.pitch, pitch);

        mapper.on_pointer_motion(&mut state, 1244.0, -997.0);
        assert!((state.camera.yaw - (yaw + 1.0)).abs() < 1e-4);
        assert!((state.camera.pitch - (pitch + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_reenabling_mouse_control_suppresses_first_sample() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        state.camera_mouse_control_enabled = true;
        mapper.on_pointer_motion(&mut state, 0.0, 0.0);
        mapper.on_pointer_motion(&mut state, 10.0, 0.0);
        let yaw = state.camera.yaw;

        state.camera_mouse_control_enabled = false;
        mapper.on_pointer_motion(&mut state, 500.0, 500.0);

        state.camera_mouse_control_enabled = true;
        mapper.on_pointer_motion(&mut state, 900.0, 40.0);
        assert_eq!(state.camera.yaw, yaw);
    }

    #[test]
    fn test_checkbox_toggle_without_motion_suppresses_first_sample() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();
        state.camera_mouse_control_enabled = true;
        input.push(motion(0.0, 0.0));
        input.push(motion(10.0, 0.0));
        mapper.process_frame(&mut input, &mut state, 0.016);
        let (yaw, pitch) = (state.camera.yaw, state.camera.pitch);

        // Unticked for a frame with no pointer motion at all
        state.camera_mouse_control_enabled = false;
        mapper.process_frame(&mut input, &mut state, 0.016);

        state.camera_mouse_control_enabled = true;
        input.push(motion(900.0, 40.0));
        mapper.process_frame(&mut input, &mut state, 0.016);
        assert_eq!(state.camera.yaw, yaw);
        assert_eq!(state.camera.pitch, pitch);

        input.push(motion(910.0, 40.0));
        mapper.process_frame(&mut input, &mut state, 0.016);
        assert!((state.camera.yaw - (yaw + 1.0)).abs() < 1e-4);
    }

    #[test]
    fn test_disabled_mouse_control_ignores_motion() {
        let mut rng = rand::rng();
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();
        let (yaw, pitch) = (state.camera.yaw, state.camera.pitch);

        for _ in 0..50 {
            for _ in 0..rng.random_range(1..8) {
                input.push(motion(
                    rng.random_range(-2000.0..2000.0),
                    rng.random_range(-2000.0..2000.0),
                ));
            }
            mapper.process_frame(&mut input, &mut state, 0.016);
        }

        assert_eq!(state.camera.yaw, yaw);
        assert_eq!(state.camera.pitch, pitch);
    }

    #[test]
    fn test_vertical_motion_is_inverted() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        state.camera_mouse_control_enabled = true;

        mapper.on_pointer_motion(&mut state, 100.0, 100.0);
        // Pointer moves up the screen
        mapper.on_pointer_motion(&mut state, 100.0, 50.0);
        assert!(state.camera.pitch > 0.0);
    }

    #[test]
    fn test_scroll_changes_zoom() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();

        input.push(InputEvent::Scroll {
            x_offset: 3.0,
            y_offset: 5.0,
        });
        mapper.process_frame(&mut input, &mut state, 0.016);
        assert_eq!(state.camera.zoom, 40.0);
    }

    #[test]
    fn test_movement_is_frame_rate_independent() {
        let mut mapper = InputMapper::new();
        let mut slow = ViewerState::default();
        let mut fast = ViewerState::default();
        let mut input = ScriptedInput::default();
        input.hold(Key::Forward);

        mapper.process_frame(&mut input, &mut slow, 0.5);
        for _ in 0..10 {
            mapper.process_frame(&mut input, &mut fast, 0.05);
        }

        assert!((slow.camera.position - fast.camera.position).magnitude() < 1e-4);
        assert!((slow.camera.position - Vector3::new(0.0, 0.0, 1.75)).magnitude() < 1e-4);
    }

    #[test]
    fn test_exit_key_requests_exit() {
        let mut mapper = InputMapper::new();
        let mut state = ViewerState::default();
        let mut input = ScriptedInput::default();

        assert!(!mapper.process_frame(&mut input, &mut state, 0.016).exit);
        input.hold(Key::Exit);
        assert!(mapper.process_frame(&mut input, &mut state, 0.016).exit);
    }
}
