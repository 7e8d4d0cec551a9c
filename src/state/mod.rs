//! # Viewer State
//!
//! The single record of runtime-tweakable viewer parameters: background colour,
//! overlay flags, camera pose and the two scene lights. One instance is created
//! by [`crate::HeistApp`] and lent by reference to the input mapper, the frame
//! snapshot and the overlay panel for the lifetime of the render loop.
//!
//! ## Lifecycle
//!
//! 1. Constructed with hardcoded defaults ([`ViewerState::new`])
//! 2. Overwritten field-by-field from disk ([`persistence::load_into`])
//! 3. Mutated every frame by input and by the overlay
//! 4. Written back once at clean shutdown ([`persistence::save`])
//!
//! Light parameters are not validated. Zero or negative attenuation terms are
//! accepted and simply produce degenerate lighting.

pub mod persistence;

pub use persistence::{load_into, save, LoadOutcome};

use crate::{config::ViewerConfig, gfx::camera::FlyCamera};

/// Omnidirectional light with distance attenuation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: [10.0, -120.0, 0.0],
            ambient: [0.1, 0.1, 0.1],
            diffuse: [0.6, 0.6, 0.6],
            specular: [1.0, 1.0, 1.0],
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

/// Cone light with a soft edge between the inner and outer cutoff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: [f32; 3],
    pub direction: [f32; 3],
    /// Inner cone half-angle in degrees
    pub cut_off: f32,
    /// Outer cone half-angle in degrees
    pub outer_cut_off: f32,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: [9.75, -118.0, 4.0],
            direction: [0.0, -125.0, 0.0],
            cut_off: 10.0,
            outer_cut_off: 15.0,
            ambient: [0.1, 0.1, 0.1],
            diffuse: [0.6, 0.6, 0.6],
            specular: [1.0, 1.0, 1.0],
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

/// Default transform seed for a scene object.
///
/// Editable from the overlay but not consumed by any draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPlacement {
    pub position: [f32; 3],
    pub scale: f32,
}

impl Default for ObjectPlacement {
    fn default() -> Self {
        Self {
            position: [10.0, -125.0, 0.0],
            scale: 3.0,
        }
    }
}

/// Process-wide viewer parameters
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub clear_color: [f32; 3],
    pub overlay_enabled: bool,
    /// When false, pointer motion leaves the camera orientation alone
    pub camera_mouse_control_enabled: bool,
    pub camera: FlyCamera,
    pub initial_object_placement: ObjectPlacement,
    pub point_light: PointLight,
    pub spot_light: SpotLight,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            overlay_enabled: false,
            camera_mouse_control_enabled: false,
            camera: FlyCamera::from_config(&config.camera),
            initial_object_placement: ObjectPlacement::default(),
            point_light: PointLight::default(),
            spot_light: SpotLight::default(),
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_defaults_match_scene_setup() {
        let state = ViewerState::default();
        assert_eq!(state.clear_color, [0.0, 0.0, 0.0]);
        assert!(!state.overlay_enabled);
        assert!(!state.camera_mouse_control_enabled);
        assert_eq!(state.camera.position, Vector3::new(0.0, 0.0, 3.0));
        assert_eq!(state.point_light.constant, 1.0);
        assert_eq!(state.spot_light.outer_cut_off, 15.0);
        assert_eq!(state.initial_object_placement.scale, 3.0);
    }

    #[test]
    fn test_attenuation_accepts_degenerate_values() {
        let mut state = ViewerState::default();
        state.point_light.constant = 0.0;
        state.point_light.linear = -1.0;
        state.spot_light.quadratic = -0.5;
        assert_eq!(state.point_light.linear, -1.0);
        assert_eq!(state.spot_light.quadratic, -0.5);
    }
}
