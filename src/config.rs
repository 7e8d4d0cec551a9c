//! Viewer configuration
//!
//! Window, asset and camera settings that are fixed for the lifetime of a run.
//! Nothing here is read from the command line or the environment; embedders
//! override fields in code through [`crate::HeistApp::with_config`].

use std::path::PathBuf;

use cgmath::Vector3;

/// Static configuration of a viewer run
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Where viewer preferences are loaded from at startup and saved to on exit
    pub state_path: PathBuf,
    /// Directory holding the scene's OBJ models and their textures
    pub asset_root: PathBuf,
    pub camera: CameraConfig,
    pub light_orbit: LightOrbit,
    /// Specular exponent shared by every material in the scene
    pub shininess: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Heist".to_string(),
            window_width: 800,
            window_height: 600,
            state_path: PathBuf::from("resources/program_state.txt"),
            asset_root: PathBuf::from("resources/objects"),
            camera: CameraConfig::default(),
            light_orbit: LightOrbit::default(),
            shininess: 32.0,
        }
    }
}

impl ViewerConfig {
    /// Aspect ratio used by the projection matrix.
    ///
    /// Derived from the configured window size, not the live surface size.
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}

/// Free-fly camera settings
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub start_position: Vector3<f32>,
    /// World units per second
    pub movement_speed: f32,
    /// Degrees per pixel of pointer motion
    pub mouse_sensitivity: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: Vector3::new(0.0, 0.0, 3.0),
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

/// Horizontal circle traced by the point light
#[derive(Debug, Clone, Copy)]
pub struct LightOrbit {
    pub radius: f32,
    pub height: f32,
    /// Radians per second
    pub angular_speed: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self {
            radius: 7.0,
            height: -120.0,
            angular_speed: 1.0,
        }
    }
}

impl LightOrbit {
    /// Position on the orbit after `elapsed` seconds
    pub fn position_at(&self, elapsed: f32) -> Vector3<f32> {
        let angle = elapsed * self.angular_speed;
        Vector3::new(
            self.radius * angle.cos(),
            self.height,
            self.radius * angle.sin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_aspect_ratio() {
        let config = ViewerConfig::default();
        assert!((config.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_starts_on_positive_x() {
        let orbit = LightOrbit::default();
        let start = orbit.position_at(0.0);
        assert!((start.x - 7.0).abs() < 1e-5);
        assert!((start.y + 120.0).abs() < 1e-5);
        assert!(start.z.abs() < 1e-5);
    }

    #[test]
    fn test_orbit_keeps_radius() {
        let orbit = LightOrbit::default();
        for step in 0..20 {
            let p = orbit.position_at(step as f32 * 0.37);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - orbit.radius).abs() < 1e-4);
        }
    }
}
