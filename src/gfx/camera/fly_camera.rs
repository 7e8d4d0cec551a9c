//! Free-fly camera driven by yaw/pitch angles
//!
//! Orientation is canonically stored as `yaw` and `pitch` (degrees). The
//! `front`, `right` and `up` basis vectors are derived from them and cached.

use cgmath::*;

use super::camera_utils::{Camera, OPENGL_TO_WGPU_MATRIX};
use crate::config::CameraConfig;

const DEFAULT_YAW: f32 = -90.0;
const DEFAULT_PITCH: f32 = 0.0;
const DEFAULT_ZOOM: f32 = 45.0;

/// Direction of a keyboard-driven camera translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub world_up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
    pub znear: f32,
    pub zfar: f32,
    pub bounds: FlyCameraBounds,
}

impl Camera for FlyCamera {
    fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        Matrix4::look_at_rh(eye, eye + self.front, self.up)
    }

    fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.zoom), aspect, self.znear, self.zfar)
    }
}

impl FlyCamera {
    pub fn new(position: Vector3<f32>) -> Self {
        Self::from_config(&CameraConfig {
            start_position: position,
            ..CameraConfig::default()
        })
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            position: config.start_position,
            front: -Vector3::unit_z(),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: Vector3::unit_y(),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            zoom: DEFAULT_ZOOM,
            znear: config.znear,
            zfar: config.zfar,
            bounds: FlyCameraBounds::default(),
        };
        camera.update_camera_vectors();
        camera
    }

    /// Translates along the camera's own axes, scaled by frame time
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Applies a pointer delta in pixels to yaw and pitch.
    ///
    /// `y_offset` grows upward; callers invert screen-space deltas.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-self.bounds.max_pitch, self.bounds.max_pitch);
        }

        self.update_camera_vectors();
    }

    /// Narrows or widens the field of view
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(self.bounds.min_zoom, self.bounds.max_zoom);
    }

    /// Restores orientation from a cached front vector.
    ///
    /// Yaw and pitch are re-derived so later pointer motion continues from the
    /// restored view. Returns `false` and leaves the camera untouched when the
    /// vector has no usable length.
    pub fn set_front(&mut self, front: Vector3<f32>) -> bool {
        let length = front.magnitude();
        if !length.is_finite() || length <= f32::EPSILON {
            return false;
        }

        let front = front / length;
        self.pitch = front.y.clamp(-1.0, 1.0).asin().to_degrees();
        self.yaw = front.z.atan2(front.x).to_degrees();
        self.front = front;
        self.update_basis();
        true
    }

    fn update_camera_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        self.front = Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.update_basis();
    }

    fn update_basis(&mut self) {
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FlyCameraBounds {
    /// Largest absolute pitch in degrees, keeps the view from flipping over
    pub max_pitch: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for FlyCameraBounds {
    fn default() -> Self {
        Self {
            max_pitch: 89.0,
            min_zoom: 1.0,
            max_zoom: 45.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = FlyCamera::new(Vector3::new(0.0, 0.0, 3.0));
        assert!(approx(camera.front, Vector3::new(0.0, 0.0, -1.0)));
        assert!(approx(camera.right, Vector3::new(1.0, 0.0, 0.0)));
        assert!(approx(camera.up, Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_keyboard_movement_scales_with_delta_time() {
        let mut camera = FlyCamera::new(Vector3::zero());
        camera.process_keyboard(CameraMovement::Forward, 0.5);
        assert!(approx(camera.position, Vector3::new(0.0, 0.0, -1.25)));

        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert!(approx(camera.position, Vector3::new(5.0, 0.0, -1.25)));
    }

    #[test]
    fn test_pitch_is_constrained() {
        let mut camera = FlyCamera::new(Vector3::zero());
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch, 89.0);

        camera.process_mouse_movement(0.0, -100_000.0, true);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn test_scroll_clamps_zoom() {
        let mut camera = FlyCamera::new(Vector3::zero());
        camera.process_mouse_scroll(10.0);
        assert_eq!(camera.zoom, 35.0);

        camera.process_mouse_scroll(500.0);
        assert_eq!(camera.zoom, 1.0);

        camera.process_mouse_scroll(-500.0);
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn test_set_front_rederives_angles() {
        let mut camera = FlyCamera::new(Vector3::zero());
        assert!(camera.set_front(Vector3::new(1.0, 1.0, 0.0)));
        assert!((camera.yaw - 0.0).abs() < 1e-3);
        assert!((camera.pitch - 45.0).abs() < 1e-3);

        // A zero-length pointer delta recomputes front from the angles.
        let restored = camera.front;
        camera.process_mouse_movement(0.0, 0.0, true);
        assert!(approx(camera.front, restored));
    }

    #[test]
    fn test_set_front_rejects_degenerate_vector() {
        let mut camera = FlyCamera::new(Vector3::zero());
        let before = camera.front;
        assert!(!camera.set_front(Vector3::zero()));
        assert!(!camera.set_front(Vector3::new(f32::NAN, 0.0, 0.0)));
        assert!(approx(camera.front, before));
    }

    #[test]
    fn test_view_matrix_is_invertible() {
        let camera = FlyCamera::new(Vector3::new(1.0, 2.0, 3.0));
        assert!(camera.view_matrix().determinant().abs() > 1e-4);
    }
}
