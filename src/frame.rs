//! Per-frame derived parameters
//!
//! A [`FrameSnapshot`] is computed from [`ViewerState`] once per frame, before
//! any draw submission. It owns no rendering logic: the render engine turns it
//! into uniform data.

use cgmath::{Matrix4, Vector3};

use crate::{
    config::LightOrbit,
    gfx::camera::Camera,
    state::{PointLight, SpotLight, ViewerState},
};

/// Everything the renderer needs to know about the current frame
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot {
    /// Seconds since the viewer started
    pub elapsed: f32,
    pub clear_color: [f32; 3],
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub view_position: Vector3<f32>,
    /// Point light with its position moved along the orbit
    pub point_light: PointLight,
    pub spot_light: SpotLight,
    /// Cosine of the spot light's inner cutoff
    pub spot_cos_cut_off: f32,
    /// Cosine of the spot light's outer cutoff
    pub spot_cos_outer_cut_off: f32,
}

impl FrameSnapshot {
    /// Derives the frame parameters for `elapsed` seconds into the run.
    ///
    /// The point light position depends on elapsed time only; the state's own
    /// point light position is left untouched.
    pub fn derive(state: &ViewerState, orbit: &LightOrbit, elapsed: f32, aspect: f32) -> Self {
        let mut point_light = state.point_light;
        point_light.position = orbit.position_at(elapsed).into();

        let spot_light = state.spot_light;

        Self {
            elapsed,
            clear_color: state.clear_color,
            view: state.camera.view_matrix(),
            projection: state.camera.projection_matrix(aspect),
            view_position: state.camera.position,
            point_light,
            spot_light,
            spot_cos_cut_off: spot_light.cut_off.to_radians().cos(),
            spot_cos_outer_cut_off: spot_light.outer_cut_off.to_radians().cos(),
        }
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    fn snapshot_at(state: &ViewerState, elapsed: f32) -> FrameSnapshot {
        FrameSnapshot::derive(state, &LightOrbit::default(), elapsed, 800.0 / 600.0)
    }

    #[test]
    fn test_point_light_follows_orbit() {
        let state = ViewerState::default();
        let quarter_turn = std::f32::consts::FRAC_PI_2;
        let snapshot = snapshot_at(&state, quarter_turn);

        let [x, y, z] = snapshot.point_light.position;
        assert!(x.abs() < 1e-4);
        assert!((y + 120.0).abs() < 1e-4);
        assert!((z - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_does_not_touch_state() {
        let state = ViewerState::default();
        let before = state.point_light.position;
        let _ = snapshot_at(&state, 12.5);
        assert_eq!(state.point_light.position, before);
    }

    #[test]
    fn test_same_time_same_light() {
        let state = ViewerState::default();
        let a = snapshot_at(&state, 3.3);
        let b = snapshot_at(&state, 3.3);
        assert_eq!(a.point_light.position, b.point_light.position);
    }

    #[test]
    fn test_spot_cutoffs_are_cosines() {
        let state = ViewerState::default();
        let snapshot = snapshot_at(&state, 0.0);
        assert!((snapshot.spot_cos_cut_off - 10f32.to_radians().cos()).abs() < 1e-6);
        assert!(snapshot.spot_cos_outer_cut_off < snapshot.spot_cos_cut_off);
    }

    #[test]
    fn test_point_in_front_of_camera_projects_inside_clip_volume() {
        let state = ViewerState::default();
        let snapshot = snapshot_at(&state, 0.0);

        let target = state.camera.position + state.camera.front.normalize() * 10.0;
        let clip = snapshot.view_projection() * Vector4::new(target.x, target.y, target.z, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_zoom_narrows_projection() {
        let mut state = ViewerState::default();
        let wide = snapshot_at(&state, 0.0).projection;
        state.camera.process_mouse_scroll(20.0);
        let narrow = snapshot_at(&state, 0.0).projection;
        assert!(narrow.y.y > wide.y.y);
    }
}
