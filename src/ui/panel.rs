// src/ui/panel.rs
//! Overlay panels for the viewer
//!
//! Widgets write straight into [`ViewerState`]. Ranges are imposed by the
//! widgets only; the state itself accepts any value.

use imgui::Drag;

use crate::{gfx::camera::FlyCamera, state::ViewerState};

/// Drag speed and range shared by every attenuation widget
const ATTENUATION_SPEED: f32 = 0.05;
const ATTENUATION_RANGE: (f32, f32) = (0.0, 1.0);

/// Read-only camera readout shown in the "Camera info" window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDiagnostics {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub front: [f32; 3],
}

impl From<&FlyCamera> for CameraDiagnostics {
    fn from(camera: &FlyCamera) -> Self {
        Self {
            position: camera.position.into(),
            yaw: camera.yaw,
            pitch: camera.pitch,
            front: camera.front.into(),
        }
    }
}

impl CameraDiagnostics {
    pub fn lines(&self) -> [String; 3] {
        let [px, py, pz] = self.position;
        let [fx, fy, fz] = self.front;
        [
            format!("Camera position: ({:.6}, {:.6}, {:.6})", px, py, pz),
            format!("(Yaw, Pitch): ({:.6}, {:.6})", self.yaw, self.pitch),
            format!("Camera front: ({:.6}, {:.6}, {:.6})", fx, fy, fz),
        ]
    }
}

/// Draws every overlay window for this frame
pub fn viewer_panel(ui: &imgui::Ui, state: &mut ViewerState) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    scene_parameters_window(ui, state);
    camera_info_window(ui, state);
}

fn scene_parameters_window(ui: &imgui::Ui, state: &mut ViewerState) {
    ui.window("Scene parameters")
        .size([420.0, 460.0], imgui::Condition::FirstUseEver)
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .build(|| {
            ui.color_edit3("Background color", &mut state.clear_color);

            // Reserved placement; no draw call reads it
            let placement = &mut state.initial_object_placement;
            Drag::new("Object position").build_array(ui, &mut placement.position[..]);
            Drag::new("Object scale")
                .speed(0.05)
                .range(0.1, 4.0)
                .build(ui, &mut placement.scale);

            if ui.collapsing_header("Point light", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                let light = &mut state.point_light;
                attenuation_drag(ui, "pointLight.constant", &mut light.constant);
                attenuation_drag(ui, "pointLight.linear", &mut light.linear);
                attenuation_drag(ui, "pointLight.quadratic", &mut light.quadratic);
            }

            if ui.collapsing_header("Spotlight", imgui::TreeNodeFlags::DEFAULT_OPEN) {
                let light = &mut state.spot_light;
                Drag::new("Spotlight position").build_array(ui, &mut light.position[..]);
                attenuation_drag(ui, "spotLight.constant", &mut light.constant);
                attenuation_drag(ui, "spotLight.linear", &mut light.linear);
                attenuation_drag(ui, "spotLight.quadratic", &mut light.quadratic);
            }
        });
}

fn attenuation_drag(ui: &imgui::Ui, label: &str, value: &mut f32) -> bool {
    let (min, max) = ATTENUATION_RANGE;
    Drag::new(label)
        .speed(ATTENUATION_SPEED)
        .range(min, max)
        .build(ui, value)
}

fn camera_info_window(ui: &imgui::Ui, state: &mut ViewerState) {
    let diagnostics = CameraDiagnostics::from(&state.camera);

    ui.window("Camera info")
        .size([460.0, 170.0], imgui::Condition::FirstUseEver)
        .position([460.0, 20.0], imgui::Condition::FirstUseEver)
        .build(|| {
            for line in diagnostics.lines() {
                ui.text(line);
            }
            ui.checkbox("Camera mouse update", &mut state.camera_mouse_control_enabled);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_diagnostics_follow_camera() {
        let mut camera = FlyCamera::new(Vector3::new(1.0, 2.0, 3.0));
        camera.process_mouse_movement(100.0, 50.0, true);

        let diagnostics = CameraDiagnostics::from(&camera);
        assert_eq!(diagnostics.position, [1.0, 2.0, 3.0]);
        assert_eq!(diagnostics.yaw, camera.yaw);
        assert_eq!(diagnostics.pitch, camera.pitch);
        assert_eq!(diagnostics.front, Into::<[f32; 3]>::into(camera.front));
    }

    #[test]
    fn test_diagnostic_lines() {
        let diagnostics = CameraDiagnostics::from(&FlyCamera::new(Vector3::new(0.0, 0.0, 3.0)));
        let [position, angles, front] = diagnostics.lines();
        assert_eq!(position, "Camera position: (0.000000, 0.000000, 3.000000)");
        assert_eq!(angles, "(Yaw, Pitch): (-90.000000, 0.000000)");
        assert!(front.starts_with("Camera front: ("));
    }
}
