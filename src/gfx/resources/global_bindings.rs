//! Global uniform bindings for camera and scene lights
//!
//! Manages the per-frame uniform buffer shared by every draw in the scene:
//! view and projection matrices, the eye position, and both lights.

use crate::{
    frame::FrameSnapshot,
    gfx::camera::camera_utils::CameraUniform,
    state::{PointLight, SpotLight},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Point light as laid out in the shader. Every member is padded to a vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    position: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    /// constant, linear, quadratic, unused
    attenuation: [f32; 4],
}

impl From<&PointLight> for PointLightRaw {
    fn from(light: &PointLight) -> Self {
        Self {
            position: extend(light.position),
            ambient: extend(light.ambient),
            diffuse: extend(light.diffuse),
            specular: extend(light.specular),
            attenuation: [light.constant, light.linear, light.quadratic, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    position: [f32; 4],
    direction: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    /// constant, linear, quadratic, unused
    attenuation: [f32; 4],
    /// cos(inner), cos(outer), unused, unused
    cut_offs: [f32; 4],
}

impl SpotLightRaw {
    fn new(light: &SpotLight, cos_cut_off: f32, cos_outer_cut_off: f32) -> Self {
        Self {
            position: extend(light.position),
            direction: extend(light.direction),
            ambient: extend(light.ambient),
            diffuse: extend(light.diffuse),
            specular: extend(light.specular),
            attenuation: [light.constant, light.linear, light.quadratic, 0.0],
            cut_offs: [cos_cut_off, cos_outer_cut_off, 0.0, 0.0],
        }
    }
}

/// Global uniform buffer content structure
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    camera: CameraUniform,
    point_light: PointLightRaw,
    spot_light: SpotLightRaw,
}

impl From<&FrameSnapshot> for GlobalUBOContent {
    fn from(frame: &FrameSnapshot) -> Self {
        Self {
            camera: CameraUniform::new(frame.view_position, frame.view, frame.projection),
            point_light: PointLightRaw::from(&frame.point_light),
            spot_light: SpotLightRaw::new(
                &frame.spot_light,
                frame.spot_cos_cut_off,
                frame.spot_cos_outer_cut_off,
            ),
        }
    }
}

fn extend(v: [f32; 3]) -> [f32; 4] {
    [v[0], v[1], v[2], 1.0]
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Uploads the frame's camera and light parameters
pub fn update_global_ubo(ubo: &mut GlobalUBO, queue: &wgpu::Queue, frame: &FrameSnapshot) {
    ubo.update_content(queue, GlobalUBOContent::from(frame));
}

/// Bind group layout and bind group for global uniforms, bound to slot 0 in
/// every pipeline
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LightOrbit, state::ViewerState};

    #[test]
    fn test_uniform_layout_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<PointLightRaw>(), 5 * 16);
        assert_eq!(std::mem::size_of::<SpotLightRaw>(), 7 * 16);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>() % 16, 0);
    }

    #[test]
    fn test_content_from_frame() {
        let state = ViewerState::default();
        let frame = FrameSnapshot::derive(&state, &LightOrbit::default(), 0.0, 4.0 / 3.0);
        let content = GlobalUBOContent::from(&frame);

        assert_eq!(content.camera.view_position, [0.0, 0.0, 3.0, 1.0]);
        assert_eq!(content.point_light.position, [7.0, -120.0, 0.0, 1.0]);
        assert_eq!(content.point_light.attenuation, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(content.spot_light.cut_offs[0], frame.spot_cos_cut_off);
        assert_eq!(content.spot_light.cut_offs[1], frame.spot_cos_outer_cut_off);
    }
}
