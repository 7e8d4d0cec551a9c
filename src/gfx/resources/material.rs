//! Phong materials
//!
//! A material pairs a diffuse map and a specular map with a shininess
//! exponent. Every material shares one bind group layout, bound to slot 1.

use wgpu::Device;

use super::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub shininess: f32,
    _padding: [f32; 3],
}

impl MaterialUniform {
    pub fn new(shininess: f32) -> Self {
        Self {
            shininess,
            _padding: [0.0; 3],
        }
    }
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Layout shared by every material bind group
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Bind Group Layout");

        MaterialBindings { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

/// Diffuse and specular maps with their GPU bindings
pub struct Material {
    pub name: String,
    pub diffuse: TextureResource,
    pub specular: TextureResource,
    _material_ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &Device,
        bindings: &MaterialBindings,
        name: &str,
        diffuse: TextureResource,
        specular: TextureResource,
        shininess: f32,
    ) -> Self {
        let material_ubo = MaterialUBO::new_with_data(device, &MaterialUniform::new(shininess));

        let bind_group = BindGroupBuilder::new(&bindings.bind_group_layout)
            .resource(material_ubo.binding_resource())
            .texture(&diffuse.view)
            .sampler(&diffuse.sampler)
            .texture(&specular.view)
            .sampler(&specular.sampler)
            .create(device, &format!("Material Bind Group: {}", name));

        Self {
            name: name.to_string(),
            diffuse,
            specular,
            _material_ubo: material_ubo,
            bind_group,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_one_vec4() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
        assert_eq!(MaterialUniform::new(32.0).shininess, 32.0);
    }
}
