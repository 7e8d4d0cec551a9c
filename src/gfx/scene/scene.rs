use cgmath::{Deg, Matrix, Matrix4, SquareMatrix, Vector3};
use log::info;
use wgpu::{util::DeviceExt, Device};

use super::object::{Model, ModelData};
use crate::{
    config::ViewerConfig,
    error::Result,
    gfx::resources::MaterialBindings,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
    },
};

/// Which pass draws an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPassKind {
    /// Phong-lit, depth-tested, no blending
    Opaque,
    /// Diffuse texture only, alpha-blended after every opaque draw
    Blended,
}

/// Fixed placement of one model in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Path relative to the asset root
    pub model: &'static str,
    pub translation: [f32; 3],
    pub scale: f32,
    /// Rotation about +Y in degrees
    pub rotation_y: f32,
    pub pass: RenderPassKind,
}

impl Placement {
    /// Translate, then scale, then rotate
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::from(self.translation))
            * Matrix4::from_scale(self.scale)
            * Matrix4::from_angle_y(Deg(self.rotation_y))
    }
}

/// The scene: stone floor, bank interior, a painting and a glass pane
pub const SCENE_LAYOUT: [Placement; 4] = [
    Placement {
        model: "floor/stone_floor.obj",
        translation: [10.0, -125.0, 0.0],
        scale: 3.0,
        rotation_y: 0.0,
        pass: RenderPassKind::Opaque,
    },
    Placement {
        model: "scene/bank.obj",
        translation: [10.0, -124.9, 1.0],
        scale: 0.35,
        rotation_y: 0.0,
        pass: RenderPassKind::Opaque,
    },
    Placement {
        model: "picture/picture.obj",
        translation: [10.0, -120.0, -5.0],
        scale: 5.0,
        rotation_y: 90.0,
        pass: RenderPassKind::Opaque,
    },
    Placement {
        model: "glass/glass.obj",
        translation: [15.0, -117.5, 2.5],
        scale: 7.5,
        rotation_y: 0.0,
        pass: RenderPassKind::Blended,
    },
];

/// Per-object uniform: model matrix and the matrix for transforming normals
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>) -> Self {
        // Inverse-transpose keeps normals perpendicular under non-uniform scale
        let normal = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        Self {
            model: model.into(),
            normal: normal.into(),
        }
    }
}

/// Layout of the per-object bind group, bound to slot 1
pub struct ObjectBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
}

impl ObjectBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Object Bind Group Layout");
        Self { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }
}

/// A model placed in the world
pub struct SceneObject {
    pub name: String,
    pub model: Model,
    pub pass: RenderPassKind,
    _transform_buffer: wgpu::Buffer,
    transform_bind_group: wgpu::BindGroup,
}

impl SceneObject {
    pub fn transform_bind_group(&self) -> &wgpu::BindGroup {
        &self.transform_bind_group
    }
}

/// Every object in the viewer, loaded once at startup
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Loads every model in [`SCENE_LAYOUT`] from the configured asset root.
    ///
    /// A model that cannot be read aborts startup; a texture that cannot be
    /// read is replaced by a flat fallback.
    pub fn load(
        device: &Device,
        queue: &wgpu::Queue,
        config: &ViewerConfig,
        object_bindings: &ObjectBindings,
        material_bindings: &MaterialBindings,
    ) -> Result<Self> {
        let mut objects = Vec::with_capacity(SCENE_LAYOUT.len());

        for placement in SCENE_LAYOUT.iter() {
            let path = config.asset_root.join(placement.model);
            let data = ModelData::load(&path)?;
            let model = Model::upload(device, queue, &data, material_bindings, config.shininess);

            let uniform = ObjectUniform::new(placement.model_matrix());
            let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Transform Buffer", placement.model)),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let transform_bind_group = BindGroupBuilder::new(&object_bindings.bind_group_layout)
                .resource(transform_buffer.as_entire_binding())
                .create(device, &format!("{} Transform Bind Group", placement.model));

            info!(
                "Loaded {} ({} meshes, {} materials)",
                path.display(),
                model.meshes.len(),
                model.materials.len()
            );

            objects.push(SceneObject {
                name: placement.model.to_string(),
                model,
                pass: placement.pass,
                _transform_buffer: transform_buffer,
                transform_bind_group,
            });
        }

        Ok(Self { objects })
    }

    /// Objects drawn by `pass`, in layout order
    pub fn objects_in(&self, pass: RenderPassKind) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(move |object| object.pass == pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    fn transform(m: Matrix4<f32>, p: [f32; 3]) -> Vector3<f32> {
        let v = m * Vector4::new(p[0], p[1], p[2], 1.0);
        Vector3::new(v.x, v.y, v.z)
    }

    #[test]
    fn test_glass_is_the_only_blended_object() {
        let blended: Vec<&str> = SCENE_LAYOUT
            .iter()
            .filter(|p| p.pass == RenderPassKind::Blended)
            .map(|p| p.model)
            .collect();
        assert_eq!(blended, vec!["glass/glass.obj"]);
        assert_eq!(SCENE_LAYOUT.last().unwrap().pass, RenderPassKind::Blended);
    }

    #[test]
    fn test_floor_transform() {
        let floor = SCENE_LAYOUT[0].model_matrix();
        let p = transform(floor, [1.0, 0.0, 0.0]);
        assert!((p - Vector3::new(13.0, -125.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_picture_rotates_before_scaling() {
        let picture = SCENE_LAYOUT[2].model_matrix();
        // +X rotated 90 degrees about Y lands on -Z, then scaled by 5
        let p = transform(picture, [1.0, 0.0, 0.0]);
        assert!((p - Vector3::new(10.0, -120.0, -10.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_normal_matrix_undoes_scale() {
        let uniform = ObjectUniform::new(Matrix4::from_scale(2.0));
        assert!((uniform.normal[0][0] - 0.5).abs() < 1e-6);
        assert!((uniform.model[0][0] - 2.0).abs() < 1e-6);
    }
}
