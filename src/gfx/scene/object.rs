//! OBJ model import and GPU meshes
//!
//! Import is split in two: [`ModelData::load`] parses the OBJ/MTL pair on the
//! CPU, and [`Model::upload`] turns it into vertex buffers and materials.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use wgpu::{util::DeviceExt, Device};

use super::vertex::Vertex3D;
use crate::{
    error::{Result, ViewerError},
    gfx::resources::{Material, MaterialBindings, TextureResource},
};

/// Texel used when a material names no diffuse map
const DEFAULT_DIFFUSE: [u8; 4] = [255, 255, 255, 255];
/// Texel used when a material names no specular map
const DEFAULT_SPECULAR: [u8; 4] = [0, 0, 0, 255];

/// Triangle mesh in CPU memory
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    pub material_id: Option<usize>,
}

impl MeshData {
    /// Interleaves a single-indexed tobj mesh.
    ///
    /// Missing normals are rebuilt by averaging face normals. Texture `v` is
    /// flipped because OBJ puts its origin at the bottom of the image.
    pub fn from_tobj(model: &tobj::Model) -> Self {
        let mesh = &model.mesh;
        let vertex_count = mesh.positions.len() / 3;

        let normals = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals.clone()
        } else {
            calculate_vertex_normals(&mesh.positions, &mesh.indices)
        };
        let has_tex_coords = mesh.texcoords.len() == vertex_count * 2;

        let vertices = (0..vertex_count)
            .map(|i| Vertex3D {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                normal: [normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]],
                tex_coords: if has_tex_coords {
                    [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
            })
            .collect();

        Self {
            name: model.name.clone(),
            vertices,
            indices: mesh.indices.clone(),
            material_id: mesh.material_id,
        }
    }
}

/// Smooth per-vertex normals from the faces that share each vertex
pub fn calculate_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let corner = |k: usize| {
            let i = triangle[k] as usize * 3;
            [positions[i], positions[i + 1], positions[i + 2]]
        };
        let (v0, v1, v2) = (corner(0), corner(1), corner(2));

        let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let face_normal = [
            edge1[1] * edge2[2] - edge1[2] * edge2[1],
            edge1[2] * edge2[0] - edge1[0] * edge2[2],
            edge1[0] * edge2[1] - edge1[1] * edge2[0],
        ];

        for &index in triangle {
            let i = index as usize * 3;
            normals[i] += face_normal[0];
            normals[i + 1] += face_normal[1];
            normals[i + 2] += face_normal[2];
        }
    }

    for normal in normals.chunks_exact_mut(3) {
        let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
        if length > 0.0 {
            normal.iter_mut().for_each(|c| *c /= length);
        }
    }

    normals
}

/// Texture maps named by an MTL material, resolved against the OBJ directory
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialMaps {
    pub name: String,
    pub diffuse: Option<PathBuf>,
    pub specular: Option<PathBuf>,
}

impl MaterialMaps {
    pub fn from_tobj(material: &tobj::Material, base_dir: &Path) -> Self {
        let resolve = |texture: &Option<String>| {
            texture
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(|name| base_dir.join(name))
        };
        Self {
            name: material.name.clone(),
            diffuse: resolve(&material.diffuse_texture),
            specular: resolve(&material.specular_texture),
        }
    }

    fn untextured() -> Self {
        Self {
            name: "default".to_string(),
            diffuse: None,
            specular: None,
        }
    }
}

/// A parsed OBJ file with its materials
#[derive(Debug, Clone)]
pub struct ModelData {
    pub path: PathBuf,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialMaps>,
}

impl ModelData {
    /// Parses an OBJ file and the MTL library it references.
    ///
    /// A missing or broken MTL library is not fatal: every mesh then falls
    /// back to the untextured default material.
    pub fn load(path: &Path) -> Result<Self> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|err| ViewerError::model(path, err))?;

        let materials = materials.unwrap_or_else(|err| {
            warn!("No usable MTL for {}: {}", path.display(), err);
            Vec::new()
        });

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let model = Self {
            path: path.to_path_buf(),
            meshes: models.iter().map(MeshData::from_tobj).collect(),
            materials: materials
                .iter()
                .map(|mtl| MaterialMaps::from_tobj(mtl, base_dir))
                .collect(),
        };

        debug!(
            "Parsed {}: {} meshes, {} materials",
            path.display(),
            model.meshes.len(),
            model.materials.len()
        );
        Ok(model)
    }

    /// Material slot for every mesh, plus whether a trailing default
    /// material is needed for meshes without a valid material id
    pub fn material_slots(&self) -> (Vec<usize>, bool) {
        let default_slot = self.materials.len();
        let slots: Vec<usize> = self
            .meshes
            .iter()
            .map(|mesh| match mesh.material_id {
                Some(id) if id < self.materials.len() => id,
                _ => default_slot,
            })
            .collect();
        let needs_default = slots.contains(&default_slot);
        (slots, needs_default)
    }
}

/// Mesh uploaded to the GPU
pub struct Mesh {
    pub name: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: usize,
}

/// All meshes and materials of one OBJ file
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn upload(
        device: &Device,
        queue: &wgpu::Queue,
        data: &ModelData,
        bindings: &MaterialBindings,
        shininess: f32,
    ) -> Self {
        let (slots, needs_default) = data.material_slots();

        let mut maps: Vec<&MaterialMaps> = data.materials.iter().collect();
        let untextured = MaterialMaps::untextured();
        if needs_default {
            maps.push(&untextured);
        }

        let materials = maps
            .into_iter()
            .map(|maps| {
                let diffuse = load_map(device, queue, maps.diffuse.as_deref(), DEFAULT_DIFFUSE);
                let specular = load_map(device, queue, maps.specular.as_deref(), DEFAULT_SPECULAR);
                Material::new(device, bindings, &maps.name, diffuse, specular, shininess)
            })
            .collect();

        let meshes = data
            .meshes
            .iter()
            .zip(slots)
            .map(|(mesh, material)| Mesh {
                name: mesh.name.clone(),
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Vertex Buffer", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Index Buffer", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
                material,
            })
            .collect();

        Self { meshes, materials }
    }
}

fn load_map(
    device: &Device,
    queue: &wgpu::Queue,
    path: Option<&Path>,
    fallback: [u8; 4],
) -> TextureResource {
    if let Some(path) = path {
        match TextureResource::from_image_path(device, queue, path) {
            Ok(texture) => return texture,
            Err(err) => warn!("{}; using a flat texture instead", err),
        }
    }
    TextureResource::solid_color(device, queue, fallback, "Fallback Texture")
}

pub trait DrawModel<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh, material: &'a Material);
    fn draw_model(&mut self, model: &'a Model);
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh, material: &'b Material) {
        self.set_bind_group(2, material.bind_group(), &[]);
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }

    fn draw_model(&mut self, model: &'b Model) {
        for mesh in &model.meshes {
            if let Some(material) = model.materials.get(mesh.material) {
                self.draw_mesh(mesh, material);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o Quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl painted
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl painted
map_Kd textures/diffuse.png
map_Ks specular.jpg
";

    #[test]
    fn test_load_quad_with_materials() {
        let dir = tempdir().unwrap();
        let obj = dir.path().join("quad.obj");
        fs::write(&obj, QUAD_OBJ).unwrap();
        fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let data = ModelData::load(&obj).unwrap();
        assert_eq!(data.meshes.len(), 1);

        let mesh = &data.meshes[0];
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.material_id, Some(0));
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);

        let maps = &data.materials[0];
        assert_eq!(maps.name, "painted");
        assert_eq!(maps.diffuse, Some(dir.path().join("textures/diffuse.png")));
        assert_eq!(maps.specular, Some(dir.path().join("specular.jpg")));
        assert_eq!(data.material_slots(), (vec![0], false));
    }

    #[test]
    fn test_tex_coords_are_flipped() {
        let dir = tempdir().unwrap();
        let obj = dir.path().join("quad.obj");
        fs::write(&obj, QUAD_OBJ).unwrap();
        fs::write(dir.path().join("quad.mtl"), QUAD_MTL).unwrap();

        let data = ModelData::load(&obj).unwrap();
        let v_values: Vec<f32> = data.meshes[0]
            .vertices
            .iter()
            .map(|v| v.tex_coords[1])
            .collect();
        assert!(v_values.contains(&1.0));
        assert!(v_values.contains(&0.0));
        let origin = data.meshes[0]
            .vertices
            .iter()
            .find(|v| v.position == [0.0, 0.0, 0.0])
            .unwrap();
        assert_eq!(origin.tex_coords, [0.0, 1.0]);
    }

    #[test]
    fn test_missing_mtl_uses_default_material() {
        let dir = tempdir().unwrap();
        let obj = dir.path().join("quad.obj");
        fs::write(&obj, QUAD_OBJ).unwrap();

        let data = ModelData::load(&obj).unwrap();
        assert!(data.materials.is_empty());
        assert_eq!(data.material_slots(), (vec![0], true));
    }

    #[test]
    fn test_missing_obj_is_model_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nothing.obj");
        assert!(matches!(
            ModelData::load(&path),
            Err(ViewerError::Model { .. })
        ));
    }

    #[test]
    fn test_vertex_normals_from_faces() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let normals = calculate_vertex_normals(&positions, &[0, 1, 2]);
        for normal in normals.chunks_exact(3) {
            assert_eq!(normal, [0.0, 0.0, 1.0]);
        }
    }
}
