use cgmath::{Matrix4, SquareMatrix, Vector3};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub trait Camera: Sized {
    fn view_matrix(&self) -> Matrix4<f32>;

    /// Projection into wgpu clip space (depth in `[0, 1]`)
    fn projection_matrix(&self, aspect: f32) -> Matrix4<f32>;

    fn build_view_projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    pub view: [[f32; 4]; 4],

    pub projection: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view: convert_matrix4_to_array(Matrix4::identity()),
            projection: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

impl CameraUniform {
    pub fn new(eye: Vector3<f32>, view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        Self {
            view_position: [eye.x, eye.y, eye.z, 1.0],
            view: convert_matrix4_to_array(view),
            projection: convert_matrix4_to_array(projection),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
