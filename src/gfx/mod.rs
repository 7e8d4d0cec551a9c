//! # Graphics Module
//!
//! Everything that talks to the GPU.
//!
//! - **Camera** ([`camera`]) - first-person fly camera and its matrices
//! - **Rendering** ([`rendering`]) - surface, pipelines and the per-frame draw
//! - **Scene** ([`scene`]) - OBJ import and the fixed model layout
//! - **Resources** ([`resources`]) - uniforms, textures and materials
//!
//! Only the camera is usable without a device; it is part of the persisted
//! viewer state.

pub mod camera;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
