//! # Scene Management Module
//!
//! Loads the viewer's fixed set of OBJ models and places them in the world.
//!
//! - [`Scene`] - every placed model, split by render pass
//! - [`ModelData`] / [`Model`] - OBJ import on the CPU and its GPU upload
//! - [`Vertex3D`] - vertex format shared by every pipeline

pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawModel, Model, ModelData};
pub use scene::{ObjectBindings, RenderPassKind, Scene, SceneObject, SCENE_LAYOUT};
pub use vertex::Vertex3D;
