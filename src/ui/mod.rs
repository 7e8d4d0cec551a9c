//! # User Interface Module
//!
//! Dear ImGui overlay, shown while the overlay flag in
//! [`ViewerState`](crate::state::ViewerState) is set.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`viewer_panel`] - the parameter and camera windows
//!
//! The overlay writes into the viewer state directly. When it is visible
//! and ImGui wants the pointer, pointer events stop at the overlay so
//! scrolling a window does not zoom the camera.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{viewer_panel, CameraDiagnostics};
