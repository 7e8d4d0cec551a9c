// src/lib.rs
//! Heist scene viewer
//!
//! A single-scene real-time viewer built on wgpu and winit: textured OBJ
//! models lit by an orbiting point light and a spot light, a free-fly camera,
//! and an ImGui overlay for tweaking parameters. Background colour, overlay
//! visibility and camera pose persist across runs.

pub mod app;
pub mod config;
pub mod error;
pub mod frame;
pub mod gfx;
pub mod input;
pub mod state;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::HeistApp;
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use state::ViewerState;
