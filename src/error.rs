//! Error types for the viewer
//!
//! Only bootstrap and asset import can fail. The settings store never returns
//! an error from loading; see [`crate::state::persistence`].

use std::path::PathBuf;

/// Errors that abort startup or shutdown of the viewer
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to request adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("Failed to load model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Failed to load texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    pub fn model(path: impl Into<PathBuf>, source: tobj::LoadError) -> Self {
        ViewerError::Model {
            path: path.into(),
            source,
        }
    }

    pub fn texture(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        ViewerError::Texture {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for viewer operations
pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_names_path() {
        let err = ViewerError::model("resources/objects/floor.obj", tobj::LoadError::OpenFileFailed);
        let message = err.to_string();
        assert!(message.contains("resources/objects/floor.obj"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ViewerError = io.into();
        assert!(matches!(err, ViewerError::Io(_)));
    }
}
