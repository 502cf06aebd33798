//! Canvas and backend errors

use thiserror::Error;
use vektor_core::TextureId;

/// Errors reported by a render backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Texture {0:?} does not exist")]
    TextureNotFound(TextureId),

    #[error("Texture data has {actual} bytes, expected {expected}")]
    InvalidTextureData { expected: usize, actual: usize },

    #[error("Region {x},{y} {width}x{height} lies outside the texture")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Backend failure: {0}")]
    Other(String),
}

/// Errors raised by canvas construction, configuration and image management
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to create glyph atlas")]
    Atlas(#[source] BackendError),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
