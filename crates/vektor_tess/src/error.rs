//! Tessellation errors

use thiserror::Error;

/// Errors raised while building or expanding paths
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TessError {
    /// Growing one of the arena buffers failed
    #[error("Failed to grow {buffer} buffer to {requested} elements")]
    OutOfMemory {
        buffer: &'static str,
        requested: usize,
    },
}

pub type Result<T> = std::result::Result<T, TessError>;
