//! Vektor Paint/Canvas API
//!
//! A retained-path 2D drawing API in the spirit of HTML Canvas. Paths are
//! recorded in transformed space, tessellated into anti-aliased triangle
//! geometry and handed to a [`RenderBackend`].
//!
//! # Features
//!
//! - Path drawing (lines, Bézier curves, arcs)
//! - Shape primitives (rect, rounded rect, ellipse, circle)
//! - Fills and strokes with colors, gradients and image patterns
//! - Save/restore draw state with transforms and scissoring
//! - Text through a pluggable [`TextShaper`]
//! - A headless [`RecordingBackend`] for tests and tooling

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod recording;
pub mod state;
pub mod text;

pub use backend::RenderBackend;
pub use config::CanvasConfig;
pub use context::{Canvas, FrameStats};
pub use error::{BackendError, CanvasError, Result};
pub use recording::{RecordedCall, RecordedPath, RecordedTexture, RecordingBackend};
pub use state::{DrawState, StateStack};
pub use text::{AtlasRegion, FontId, FontStyle, GlyphQuad, ShapedRun, TextAlign, TextShaper};

pub use vektor_core::{
    Affine2D, BlendFactor, Bounds, Color, CompositeOperation, CompositeOperationState,
    CornerRadius, ImageFlags, LineCap, LineJoin, Paint, Point, Rect, Scissor, TextureId,
    TextureKind, Winding,
};
pub use vektor_tess::{Tolerance, Vertex};
