//! Vektor core value types
//!
//! Plain, copyable values shared by the tessellator, the canvas API and
//! render backends:
//!
//! - Geometry: points, rectangles, bounds
//! - 2D affine transforms
//! - Straight-alpha colors and paints (solid, gradients, image patterns)
//! - Scissor rectangles
//! - Stroke styles, winding and composite operations

pub mod color;
pub mod geometry;
pub mod image;
pub mod paint;
pub mod scissor;
pub mod style;
pub mod transform;

pub use color::Color;
pub use geometry::{Bounds, CornerRadius, Point, Rect};
pub use image::{ImageFlags, TextureId, TextureKind};
pub use paint::Paint;
pub use scissor::Scissor;
pub use style::{
    BlendFactor, CompositeOperation, CompositeOperationState, LineCap, LineJoin, Winding,
};
pub use transform::Affine2D;

/// Kappa for approximating a quarter circle with a cubic Bézier
pub const KAPPA90: f32 = 0.552_284_8;
