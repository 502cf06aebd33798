//! Vektor path tessellation
//!
//! Converts path commands into anti-aliased triangle geometry:
//!
//! - [`CommandBuffer`]: path commands with points pre-transformed to device space
//! - [`flatten`]: adaptive Bézier subdivision into polylines, winding correction
//! - [`calculate_joins`]: miter/bevel classification and convexity
//! - [`expand_fill`] / [`expand_stroke`]: fan, fringe and stroke strips
//!
//! All buffers live in a [`PathCache`] that is reused from frame to frame.
//!
//! ```
//! use vektor_core::{Affine2D, Rect};
//! use vektor_tess::{expand_fill, flatten, CommandBuffer, PathCache, Tolerance};
//!
//! let mut commands = CommandBuffer::new();
//! commands
//!     .rect(&Affine2D::IDENTITY, Rect::new(0.0, 0.0, 10.0, 10.0))
//!     .unwrap();
//!
//! let mut cache = PathCache::new();
//! flatten(&mut cache, &commands, Tolerance::default()).unwrap();
//! expand_fill(&mut cache, 1.0).unwrap();
//!
//! assert!(cache.fill_geometry().convex);
//! ```

mod arena;
pub mod cache;
pub mod commands;
pub mod error;
pub mod fill;
pub mod flatten;
pub mod joins;
pub mod stroke;
pub mod vertex;

pub use cache::{
    FillGeometry, Path, PathCache, PathPoint, PathVertices, PointFlags, StrokeGeometry,
};
pub use commands::{Command, CommandBuffer, Commands};
pub use error::{Result, TessError};
pub use fill::{expand_fill, FILL_MITER_LIMIT};
pub use flatten::flatten;
pub use joins::calculate_joins;
pub use stroke::{curve_divs, expand_stroke, StrokeStyle};
pub use vertex::Vertex;

/// Tessellation tolerances in device space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    /// Curve flatness threshold
    pub tess: f32,
    /// Points closer than this are merged
    pub dist: f32,
}

impl Tolerance {
    pub const fn new(tess: f32, dist: f32) -> Self {
        Self { tess, dist }
    }

    /// Tolerances for a display with `device_pixel_ratio` physical pixels per
    /// logical pixel.
    pub fn for_device_ratio(self, device_pixel_ratio: f32) -> Self {
        Self {
            tess: self.tess / device_pixel_ratio,
            dist: self.dist / device_pixel_ratio,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(0.25, 0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_scales_with_device_ratio() {
        let tol = Tolerance::default().for_device_ratio(2.0);
        assert_eq!(tol, Tolerance::new(0.125, 0.005));
    }
}
