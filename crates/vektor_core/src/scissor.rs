//! Scissor (clip) rectangles in a transformed frame

use crate::geometry::Rect;
use crate::transform::Affine2D;

/// A clip rectangle: `transform` maps the rectangle's local frame (origin at
/// its center) to device space, `extent` holds the half-size.
///
/// An extent of `(-1, -1)` disables scissoring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scissor {
    pub transform: Affine2D,
    pub extent: [f32; 2],
}

impl Default for Scissor {
    fn default() -> Self {
        Self::DISABLED
    }
}

impl Scissor {
    pub const DISABLED: Scissor = Scissor {
        transform: Affine2D::IDENTITY,
        extent: [-1.0, -1.0],
    };

    /// Scissor for `rect` given in the space of `transform`.
    ///
    /// Negative sizes clamp to zero.
    pub fn from_rect(rect: Rect, transform: &Affine2D) -> Self {
        let w = rect.width.max(0.0);
        let h = rect.height.max(0.0);
        let center = Affine2D::translation(rect.x + w * 0.5, rect.y + h * 0.5);

        Self {
            transform: transform.then(&center),
            extent: [w * 0.5, h * 0.5],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.extent[0] >= 0.0
    }

    /// Axis-aligned bounds of this scissor in the space of `transform`.
    ///
    /// When the two frames differ in rotation the result is the bounding box
    /// of the rotated rectangle, so intersections become approximate.
    pub fn local_bounds(&self, transform: &Affine2D) -> Rect {
        let to_local = transform.inverse().unwrap_or(Affine2D::IDENTITY);
        let p = to_local.then(&self.transform).elements;

        let [ex, ey] = self.extent;
        let tex = ex * p[0].abs() + ey * p[2].abs();
        let tey = ex * p[1].abs() + ey * p[3].abs();
        Rect::new(p[4] - tex, p[5] - tey, tex * 2.0, tey * 2.0)
    }
}
