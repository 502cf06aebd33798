//! Paints: solid colors, gradients and image patterns
//!
//! Every paint is described by the same handful of parameters so a backend
//! needs a single shader: a transform into paint space, a rounded box
//! (`extent` + `radius`) whose edge is blurred by `feather`, and the two
//! colors on either side of that edge.

use crate::color::Color;
use crate::image::TextureId;
use crate::transform::Affine2D;

/// Distance used to stretch linear gradients to "infinity"
const LARGE: f32 = 1e5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paint {
    pub transform: Affine2D,
    /// Half-width/half-height of the paint box
    pub extent: [f32; 2],
    pub radius: f32,
    pub feather: f32,
    pub inner_color: Color,
    pub outer_color: Color,
    pub image: Option<TextureId>,
}

impl Default for Paint {
    fn default() -> Self {
        Self::color(Color::BLACK)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::color(color)
    }
}

impl Paint {
    /// A solid color paint
    pub fn color(color: Color) -> Self {
        Self {
            transform: Affine2D::IDENTITY,
            extent: [0.0, 0.0],
            radius: 0.0,
            feather: 1.0,
            inner_color: color,
            outer_color: color,
            image: None,
        }
    }

    /// Linear gradient from `start` (inner color) to `end` (outer color)
    pub fn linear_gradient(
        sx: f32,
        sy: f32,
        ex: f32,
        ey: f32,
        inner_color: Color,
        outer_color: Color,
    ) -> Self {
        let mut dx = ex - sx;
        let mut dy = ey - sy;
        let d = dx.hypot(dy);
        if d > 0.0001 {
            dx /= d;
            dy /= d;
        } else {
            dx = 0.0;
            dy = 1.0;
        }

        Self {
            transform: Affine2D::new(dy, -dx, dx, dy, sx - dx * LARGE, sy - dy * LARGE),
            extent: [LARGE, LARGE + d * 0.5],
            radius: 0.0,
            feather: d.max(1.0),
            inner_color,
            outer_color,
            image: None,
        }
    }

    /// Radial gradient between two radii around `(cx, cy)`
    pub fn radial_gradient(
        cx: f32,
        cy: f32,
        inner_radius: f32,
        outer_radius: f32,
        inner_color: Color,
        outer_color: Color,
    ) -> Self {
        let r = (inner_radius + outer_radius) * 0.5;
        let f = outer_radius - inner_radius;

        Self {
            transform: Affine2D::translation(cx, cy),
            extent: [r, r],
            radius: r,
            feather: f.max(1.0),
            inner_color,
            outer_color,
            image: None,
        }
    }

    /// Feathered rounded box, the basis for drop shadows and glows
    #[allow(clippy::too_many_arguments)]
    pub fn box_gradient(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        feather: f32,
        inner_color: Color,
        outer_color: Color,
    ) -> Self {
        Self {
            transform: Affine2D::translation(x + width * 0.5, y + height * 0.5),
            extent: [width * 0.5, height * 0.5],
            radius,
            feather: feather.max(1.0),
            inner_color,
            outer_color,
            image: None,
        }
    }

    /// Image pattern with its top-left at `(cx, cy)`, rotated by `angle`
    pub fn image_pattern(
        cx: f32,
        cy: f32,
        width: f32,
        height: f32,
        angle: f32,
        image: TextureId,
        alpha: f32,
    ) -> Self {
        let mut transform = Affine2D::rotation(angle);
        transform.elements[4] = cx;
        transform.elements[5] = cy;

        let tint = Color::new(1.0, 1.0, 1.0, alpha);
        Self {
            transform,
            extent: [width, height],
            radius: 0.0,
            feather: 0.0,
            inner_color: tint,
            outer_color: tint,
            image: Some(image),
        }
    }

    /// Scale both colors' alpha by `factor`
    pub fn multiply_alpha(&mut self, factor: f32) {
        self.inner_color = self.inner_color.multiply_alpha(factor);
        self.outer_color = self.outer_color.multiply_alpha(factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn test_color_paint_is_flat() {
        let p = Paint::color(Color::RED);
        assert_eq!(p.inner_color, p.outer_color);
        assert_eq!(p.feather, 1.0);
        assert!(p.image.is_none());
    }

    #[test]
    fn test_linear_gradient_axis() {
        let p = Paint::linear_gradient(0.0, 0.0, 0.0, 100.0, Color::WHITE, Color::BLACK);
        assert_eq!(p.feather, 100.0);
        assert_eq!(p.extent, [LARGE, LARGE + 50.0]);

        // Paint space y axis runs along the gradient direction
        let origin = p.transform.transform_point(Point::new(0.0, LARGE));
        assert!(origin.x.abs() < 1e-2 && origin.y.abs() < 1e-2);
    }

    #[test]
    fn test_degenerate_linear_gradient_points_down() {
        let p = Paint::linear_gradient(5.0, 5.0, 5.0, 5.0, Color::WHITE, Color::BLACK);
        assert_eq!(p.feather, 1.0);
        assert_eq!(p.transform.elements[0], 1.0);
    }

    #[test]
    fn test_radial_gradient_feather() {
        let p = Paint::radial_gradient(10.0, 10.0, 4.0, 8.0, Color::WHITE, Color::BLACK);
        assert_eq!(p.radius, 6.0);
        assert_eq!(p.feather, 4.0);
        assert_eq!(p.transform, Affine2D::translation(10.0, 10.0));
    }

    #[test]
    fn test_multiply_alpha() {
        let mut p = Paint::box_gradient(0.0, 0.0, 10.0, 10.0, 2.0, 0.5, Color::WHITE, Color::BLACK);
        assert_eq!(p.feather, 1.0);
        p.multiply_alpha(0.25);
        assert_eq!(p.inner_color.a, 0.25);
        assert_eq!(p.outer_color.a, 0.25);
    }
}
