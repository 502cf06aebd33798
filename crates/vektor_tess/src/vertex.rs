//! Output vertex layout

use vektor_core::Point;

/// A vertex for path rendering.
///
/// `u` is the coverage coordinate across an edge (0 and 1 at the outer
/// borders of a fringe, 0.5 on the shape itself), `v` fades caps along the
/// stroke direction (0 at the outer edge of an anti-aliased cap).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self { x, y, u, v }
    }

    pub fn at(p: Point, u: f32, v: f32) -> Self {
        Self::new(p.x, p.y, u, v)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
