//! Geometric primitives

use std::ops::{Add, Mul, Neg, Sub};

/// A 2D point, also used as a direction vector
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Normalize in place, returning the original length.
    ///
    /// Vectors shorter than `1e-6` are left untouched.
    pub fn normalize(&mut self) -> f32 {
        let d = self.length();
        if d > 1e-6 {
            let id = 1.0 / d;
            self.x *= id;
            self.y *= id;
        }
        d
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product `other.x * self.y - self.x * other.y`.
    ///
    /// Positive when `other` turns left of `self` in a y-down frame.
    pub fn cross(self, other: Point) -> f32 {
        other.x * self.y - self.x * other.y
    }

    /// Left-hand normal `(y, -x)` of a direction
    pub fn left_normal(self) -> Self {
        Point::new(self.y, -self.x)
    }

    /// True if both coordinates lie within `tol` of `other` (euclidean)
    pub fn approx_eq(self, other: Point, tol: f32) -> bool {
        (other - self).length_squared() < tol * tol
    }

    /// Squared distance from `self` to the segment `p..q`
    pub fn distance_to_segment_squared(self, p: Point, q: Point) -> f32 {
        let pq = q - p;
        let d = pq.length_squared();
        let mut t = pq.dot(self - p);
        if d > 0.0 {
            t /= d;
        }
        let t = t.clamp(0.0, 1.0);
        (p + pq * t - self).length_squared()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// A rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned intersection; an empty overlap yields zero width/height.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let min_x = self.x.max(other.x);
        let min_y = self.y.max(other.y);
        let max_x = (self.x + self.width).min(other.x + other.width);
        let max_y = (self.y + self.height).min(other.y + other.height);
        Rect::new(min_x, min_y, (max_x - min_x).max(0.0), (max_y - min_y).max(0.0))
    }
}

/// Axis-aligned bounding box as `min`/`max` corners
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    /// Inverted bounds that any `include` call replaces
    pub const EMPTY: Bounds = Bounds {
        min: Point::new(f32::MAX, f32::MAX),
        max: Point::new(f32::MIN, f32::MIN),
    };

    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn include(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}

/// Corner radius for rounded rectangles
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadius {
    pub const fn uniform(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    /// True when every corner is too small to be worth rounding
    pub fn is_sharp(&self) -> bool {
        self.top_left < 0.1
            && self.top_right < 0.1
            && self.bottom_right < 0.1
            && self.bottom_left < 0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_returns_length() {
        let mut v = Point::new(3.0, 4.0);
        assert_eq!(v.normalize(), 5.0);
        assert!((v.length() - 1.0).abs() < 1e-6);

        let mut tiny = Point::new(1e-8, 0.0);
        tiny.normalize();
        assert_eq!(tiny, Point::new(1e-8, 0.0));
    }

    #[test]
    fn test_cross_sign() {
        // y-down: heading east then south is a right turn on screen
        let east = Point::new(1.0, 0.0);
        let south = Point::new(0.0, 1.0);
        assert!(east.cross(south) < 0.0);
        assert!(south.cross(east) > 0.0);
    }

    #[test]
    fn test_segment_distance() {
        let p = Point::new(5.0, 3.0);
        let d = p.distance_to_segment_squared(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(d, 9.0);

        // Clamped to the segment end
        let p = Point::new(13.0, 4.0);
        let d = p.distance_to_segment_squared(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(d, 25.0);
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 10.0);
        assert_eq!(a.intersect(&b), Rect::new(5.0, 0.0, 5.0, 5.0));

        let far = Rect::new(20.0, 20.0, 1.0, 1.0);
        let empty = a.intersect(&far);
        assert_eq!(empty.width, 0.0);
        assert_eq!(empty.height, 0.0);
    }

    #[test]
    fn test_bounds_include() {
        let mut b = Bounds::EMPTY;
        assert!(b.is_empty());
        b.include(Point::new(1.0, 2.0));
        b.include(Point::new(-1.0, 5.0));
        assert_eq!(b, Bounds::new(-1.0, 2.0, 1.0, 5.0));
    }
}
