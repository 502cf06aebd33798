//! Command flattening
//!
//! Turns the command stream into polylines in the path cache: curves are
//! subdivided adaptively, windings enforced and per-segment directions
//! computed for the join classifier.

use vektor_core::{Point, Winding};

use crate::cache::{PathCache, PointFlags};
use crate::commands::{Command, CommandBuffer};
use crate::error::Result;
use crate::Tolerance;

/// Recursion limit for Bézier subdivision
const MAX_BEZIER_LEVEL: u32 = 10;

/// Flatten `commands` into `cache`.
///
/// Does nothing if the cache was already flattened, so that filling and then
/// stroking the same path flattens it once. On error the cache is left
/// empty and the next call starts over.
pub fn flatten(cache: &mut PathCache, commands: &CommandBuffer, tol: Tolerance) -> Result<()> {
    if cache.flattened {
        return Ok(());
    }

    cache.clear();
    if let Err(err) = add_commands(cache, commands, tol, MAX_BEZIER_LEVEL) {
        cache.clear();
        return Err(err);
    }

    finish_paths(cache, tol.dist);
    cache.flattened = true;
    tracing::trace!(
        paths = cache.paths.len(),
        points = cache.points.len(),
        "flattened path"
    );
    Ok(())
}

fn add_commands(
    cache: &mut PathCache,
    commands: &CommandBuffer,
    tol: Tolerance,
    max_level: u32,
) -> Result<()> {
    for cmd in commands.iter() {
        match cmd {
            Command::MoveTo(p) => {
                cache.add_path()?;
                cache.add_point(p, PointFlags::CORNER, tol.dist)?;
            }
            Command::LineTo(p) => cache.add_point(p, PointFlags::CORNER, tol.dist)?,
            Command::BezierTo {
                control1,
                control2,
                end,
            } => {
                if let Some(start) = cache.points.last().map(|p| p.pos) {
                    tessellate_bezier(
                        cache,
                        [start, control1, control2, end],
                        0,
                        max_level,
                        PointFlags::CORNER,
                        tol,
                    )?;
                }
            }
            Command::Close => {
                if let Some(path) = cache.paths.last_mut() {
                    path.closed = true;
                }
            }
            Command::Winding(winding) => {
                if let Some(path) = cache.paths.last_mut() {
                    path.winding = winding;
                }
            }
        }
    }
    Ok(())
}

fn tessellate_bezier(
    cache: &mut PathCache,
    [p1, p2, p3, p4]: [Point; 4],
    level: u32,
    max_level: u32,
    flags: PointFlags,
    tol: Tolerance,
) -> Result<()> {
    if level > max_level {
        return Ok(());
    }

    let d = p4 - p1;
    let d2 = (p2 - p4).cross(d).abs();
    let d3 = (p3 - p4).cross(d).abs();

    if (d2 + d3) * (d2 + d3) < tol.tess * d.length_squared() {
        return cache.add_point(p4, flags, tol.dist);
    }

    let p12 = midpoint(p1, p2);
    let p23 = midpoint(p2, p3);
    let p34 = midpoint(p3, p4);
    let p123 = midpoint(p12, p23);
    let p234 = midpoint(p23, p34);
    let p1234 = midpoint(p123, p234);

    tessellate_bezier(
        cache,
        [p1, p12, p123, p1234],
        level + 1,
        max_level,
        PointFlags::empty(),
        tol,
    )?;
    tessellate_bezier(cache, [p1234, p234, p34, p4], level + 1, max_level, flags, tol)
}

fn midpoint(a: Point, b: Point) -> Point {
    (a + b) * 0.5
}

/// Close coincident ends, enforce windings, compute directions and bounds
fn finish_paths(cache: &mut PathCache, dist_tol: f32) {
    let PathCache {
        points,
        paths,
        bounds,
        ..
    } = cache;

    for path in paths.iter_mut() {
        let pts = &mut points[path.points()];

        if pts.len() > 1 && pts[pts.len() - 1].pos.approx_eq(pts[0].pos, dist_tol) {
            path.count -= 1;
            path.closed = true;
        }
        let pts = &mut pts[..path.count];

        if pts.len() > 2 {
            let area = polygon_area(pts.iter().map(|p| p.pos));
            let reverse = match path.winding {
                Winding::CounterClockwise => area < 0.0,
                Winding::Clockwise => area > 0.0,
            };
            if reverse {
                pts.reverse();
            }
        }

        let count = pts.len();
        for i in 0..count {
            let next = pts[(i + 1) % count].pos;
            let p = &mut pts[i];
            p.d = next - p.pos;
            p.len = p.d.normalize();
            bounds.include(p.pos);
        }
    }
}

/// Signed area of a polygon, positive for the solid winding
pub(crate) fn polygon_area(mut pts: impl Iterator<Item = Point>) -> f32 {
    let Some(a) = pts.next() else {
        return 0.0;
    };
    let Some(mut b) = pts.next() else {
        return 0.0;
    };

    let mut area = 0.0;
    for c in pts {
        area += triangle_area2(a, b, c);
        b = c;
    }
    area * 0.5
}

fn triangle_area2(a: Point, b: Point, c: Point) -> f32 {
    let ab = b - a;
    let ac = c - a;
    ac.x * ab.y - ab.x * ac.y
}
