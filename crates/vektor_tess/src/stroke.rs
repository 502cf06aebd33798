//! Stroke expansion
//!
//! Builds one triangle strip per sub-path: caps on open paths, miter pairs
//! on plain joins, bevel or round geometry on joins flagged by the
//! classifier.

use std::f32::consts::PI;

use vektor_core::{LineCap, LineJoin, Point};

use crate::cache::{PathCache, PathPoint, PointFlags};
use crate::error::Result;
use crate::joins::calculate_joins;
use crate::vertex::Vertex;

/// Stroke parameters in device space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Half of the stroke width
    pub half_width: f32,
    /// Anti-aliasing fringe width, 0 disables the fringe
    pub fringe: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
}

/// Number of segments needed to approximate an arc of radius `r` spanning
/// `arc` radians within `tol`.
pub fn curve_divs(r: f32, arc: f32, tol: f32) -> usize {
    let da = (r / (r + tol)).acos() * 2.0;
    ((arc / da).ceil() as usize).max(2)
}

/// Expand the flattened paths in `cache` into stroke strips.
pub fn expand_stroke(cache: &mut PathCache, style: &StrokeStyle, tess_tol: f32) -> Result<()> {
    let aa = style.fringe;
    let ncap = curve_divs(style.half_width, PI, tess_tol);
    let w = style.half_width + aa * 0.5;
    let (u0, u1) = if aa == 0.0 { (0.5, 0.5) } else { (0.0, 1.0) };

    calculate_joins(cache, w, style.join, style.miter_limit);

    let mut nverts = 0;
    for path in &cache.paths {
        nverts += if style.join == LineJoin::Round {
            (path.count + path.bevel_count * (ncap + 2) + 1) * 2
        } else {
            (path.count + path.bevel_count * 5 + 1) * 2
        };
        if !path.closed {
            nverts += if style.cap == LineCap::Round {
                (ncap * 2 + 2) * 2
            } else {
                12
            };
        }
    }
    cache.alloc_vertices(nverts)?;

    let PathCache {
        points,
        paths,
        vertices,
        ..
    } = cache;
    let strip = StripStyle {
        lw: w,
        rw: w,
        lu: u0,
        ru: u1,
    };

    for path in paths.iter_mut() {
        let start = vertices.len();
        path.fill = start..start;

        let pts = &points[path.points()];
        let count = pts.len();
        if count < 2 {
            path.stroke = start..start;
            continue;
        }

        if path.closed {
            for i in 0..count {
                let p0 = &pts[(i + count - 1) % count];
                stroke_join(vertices, p0, &pts[i], &strip, style.join, ncap);
            }
            let first = vertices[start];
            let second = vertices[start + 1];
            vertices.push(Vertex::new(first.x, first.y, u0, 1.0));
            vertices.push(Vertex::new(second.x, second.y, u1, 1.0));
        } else {
            let head = pts[0].pos;
            let d = (pts[1].pos - head).normalized();
            match style.cap {
                LineCap::Butt => butt_cap_start(vertices, head, d, w, -aa * 0.5, aa, u0, u1),
                LineCap::Square => butt_cap_start(vertices, head, d, w, w - aa, aa, u0, u1),
                LineCap::Round => round_cap_start(vertices, head, d, w, ncap, u0, u1),
            }

            for i in 1..count - 1 {
                stroke_join(vertices, &pts[i - 1], &pts[i], &strip, style.join, ncap);
            }

            let tail = pts[count - 1].pos;
            let d = (tail - pts[count - 2].pos).normalized();
            match style.cap {
                LineCap::Butt => butt_cap_end(vertices, tail, d, w, -aa * 0.5, aa, u0, u1),
                LineCap::Square => butt_cap_end(vertices, tail, d, w, w - aa, aa, u0, u1),
                LineCap::Round => round_cap_end(vertices, tail, d, w, ncap, u0, u1),
            }
        }

        path.stroke = start..vertices.len();
    }

    Ok(())
}

/// Widths and edge coordinates of the two sides of a strip
#[derive(Clone, Copy, Debug)]
pub(crate) struct StripStyle {
    pub lw: f32,
    pub rw: f32,
    pub lu: f32,
    pub ru: f32,
}

fn stroke_join(
    out: &mut Vec<Vertex>,
    p0: &PathPoint,
    p1: &PathPoint,
    strip: &StripStyle,
    join: LineJoin,
    ncap: usize,
) {
    if p1
        .flags
        .intersects(PointFlags::BEVEL | PointFlags::INNER_BEVEL)
    {
        if join == LineJoin::Round {
            round_join(out, p0, p1, strip, ncap);
        } else {
            bevel_join(out, p0, p1, strip);
        }
    } else {
        out.push(Vertex::at(p1.pos + p1.dm * strip.lw, strip.lu, 1.0));
        out.push(Vertex::at(p1.pos - p1.dm * strip.rw, strip.ru, 1.0));
    }
}

/// Endpoints of the bevel on one side of a join.
///
/// Inner bevels use the two edge normals, others collapse onto the miter.
fn choose_bevel(inner_bevel: bool, p0: &PathPoint, p1: &PathPoint, w: f32) -> (Point, Point) {
    if inner_bevel {
        (
            p1.pos + p0.d.left_normal() * w,
            p1.pos + p1.d.left_normal() * w,
        )
    } else {
        let p = p1.pos + p1.dm * w;
        (p, p)
    }
}

/// Bevel geometry on the outer side of a join; 8 vertices for a bevel,
/// 10 when only the inner side overlaps.
pub(crate) fn bevel_join(out: &mut Vec<Vertex>, p0: &PathPoint, p1: &PathPoint, s: &StripStyle) {
    let StripStyle { lw, rw, lu, ru } = *s;
    let dl0 = p0.d.left_normal();
    let dl1 = p1.d.left_normal();
    let p = p1.pos;
    let inner = p1.flags.contains(PointFlags::INNER_BEVEL);
    let bevel = p1.flags.contains(PointFlags::BEVEL);

    if p1.flags.contains(PointFlags::LEFT) {
        let (l0, l1) = choose_bevel(inner, p0, p1, lw);

        out.push(Vertex::at(l0, lu, 1.0));
        out.push(Vertex::at(p - dl0 * rw, ru, 1.0));

        if bevel {
            out.push(Vertex::at(l0, lu, 1.0));
            out.push(Vertex::at(p - dl0 * rw, ru, 1.0));

            out.push(Vertex::at(l1, lu, 1.0));
            out.push(Vertex::at(p - dl1 * rw, ru, 1.0));
        } else {
            let r0 = p - p1.dm * rw;

            out.push(Vertex::at(p, 0.5, 1.0));
            out.push(Vertex::at(p - dl0 * rw, ru, 1.0));

            out.push(Vertex::at(r0, ru, 1.0));
            out.push(Vertex::at(r0, ru, 1.0));

            out.push(Vertex::at(p, 0.5, 1.0));
            out.push(Vertex::at(p - dl1 * rw, ru, 1.0));
        }

        out.push(Vertex::at(l1, lu, 1.0));
        out.push(Vertex::at(p - dl1 * rw, ru, 1.0));
    } else {
        let (r0, r1) = choose_bevel(inner, p0, p1, -rw);

        out.push(Vertex::at(p + dl0 * lw, lu, 1.0));
        out.push(Vertex::at(r0, ru, 1.0));

        if bevel {
            out.push(Vertex::at(p + dl0 * lw, lu, 1.0));
            out.push(Vertex::at(r0, ru, 1.0));

            out.push(Vertex::at(p + dl1 * lw, lu, 1.0));
            out.push(Vertex::at(r1, ru, 1.0));
        } else {
            let l0 = p + p1.dm * lw;

            out.push(Vertex::at(p + dl0 * lw, lu, 1.0));
            out.push(Vertex::at(p, 0.5, 1.0));

            out.push(Vertex::at(l0, lu, 1.0));
            out.push(Vertex::at(l0, lu, 1.0));

            out.push(Vertex::at(p + dl1 * lw, lu, 1.0));
            out.push(Vertex::at(p, 0.5, 1.0));
        }

        out.push(Vertex::at(p + dl1 * lw, lu, 1.0));
        out.push(Vertex::at(r1, ru, 1.0));
    }
}

/// Round join fanning around the outer side; `4 + 2n` vertices with
/// `2 <= n <= ncap`.
fn round_join(out: &mut Vec<Vertex>, p0: &PathPoint, p1: &PathPoint, s: &StripStyle, ncap: usize) {
    let StripStyle { lw, rw, lu, ru } = *s;
    let dl0 = p0.d.left_normal();
    let dl1 = p1.d.left_normal();
    let p = p1.pos;
    let inner = p1.flags.contains(PointFlags::INNER_BEVEL);

    if p1.flags.contains(PointFlags::LEFT) {
        let (l0, l1) = choose_bevel(inner, p0, p1, lw);
        let a0 = (-dl0.y).atan2(-dl0.x);
        let mut a1 = (-dl1.y).atan2(-dl1.x);
        if a1 > a0 {
            a1 -= PI * 2.0;
        }

        out.push(Vertex::at(l0, lu, 1.0));
        out.push(Vertex::at(p - dl0 * rw, ru, 1.0));

        let n = arc_steps(a0 - a1, ncap);
        for i in 0..n {
            let u = i as f32 / (n - 1) as f32;
            let a = a0 + u * (a1 - a0);
            out.push(Vertex::at(p, 0.5, 1.0));
            out.push(Vertex::at(p + Point::new(a.cos(), a.sin()) * rw, ru, 1.0));
        }

        out.push(Vertex::at(l1, lu, 1.0));
        out.push(Vertex::at(p - dl1 * rw, ru, 1.0));
    } else {
        let (r0, r1) = choose_bevel(inner, p0, p1, -rw);
        let a0 = dl0.y.atan2(dl0.x);
        let mut a1 = dl1.y.atan2(dl1.x);
        if a1 < a0 {
            a1 += PI * 2.0;
        }

        out.push(Vertex::at(p + dl0 * rw, lu, 1.0));
        out.push(Vertex::at(r0, ru, 1.0));

        let n = arc_steps(a1 - a0, ncap);
        for i in 0..n {
            let u = i as f32 / (n - 1) as f32;
            let a = a0 + u * (a1 - a0);
            out.push(Vertex::at(p + Point::new(a.cos(), a.sin()) * lw, lu, 1.0));
            out.push(Vertex::at(p, 0.5, 1.0));
        }

        out.push(Vertex::at(p + dl1 * rw, lu, 1.0));
        out.push(Vertex::at(r1, ru, 1.0));
    }
}

fn arc_steps(angle: f32, ncap: usize) -> usize {
    let ncap = ncap.max(2);
    ((angle / PI * ncap as f32).ceil() as usize).clamp(2, ncap)
}

#[allow(clippy::too_many_arguments)]
fn butt_cap_start(
    out: &mut Vec<Vertex>,
    p: Point,
    d: Point,
    w: f32,
    offset: f32,
    aa: f32,
    u0: f32,
    u1: f32,
) {
    let px = p - d * offset;
    let dl = d.left_normal();

    out.push(Vertex::at(px + dl * w - d * aa, u0, 0.0));
    out.push(Vertex::at(px - dl * w - d * aa, u1, 0.0));
    out.push(Vertex::at(px + dl * w, u0, 1.0));
    out.push(Vertex::at(px - dl * w, u1, 1.0));
}

#[allow(clippy::too_many_arguments)]
fn butt_cap_end(
    out: &mut Vec<Vertex>,
    p: Point,
    d: Point,
    w: f32,
    offset: f32,
    aa: f32,
    u0: f32,
    u1: f32,
) {
    let px = p + d * offset;
    let dl = d.left_normal();

    out.push(Vertex::at(px + dl * w, u0, 1.0));
    out.push(Vertex::at(px - dl * w, u1, 1.0));
    out.push(Vertex::at(px + dl * w + d * aa, u0, 0.0));
    out.push(Vertex::at(px - dl * w + d * aa, u1, 0.0));
}

fn round_cap_start(
    out: &mut Vec<Vertex>,
    p: Point,
    d: Point,
    w: f32,
    ncap: usize,
    u0: f32,
    u1: f32,
) {
    let dl = d.left_normal();
    for i in 0..ncap {
        let a = i as f32 / (ncap - 1) as f32 * PI;
        let ax = a.cos() * w;
        let ay = a.sin() * w;
        out.push(Vertex::at(p - dl * ax - d * ay, u0, 1.0));
        out.push(Vertex::at(p, 0.5, 1.0));
    }
    out.push(Vertex::at(p + dl * w, u0, 1.0));
    out.push(Vertex::at(p - dl * w, u1, 1.0));
}

fn round_cap_end(
    out: &mut Vec<Vertex>,
    p: Point,
    d: Point,
    w: f32,
    ncap: usize,
    u0: f32,
    u1: f32,
) {
    let dl = d.left_normal();
    out.push(Vertex::at(p + dl * w, u0, 1.0));
    out.push(Vertex::at(p - dl * w, u1, 1.0));
    for i in 0..ncap {
        let a = i as f32 / (ncap - 1) as f32 * PI;
        let ax = a.cos() * w;
        let ay = a.sin() * w;
        out.push(Vertex::at(p, 0.5, 1.0));
        out.push(Vertex::at(p - dl * ax + d * ay, u0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandBuffer;
    use crate::flatten::flatten;
    use crate::Tolerance;
    use vektor_core::{Affine2D, Rect};

    const TESS_TOL: f32 = 0.25;

    fn polyline(points: &[Point]) -> PathCache {
        let id = Affine2D::IDENTITY;
        let mut commands = CommandBuffer::new();
        commands.move_to(&id, points[0]).unwrap();
        for &p in &points[1..] {
            commands.line_to(&id, p).unwrap();
        }
        let mut cache = PathCache::new();
        flatten(&mut cache, &commands, Tolerance::default()).unwrap();
        cache
    }

    fn style(half_width: f32, fringe: f32, cap: LineCap, join: LineJoin) -> StrokeStyle {
        StrokeStyle {
            half_width,
            fringe,
            cap,
            join,
            miter_limit: 10.0,
        }
    }

    fn gentle_zigzag() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 5.0),
            Point::new(30.0, 5.0),
            Point::new(40.0, 0.0),
        ]
    }

    #[test]
    fn test_curve_divs() {
        assert_eq!(curve_divs(0.0, PI, 0.25), 2);
        assert!(curve_divs(10.0, PI, 0.25) > curve_divs(1.0, PI, 0.25));
        assert!(curve_divs(10.0, PI, 0.01) > curve_divs(10.0, PI, 0.25));
    }

    #[test]
    fn test_miter_polyline_vertex_count() {
        let pts = gentle_zigzag();
        let mut cache = polyline(&pts);
        expand_stroke(
            &mut cache,
            &style(1.0, 1.0, LineCap::Butt, LineJoin::Miter),
            TESS_TOL,
        )
        .unwrap();

        let geometry = cache.stroke_geometry();
        assert_eq!(geometry.paths.len(), 1);
        assert_eq!(geometry.paths[0].len(), 2 * (pts.len() - 2) + 8);
        let interior = &cache.points()[1..pts.len() - 1];
        assert!(interior
            .iter()
            .all(|p| !p.flags.intersects(PointFlags::BEVEL | PointFlags::INNER_BEVEL)));
    }

    #[test]
    fn test_round_caps_replace_butt_caps() {
        let pts = gentle_zigzag();
        let mut cache = polyline(&pts);
        expand_stroke(
            &mut cache,
            &style(3.0, 1.0, LineCap::Round, LineJoin::Miter),
            TESS_TOL,
        )
        .unwrap();

        let ncap = curve_divs(3.0, PI, TESS_TOL);
        let strip = cache.stroke_geometry().paths[0];
        assert_eq!(strip.len(), 2 * (pts.len() - 2) + 2 * (2 * ncap + 2));
    }

    #[test]
    fn test_round_join_on_right_angle() {
        let mut cache = polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        expand_stroke(
            &mut cache,
            &style(2.0, 1.0, LineCap::Butt, LineJoin::Round),
            TESS_TOL,
        )
        .unwrap();

        let ncap = curve_divs(2.0, PI, TESS_TOL);
        let n = ((ncap as f32) * 0.5).ceil() as usize;
        let n = n.clamp(2, ncap);
        let strip = cache.stroke_geometry().paths[0];
        assert_eq!(strip.len(), 8 + 4 + 2 * n);
    }

    #[test]
    fn test_round_join_stays_on_outer_radius() {
        let mut cache = polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        expand_stroke(
            &mut cache,
            &style(2.0, 0.0, LineCap::Butt, LineJoin::Round),
            TESS_TOL,
        )
        .unwrap();

        // Winding enforcement reverses the polyline, so the corner turns left
        assert!(cache.points()[1].flags.contains(PointFlags::LEFT));

        // Skip the start cap and the two leading join vertices
        let corner = Point::new(10.0, 0.0);
        let strip = cache.stroke_geometry().paths[0];
        let fan = &strip[6..strip.len() - 6];
        assert!(!fan.is_empty());
        for pair in fan.chunks(2) {
            let (a, b) = (pair[0].position(), pair[1].position());
            let (center, rim) = if a == corner { (a, b) } else { (b, a) };
            assert_eq!(center, corner);
            assert!(((rim - corner).length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_bevel_join_vertex_count() {
        let mut cache = polyline(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        expand_stroke(
            &mut cache,
            &style(2.0, 1.0, LineCap::Butt, LineJoin::Bevel),
            TESS_TOL,
        )
        .unwrap();
        assert_eq!(cache.stroke_geometry().paths[0].len(), 8 + 8);
    }

    #[test]
    fn test_butt_cap_positions_without_fringe() {
        let mut cache = polyline(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        expand_stroke(
            &mut cache,
            &style(2.0, 0.0, LineCap::Butt, LineJoin::Miter),
            TESS_TOL,
        )
        .unwrap();

        let strip = cache.stroke_geometry().paths[0];
        assert_eq!(strip.len(), 8);
        assert_eq!(strip[2].position(), Point::new(0.0, -2.0));
        assert_eq!(strip[3].position(), Point::new(0.0, 2.0));
        assert_eq!(strip[4].position(), Point::new(10.0, -2.0));
        assert_eq!(strip[5].position(), Point::new(10.0, 2.0));
        assert!(strip.iter().all(|v| v.u == 0.5));
    }

    #[test]
    fn test_square_cap_extends_past_the_end() {
        let mut cache = polyline(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        expand_stroke(
            &mut cache,
            &style(2.0, 0.0, LineCap::Square, LineJoin::Miter),
            TESS_TOL,
        )
        .unwrap();

        let strip = cache.stroke_geometry().paths[0];
        assert_eq!(strip[2].position(), Point::new(-2.0, -2.0));
        assert_eq!(strip[7].position(), Point::new(12.0, 2.0));
    }

    #[test]
    fn test_closed_path_repeats_first_pair() {
        let id = Affine2D::IDENTITY;
        let mut commands = CommandBuffer::new();
        commands.rect(&id, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        let mut cache = PathCache::new();
        flatten(&mut cache, &commands, Tolerance::default()).unwrap();
        expand_stroke(
            &mut cache,
            &style(1.0, 1.0, LineCap::Butt, LineJoin::Miter),
            TESS_TOL,
        )
        .unwrap();

        let strip = cache.stroke_geometry().paths[0];
        assert_eq!(strip.len(), 4 * 2 + 2);
        assert_eq!(strip[8].position(), strip[0].position());
        assert_eq!(strip[9].position(), strip[1].position());
    }

    #[test]
    fn test_single_point_emits_nothing() {
        let mut cache = polyline(&[Point::new(5.0, 5.0)]);
        expand_stroke(
            &mut cache,
            &style(1.0, 1.0, LineCap::Round, LineJoin::Round),
            TESS_TOL,
        )
        .unwrap();
        assert!(cache.stroke_geometry().paths[0].is_empty());
    }
}
