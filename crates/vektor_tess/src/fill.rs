//! Fill expansion
//!
//! Each sub-path becomes a triangle fan for the interior and, when
//! anti-aliased, a fringe strip along its outline. A single convex sub-path
//! can be drawn directly; anything else is drawn through the stencil buffer
//! and gets a bounding cover quad.

use vektor_core::LineJoin;

use crate::cache::{PathCache, PointFlags};
use crate::error::Result;
use crate::joins::calculate_joins;
use crate::stroke::{bevel_join, StripStyle};
use crate::vertex::Vertex;

/// Miter limit used to classify the fringe joins of fills
pub const FILL_MITER_LIMIT: f32 = 2.4;

const COVER_VERTICES: usize = 4;

/// Expand the flattened paths in `cache` into fill geometry.
///
/// `fringe` is the anti-aliasing width, 0 disables the fringe.
pub fn expand_fill(cache: &mut PathCache, fringe: f32) -> Result<()> {
    let fringed = fringe > 0.0;

    calculate_joins(cache, fringe, LineJoin::Miter, FILL_MITER_LIMIT);

    let mut nverts = COVER_VERTICES;
    for path in &cache.paths {
        nverts += path.count + path.bevel_count + 1;
        if fringed {
            nverts += (path.count + path.bevel_count * 5 + 1) * 2;
        }
    }
    cache.alloc_vertices(nverts)?;

    let convex = cache.paths.len() == 1 && cache.paths[0].convex;
    let woff = 0.5 * fringe;

    let PathCache {
        points,
        paths,
        vertices,
        bounds,
        cover,
        ..
    } = cache;

    for path in paths.iter_mut() {
        let pts = &points[path.points()];
        let count = pts.len();

        let start = vertices.len();
        if fringed {
            for i in 0..count {
                let p0 = &pts[(i + count - 1) % count];
                let p1 = &pts[i];
                if p1.flags.contains(PointFlags::BEVEL) && !p1.flags.contains(PointFlags::LEFT) {
                    vertices.push(Vertex::at(p1.pos + p0.d.left_normal() * woff, 0.5, 1.0));
                    vertices.push(Vertex::at(p1.pos + p1.d.left_normal() * woff, 0.5, 1.0));
                } else {
                    vertices.push(Vertex::at(p1.pos + p1.dm * woff, 0.5, 1.0));
                }
            }
        } else {
            vertices.extend(pts.iter().map(|p| Vertex::at(p.pos, 0.5, 1.0)));
        }
        path.fill = start..vertices.len();

        let start = vertices.len();
        if fringed && count > 0 {
            let strip = if convex {
                // Only the outer half; the fan already covers the inset
                StripStyle {
                    lw: woff,
                    rw: fringe - woff,
                    lu: 0.5,
                    ru: 1.0,
                }
            } else {
                StripStyle {
                    lw: fringe + woff,
                    rw: fringe - woff,
                    lu: 0.0,
                    ru: 1.0,
                }
            };

            for i in 0..count {
                let p0 = &pts[(i + count - 1) % count];
                let p1 = &pts[i];
                if p1
                    .flags
                    .intersects(PointFlags::BEVEL | PointFlags::INNER_BEVEL)
                {
                    bevel_join(vertices, p0, p1, &strip);
                } else {
                    vertices.push(Vertex::at(p1.pos + p1.dm * strip.lw, strip.lu, 1.0));
                    vertices.push(Vertex::at(p1.pos - p1.dm * strip.rw, strip.ru, 1.0));
                }
            }

            let first = vertices[start];
            let second = vertices[start + 1];
            vertices.push(Vertex::new(first.x, first.y, strip.lu, 1.0));
            vertices.push(Vertex::new(second.x, second.y, strip.ru, 1.0));
        }
        path.stroke = start..vertices.len();
    }

    if !convex {
        let start = vertices.len();
        let (min, max) = (bounds.min, bounds.max);
        vertices.extend_from_slice(&[
            Vertex::new(max.x, max.y, 0.5, 1.0),
            Vertex::new(max.x, min.y, 0.5, 1.0),
            Vertex::new(min.x, max.y, 0.5, 1.0),
            Vertex::new(min.x, min.y, 0.5, 1.0),
        ]);
        *cover = start..vertices.len();
    }

    Ok(())
}
