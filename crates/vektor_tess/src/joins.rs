//! Join classification
//!
//! Computes the averaged miter extrusion of every point and decides which
//! joins need bevel geometry on their outer or inner side.

use vektor_core::LineJoin;

use crate::cache::{PathCache, PointFlags};

/// Miter vectors are scaled by `1 / |dm|²`, capped here for near-reversals
const MAX_MITER_SCALE: f32 = 600.0;

/// Classify the joins of every path for a stroke of half-width `width`.
///
/// Resets each path's bevel count and convexity.
pub fn calculate_joins(cache: &mut PathCache, width: f32, join: LineJoin, miter_limit: f32) {
    let iw = if width > 0.0 { 1.0 / width } else { 0.0 };

    let PathCache { points, paths, .. } = cache;
    for path in paths.iter_mut() {
        let pts = &mut points[path.points()];
        let count = pts.len();
        let mut nleft = 0;
        path.bevel_count = 0;

        for i in 0..count {
            let p0 = pts[(i + count - 1) % count];
            let p1 = &mut pts[i];

            let dl0 = p0.d.left_normal();
            let dl1 = p1.d.left_normal();
            p1.dm = (dl0 + dl1) * 0.5;
            let dmr2 = p1.dm.length_squared();
            if dmr2 > 1e-6 {
                p1.dm = p1.dm * (1.0 / dmr2).min(MAX_MITER_SCALE);
            }

            p1.flags &= PointFlags::CORNER;

            if p0.d.cross(p1.d) > 0.0 {
                nleft += 1;
                p1.flags |= PointFlags::LEFT;
            }

            // Segments too short for the stroke width fold over on the inside
            let limit = (p0.len.min(p1.len) * iw).max(1.01);
            if dmr2 * limit * limit < 1.0 {
                p1.flags |= PointFlags::INNER_BEVEL;
            }

            if p1.flags.contains(PointFlags::CORNER)
                && (dmr2 * miter_limit * miter_limit < 1.0
                    || matches!(join, LineJoin::Bevel | LineJoin::Round))
            {
                p1.flags |= PointFlags::BEVEL;
            }

            if p1
                .flags
                .intersects(PointFlags::BEVEL | PointFlags::INNER_BEVEL)
            {
                path.bevel_count += 1;
            }
        }

        path.convex = nleft == count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandBuffer;
    use crate::flatten::flatten;
    use crate::Tolerance;
    use vektor_core::{Affine2D, Point, Rect};

    fn cache_for(build: impl FnOnce(&mut CommandBuffer, &Affine2D)) -> PathCache {
        let mut commands = CommandBuffer::new();
        build(&mut commands, &Affine2D::IDENTITY);
        let mut cache = PathCache::new();
        flatten(&mut cache, &commands, Tolerance::default()).unwrap();
        cache
    }

    fn spike(c: &mut CommandBuffer, id: &Affine2D) {
        c.move_to(id, Point::new(0.0, 0.0)).unwrap();
        c.line_to(id, Point::new(10.0, 0.0)).unwrap();
        c.line_to(id, Point::new(0.0, 1.0)).unwrap();
    }

    #[test]
    fn test_square_is_convex_with_miters() {
        let mut cache = cache_for(|c, id| c.rect(id, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap());
        calculate_joins(&mut cache, 1.0, LineJoin::Miter, 10.0);

        let path = &cache.paths()[0];
        assert!(path.convex);
        assert_eq!(path.bevel_count, 0);

        let pts = cache.path_points(path);
        assert!(pts.iter().all(|p| p.flags == PointFlags::CORNER | PointFlags::LEFT));
        // Right-angle miter reaches the diagonal
        assert_eq!(pts[1].dm, Point::new(1.0, -1.0));
    }

    #[test]
    fn test_round_and_bevel_joins_bevel_every_corner() {
        for join in [LineJoin::Round, LineJoin::Bevel] {
            let mut cache =
                cache_for(|c, id| c.rect(id, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap());
            calculate_joins(&mut cache, 1.0, join, 10.0);
            assert_eq!(cache.paths()[0].bevel_count, 4);
        }
    }

    #[test]
    fn test_sharp_corner_exceeds_miter_limit() {
        let mut cache = cache_for(spike);
        calculate_joins(&mut cache, 1.0, LineJoin::Miter, 10.0);

        let pts = cache.path_points(&cache.paths()[0]);
        assert!(pts[1].flags.contains(PointFlags::BEVEL));

        // A generous limit keeps the miter
        let mut cache = cache_for(spike);
        calculate_joins(&mut cache, 1.0, LineJoin::Miter, 100.0);
        let pts = cache.path_points(&cache.paths()[0]);
        assert!(!pts[1].flags.contains(PointFlags::BEVEL));
    }

    #[test]
    fn test_wide_stroke_on_short_segments_needs_inner_bevel() {
        let mut cache = cache_for(spike);
        calculate_joins(&mut cache, 50.0, LineJoin::Miter, 100.0);

        let pts = cache.path_points(&cache.paths()[0]);
        assert!(pts[1].flags.contains(PointFlags::INNER_BEVEL));
        assert!(cache.paths()[0].bevel_count >= 1);
    }

    #[test]
    fn test_curve_samples_are_never_bevelled() {
        let mut cache = cache_for(|c, id| c.circle(id, Point::new(0.0, 0.0), 50.0).unwrap());
        calculate_joins(&mut cache, 1.0, LineJoin::Round, 10.0);

        let path = &cache.paths()[0];
        let pts = cache.path_points(path);
        let bevelled = pts
            .iter()
            .filter(|p| p.flags.contains(PointFlags::BEVEL))
            .count();
        // Only the four segment ends are corners
        assert_eq!(bevelled, 4);
        assert!(path.convex);
    }

    #[test]
    fn test_reclassification_clears_previous_flags() {
        let mut cache = cache_for(|c, id| c.rect(id, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap());
        calculate_joins(&mut cache, 1.0, LineJoin::Bevel, 10.0);
        calculate_joins(&mut cache, 1.0, LineJoin::Miter, 10.0);
        assert_eq!(cache.paths()[0].bevel_count, 0);
    }
}
