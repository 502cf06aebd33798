//! Path cache
//!
//! Per-frame arena holding the flattened points, the sub-paths and the
//! vertices produced for them. Everything is cleared (capacity kept) when a
//! new path is begun.

use std::ops::Range;

use bitflags::bitflags;
use smallvec::SmallVec;
use vektor_core::{Bounds, Point, Winding};

use crate::vertex::Vertex;

bitflags! {
    /// Per-point classification used when expanding joins
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PointFlags: u8 {
        /// The point is a real corner of the outline, not a curve sample
        const CORNER = 0x01;
        /// The path turns left at this point
        const LEFT = 0x02;
        /// The outer side of the join needs bevel geometry
        const BEVEL = 0x04;
        /// The inner side of the join overlaps and needs bevel geometry
        const INNER_BEVEL = 0x08;
    }
}

/// Flattened outline point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathPoint {
    pub pos: Point,
    /// Unit direction towards the next point
    pub d: Point,
    /// Distance to the next point
    pub len: f32,
    /// Averaged miter extrusion
    pub dm: Point,
    pub flags: PointFlags,
}

impl PathPoint {
    pub(crate) fn new(pos: Point, flags: PointFlags) -> Self {
        Self {
            pos,
            flags,
            ..Default::default()
        }
    }
}

/// One flattened sub-path
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Index of the first point in the cache's point buffer
    pub first: usize,
    pub count: usize,
    pub closed: bool,
    pub winding: Winding,
    pub convex: bool,
    pub bevel_count: usize,
    /// Fill fan vertices in the cache's vertex buffer
    pub fill: Range<usize>,
    /// Fringe or stroke strip vertices in the cache's vertex buffer
    pub stroke: Range<usize>,
}

impl Path {
    pub(crate) fn new(first: usize) -> Self {
        Self {
            first,
            count: 0,
            closed: false,
            winding: Winding::SOLID,
            convex: false,
            bevel_count: 0,
            fill: 0..0,
            stroke: 0..0,
        }
    }

    pub fn points(&self) -> Range<usize> {
        self.first..self.first + self.count
    }
}

/// Vertices of one sub-path as seen by a renderer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathVertices<'a> {
    /// Triangle fan covering the interior
    pub fill: &'a [Vertex],
    /// Triangle strip along the outline (fringe or stroke)
    pub stroke: &'a [Vertex],
}

/// Expanded fill ready for submission
#[derive(Clone, Debug, PartialEq)]
pub struct FillGeometry<'a> {
    pub paths: SmallVec<[PathVertices<'a>; 4]>,
    pub bounds: Bounds,
    /// Single convex sub-path; can be drawn without stencilling
    pub convex: bool,
    /// Bounding quad as a triangle strip, empty in the convex case
    pub cover: &'a [Vertex],
}

/// Expanded stroke ready for submission
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeGeometry<'a> {
    /// Triangle strip per sub-path
    pub paths: SmallVec<[&'a [Vertex]; 4]>,
    pub bounds: Bounds,
}

/// Arena of flattened points, sub-paths and output vertices
#[derive(Clone, Debug, Default)]
pub struct PathCache {
    pub(crate) points: Vec<PathPoint>,
    pub(crate) paths: Vec<Path>,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) bounds: Bounds,
    /// Vertex range of the fill cover quad, if one was emitted
    pub(crate) cover: Range<usize>,
    /// Set once a flatten pass has completed
    pub(crate) flattened: bool,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to an empty cache without releasing memory
    pub fn clear(&mut self) {
        self.points.clear();
        self.paths.clear();
        self.vertices.clear();
        self.bounds = Bounds::EMPTY;
        self.cover = 0..0;
        self.flattened = false;
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True once the current commands have been fully flattened
    pub fn is_flattened(&self) -> bool {
        self.flattened
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn path_points(&self, path: &Path) -> &[PathPoint] {
        &self.points[path.points()]
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Borrow the result of the last fill expansion
    pub fn fill_geometry(&self) -> FillGeometry<'_> {
        let paths = self
            .paths
            .iter()
            .map(|path| PathVertices {
                fill: &self.vertices[path.fill.clone()],
                stroke: &self.vertices[path.stroke.clone()],
            })
            .collect();

        FillGeometry {
            paths,
            bounds: self.bounds,
            convex: self.paths.len() == 1 && self.paths[0].convex,
            cover: &self.vertices[self.cover.clone()],
        }
    }

    /// Borrow the result of the last stroke expansion
    pub fn stroke_geometry(&self) -> StrokeGeometry<'_> {
        StrokeGeometry {
            paths: self
                .paths
                .iter()
                .map(|path| &self.vertices[path.stroke.clone()])
                .collect(),
            bounds: self.bounds,
        }
    }

    pub(crate) fn add_path(&mut self) -> crate::Result<()> {
        crate::arena::reserve(&mut self.paths, 1, "path")?;
        self.paths.push(Path::new(self.points.len()));
        Ok(())
    }

    /// Append a point to the last sub-path.
    ///
    /// A point within `dist_tol` of the previous one only merges its flags.
    pub(crate) fn add_point(
        &mut self,
        pos: Point,
        flags: PointFlags,
        dist_tol: f32,
    ) -> crate::Result<()> {
        let Some(path) = self.paths.last_mut() else {
            return Ok(());
        };

        if path.count > 0 {
            if let Some(last) = self.points.last_mut() {
                if last.pos.approx_eq(pos, dist_tol) {
                    last.flags |= flags;
                    return Ok(());
                }
            }
        }

        crate::arena::reserve(&mut self.points, 1, "point")?;
        self.points.push(PathPoint::new(pos, flags));
        path.count += 1;
        Ok(())
    }

    /// Reset the vertex buffer and reserve room for `count` vertices.
    ///
    /// Every path's vertex ranges are emptied first, so a failed reservation
    /// leaves no range pointing past the buffer.
    pub(crate) fn alloc_vertices(&mut self, count: usize) -> crate::Result<()> {
        self.vertices.clear();
        self.cover = 0..0;
        for path in &mut self.paths {
            path.fill = 0..0;
            path.stroke = 0..0;
        }
        crate::arena::reserve(&mut self.vertices, count, "vertex")
    }
}
