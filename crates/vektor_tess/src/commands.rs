//! Path command buffer
//!
//! Commands are stored as a flat float stream: an opcode followed by its
//! operands. Points are transformed by the caller's current transform when
//! they are appended, so a path keeps the geometry it was authored with even
//! if the transform changes before it is filled or stroked.

use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, TAU};
use vektor_core::{Affine2D, CornerRadius, Point, Rect, Winding, KAPPA90};

use crate::arena;
use crate::error::Result;

const MOVE_TO: f32 = 0.0;
const LINE_TO: f32 = 1.0;
const BEZIER_TO: f32 = 2.0;
const CLOSE: f32 = 3.0;
const WINDING: f32 = 4.0;

/// Tangent distances beyond this make `arc_to` fall back to a line
const MAX_ARC_TO_TANGENT: f32 = 10_000.0;

/// Path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    MoveTo(Point),
    LineTo(Point),
    BezierTo {
        control1: Point,
        control2: Point,
        end: Point,
    },
    Close,
    Winding(Winding),
}

impl Command {
    fn transformed(self, xform: &Affine2D) -> Self {
        match self {
            Command::MoveTo(p) => Command::MoveTo(xform.transform_point(p)),
            Command::LineTo(p) => Command::LineTo(xform.transform_point(p)),
            Command::BezierTo {
                control1,
                control2,
                end,
            } => Command::BezierTo {
                control1: xform.transform_point(control1),
                control2: xform.transform_point(control2),
                end: xform.transform_point(end),
            },
            other => other,
        }
    }

    fn end_point(&self) -> Option<Point> {
        match *self {
            Command::MoveTo(p) | Command::LineTo(p) => Some(p),
            Command::BezierTo { end, .. } => Some(end),
            Command::Close | Command::Winding(_) => None,
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Command::MoveTo(_) | Command::LineTo(_) => 3,
            Command::BezierTo { .. } => 7,
            Command::Close => 1,
            Command::Winding(_) => 2,
        }
    }

    fn encode(&self, out: &mut Vec<f32>) {
        match *self {
            Command::MoveTo(p) => out.extend_from_slice(&[MOVE_TO, p.x, p.y]),
            Command::LineTo(p) => out.extend_from_slice(&[LINE_TO, p.x, p.y]),
            Command::BezierTo {
                control1,
                control2,
                end,
            } => out.extend_from_slice(&[
                BEZIER_TO, control1.x, control1.y, control2.x, control2.y, end.x, end.y,
            ]),
            Command::Close => out.push(CLOSE),
            Command::Winding(w) => out.extend_from_slice(&[WINDING, w.code()]),
        }
    }
}

/// Append-only list of path commands for the path under construction
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    data: Vec<f32>,
    /// Last point appended, in the caller's local coordinates
    last: Point,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all commands, keeping the allocation
    pub fn clear(&mut self) {
        self.data.clear();
        self.last = Point::ZERO;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw float stream
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Decoded commands, in device space
    pub fn iter(&self) -> Commands<'_> {
        Commands {
            data: &self.data,
            pos: 0,
        }
    }

    /// Last appended point in local coordinates, `None` if nothing was added
    pub fn last_point(&self) -> Option<Point> {
        (!self.is_empty()).then_some(self.last)
    }

    /// Transform `commands` by `xform` and append them.
    pub fn append(&mut self, xform: &Affine2D, commands: &[Command]) -> Result<()> {
        let len = commands.iter().map(Command::encoded_len).sum();
        arena::reserve(&mut self.data, len, "command")?;

        if let Some(end) = commands.iter().rev().find_map(Command::end_point) {
            self.last = end;
        }
        for cmd in commands {
            cmd.transformed(xform).encode(&mut self.data);
        }
        Ok(())
    }

    pub fn move_to(&mut self, xform: &Affine2D, p: Point) -> Result<()> {
        self.append(xform, &[Command::MoveTo(p)])
    }

    pub fn line_to(&mut self, xform: &Affine2D, p: Point) -> Result<()> {
        self.append(xform, &[Command::LineTo(p)])
    }

    pub fn bezier_to(
        &mut self,
        xform: &Affine2D,
        control1: Point,
        control2: Point,
        end: Point,
    ) -> Result<()> {
        self.append(
            xform,
            &[Command::BezierTo {
                control1,
                control2,
                end,
            }],
        )
    }

    /// Quadratic Bézier from the last point, raised to a cubic
    pub fn quad_to(&mut self, xform: &Affine2D, control: Point, end: Point) -> Result<()> {
        let start = self.last;
        self.bezier_to(
            xform,
            start + (control - start) * (2.0 / 3.0),
            end + (control - end) * (2.0 / 3.0),
            end,
        )
    }

    pub fn close(&mut self) -> Result<()> {
        self.append(&Affine2D::IDENTITY, &[Command::Close])
    }

    /// Declare the winding of the current sub-path
    pub fn winding(&mut self, winding: Winding) -> Result<()> {
        self.append(&Affine2D::IDENTITY, &[Command::Winding(winding)])
    }

    /// Circular arc around `center` from angle `a0` to `a1` (radians).
    ///
    /// Continues the current sub-path with a line to the arc start, or starts
    /// a new sub-path when the buffer is empty. Each Bézier segment spans at
    /// most a quarter turn and a single call emits at most five.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        xform: &Affine2D,
        center: Point,
        radius: f32,
        a0: f32,
        a1: f32,
        dir: Winding,
    ) -> Result<()> {
        let mut da = a1 - a0;
        if dir == Winding::Clockwise {
            if da.abs() >= TAU {
                da = TAU;
            } else {
                while da < 0.0 {
                    da += TAU;
                }
            }
        } else if da.abs() >= TAU {
            da = -TAU;
        } else {
            while da > 0.0 {
                da -= TAU;
            }
        }

        let ndivs = ((da.abs() / FRAC_PI_2 + 0.5) as i32).clamp(1, 5);
        let hda = (da / ndivs as f32) / 2.0;
        let mut kappa = if hda.abs() > 1e-6 {
            (4.0 / 3.0 * (1.0 - hda.cos()) / hda.sin()).abs()
        } else {
            0.0
        };
        if dir == Winding::CounterClockwise {
            kappa = -kappa;
        }

        let mut cmds: SmallVec<[Command; 6]> = SmallVec::new();
        let mut prev = Point::ZERO;
        let mut prev_tan = Point::ZERO;
        for i in 0..=ndivs {
            let a = a0 + da * (i as f32 / ndivs as f32);
            let d = Point::new(a.cos(), a.sin());
            let p = center + d * radius;
            let tan = Point::new(-d.y * radius * kappa, d.x * radius * kappa);

            if i == 0 {
                cmds.push(if self.is_empty() {
                    Command::MoveTo(p)
                } else {
                    Command::LineTo(p)
                });
            } else {
                cmds.push(Command::BezierTo {
                    control1: prev + prev_tan,
                    control2: p - tan,
                    end: p,
                });
            }
            prev = p;
            prev_tan = tan;
        }

        self.append(xform, &cmds)
    }

    /// Arc of `radius` tangent to the lines last→`p1` and `p1`→`p2`.
    ///
    /// Degenerate corners (coincident or collinear points, a radius below
    /// `dist_tol`) become a straight line to `p1`.
    pub fn arc_to(
        &mut self,
        xform: &Affine2D,
        p1: Point,
        p2: Point,
        radius: f32,
        dist_tol: f32,
    ) -> Result<()> {
        let Some(p0) = self.last_point() else {
            return Ok(());
        };

        if p0.approx_eq(p1, dist_tol)
            || p1.approx_eq(p2, dist_tol)
            || p1.distance_to_segment_squared(p0, p2) < dist_tol * dist_tol
            || radius < dist_tol
        {
            return self.line_to(xform, p1);
        }

        let Some(arc) = tangent_arc(p0, p1, p2, radius) else {
            return self.line_to(xform, p1);
        };
        self.arc(xform, arc.center, radius, arc.a0, arc.a1, arc.dir)
    }

    pub fn rect(&mut self, xform: &Affine2D, rect: Rect) -> Result<()> {
        let Rect {
            x,
            y,
            width: w,
            height: h,
        } = rect;
        self.append(
            xform,
            &[
                Command::MoveTo(Point::new(x, y)),
                Command::LineTo(Point::new(x, y + h)),
                Command::LineTo(Point::new(x + w, y + h)),
                Command::LineTo(Point::new(x + w, y)),
                Command::Close,
            ],
        )
    }

    pub fn rounded_rect(&mut self, xform: &Affine2D, rect: Rect, radius: f32) -> Result<()> {
        self.rounded_rect_varying(xform, rect, CornerRadius::uniform(radius))
    }

    /// Rounded rectangle with a separate radius per corner.
    ///
    /// Radii are clamped to half the width and height.
    pub fn rounded_rect_varying(
        &mut self,
        xform: &Affine2D,
        rect: Rect,
        radii: CornerRadius,
    ) -> Result<()> {
        if radii.is_sharp() {
            return self.rect(xform, rect);
        }

        let Rect {
            x,
            y,
            width: w,
            height: h,
        } = rect;
        let halfw = w.abs() * 0.5;
        let halfh = h.abs() * 0.5;
        let corner = |r: f32| Point::new(r.min(halfw) * sign(w), r.min(halfh) * sign(h));
        let bl = corner(radii.bottom_left);
        let br = corner(radii.bottom_right);
        let tr = corner(radii.top_right);
        let tl = corner(radii.top_left);
        let k = 1.0 - KAPPA90;

        self.append(
            xform,
            &[
                Command::MoveTo(Point::new(x, y + tl.y)),
                Command::LineTo(Point::new(x, y + h - bl.y)),
                Command::BezierTo {
                    control1: Point::new(x, y + h - bl.y * k),
                    control2: Point::new(x + bl.x * k, y + h),
                    end: Point::new(x + bl.x, y + h),
                },
                Command::LineTo(Point::new(x + w - br.x, y + h)),
                Command::BezierTo {
                    control1: Point::new(x + w - br.x * k, y + h),
                    control2: Point::new(x + w, y + h - br.y * k),
                    end: Point::new(x + w, y + h - br.y),
                },
                Command::LineTo(Point::new(x + w, y + tr.y)),
                Command::BezierTo {
                    control1: Point::new(x + w, y + tr.y * k),
                    control2: Point::new(x + w - tr.x * k, y),
                    end: Point::new(x + w - tr.x, y),
                },
                Command::LineTo(Point::new(x + tl.x, y)),
                Command::BezierTo {
                    control1: Point::new(x + tl.x * k, y),
                    control2: Point::new(x, y + tl.y * k),
                    end: Point::new(x, y + tl.y),
                },
                Command::Close,
            ],
        )
    }

    pub fn ellipse(&mut self, xform: &Affine2D, center: Point, rx: f32, ry: f32) -> Result<()> {
        let Point { x: cx, y: cy } = center;
        let kx = rx * KAPPA90;
        let ky = ry * KAPPA90;

        self.append(
            xform,
            &[
                Command::MoveTo(Point::new(cx - rx, cy)),
                Command::BezierTo {
                    control1: Point::new(cx - rx, cy + ky),
                    control2: Point::new(cx - kx, cy + ry),
                    end: Point::new(cx, cy + ry),
                },
                Command::BezierTo {
                    control1: Point::new(cx + kx, cy + ry),
                    control2: Point::new(cx + rx, cy + ky),
                    end: Point::new(cx + rx, cy),
                },
                Command::BezierTo {
                    control1: Point::new(cx + rx, cy - ky),
                    control2: Point::new(cx + kx, cy - ry),
                    end: Point::new(cx, cy - ry),
                },
                Command::BezierTo {
                    control1: Point::new(cx - kx, cy - ry),
                    control2: Point::new(cx - rx, cy - ky),
                    end: Point::new(cx - rx, cy),
                },
                Command::Close,
            ],
        )
    }

    pub fn circle(&mut self, xform: &Affine2D, center: Point, radius: f32) -> Result<()> {
        self.ellipse(xform, center, radius, radius)
    }
}

/// Circle tangent to two lines meeting at a corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TangentArc {
    pub center: Point,
    pub a0: f32,
    pub a1: f32,
    pub dir: Winding,
}

/// Circle of `radius` tangent to `p0→p1` and `p1→p2`, with the start and end
/// angles of the arc between the two tangent points.
///
/// Returns `None` when the corner is so shallow that the tangent points run
/// off towards infinity.
pub(crate) fn tangent_arc(p0: Point, p1: Point, p2: Point, radius: f32) -> Option<TangentArc> {
    let d0 = (p0 - p1).normalized();
    let d1 = (p2 - p1).normalized();
    let a = d0.dot(d1).clamp(-1.0, 1.0).acos();
    let d = radius / (a / 2.0).tan();

    if !d.is_finite() || d > MAX_ARC_TO_TANGENT {
        return None;
    }

    let arc = if d0.cross(d1) > 0.0 {
        TangentArc {
            center: Point::new(
                p1.x + d0.x * d + d0.y * radius,
                p1.y + d0.y * d - d0.x * radius,
            ),
            a0: d0.x.atan2(-d0.y),
            a1: (-d1.x).atan2(d1.y),
            dir: Winding::Clockwise,
        }
    } else {
        TangentArc {
            center: Point::new(
                p1.x + d0.x * d - d0.y * radius,
                p1.y + d0.y * d + d0.x * radius,
            ),
            a0: (-d0.x).atan2(d0.y),
            a1: d1.x.atan2(-d1.y),
            dir: Winding::CounterClockwise,
        }
    };
    Some(arc)
}

fn sign(v: f32) -> f32 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Iterator decoding a [`CommandBuffer`]
pub struct Commands<'a> {
    data: &'a [f32],
    pos: usize,
}

impl Iterator for Commands<'_> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        let data = self.data;
        let pos = self.pos;
        let op = *data.get(pos)?;
        let pt = |i: usize| Point::new(data[pos + 1 + 2 * i], data[pos + 2 + 2 * i]);

        let cmd = if op == MOVE_TO {
            Command::MoveTo(pt(0))
        } else if op == LINE_TO {
            Command::LineTo(pt(0))
        } else if op == BEZIER_TO {
            Command::BezierTo {
                control1: pt(0),
                control2: pt(1),
                end: pt(2),
            }
        } else if op == CLOSE {
            Command::Close
        } else if op == WINDING {
            Command::Winding(Winding::from_code(data[pos + 1]))
        } else {
            return None;
        };

        self.pos += cmd.encoded_len();
        Some(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(buf: &CommandBuffer) -> Vec<Command> {
        buf.iter().collect()
    }

    #[test]
    fn test_points_are_transformed_at_append_time() {
        let mut buf = CommandBuffer::new();
        let xform = Affine2D::translation(10.0, 0.0);
        buf.move_to(&xform, Point::new(1.0, 1.0)).unwrap();
        buf.line_to(&Affine2D::IDENTITY, Point::new(2.0, 2.0)).unwrap();

        assert_eq!(
            collect(&buf),
            vec![
                Command::MoveTo(Point::new(11.0, 1.0)),
                Command::LineTo(Point::new(2.0, 2.0)),
            ]
        );
        // The pen position stays in local space
        assert_eq!(buf.last_point(), Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_float_stream_layout() {
        let mut buf = CommandBuffer::new();
        buf.move_to(&Affine2D::IDENTITY, Point::new(1.0, 2.0)).unwrap();
        buf.winding(Winding::Clockwise).unwrap();
        buf.close().unwrap();
        assert_eq!(buf.as_slice(), &[MOVE_TO, 1.0, 2.0, WINDING, 2.0, CLOSE]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buf = CommandBuffer::new();
        buf.rect(&Affine2D::IDENTITY, Rect::new(0.0, 0.0, 1.0, 1.0))
            .unwrap();
        let cap = buf.data.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.last_point(), None);
        assert_eq!(buf.data.capacity(), cap);
    }

    #[test]
    fn test_quad_to_raises_degree() {
        let mut buf = CommandBuffer::new();
        let id = Affine2D::IDENTITY;
        buf.move_to(&id, Point::new(0.0, 0.0)).unwrap();
        buf.quad_to(&id, Point::new(3.0, 3.0), Point::new(6.0, 0.0))
            .unwrap();

        assert_eq!(
            collect(&buf)[1],
            Command::BezierTo {
                control1: Point::new(2.0, 2.0),
                control2: Point::new(4.0, 2.0),
                end: Point::new(6.0, 0.0),
            }
        );
    }

    #[test]
    fn test_rect_commands() {
        let mut buf = CommandBuffer::new();
        buf.rect(&Affine2D::IDENTITY, Rect::new(1.0, 2.0, 3.0, 4.0))
            .unwrap();
        let cmds = collect(&buf);
        assert_eq!(cmds.len(), 5);
        assert_eq!(cmds[0], Command::MoveTo(Point::new(1.0, 2.0)));
        assert_eq!(cmds[2], Command::LineTo(Point::new(4.0, 6.0)));
        assert_eq!(cmds[4], Command::Close);
    }

    #[test]
    fn test_sharp_rounded_rect_is_rect() {
        let mut a = CommandBuffer::new();
        let mut b = CommandBuffer::new();
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        a.rounded_rect(&Affine2D::IDENTITY, r, 0.05).unwrap();
        b.rect(&Affine2D::IDENTITY, r).unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn test_rounded_rect_clamps_radius() {
        let mut buf = CommandBuffer::new();
        buf.rounded_rect(&Affine2D::IDENTITY, Rect::new(0.0, 0.0, 10.0, 4.0), 100.0)
            .unwrap();
        // Starts at the top-left corner, radius limited to half the height
        assert_eq!(collect(&buf)[0], Command::MoveTo(Point::new(0.0, 2.0)));
    }

    #[test]
    fn test_arc_segment_count() {
        let id = Affine2D::IDENTITY;
        let mut buf = CommandBuffer::new();
        buf.arc(&id, Point::ZERO, 10.0, 0.0, std::f32::consts::PI, Winding::Clockwise)
            .unwrap();
        let cmds = collect(&buf);
        assert!(matches!(cmds[0], Command::MoveTo(_)));
        assert_eq!(cmds.len(), 3);

        // A full turn is four quarter segments; more never exceeds five
        let mut buf = CommandBuffer::new();
        buf.arc(&id, Point::ZERO, 10.0, 0.0, 100.0, Winding::Clockwise)
            .unwrap();
        assert_eq!(collect(&buf).len(), 5);
    }

    #[test]
    fn test_arc_continues_existing_path() {
        let id = Affine2D::IDENTITY;
        let mut buf = CommandBuffer::new();
        buf.move_to(&id, Point::ZERO).unwrap();
        buf.arc(&id, Point::new(5.0, 0.0), 5.0, 0.0, 1.0, Winding::Clockwise)
            .unwrap();
        assert!(matches!(collect(&buf)[1], Command::LineTo(_)));
    }

    #[test]
    fn test_arc_ends_on_circle() {
        let id = Affine2D::IDENTITY;
        let mut buf = CommandBuffer::new();
        buf.arc(
            &id,
            Point::new(1.0, 1.0),
            4.0,
            0.3,
            2.0,
            Winding::CounterClockwise,
        )
        .unwrap();
        let Some(Command::BezierTo { end, .. }) = collect(&buf).last().copied() else {
            panic!("expected a curve");
        };
        let expected = Point::new(1.0 + 4.0 * 2.0f32.cos(), 1.0 + 4.0 * 2.0f32.sin());
        assert!(end.approx_eq(expected, 1e-4));
    }

    #[test]
    fn test_arc_to_needs_a_current_point() {
        let mut buf = CommandBuffer::new();
        buf.arc_to(
            &Affine2D::IDENTITY,
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            0.5,
            0.01,
        )
        .unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_arc_to_degenerates_to_line() {
        let id = Affine2D::IDENTITY;

        // Collinear
        let mut buf = CommandBuffer::new();
        buf.move_to(&id, Point::ZERO).unwrap();
        buf.arc_to(&id, Point::new(5.0, 0.0), Point::new(10.0, 0.0), 2.0, 0.01)
            .unwrap();
        assert_eq!(collect(&buf)[1], Command::LineTo(Point::new(5.0, 0.0)));

        // Radius below tolerance
        let mut buf = CommandBuffer::new();
        buf.move_to(&id, Point::ZERO).unwrap();
        buf.arc_to(&id, Point::new(5.0, 0.0), Point::new(5.0, 5.0), 0.001, 0.01)
            .unwrap();
        assert_eq!(collect(&buf).len(), 2);

        // Coincident tangent points
        let mut buf = CommandBuffer::new();
        buf.move_to(&id, Point::ZERO).unwrap();
        buf.arc_to(&id, Point::ZERO, Point::new(5.0, 5.0), 1.0, 0.01)
            .unwrap();
        assert_eq!(collect(&buf)[1], Command::LineTo(Point::ZERO));
    }

    /// The arc must start on the first tangent line and end on the second,
    /// both at `radius` from the center, for corners turning either way.
    #[test]
    fn test_tangent_arc_touches_both_lines() {
        let corner = Point::new(3.0, -2.0);
        let radius = 1.5;

        for i in 0..24 {
            for j in 0..24 {
                if i == j {
                    continue;
                }
                let ai = i as f32 / 24.0 * TAU;
                let aj = j as f32 / 24.0 * TAU;
                let p0 = corner + Point::new(ai.cos(), ai.sin()) * 20.0;
                let p2 = corner + Point::new(aj.cos(), aj.sin()) * 20.0;
                if corner.distance_to_segment_squared(p0, p2) < 1e-3 {
                    continue;
                }
                let Some(arc) = tangent_arc(p0, corner, p2, radius) else {
                    continue;
                };

                let start = arc.center + Point::new(arc.a0.cos(), arc.a0.sin()) * radius;
                let end = arc.center + Point::new(arc.a1.cos(), arc.a1.sin()) * radius;

                assert!(
                    start.distance_to_segment_squared(p0, corner) < 1e-4,
                    "start off first tangent for i={i} j={j}"
                );
                assert!(
                    end.distance_to_segment_squared(corner, p2) < 1e-4,
                    "end off second tangent for i={i} j={j}"
                );
                // Center sits `radius` away from both lines
                let d0 = arc.center.distance_to_segment_squared(p0, corner).sqrt();
                let d1 = arc.center.distance_to_segment_squared(corner, p2).sqrt();
                assert!((d0 - radius).abs() < 1e-3 && (d1 - radius).abs() < 1e-3);
            }
        }
    }
}
