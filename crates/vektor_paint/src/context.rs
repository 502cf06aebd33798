//! Canvas - the path authoring API
//!
//! Paths are built with the current transform applied at call time, then
//! tessellated by [`Canvas::fill`] / [`Canvas::stroke`] and handed to the
//! render backend together with the paint, scissor and composite state.

use vektor_core::{
    Affine2D, BlendFactor, Color, CompositeOperation, CompositeOperationState, CornerRadius,
    ImageFlags, LineCap, LineJoin, Paint, Point, Rect, Scissor, TextureId, TextureKind, Winding,
};
use vektor_tess::{
    expand_fill, expand_stroke, flatten, CommandBuffer, PathCache, StrokeStyle, Tolerance,
    Vertex,
};

use crate::backend::RenderBackend;
use crate::config::CanvasConfig;
use crate::error::{BackendError, CanvasError, Result};
use crate::state::{DrawState, StateStack};
use crate::text::{FontId, TextAlign, TextShaper};

/// Device stroke widths are clamped to this
const MAX_STROKE_WIDTH: f32 = 200.0;

/// Glyphs are never rasterized at more than this multiple of their size
const MAX_FONT_SCALE: f32 = 4.0;

/// Draw statistics of the current frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub fill_triangles: usize,
    pub stroke_triangles: usize,
    pub text_triangles: usize,
}

struct TextContext {
    shaper: Box<dyn TextShaper>,
    atlas: TextureId,
}

/// The drawing context
///
/// ```
/// use vektor_paint::{Canvas, Color, RecordingBackend};
///
/// let mut canvas = Canvas::new(RecordingBackend::new());
/// canvas.begin_frame(800.0, 600.0, 1.0);
/// canvas.begin_path();
/// canvas.rect(10.0, 10.0, 100.0, 50.0);
/// canvas.fill_color(Color::RED);
/// canvas.fill();
/// canvas.end_frame();
///
/// assert_eq!(canvas.backend().flushed().len(), 1);
/// ```
pub struct Canvas<B: RenderBackend> {
    backend: B,
    config: CanvasConfig,
    commands: CommandBuffer,
    cache: PathCache,
    states: StateStack,
    tolerance: Tolerance,
    fringe_width: f32,
    device_px_ratio: f32,
    stats: FrameStats,
    text: Option<TextContext>,
    text_vertices: Vec<Vertex>,
}

impl<B: RenderBackend> Canvas<B> {
    pub fn new(backend: B) -> Self {
        let config = CanvasConfig::default();
        let mut canvas = Self {
            backend,
            states: StateStack::new(config.max_states),
            config,
            commands: CommandBuffer::new(),
            cache: PathCache::new(),
            tolerance: Tolerance::default(),
            fringe_width: 1.0,
            device_px_ratio: 1.0,
            stats: FrameStats::default(),
            text: None,
            text_vertices: Vec::new(),
        };
        canvas.set_device_pixel_ratio(1.0);
        canvas
    }

    pub fn with_config(backend: B, config: CanvasConfig) -> Result<Self> {
        config.validate()?;
        let mut canvas = Self::new(backend);
        canvas.states = StateStack::new(config.max_states);
        canvas.config = config;
        canvas.set_device_pixel_ratio(1.0);
        Ok(canvas)
    }

    /// Attach a text shaper and create its glyph atlas texture.
    ///
    /// Replaces (and releases the atlas of) any previous shaper.
    pub fn set_text_shaper(&mut self, shaper: impl TextShaper + 'static) -> Result<()> {
        let (width, height) = shaper.atlas_size();
        let atlas = self
            .backend
            .create_texture(TextureKind::Alpha, width, height, ImageFlags::empty(), None)
            .map_err(CanvasError::Atlas)?;

        if let Some(old) = self.text.replace(TextContext {
            shaper: Box::new(shaper),
            atlas,
        }) {
            if let Err(err) = self.backend.delete_texture(old.atlas) {
                tracing::warn!(%err, "failed to release previous glyph atlas");
            }
        }
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Current draw state
    pub fn state(&self) -> &DrawState {
        self.states.current()
    }

    pub fn state_depth(&self) -> usize {
        self.states.depth()
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn fringe_width(&self) -> f32 {
        self.fringe_width
    }

    /// Glyph atlas texture, if a shaper is attached
    pub fn atlas_texture(&self) -> Option<TextureId> {
        self.text.as_ref().map(|t| t.atlas)
    }

    fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.tolerance =
            Tolerance::new(self.config.tess_tol, self.config.dist_tol).for_device_ratio(ratio);
        self.fringe_width = 1.0 / ratio;
        self.device_px_ratio = ratio;
    }

    fn state_mut(&mut self) -> &mut DrawState {
        self.states.current_mut()
    }

    // === Frames ===

    /// Start a frame of `width` x `height` logical pixels.
    pub fn begin_frame(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        tracing::trace!(width, height, device_pixel_ratio, "begin frame");

        self.states.clear();
        self.set_device_pixel_ratio(device_pixel_ratio);
        self.backend.viewport(width, height, device_pixel_ratio);
        self.stats = FrameStats::default();
    }

    /// Discard everything drawn since `begin_frame`
    pub fn cancel_frame(&mut self) {
        tracing::trace!("cancel frame");
        self.backend.cancel();
    }

    pub fn end_frame(&mut self) {
        let stats = self.stats;
        tracing::trace!(
            draw_calls = stats.draw_calls,
            fill_triangles = stats.fill_triangles,
            stroke_triangles = stats.stroke_triangles,
            text_triangles = stats.text_triangles,
            "end frame"
        );
        self.backend.flush();
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.stats
    }

    // === State ===

    pub fn save(&mut self) {
        self.states.save();
    }

    pub fn restore(&mut self) {
        self.states.restore();
    }

    pub fn reset(&mut self) {
        self.states.reset();
    }

    // === Render styles ===

    pub fn shape_anti_alias(&mut self, enabled: bool) {
        self.state_mut().shape_anti_alias = enabled;
    }

    pub fn stroke_width(&mut self, width: f32) {
        self.state_mut().stroke_width = width;
    }

    pub fn miter_limit(&mut self, limit: f32) {
        self.state_mut().miter_limit = limit;
    }

    pub fn line_cap(&mut self, cap: LineCap) {
        self.state_mut().line_cap = cap;
    }

    pub fn line_join(&mut self, join: LineJoin) {
        self.state_mut().line_join = join;
    }

    pub fn global_alpha(&mut self, alpha: f32) {
        self.state_mut().alpha = alpha;
    }

    pub fn stroke_color(&mut self, color: Color) {
        self.state_mut().stroke = Paint::color(color);
    }

    /// Set the stroke paint; its transform is taken relative to the current
    /// transform.
    pub fn stroke_paint(&mut self, paint: Paint) {
        let state = self.state_mut();
        state.stroke = paint;
        state.stroke.transform = state.transform.then(&paint.transform);
    }

    pub fn fill_color(&mut self, color: Color) {
        self.state_mut().fill = Paint::color(color);
    }

    /// Set the fill paint; its transform is taken relative to the current
    /// transform.
    pub fn fill_paint(&mut self, paint: Paint) {
        let state = self.state_mut();
        state.fill = paint;
        state.fill.transform = state.transform.then(&paint.transform);
    }

    pub fn global_composite_operation(&mut self, op: CompositeOperation) {
        self.state_mut().composite = CompositeOperationState::new(op);
    }

    pub fn global_composite_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.global_composite_blend_func_separate(src, dst, src, dst);
    }

    pub fn global_composite_blend_func_separate(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.state_mut().composite =
            CompositeOperationState::with_blend_factors(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    // === Transforms ===

    pub fn reset_transform(&mut self) {
        self.state_mut().transform = Affine2D::IDENTITY;
    }

    /// Apply `t` before the current transform
    fn premultiply(&mut self, t: Affine2D) {
        let state = self.state_mut();
        state.transform = state.transform.then(&t);
    }

    /// Apply the matrix `[a c e; b d f; 0 0 1]` before the current transform
    pub fn transform(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.premultiply(Affine2D::new(a, b, c, d, e, f));
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.premultiply(Affine2D::translation(x, y));
    }

    pub fn rotate(&mut self, angle: f32) {
        self.premultiply(Affine2D::rotation(angle));
    }

    pub fn skew_x(&mut self, angle: f32) {
        self.premultiply(Affine2D::skew_x(angle));
    }

    pub fn skew_y(&mut self, angle: f32) {
        self.premultiply(Affine2D::skew_y(angle));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.premultiply(Affine2D::scale(x, y));
    }

    pub fn current_transform(&self) -> Affine2D {
        self.state().transform
    }

    // === Scissoring ===

    /// Clip to a rectangle in the current local space
    pub fn scissor(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let state = self.state_mut();
        state.scissor = Scissor::from_rect(Rect::new(x, y, width, height), &state.transform);
    }

    /// Clip to the intersection of the current scissor and a rectangle.
    ///
    /// The current scissor is first projected into the local space, which
    /// is only exact when both frames share a rotation.
    pub fn intersect_scissor(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let state = *self.state();
        if !state.scissor.is_enabled() {
            self.scissor(x, y, width, height);
            return;
        }

        let current = state.scissor.local_bounds(&state.transform);
        let r = current.intersect(&Rect::new(x, y, width, height));
        self.scissor(r.x, r.y, r.width, r.height);
    }

    pub fn reset_scissor(&mut self) {
        self.state_mut().scissor = Scissor::DISABLED;
    }

    // === Paths ===

    /// Clear the current path
    pub fn begin_path(&mut self) {
        self.commands.clear();
        self.cache.clear();
    }

    fn record(&mut self, result: vektor_tess::Result<()>) {
        if let Err(err) = result {
            tracing::warn!(%err, "dropping path command");
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let xform = self.current_transform();
        let result = self.commands.move_to(&xform, Point::new(x, y));
        self.record(result);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        let xform = self.current_transform();
        let result = self.commands.line_to(&xform, Point::new(x, y));
        self.record(result);
    }

    pub fn bezier_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        let xform = self.current_transform();
        let result = self.commands.bezier_to(
            &xform,
            Point::new(c1x, c1y),
            Point::new(c2x, c2y),
            Point::new(x, y),
        );
        self.record(result);
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let xform = self.current_transform();
        let result = self
            .commands
            .quad_to(&xform, Point::new(cx, cy), Point::new(x, y));
        self.record(result);
    }

    /// Arc of radius `radius` tangent to the lines from the last point to
    /// `(x1, y1)` and from there to `(x2, y2)`
    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, radius: f32) {
        let xform = self.current_transform();
        let dist_tol = self.tolerance.dist;
        let result = self.commands.arc_to(
            &xform,
            Point::new(x1, y1),
            Point::new(x2, y2),
            radius,
            dist_tol,
        );
        self.record(result);
    }

    /// Circular arc around `(cx, cy)` from angle `a0` to `a1` in radians
    pub fn arc(&mut self, cx: f32, cy: f32, radius: f32, a0: f32, a1: f32, dir: Winding) {
        let xform = self.current_transform();
        let result = self
            .commands
            .arc(&xform, Point::new(cx, cy), radius, a0, a1, dir);
        self.record(result);
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let xform = self.current_transform();
        let result = self.commands.rect(&xform, Rect::new(x, y, width, height));
        self.record(result);
    }

    pub fn rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) {
        let xform = self.current_transform();
        let result = self
            .commands
            .rounded_rect(&xform, Rect::new(x, y, width, height), radius);
        self.record(result);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect_varying(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        top_left: f32,
        top_right: f32,
        bottom_right: f32,
        bottom_left: f32,
    ) {
        let xform = self.current_transform();
        let radii = CornerRadius {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        };
        let result =
            self.commands
                .rounded_rect_varying(&xform, Rect::new(x, y, width, height), radii);
        self.record(result);
    }

    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) {
        let xform = self.current_transform();
        let result = self.commands.ellipse(&xform, Point::new(cx, cy), rx, ry);
        self.record(result);
    }

    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32) {
        let xform = self.current_transform();
        let result = self.commands.circle(&xform, Point::new(cx, cy), radius);
        self.record(result);
    }

    pub fn close_path(&mut self) {
        let result = self.commands.close();
        self.record(result);
    }

    /// Declare the current sub-path solid or a hole
    pub fn path_winding(&mut self, winding: Winding) {
        let result = self.commands.winding(winding);
        self.record(result);
    }

    /// Flattened outline of the current path
    pub fn path_cache(&self) -> &PathCache {
        &self.cache
    }

    // === Drawing ===

    fn fringe_for(&self, state: &DrawState) -> f32 {
        if self.config.antialias && state.shape_anti_alias {
            self.fringe_width
        } else {
            0.0
        }
    }

    /// Fill the current path with the fill paint
    pub fn fill(&mut self) {
        let state = *self.state();
        let fringe = self.fringe_for(&state);

        let result = flatten(&mut self.cache, &self.commands, self.tolerance)
            .and_then(|_| expand_fill(&mut self.cache, fringe));
        if let Err(err) = result {
            tracing::warn!(%err, "fill skipped");
            return;
        }
        if self.cache.paths().is_empty() {
            return;
        }

        let mut paint = state.fill;
        paint.multiply_alpha(state.alpha);

        let geometry = self.cache.fill_geometry();
        self.backend.fill(
            &paint,
            state.composite,
            &state.scissor,
            self.fringe_width,
            &geometry,
        );

        self.stats.draw_calls += 1;
        for path in &geometry.paths {
            self.stats.fill_triangles +=
                triangle_count(path.fill.len()) + triangle_count(path.stroke.len());
        }
    }

    /// Stroke the current path with the stroke paint
    pub fn stroke(&mut self) {
        let state = *self.state();
        let scale = state.transform.average_scale();
        let mut stroke_width = (state.stroke_width * scale).clamp(0.0, MAX_STROKE_WIDTH);
        let mut paint = state.stroke;

        if stroke_width < self.fringe_width {
            // Thinner than a pixel: fade out instead of shrinking further
            let alpha = (stroke_width / self.fringe_width).clamp(0.0, 1.0);
            paint.multiply_alpha(alpha * alpha);
            stroke_width = self.fringe_width;
        }
        paint.multiply_alpha(state.alpha);

        let style = StrokeStyle {
            half_width: stroke_width * 0.5,
            fringe: self.fringe_for(&state),
            cap: state.line_cap,
            join: state.line_join,
            miter_limit: state.miter_limit,
        };

        let result = flatten(&mut self.cache, &self.commands, self.tolerance)
            .and_then(|_| expand_stroke(&mut self.cache, &style, self.tolerance.tess));
        if let Err(err) = result {
            tracing::warn!(%err, "stroke skipped");
            return;
        }

        let geometry = self.cache.stroke_geometry();
        if geometry.paths.iter().all(|strip| strip.is_empty()) {
            return;
        }
        self.backend.stroke(
            &paint,
            state.composite,
            &state.scissor,
            self.fringe_width,
            stroke_width,
            &geometry,
        );

        self.stats.draw_calls += 1;
        for strip in &geometry.paths {
            self.stats.stroke_triangles += triangle_count(strip.len());
        }
    }

    // === Images ===

    /// Create an RGBA image from `width * height * 4` bytes
    pub fn create_image_rgba(
        &mut self,
        width: u32,
        height: u32,
        flags: ImageFlags,
        data: &[u8],
    ) -> Result<TextureId> {
        Ok(self
            .backend
            .create_texture(TextureKind::Rgba, width, height, flags, Some(data))?)
    }

    /// Replace the whole contents of an image
    pub fn update_image(&mut self, image: TextureId, data: &[u8]) -> Result<()> {
        let (width, height) = self
            .backend
            .texture_size(image)
            .ok_or(BackendError::TextureNotFound(image))?;
        Ok(self
            .backend
            .update_texture(image, 0, 0, width, height, data)?)
    }

    pub fn delete_image(&mut self, image: TextureId) -> Result<()> {
        Ok(self.backend.delete_texture(image)?)
    }

    pub fn image_size(&self, image: TextureId) -> Option<(u32, u32)> {
        self.backend.texture_size(image)
    }

    // === Text ===

    pub fn font_face_id(&mut self, face: FontId) {
        self.state_mut().font.face = face;
    }

    pub fn font_size(&mut self, size: f32) {
        self.state_mut().font.size = size;
    }

    pub fn font_blur(&mut self, blur: f32) {
        self.state_mut().font.blur = blur;
    }

    pub fn text_letter_spacing(&mut self, spacing: f32) {
        self.state_mut().font.letter_spacing = spacing;
    }

    pub fn text_line_height(&mut self, line_height: f32) {
        self.state_mut().font.line_height = line_height;
    }

    pub fn text_align(&mut self, align: TextAlign) {
        self.state_mut().font.align = align;
    }

    /// Draw `text` with its pen starting at `(x, y)` using the fill paint.
    ///
    /// Returns the pen x position after the run, or `x` when no shaper or
    /// font is available.
    pub fn text(&mut self, x: f32, y: f32, text: &str) -> f32 {
        let state = *self.state();
        let Some(ctx) = self.text.as_mut() else {
            return x;
        };
        if !ctx.shaper.has_font(state.font.face) {
            tracing::trace!(face = state.font.face.0, "no such font, text skipped");
            return x;
        }

        let scale = font_scale(&state.transform) * self.device_px_ratio;
        let invscale = 1.0 / scale;
        let run = ctx
            .shaper
            .shape(text, x * scale, y * scale, &state.font.scaled(scale));

        self.text_vertices.clear();
        if let Err(err) = self.text_vertices.try_reserve(run.quads.len() * 6) {
            tracing::warn!(%err, "text skipped");
            return x;
        }
        let xform = &state.transform;
        for q in &run.quads {
            let corner = |px: f32, py: f32| {
                xform.transform_point(Point::new(px * invscale, py * invscale))
            };
            let c0 = corner(q.x0, q.y0);
            let c1 = corner(q.x1, q.y0);
            let c2 = corner(q.x1, q.y1);
            let c3 = corner(q.x0, q.y1);

            self.text_vertices.extend_from_slice(&[
                Vertex::at(c0, q.s0, q.t0),
                Vertex::at(c2, q.s1, q.t1),
                Vertex::at(c1, q.s1, q.t0),
                Vertex::at(c0, q.s0, q.t0),
                Vertex::at(c3, q.s0, q.t1),
                Vertex::at(c2, q.s1, q.t1),
            ]);
        }

        if let Some((region, pixels)) = ctx.shaper.take_dirty() {
            if let Err(err) = self.backend.update_texture(
                ctx.atlas,
                region.x,
                region.y,
                region.width,
                region.height,
                pixels,
            ) {
                tracing::warn!(%err, "glyph atlas upload failed");
            }
        }

        if !self.text_vertices.is_empty() {
            let mut paint = state.fill;
            paint.image = Some(ctx.atlas);
            paint.multiply_alpha(state.alpha);

            self.backend.triangles(
                &paint,
                state.composite,
                &state.scissor,
                self.fringe_width,
                &self.text_vertices,
            );
            self.stats.draw_calls += 1;
            self.stats.text_triangles += self.text_vertices.len() / 3;
        }

        run.advance_x * invscale
    }
}

fn triangle_count(vertices: usize) -> usize {
    vertices.saturating_sub(2)
}

fn quantize(a: f32, d: f32) -> f32 {
    ((a / d + 0.5) as i32) as f32 * d
}

/// Scale at which glyphs are rasterized for `transform`
fn font_scale(transform: &Affine2D) -> f32 {
    quantize(transform.average_scale(), 0.01).min(MAX_FONT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingBackend;

    fn canvas() -> Canvas<RecordingBackend> {
        let mut canvas = Canvas::new(RecordingBackend::new());
        canvas.begin_frame(100.0, 100.0, 1.0);
        canvas
    }

    #[test]
    fn test_font_scale_is_quantized_and_capped() {
        assert_eq!(font_scale(&Affine2D::IDENTITY), 1.0);
        assert_eq!(font_scale(&Affine2D::scale(10.0, 10.0)), 4.0);
        assert!((font_scale(&Affine2D::scale(1.234, 1.234)) - 1.23).abs() < 1e-5);
    }

    #[test]
    fn test_transforms_apply_newest_first() {
        let mut c = canvas();
        c.translate(10.0, 0.0);
        c.scale(2.0, 2.0);
        // Scale first, then translate
        let p = c.current_transform().transform_point(Point::new(1.0, 1.0));
        assert_eq!(p, Point::new(12.0, 2.0));
    }

    #[test]
    fn test_paint_transform_composed_at_assignment() {
        let mut c = canvas();
        c.translate(5.0, 5.0);
        c.fill_paint(Paint::color(Color::RED));
        c.reset_transform();

        let origin = c.state().fill.transform.transform_point(Point::ZERO);
        assert_eq!(origin, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_begin_frame_scales_tolerances() {
        let mut c = canvas();
        c.begin_frame(100.0, 100.0, 2.0);
        assert_eq!(c.fringe_width(), 0.5);
        assert_eq!(c.tolerance(), Tolerance::new(0.125, 0.005));
        assert_eq!(c.backend().viewport_size(), Some((100.0, 100.0, 2.0)));
    }

    #[test]
    fn test_begin_frame_resets_state() {
        let mut c = canvas();
        c.save();
        c.global_alpha(0.3);
        c.begin_frame(100.0, 100.0, 1.0);
        assert_eq!(c.state_depth(), 1);
        assert_eq!(*c.state(), DrawState::default());
    }

    #[test]
    fn test_fill_then_stroke_flattens_once() {
        let mut c = canvas();
        c.begin_path();
        c.rect(0.0, 0.0, 10.0, 10.0);
        c.fill();
        let points = c.path_cache().points().len();
        c.stroke();
        assert_eq!(c.path_cache().points().len(), points);
        assert_eq!(c.frame_stats().draw_calls, 2);
    }

    #[test]
    fn test_antialias_disabled_by_config() {
        let config = CanvasConfig::default().with_antialias(false);
        let mut c = Canvas::with_config(RecordingBackend::new(), config).unwrap();
        c.begin_frame(100.0, 100.0, 1.0);
        c.begin_path();
        c.rect(0.0, 0.0, 10.0, 10.0);
        c.fill();

        let geometry = c.path_cache().fill_geometry();
        assert!(geometry.paths[0].stroke.is_empty());
    }
}
