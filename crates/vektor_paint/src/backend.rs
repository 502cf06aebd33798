//! Render backend interface
//!
//! A backend owns textures and turns the canvas' triangle geometry into
//! pixels. Draw calls are expected to be batched until `flush`.

use vektor_core::{CompositeOperationState, ImageFlags, Paint, Scissor, TextureId, TextureKind};
use vektor_tess::{FillGeometry, StrokeGeometry, Vertex};

use crate::error::BackendError;

pub trait RenderBackend {
    /// Create a texture, optionally initialised with `data`
    /// (`width * height * kind.bytes_per_pixel()` bytes).
    fn create_texture(
        &mut self,
        kind: TextureKind,
        width: u32,
        height: u32,
        flags: ImageFlags,
        data: Option<&[u8]>,
    ) -> Result<TextureId, BackendError>;

    /// Upload a sub-rectangle. `data` holds the whole image, rows of the
    /// full texture width.
    fn update_texture(
        &mut self,
        id: TextureId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<(), BackendError>;

    fn delete_texture(&mut self, id: TextureId) -> Result<(), BackendError>;

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)>;

    /// Start of a frame
    fn viewport(&mut self, width: f32, height: f32, device_pixel_ratio: f32);

    /// Drop everything queued since the last flush
    fn cancel(&mut self);

    /// Submit everything queued
    fn flush(&mut self);

    fn fill(
        &mut self,
        paint: &Paint,
        composite: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        geometry: &FillGeometry<'_>,
    );

    #[allow(clippy::too_many_arguments)]
    fn stroke(
        &mut self,
        paint: &Paint,
        composite: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        stroke_width: f32,
        geometry: &StrokeGeometry<'_>,
    );

    /// Plain triangle list, used for glyph quads
    fn triangles(
        &mut self,
        paint: &Paint,
        composite: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        vertices: &[Vertex],
    );
}
