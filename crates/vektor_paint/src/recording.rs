//! Headless backend that records draw calls
//!
//! Keeps textures in memory and copies every draw call's geometry, so canvas
//! output can be inspected in tests and tools without a GPU.

use rustc_hash::FxHashMap;
use vektor_core::{
    Bounds, CompositeOperationState, ImageFlags, Paint, Scissor, TextureId, TextureKind,
};
use vektor_tess::{FillGeometry, StrokeGeometry, Vertex};

use crate::backend::RenderBackend;
use crate::error::BackendError;

/// Texture held by a [`RecordingBackend`]
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedTexture {
    pub kind: TextureKind,
    pub width: u32,
    pub height: u32,
    pub flags: ImageFlags,
    pub data: Vec<u8>,
}

/// Owned copy of one sub-path of a fill
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedPath {
    pub fill: Vec<Vertex>,
    pub stroke: Vec<Vertex>,
}

/// A draw call as received by the backend
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    Fill {
        paint: Paint,
        composite: CompositeOperationState,
        scissor: Scissor,
        fringe: f32,
        bounds: Bounds,
        convex: bool,
        paths: Vec<RecordedPath>,
        cover: Vec<Vertex>,
    },
    Stroke {
        paint: Paint,
        composite: CompositeOperationState,
        scissor: Scissor,
        fringe: f32,
        stroke_width: f32,
        paths: Vec<Vec<Vertex>>,
    },
    Triangles {
        paint: Paint,
        composite: CompositeOperationState,
        scissor: Scissor,
        fringe: f32,
        vertices: Vec<Vertex>,
    },
}

impl RecordedCall {
    pub fn paint(&self) -> &Paint {
        match self {
            RecordedCall::Fill { paint, .. }
            | RecordedCall::Stroke { paint, .. }
            | RecordedCall::Triangles { paint, .. } => paint,
        }
    }

    pub fn scissor(&self) -> &Scissor {
        match self {
            RecordedCall::Fill { scissor, .. }
            | RecordedCall::Stroke { scissor, .. }
            | RecordedCall::Triangles { scissor, .. } => scissor,
        }
    }

    pub fn composite(&self) -> CompositeOperationState {
        match self {
            RecordedCall::Fill { composite, .. }
            | RecordedCall::Stroke { composite, .. }
            | RecordedCall::Triangles { composite, .. } => *composite,
        }
    }
}

/// In-memory [`RenderBackend`]
#[derive(Debug, Default)]
pub struct RecordingBackend {
    textures: FxHashMap<TextureId, RecordedTexture>,
    next_texture: u32,
    viewport: Option<(f32, f32, f32)>,
    pending: Vec<RecordedCall>,
    flushed: Vec<RecordedCall>,
    flush_count: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls queued since the last flush or cancel
    pub fn pending(&self) -> &[RecordedCall] {
        &self.pending
    }

    /// Calls submitted by the most recent flush
    pub fn flushed(&self) -> &[RecordedCall] {
        &self.flushed
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    /// Last `(width, height, device_pixel_ratio)` passed to `viewport`
    pub fn viewport_size(&self) -> Option<(f32, f32, f32)> {
        self.viewport
    }

    pub fn texture(&self, id: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(&id)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_texture(
        &mut self,
        kind: TextureKind,
        width: u32,
        height: u32,
        flags: ImageFlags,
        data: Option<&[u8]>,
    ) -> Result<TextureId, BackendError> {
        let expected = width as usize * height as usize * kind.bytes_per_pixel();
        let data = match data {
            Some(bytes) if bytes.len() != expected => {
                return Err(BackendError::InvalidTextureData {
                    expected,
                    actual: bytes.len(),
                })
            }
            Some(bytes) => bytes.to_vec(),
            None => vec![0; expected],
        };

        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.textures.insert(
            id,
            RecordedTexture {
                kind,
                width,
                height,
                flags,
                data,
            },
        );
        tracing::trace!(?id, width, height, ?kind, "created texture");
        Ok(id)
    }

    fn update_texture(
        &mut self,
        id: TextureId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<(), BackendError> {
        let texture = self
            .textures
            .get_mut(&id)
            .ok_or(BackendError::TextureNotFound(id))?;

        if x.saturating_add(width) > texture.width || y.saturating_add(height) > texture.height {
            return Err(BackendError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        if data.len() != texture.data.len() {
            return Err(BackendError::InvalidTextureData {
                expected: texture.data.len(),
                actual: data.len(),
            });
        }

        let bpp = texture.kind.bytes_per_pixel();
        let stride = texture.width as usize * bpp;
        for row in y as usize..(y + height) as usize {
            let start = row * stride + x as usize * bpp;
            let end = start + width as usize * bpp;
            texture.data[start..end].copy_from_slice(&data[start..end]);
        }
        Ok(())
    }

    fn delete_texture(&mut self, id: TextureId) -> Result<(), BackendError> {
        self.textures
            .remove(&id)
            .map(|_| ())
            .ok_or(BackendError::TextureNotFound(id))
    }

    fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|t| (t.width, t.height))
    }

    fn viewport(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.viewport = Some((width, height, device_pixel_ratio));
    }

    fn cancel(&mut self) {
        self.pending.clear();
    }

    fn flush(&mut self) {
        self.flushed = std::mem::take(&mut self.pending);
        self.flush_count += 1;
    }

    fn fill(
        &mut self,
        paint: &Paint,
        composite: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        geometry: &FillGeometry<'_>,
    ) {
        self.pending.push(RecordedCall::Fill {
            paint: *paint,
            composite,
            scissor: *scissor,
            fringe,
            bounds: geometry.bounds,
            convex: geometry.convex,
            paths: geometry
                .paths
                .iter()
                .map(|p| RecordedPath {
                    fill: p.fill.to_vec(),
                    stroke: p.stroke.to_vec(),
                })
                .collect(),
            cover: geometry.cover.to_vec(),
        });
    }

    fn stroke(
        &mut self,
        paint: &Paint,
        composite: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        stroke_width: f32,
        geometry: &StrokeGeometry<'_>,
    ) {
        self.pending.push(RecordedCall::Stroke {
            paint: *paint,
            composite,
            scissor: *scissor,
            fringe,
            stroke_width,
            paths: geometry.paths.iter().map(|p| p.to_vec()).collect(),
        });
    }

    fn triangles(
        &mut self,
        paint: &Paint,
        composite: CompositeOperationState,
        scissor: &Scissor,
        fringe: f32,
        vertices: &[Vertex],
    ) {
        self.pending.push(RecordedCall::Triangles {
            paint: *paint,
            composite,
            scissor: *scissor,
            fringe,
            vertices: vertices.to_vec(),
        });
    }
}
