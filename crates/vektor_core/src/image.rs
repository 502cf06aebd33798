//! Texture handles shared between paints and render backends

use bitflags::bitflags;

/// Backend-assigned texture handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Pixel layout of a texture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Single 8-bit coverage channel (glyph atlases)
    Alpha,
    /// 8-bit RGBA
    Rgba,
}

impl TextureKind {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            TextureKind::Alpha => 1,
            TextureKind::Rgba => 4,
        }
    }
}

bitflags! {
    /// Sampling and upload hints for a texture
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ImageFlags: u32 {
        /// Generate mipmaps during creation of the image.
        const GENERATE_MIPMAPS = 1 << 0;
        /// Repeat image in X direction.
        const REPEAT_X = 1 << 1;
        /// Repeat image in Y direction.
        const REPEAT_Y = 1 << 2;
        /// Flips (inverses) image in Y direction when rendered.
        const FLIP_Y = 1 << 3;
        /// Image data has premultiplied alpha.
        const PREMULTIPLIED = 1 << 4;
        /// Image interpolation is Nearest instead of Linear.
        const NEAREST = 1 << 5;
    }
}
