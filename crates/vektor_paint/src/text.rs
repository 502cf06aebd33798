//! Text shaping interface
//!
//! The canvas does not rasterize glyphs itself. A [`TextShaper`] lays out a
//! run of text into textured quads against a single-channel glyph atlas that
//! the canvas mirrors into a backend texture.

use bitflags::bitflags;

/// Shaper-assigned font face handle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontId(pub u32);

bitflags! {
    /// Horizontal and vertical anchoring of a text run
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TextAlign: u8 {
        const LEFT = 1 << 0;
        const CENTER = 1 << 1;
        const RIGHT = 1 << 2;
        const TOP = 1 << 3;
        const MIDDLE = 1 << 4;
        const BOTTOM = 1 << 5;
        const BASELINE = 1 << 6;
    }
}

impl Default for TextAlign {
    fn default() -> Self {
        TextAlign::LEFT | TextAlign::BASELINE
    }
}

/// Font selection and layout parameters for a run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontStyle {
    pub face: FontId,
    pub size: f32,
    pub blur: f32,
    pub letter_spacing: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    pub align: TextAlign,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            face: FontId::default(),
            size: 16.0,
            blur: 0.0,
            letter_spacing: 0.0,
            line_height: 1.0,
            align: TextAlign::default(),
        }
    }
}

impl FontStyle {
    /// The style with every length multiplied by `scale`
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            size: self.size * scale,
            blur: self.blur * scale,
            letter_spacing: self.letter_spacing * scale,
            ..*self
        }
    }
}

/// One glyph: screen rectangle `(x0, y0)-(x1, y1)` and atlas coordinates
/// `(s0, t0)-(s1, t1)`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphQuad {
    pub x0: f32,
    pub y0: f32,
    pub s0: f32,
    pub t0: f32,
    pub x1: f32,
    pub y1: f32,
    pub s1: f32,
    pub t1: f32,
}

/// Result of shaping a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedRun {
    pub quads: Vec<GlyphQuad>,
    /// Pen x position after the last glyph
    pub advance_x: f32,
}

/// Rectangle of the atlas in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Glyph layout and atlas management
pub trait TextShaper {
    /// Atlas dimensions in pixels
    fn atlas_size(&self) -> (u32, u32);

    fn has_font(&self, face: FontId) -> bool;

    /// Lay out `text` with its pen starting at `(x, y)`.
    ///
    /// Coordinates and the lengths in `style` are in atlas pixel scale.
    fn shape(&mut self, text: &str, x: f32, y: f32, style: &FontStyle) -> ShapedRun;

    /// The atlas region rasterized since the last call together with the
    /// full atlas pixels (one byte per pixel), or `None` if nothing changed.
    fn take_dirty(&mut self) -> Option<(AtlasRegion, &[u8])>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = FontStyle::default();
        assert_eq!(style.size, 16.0);
        assert_eq!(style.align, TextAlign::LEFT | TextAlign::BASELINE);
    }

    #[test]
    fn test_scaled_keeps_line_height() {
        let style = FontStyle {
            letter_spacing: 1.0,
            line_height: 1.5,
            ..Default::default()
        };
        let scaled = style.scaled(2.0);
        assert_eq!(scaled.size, 32.0);
        assert_eq!(scaled.letter_spacing, 2.0);
        assert_eq!(scaled.line_height, 1.5);
    }
}
