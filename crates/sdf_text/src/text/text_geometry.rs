//! Glyph quad geometry
//!
//! Turns a [`TextLayout`] into flat position/UV/index buffers, one quad per
//! placed glyph. Zero-area glyphs (spaces, fallbacks) still get a quad so
//! glyph `i` always owns vertices `4i..4i+4` and indices `6i..6i+6`.

use super::text_layout::{PlacedGlyph, TextLayout};

/// Bounding box of generated geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    /// Minimum X coordinate
    pub min_x: f32,
    /// Minimum Y coordinate
    pub min_y: f32,
    /// Maximum X coordinate
    pub max_x: f32,
    /// Maximum Y coordinate
    pub max_y: f32,
}

impl TextBounds {
    /// Calculate width of bounding box
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Calculate height of bounding box
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// Vertex, UV and index buffers in font pixel space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextGeometry {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl TextGeometry {
    /// Build one quad per placed glyph
    ///
    /// UVs use a top-left atlas origin and are normalized by the atlas page
    /// size recorded in the layout.
    pub fn build(layout: &TextLayout) -> Self {
        let count = layout.glyphs().len();
        let mut geometry = Self {
            positions: Vec::with_capacity(count * 4),
            uvs: Vec::with_capacity(count * 4),
            indices: Vec::with_capacity(count * 6),
        };

        let (atlas_w, atlas_h) = layout.atlas_size();
        for placed in layout.glyphs() {
            geometry.push_quad(placed, atlas_w, atlas_h);
        }

        geometry
    }

    fn push_quad(&mut self, placed: &PlacedGlyph, atlas_w: f32, atlas_h: f32) {
        let glyph = &placed.glyph;

        let x0 = placed.position.x + glyph.xoffset;
        let y0 = placed.position.y + glyph.yoffset;
        let x1 = x0 + glyph.width;
        let y1 = y0 + glyph.height;

        let u0 = glyph.x / atlas_w;
        let v0 = glyph.y / atlas_h;
        let u1 = (glyph.x + glyph.width) / atlas_w;
        let v1 = (glyph.y + glyph.height) / atlas_h;

        let base = self.positions.len() as u32;

        // Bottom-left, top-left, top-right, bottom-right (Y grows downward)
        self.positions.extend_from_slice(&[[x0, y1, 0.0], [x0, y0, 0.0], [x1, y0, 0.0], [x1, y1, 0.0]]);
        self.uvs.extend_from_slice(&[[u0, v1], [u0, v0], [u1, v0], [u1, v1]]);
        self.indices.extend_from_slice(&[
            base, base + 2, base + 1,
            base, base + 3, base + 2,
        ]);
    }

    /// Vertex positions, four per glyph
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Texture coordinates, parallel to positions
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Triangle indices, six per glyph
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of glyph quads
    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// True when no quads were generated
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Raw position buffer for GPU upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw UV buffer for GPU upload
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw index buffer for GPU upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Bounding box of all vertices, `None` when empty
    pub fn bounds(&self) -> Option<TextBounds> {
        let first = self.positions.first()?;
        let init = TextBounds {
            min_x: first[0],
            min_y: first[1],
            max_x: first[0],
            max_y: first[1],
        };

        Some(self.positions.iter().fold(init, |b, p| TextBounds {
            min_x: b.min_x.min(p[0]),
            min_y: b.min_y.min(p[1]),
            max_x: b.max_x.max(p[0]),
            max_y: b.max_y.max(p[1]),
        }))
    }
}
