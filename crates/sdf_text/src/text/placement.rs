//! World placement of a laid-out text block
//!
//! Maps font pixels onto the node's world width and shifts the block so the
//! requested anchor point lands on the node origin.
//!
//! # Coordinate Mapping
//!
//! The mesh is scaled by `-s` on every axis and rotated 180° about +Y. The
//! net effect on a layout point is `(x, y) -> (s * x, -s * y)`, so the block
//! (`y ∈ [-height, 0]`) lands in `[0, W] × [0, H]` before the anchor offset,
//! reading left to right with its first line on top.

use bitflags::bitflags;

use super::text_layout::{TextAlign, TextLayout};
use crate::foundation::math::{Transform, Vec2, Vec3};

bitflags! {
    /// Edges named by an anchor value
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Anchor: u8 {
        /// Origin on the left edge
        const LEFT = 1 << 0;
        /// Origin on the right edge
        const RIGHT = 1 << 1;
        /// Origin on the top edge
        const TOP = 1 << 2;
        /// Origin on the bottom edge
        const BOTTOM = 1 << 3;
    }
}

impl Anchor {
    /// Fraction of the width to shift left; left wins over right when both are named
    pub fn horizontal_tiebreak(self) -> f32 {
        if self.contains(Self::LEFT) {
            0.0
        } else if self.contains(Self::RIGHT) {
            1.0
        } else {
            0.5
        }
    }

    /// Fraction of the height to shift down; bottom wins over top when both are named
    pub fn vertical_tiebreak(self) -> f32 {
        if self.contains(Self::BOTTOM) {
            0.0
        } else if self.contains(Self::TOP) {
            1.0
        } else {
            0.5
        }
    }

    /// Offset that moves the anchor point of a `width × height` block onto the origin
    pub fn offset(self, width: f32, height: f32) -> Vec2 {
        Vec2::new(-(width * self.horizontal_tiebreak()), -(height * self.vertical_tiebreak()))
    }
}

/// Anchor attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSpec {
    /// Follow the horizontal text alignment, centered vertically
    Align,
    /// Explicit edge set; empty means centered on both axes
    Edges(Anchor),
}

impl Default for AnchorSpec {
    fn default() -> Self {
        Self::Edges(Anchor::empty())
    }
}

impl AnchorSpec {
    /// Parse `align`, `center`, or a combination like `top-left` / `bottom right`
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value == "align" {
            return Some(Self::Align);
        }

        let mut edges = Anchor::empty();
        for token in value.split(|c: char| c.is_whitespace() || c == '-' || c == '_' || c == ',') {
            match token {
                "" | "center" | "centre" | "middle" => {}
                "left" => edges |= Anchor::LEFT,
                "right" => edges |= Anchor::RIGHT,
                "top" => edges |= Anchor::TOP,
                "bottom" => edges |= Anchor::BOTTOM,
                _ => return None,
            }
        }
        Some(Self::Edges(edges))
    }

    /// Concrete edge set for a given alignment
    pub fn resolve(self, align: TextAlign) -> Anchor {
        match self {
            Self::Edges(edges) => edges,
            Self::Align => match align {
                TextAlign::Left => Anchor::LEFT,
                TextAlign::Center => Anchor::empty(),
                TextAlign::Right => Anchor::RIGHT,
            },
        }
    }
}

/// Scale, world size and transform of a text mesh
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    /// World units per font pixel
    pub scale: f32,
    /// World-space size of the text box
    pub world_size: Vec2,
    /// Anchor shift applied after scaling
    pub offset: Vec2,
    /// Mesh transform relative to the owning node
    pub transform: Transform,
}

impl TextPlacement {
    /// Fit `layout` into `world_width` and anchor it
    pub fn compute(layout: &TextLayout, world_width: f32, anchor: Anchor) -> Self {
        let box_width = layout.box_width();
        let scale = if box_width > 0.0 { world_width / box_width } else { 0.0 };

        let world_size = Vec2::new(scale * box_width, scale * layout.height());
        let offset = anchor.offset(world_size.x, world_size.y);

        let transform = Transform::identity()
            .with_uniform_scale(-scale)
            .with_rotation_axis_angle(Vec3::y(), std::f32::consts::PI)
            .with_position(Vec3::new(offset.x, offset.y, 0.0));

        Self {
            scale,
            world_size,
            offset,
            transform,
        }
    }
}
