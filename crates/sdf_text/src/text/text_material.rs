//! SDF text material utilities
//!
//! Glyph coverage comes from a signed distance field stored in the atlas
//! alpha channel. The fragment stage thresholds the distance at
//! [`SdfMaterialParams::threshold`] and smooths the edge over one screen
//! pixel. Two shading variants exist:
//! - **Normal**: straight alpha, color and coverage blended separately
//! - **Pre**: color pre-multiplied by coverage and opacity before blending

use std::sync::Arc;

use super::font_atlas::AtlasTexture;
use crate::foundation::math::Vec3;

/// SDF shading variant selected by the `mode` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Straight alpha output
    #[default]
    Normal,
    /// Pre-multiplied alpha output
    Pre,
}

impl RenderMode {
    /// Parse `normal` or `pre` (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "pre" => Some(Self::Pre),
            _ => None,
        }
    }
}

/// How the fragment output combines with the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// `src * a + dst * (1 - a)`
    Straight,
    /// `src + dst * (1 - a)`
    Premultiplied,
}

impl From<RenderMode> for BlendMode {
    fn from(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Normal => Self::Straight,
            RenderMode::Pre => Self::Premultiplied,
        }
    }
}

/// Shader uniforms and pipeline state for SDF text
#[derive(Debug, Clone, PartialEq)]
pub struct SdfMaterialParams {
    /// Fill color (linear RGB, 0.0-1.0)
    pub color: Vec3,
    /// Whole-mesh opacity (0.0-1.0)
    pub opacity: f32,
    /// Distance value treated as the glyph edge
    pub threshold: f32,
    /// Anisotropic filtering hint for the atlas sampler
    pub anisotropy: u8,
    /// Render back faces too
    pub double_sided: bool,
    /// Draw in the transparent pass with blending enabled
    pub transparent: bool,
    /// Blend equation
    pub blend: BlendMode,
}

impl Default for SdfMaterialParams {
    fn default() -> Self {
        Self {
            color: Vec3::zeros(),
            opacity: 1.0,
            threshold: 0.5,
            anisotropy: AtlasTexture::MAX_ANISOTROPY,
            double_sided: true,
            transparent: true,
            blend: BlendMode::Straight,
        }
    }
}

/// Material for one text mesh
#[derive(Debug, Clone)]
pub struct SdfTextMaterial {
    /// Shared atlas page
    pub atlas: Arc<AtlasTexture>,
    /// Uniforms and pipeline state
    pub params: SdfMaterialParams,
    /// Variant the material was built for
    pub mode: RenderMode,
}

impl SdfTextMaterial {
    /// Color the fragment stage emits for full coverage
    ///
    /// Pre-multiplied materials fold opacity into the color.
    pub fn output_color(&self) -> [f32; 4] {
        let c = self.params.color;
        let a = self.params.opacity;
        match self.params.blend {
            BlendMode::Straight => [c.x, c.y, c.z, a],
            BlendMode::Premultiplied => [c.x * a, c.y * a, c.z * a, a],
        }
    }
}

/// Create an SDF text material
///
/// The atlas is shared, not copied; every mesh built from the same font
/// references the same texture.
///
/// # Arguments
///
/// * `atlas` - Decoded atlas page (alpha channel is the distance field)
/// * `color` - RGB fill color (0.0-1.0 range)
/// * `opacity` - Mesh opacity, clamped to 0.0-1.0
/// * `mode` - Shading variant
pub fn create_sdf_text_material(
    atlas: Arc<AtlasTexture>,
    color: Vec3,
    opacity: f32,
    mode: RenderMode,
) -> SdfTextMaterial {
    SdfTextMaterial {
        atlas,
        params: SdfMaterialParams {
            color,
            opacity: opacity.clamp(0.0, 1.0),
            blend: mode.into(),
            ..Default::default()
        },
        mode,
    }
}
