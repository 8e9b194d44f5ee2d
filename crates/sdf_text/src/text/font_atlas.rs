//! Loaded font assets
//!
//! A [`FontAtlas`] pairs a parsed descriptor with its decoded atlas page.
//! Both halves are shared read-only between every node that uses the font.

use std::sync::Arc;

use super::font_descriptor::{FontDescriptor, FontParseError};
use crate::assets::{AssetError, ImageData};

/// Errors raised while acquiring a font descriptor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontLoadError {
    /// The descriptor could not be fetched
    #[error("Failed to fetch font '{url}': {reason}")]
    Fetch {
        /// Descriptor URL
        url: String,
        /// Underlying fetch failure
        reason: String,
    },

    /// The descriptor was fetched but is not a valid BMFont file
    #[error("Failed to parse font '{url}': {source}")]
    Parse {
        /// Descriptor URL
        url: String,
        /// Parser failure
        #[source]
        source: FontParseError,
    },
}

/// Errors raised while acquiring an atlas image
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextureLoadError {
    /// The image could not be fetched
    #[error("Failed to fetch atlas '{url}': {reason}")]
    Fetch {
        /// Image URL
        url: String,
        /// Underlying fetch failure
        reason: String,
    },

    /// The image was fetched but could not be decoded
    #[error("Failed to decode atlas '{url}': {reason}")]
    Decode {
        /// Image URL
        url: String,
        /// Decoder failure
        reason: String,
    },
}

/// Any failure that stops a text node from rendering
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// Font descriptor failure
    #[error(transparent)]
    FontLoad(#[from] FontLoadError),

    /// Atlas image failure
    #[error(transparent)]
    TextureLoad(#[from] TextureLoadError),

    /// The node handle does not refer to a live node
    #[error("Unknown text node")]
    UnknownNode,
}

/// Parse a fetched font descriptor
pub fn load_font(url: &str, fetched: Result<Vec<u8>, AssetError>) -> Result<FontDescriptor, FontLoadError> {
    let bytes = fetched.map_err(|e| FontLoadError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let font = FontDescriptor::parse(&bytes).map_err(|source| FontLoadError::Parse {
        url: url.to_string(),
        source,
    })?;

    log::info!(
        "Loaded font '{}' from {} ({} glyphs at {}px)",
        font.face(),
        url,
        font.glyph_count(),
        font.size()
    );
    Ok(font)
}

/// Decode a fetched atlas image
pub fn load_texture(url: &str, fetched: Result<Vec<u8>, AssetError>) -> Result<AtlasTexture, TextureLoadError> {
    let bytes = fetched.map_err(|e| TextureLoadError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let image = ImageData::from_bytes(&bytes).map_err(|e| TextureLoadError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    log::info!("Loaded atlas {} ({}x{})", url, image.width, image.height);
    Ok(AtlasTexture::new(url, image))
}

/// A decoded atlas page awaiting upload by the renderer
#[derive(Debug, Clone)]
pub struct AtlasTexture {
    url: String,
    image: ImageData,
}

impl AtlasTexture {
    /// Anisotropic filtering requested for atlas sampling; renderers clamp to their limit
    pub const MAX_ANISOTROPY: u8 = 16;

    /// Wrap a decoded image
    pub fn new(url: impl Into<String>, image: ImageData) -> Self {
        Self { url: url.into(), image }
    }

    /// Source URL, which doubles as the renderer's cache key
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decoded RGBA pixels
    pub fn image(&self) -> &ImageData {
        &self.image
    }

    /// Atlas dimensions in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width, self.image.height)
    }
}

/// A descriptor together with its atlas page
#[derive(Debug, Clone)]
pub struct FontAtlas {
    /// Parsed descriptor
    pub descriptor: Arc<FontDescriptor>,
    /// Decoded atlas page
    pub texture: Arc<AtlasTexture>,
}

impl FontAtlas {
    /// Pair up shared font assets
    pub fn new(descriptor: Arc<FontDescriptor>, texture: Arc<AtlasTexture>) -> Self {
        Self { descriptor, texture }
    }
}
