//! Atlas page decoding
//!
//! Atlas pages arrive as encoded bytes from an [`AssetFetcher`](super::AssetFetcher)
//! and are expanded to tightly packed RGBA8. The distance field lives in the
//! alpha channel.

use crate::assets::AssetError;

/// Decoded RGBA8 pixels, row-major, top row first
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Pixel bytes, four per pixel
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ImageData {
    /// Bytes per pixel
    pub const CHANNELS: usize = 4;

    /// Decode PNG bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| AssetError::InvalidData(format!("Failed to decode image: {}", e)))?
            .into_rgba8();

        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::InvalidData("image has no pixels".to_string()));
        }

        log::debug!("Decoded atlas page {}x{}", width, height);
        Ok(Self {
            data: decoded.into_raw(),
            width,
            height,
        })
    }

    /// Uniform image, mostly for tests and placeholder atlases
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            data: rgba.repeat(width as usize * height as usize),
            width,
            height,
        }
    }

    /// Distance value (alpha) at a pixel, `None` outside the image
    pub fn distance_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        self.data.get(offset + 3).copied()
    }

    /// Size of the pixel buffer in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
