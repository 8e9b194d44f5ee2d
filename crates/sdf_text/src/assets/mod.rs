//! Asset acquisition for font descriptors and atlas images
//!
//! Fetching is split from caching: an [`AssetFetcher`] starts non-blocking
//! reads and reports completions later, while the [`AssetLibrary`] keeps one
//! shared, parsed copy of every URL and de-duplicates in-flight requests.

pub mod asset_library;
pub mod fetcher;
pub mod image_loader;

pub use asset_library::{AssetLibrary, Delivery, RequestOutcome};
pub use fetcher::{AssetFetcher, FetchCompletion, FileFetcher};
pub use image_loader::ImageData;

use thiserror::Error;

/// The two kinds of file a text node depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Bitmap font descriptor (`.fnt`)
    FontDescriptor,
    /// Atlas page image
    AtlasImage,
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
