//! Shared cache of parsed fonts and decoded atlases
//!
//! Each URL is fetched at most once while it is in flight and parsed at most
//! once when it lands. Ready assets are handed out as `Arc`s; nodes never get
//! a private copy.

use std::collections::HashMap;
use std::sync::Arc;

use super::{AssetError, AssetKind};
use crate::text::font_atlas::{load_font, load_texture, AtlasTexture, FontAtlas, TextError};
use crate::text::font_descriptor::FontDescriptor;

/// Cache entry
enum Slot<T> {
    /// Fetch issued, nothing delivered yet
    Pending,
    /// Parsed and shared
    Ready(Arc<T>),
}

impl<T> Slot<T> {
    fn ready(&self) -> Option<Arc<T>> {
        match self {
            Self::Ready(asset) => Some(Arc::clone(asset)),
            Self::Pending => None,
        }
    }
}

/// Result of asking the library for a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// First request: the caller must start a fetch
    Issued,
    /// A fetch is already running; wait for it
    InFlight,
    /// Already parsed and available
    Cached,
}

/// Result of handing a finished fetch to the library
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Parsed and now cached
    Stored,
    /// Fetch or parse failed; the entry was evicted
    Failed(TextError),
    /// Nobody was waiting for this URL (duplicate or unrequested)
    Ignored,
}

/// URL-keyed font and atlas cache
#[derive(Default)]
pub struct AssetLibrary {
    fonts: HashMap<String, Slot<FontDescriptor>>,
    textures: HashMap<String, Slot<AtlasTexture>>,
}

impl AssetLibrary {
    /// Create a new empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in `url`
    pub fn request(&mut self, kind: AssetKind, url: &str) -> RequestOutcome {
        match kind {
            AssetKind::FontDescriptor => Self::request_slot(&mut self.fonts, url),
            AssetKind::AtlasImage => Self::request_slot(&mut self.textures, url),
        }
    }

    fn request_slot<T>(slots: &mut HashMap<String, Slot<T>>, url: &str) -> RequestOutcome {
        match slots.get(url) {
            Some(Slot::Ready(_)) => RequestOutcome::Cached,
            Some(Slot::Pending) => RequestOutcome::InFlight,
            None => {
                slots.insert(url.to_string(), Slot::Pending);
                RequestOutcome::Issued
            }
        }
    }

    /// Hand over a finished fetch
    pub fn deliver(&mut self, kind: AssetKind, url: &str, fetched: Result<Vec<u8>, AssetError>) -> Delivery {
        match kind {
            AssetKind::FontDescriptor => {
                if !matches!(self.fonts.get(url), Some(Slot::Pending)) {
                    log::debug!("Ignoring unexpected font delivery for {}", url);
                    return Delivery::Ignored;
                }
                match load_font(url, fetched) {
                    Ok(font) => {
                        self.fonts.insert(url.to_string(), Slot::Ready(Arc::new(font)));
                        Delivery::Stored
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        self.fonts.remove(url);
                        Delivery::Failed(e.into())
                    }
                }
            }
            AssetKind::AtlasImage => {
                if !matches!(self.textures.get(url), Some(Slot::Pending)) {
                    log::debug!("Ignoring unexpected atlas delivery for {}", url);
                    return Delivery::Ignored;
                }
                match load_texture(url, fetched) {
                    Ok(texture) => {
                        self.textures.insert(url.to_string(), Slot::Ready(Arc::new(texture)));
                        Delivery::Stored
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        self.textures.remove(url);
                        Delivery::Failed(e.into())
                    }
                }
            }
        }
    }

    /// Parsed font, if ready
    pub fn font(&self, url: &str) -> Option<Arc<FontDescriptor>> {
        self.fonts.get(url).and_then(Slot::ready)
    }

    /// Decoded atlas, if ready
    pub fn texture(&self, url: &str) -> Option<Arc<AtlasTexture>> {
        self.textures.get(url).and_then(Slot::ready)
    }

    /// Font and atlas together, once both are ready
    pub fn atlas(&self, font_url: &str, image_url: &str) -> Option<FontAtlas> {
        Some(FontAtlas::new(self.font(font_url)?, self.texture(image_url)?))
    }

    /// Check if a fetch for `url` is outstanding
    pub fn is_pending(&self, kind: AssetKind, url: &str) -> bool {
        match kind {
            AssetKind::FontDescriptor => matches!(self.fonts.get(url), Some(Slot::Pending)),
            AssetKind::AtlasImage => matches!(self.textures.get(url), Some(Slot::Pending)),
        }
    }

    /// Number of ready assets
    pub fn len(&self) -> usize {
        self.fonts.values().filter(|s| s.ready().is_some()).count()
            + self.textures.values().filter(|s| s.ready().is_some()).count()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every ready asset; outstanding fetches stay pending
    pub fn clear(&mut self) {
        self.fonts.retain(|_, slot| matches!(slot, Slot::Pending));
        self.textures.retain(|_, slot| matches!(slot, Slot::Pending));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::font_atlas::FontLoadError;
    use crate::text::test_fonts::{atlas_png, monospace_fnt};

    #[test]
    fn test_second_request_does_not_refetch() {
        let mut library = AssetLibrary::new();
        assert_eq!(library.request(AssetKind::FontDescriptor, "a.fnt"), RequestOutcome::Issued);
        assert_eq!(library.request(AssetKind::FontDescriptor, "a.fnt"), RequestOutcome::InFlight);
        assert!(library.is_pending(AssetKind::FontDescriptor, "a.fnt"));

        assert_eq!(library.deliver(AssetKind::FontDescriptor, "a.fnt", Ok(monospace_fnt())), Delivery::Stored);
        assert_eq!(library.request(AssetKind::FontDescriptor, "a.fnt"), RequestOutcome::Cached);
    }

    #[test]
    fn test_duplicate_delivery_keeps_first_entry() {
        let mut library = AssetLibrary::new();
        library.request(AssetKind::AtlasImage, "a.png");
        library.deliver(AssetKind::AtlasImage, "a.png", Ok(atlas_png()));
        let first = library.texture("a.png").unwrap();

        let again = library.deliver(AssetKind::AtlasImage, "a.png", Ok(atlas_png()));
        assert_eq!(again, Delivery::Ignored);
        assert!(Arc::ptr_eq(&first, &library.texture("a.png").unwrap()));
    }

    #[test]
    fn test_failure_evicts_so_next_request_retries() {
        let mut library = AssetLibrary::new();
        library.request(AssetKind::FontDescriptor, "bad.fnt");

        let delivery = library.deliver(
            AssetKind::FontDescriptor,
            "bad.fnt",
            Err(AssetError::NotFound("bad.fnt".into())),
        );
        assert!(matches!(
            delivery,
            Delivery::Failed(TextError::FontLoad(FontLoadError::Fetch { .. }))
        ));
        assert!(!library.is_pending(AssetKind::FontDescriptor, "bad.fnt"));
        assert_eq!(library.request(AssetKind::FontDescriptor, "bad.fnt"), RequestOutcome::Issued);
    }

    #[test]
    fn test_unrequested_delivery_is_ignored() {
        let mut library = AssetLibrary::new();
        assert_eq!(library.deliver(AssetKind::FontDescriptor, "x.fnt", Ok(monospace_fnt())), Delivery::Ignored);
        assert!(library.font("x.fnt").is_none());
    }

    #[test]
    fn test_atlas_needs_both_halves() {
        let mut library = AssetLibrary::new();
        library.request(AssetKind::FontDescriptor, "a.fnt");
        library.request(AssetKind::AtlasImage, "a.png");
        library.deliver(AssetKind::FontDescriptor, "a.fnt", Ok(monospace_fnt()));
        assert!(library.atlas("a.fnt", "a.png").is_none());

        library.deliver(AssetKind::AtlasImage, "a.png", Ok(atlas_png()));
        let atlas = library.atlas("a.fnt", "a.png").unwrap();
        assert_eq!(atlas.texture.dimensions(), (8, 8));
        assert_eq!(library.len(), 2);

        library.clear();
        assert!(library.is_empty());
    }
}
