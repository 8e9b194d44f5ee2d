//! Controller and system scenarios against a recording host

mod system_loading;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::assets::{AssetFetcher, AssetKind, FetchCompletion, ImageData};
use crate::text::test_fonts::monospace_font;
use crate::text::{AtlasTexture, FontAtlas, SiblingBox, TextHost, TextMesh};

/// Everything a host saw
#[derive(Default)]
pub struct HostLog {
    pub renderables: HashMap<String, TextMesh>,
    pub published: usize,
    pub double_attach: bool,
    pub sibling: Option<SiblingBox>,
    pub sibling_writes: Vec<(f32, f32)>,
}

/// Host whose log stays readable after the node takes ownership
#[derive(Clone, Default)]
pub struct RecordingHost(pub Rc<RefCell<HostLog>>);

impl RecordingHost {
    pub fn with_sibling(sibling: SiblingBox) -> Self {
        let host = Self::default();
        host.0.borrow_mut().sibling = Some(sibling);
        host
    }

    pub fn mesh(&self) -> Option<TextMesh> {
        self.0.borrow().renderables.get(crate::text::RENDERABLE_KEY).cloned()
    }

    pub fn renderable_count(&self) -> usize {
        self.0.borrow().renderables.len()
    }
}

impl TextHost for RecordingHost {
    fn set_renderable(&mut self, key: &str, mesh: TextMesh) {
        let mut log = self.0.borrow_mut();
        if log.renderables.insert(key.to_string(), mesh).is_some() {
            log.double_attach = true;
        }
        log.published += 1;
    }

    fn remove_renderable(&mut self, key: &str) {
        self.0.borrow_mut().renderables.remove(key);
    }

    fn sibling_geometry(&self) -> Option<SiblingBox> {
        self.0.borrow().sibling
    }

    fn set_sibling_geometry_dimensions(&mut self, width: f32, height: f32) {
        let mut log = self.0.borrow_mut();
        log.sibling_writes.push((width, height));
        log.sibling = Some(SiblingBox {
            width: Some(width),
            height: Some(height),
        });
    }
}

/// Fetcher that records requests and completes only what a test queues
#[derive(Clone, Default)]
pub struct ManualFetcher {
    pub issued: Rc<RefCell<Vec<(AssetKind, String)>>>,
    pub ready: Rc<RefCell<Vec<FetchCompletion>>>,
}

impl ManualFetcher {
    pub fn issued_count(&self) -> usize {
        self.issued.borrow().len()
    }
}

impl AssetFetcher for ManualFetcher {
    fn begin_fetch(&mut self, kind: AssetKind, url: &str) {
        self.issued.borrow_mut().push((kind, url.to_string()));
    }

    fn poll_completed(&mut self) -> Vec<FetchCompletion> {
        std::mem::take(&mut *self.ready.borrow_mut())
    }
}

/// Monospace font with a blank 256x256 atlas
pub fn mono_atlas() -> FontAtlas {
    FontAtlas::new(
        Arc::new(monospace_font()),
        Arc::new(AtlasTexture::new(
            "mono.png",
            ImageData::filled(256, 256, [0, 0, 0, 0]),
        )),
    )
}
