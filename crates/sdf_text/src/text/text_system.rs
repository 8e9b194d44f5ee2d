//! Text system
//!
//! Owns every [`TextNode`], the shared [`AssetLibrary`] and the fetcher that
//! feeds it. Hosts attach nodes with raw attributes; the system resolves
//! them, requests missing assets and routes completions back to the nodes
//! that wait on them. Call [`TextSystem::pump`] once per frame.

use slotmap::{new_key_type, SlotMap};

use super::font_atlas::{FontAtlas, TextError};
use super::text_config::{TextAttributes, TextConfig, TextDefaults};
use super::text_node::{Completion, LoadRequest, TextHost, TextNode};
use crate::assets::{AssetError, AssetFetcher, AssetKind, AssetLibrary, Delivery, RequestOutcome};

new_key_type! {
    /// Handle to a text node owned by a [`TextSystem`]
    pub struct TextNodeId;
}

/// Something that happened to a node during a system call
#[derive(Debug, Clone, PartialEq)]
pub enum TextEvent {
    /// A new mesh was published
    Rendered {
        /// Affected node
        node: TextNodeId,
    },
    /// Loading failed; the node shows no mesh until its next update
    Failed {
        /// Affected node
        node: TextNodeId,
        /// What went wrong
        error: TextError,
    },
    /// A completion for an outdated configuration was dropped
    Discarded {
        /// Affected node
        node: TextNodeId,
    },
}

/// A load waiting for one or both assets
#[derive(Debug)]
struct Waiter {
    node: TextNodeId,
    request: LoadRequest,
}

impl Waiter {
    fn waits_on(&self, kind: AssetKind, url: &str) -> bool {
        match kind {
            AssetKind::FontDescriptor => self.request.font_url == url,
            AssetKind::AtlasImage => self.request.image_url == url,
        }
    }
}

/// Owner of all text nodes and their shared assets
pub struct TextSystem {
    nodes: SlotMap<TextNodeId, TextNode>,
    library: AssetLibrary,
    fetcher: Box<dyn AssetFetcher>,
    defaults: TextDefaults,
    waiters: Vec<Waiter>,
    events: Vec<TextEvent>,
}

impl TextSystem {
    /// Create a system fetching through `fetcher`
    pub fn new(fetcher: Box<dyn AssetFetcher>, defaults: TextDefaults) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            library: AssetLibrary::new(),
            fetcher,
            defaults,
            waiters: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Attach a text node to `host`
    ///
    /// Renders immediately when the font is already cached; otherwise the
    /// mesh appears during a later [`pump`](Self::pump).
    pub fn attach(&mut self, host: Box<dyn TextHost>, attrs: &TextAttributes) -> TextNodeId {
        let config = TextConfig::resolve(attrs, &self.defaults);
        let mut node = TextNode::new(host);
        let request = node.attach(config);

        let id = self.nodes.insert(node);
        log::debug!("Attached text node {:?}", id);
        self.request(id, request);
        id
    }

    /// Apply new attributes to a node
    pub fn update(&mut self, id: TextNodeId, attrs: &TextAttributes) -> Result<(), TextError> {
        let config = TextConfig::resolve(attrs, &self.defaults);
        let node = self.nodes.get_mut(id).ok_or(TextError::UnknownNode)?;

        // Older waiters on other assets stay queued and come back as `Discarded`
        if let Some(request) = node.update(config) {
            self.request(id, request);
        }
        Ok(())
    }

    /// Detach and drop a node; cached assets stay for other nodes
    pub fn remove(&mut self, id: TextNodeId) -> Result<(), TextError> {
        let mut node = self.nodes.remove(id).ok_or(TextError::UnknownNode)?;
        node.remove();
        self.waiters.retain(|w| w.node != id);
        log::debug!("Removed text node {:?}", id);
        Ok(())
    }

    /// Drain finished fetches and return everything that happened since the last call
    pub fn pump(&mut self) -> Vec<TextEvent> {
        for completion in self.fetcher.poll_completed() {
            self.settle(completion.kind, &completion.url, completion.result);
        }
        std::mem::take(&mut self.events)
    }

    /// Hand a finished fetch to the system directly
    pub fn deliver(&mut self, kind: AssetKind, url: &str, result: Result<Vec<u8>, AssetError>) -> Vec<TextEvent> {
        self.settle(kind, url, result);
        std::mem::take(&mut self.events)
    }

    /// Start or join the fetches for `request`
    ///
    /// A node holds at most one waiter per font and atlas pair. Every waiter
    /// leaves the queue once its pair lands or either half fails.
    fn request(&mut self, id: TextNodeId, request: LoadRequest) {
        self.waiters
            .retain(|w| w.node != id || !w.request.same_assets(&request));

        for (kind, url) in [
            (AssetKind::FontDescriptor, request.font_url.as_str()),
            (AssetKind::AtlasImage, request.image_url.as_str()),
        ] {
            if self.library.request(kind, url) == RequestOutcome::Issued {
                log::info!("Fetching {:?} {}", kind, url);
                self.fetcher.begin_fetch(kind, url);
            }
        }

        match self.library.atlas(&request.font_url, &request.image_url) {
            Some(atlas) => {
                let result = Ok(atlas);
                self.complete(id, request.generation, result);
            }
            None => self.waiters.push(Waiter { node: id, request }),
        }
    }

    fn settle(&mut self, kind: AssetKind, url: &str, result: Result<Vec<u8>, AssetError>) {
        match self.library.deliver(kind, url, result) {
            Delivery::Ignored => {}
            Delivery::Stored => {
                let (ready, waiting): (Vec<Waiter>, Vec<Waiter>) =
                    std::mem::take(&mut self.waiters).into_iter().partition(|w| {
                        w.waits_on(kind, url) && self.library.atlas(&w.request.font_url, &w.request.image_url).is_some()
                    });
                self.waiters = waiting;

                for waiter in ready {
                    if let Some(atlas) = self.library.atlas(&waiter.request.font_url, &waiter.request.image_url) {
                        self.complete(waiter.node, waiter.request.generation, Ok(atlas));
                    }
                }
            }
            Delivery::Failed(error) => {
                let (failed, waiting): (Vec<Waiter>, Vec<Waiter>) =
                    std::mem::take(&mut self.waiters).into_iter().partition(|w| w.waits_on(kind, url));
                self.waiters = waiting;

                for waiter in failed {
                    self.complete(waiter.node, waiter.request.generation, Err(error.clone()));
                }
            }
        }
    }

    fn complete(&mut self, id: TextNodeId, generation: u64, result: Result<FontAtlas, TextError>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };

        let event = match node.complete(generation, result) {
            Ok(Completion::Rendered) => TextEvent::Rendered { node: id },
            Ok(Completion::Stale) => TextEvent::Discarded { node: id },
            Err(error) => TextEvent::Failed { node: id, error },
        };
        self.events.push(event);
    }

    /// Node by handle
    pub fn node(&self, id: TextNodeId) -> Option<&TextNode> {
        self.nodes.get(id)
    }

    /// Loads still waiting on an asset, superseded ones included
    pub fn pending_count(&self) -> usize {
        self.waiters.len()
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Shared asset cache
    pub fn library(&self) -> &AssetLibrary {
        &self.library
    }

    /// Deployment defaults applied to every node
    pub fn defaults(&self) -> &TextDefaults {
        &self.defaults
    }
}
