//! Per-entity text controller
//!
//! A [`TextNode`] owns one entity's text mesh. It walks
//! `Idle → Loading → Ready → (Loading again) | Removed`, stamps every load
//! with a generation and ignores completions from older generations, so a
//! slow font for an outdated configuration never overwrites a newer mesh.
//!
//! Asset acquisition lives outside the node: [`TextNode::attach`] and
//! [`TextNode::update`] return a [`LoadRequest`] and whoever fulfils it calls
//! [`TextNode::complete`] with the same generation.

use super::font_atlas::{FontAtlas, TextError};
use super::placement::TextPlacement;
use super::text_config::TextConfig;
use super::text_geometry::TextGeometry;
use super::text_layout::TextLayout;
use super::text_material::{create_sdf_text_material, SdfTextMaterial};
use crate::foundation::math::{Transform, Vec2};

/// Key under which the text mesh is attached to its host
pub const RENDERABLE_KEY: &str = "sdf-text";

/// Dimensions of a sibling geometry component; `None` means not set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SiblingBox {
    /// Explicit width
    pub width: Option<f32>,
    /// Explicit height
    pub height: Option<f32>,
}

/// The scene-graph entity a text node renders into
pub trait TextHost {
    /// Attach `mesh` under `key`, replacing nothing; the node detaches first
    fn set_renderable(&mut self, key: &str, mesh: TextMesh);

    /// Detach whatever is attached under `key`
    fn remove_renderable(&mut self, key: &str);

    /// Sibling geometry component, if the entity has one
    fn sibling_geometry(&self) -> Option<SiblingBox>;

    /// Write computed dimensions back onto the sibling geometry
    fn set_sibling_geometry_dimensions(&mut self, width: f32, height: f32);
}

/// Renderable text: buffers, material and placement
#[derive(Debug, Clone)]
pub struct TextMesh {
    /// Glyph quads in font pixel space
    pub geometry: TextGeometry,
    /// SDF material sharing the font atlas
    pub material: SdfTextMaterial,
    /// Mesh transform relative to the host entity
    pub transform: Transform,
    /// World-space size of the text box
    pub world_size: Vec2,
}

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Nothing requested, or the last load failed
    Idle,
    /// Waiting for font and atlas
    Loading,
    /// Mesh published
    Ready,
    /// Detached for good
    Removed,
}

/// Assets a node needs before it can render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Generation to pass back to [`TextNode::complete`]
    pub generation: u64,
    /// Font descriptor URL
    pub font_url: String,
    /// Atlas image URL
    pub image_url: String,
}

impl LoadRequest {
    /// True when both requests wait on the same font and atlas
    pub fn same_assets(&self, other: &Self) -> bool {
        self.font_url == other.font_url && self.image_url == other.image_url
    }
}

/// Outcome of a successful [`TextNode::complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A new mesh was published
    Rendered,
    /// The completion belonged to an older generation and was dropped
    Stale,
}

/// Text controller for one host entity
pub struct TextNode {
    host: Box<dyn TextHost>,
    config: Option<TextConfig>,
    state: NodeState,
    generation: u64,
    placement: Option<TextPlacement>,
    /// Sibling dimensions this node writes; captured the first time a sibling is seen
    owned_dims: Option<OwnedDims>,
}

/// Sibling dimensions that were unset when the node first saw them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OwnedDims {
    width: bool,
    height: bool,
}

impl OwnedDims {
    fn of(sibling: SiblingBox) -> Self {
        Self {
            width: sibling.width.is_none(),
            height: sibling.height.is_none(),
        }
    }

    fn any(self) -> bool {
        self.width || self.height
    }

    /// Hide the values this node wrote so they never feed back into layout
    fn mask(self, sibling: SiblingBox) -> SiblingBox {
        SiblingBox {
            width: sibling.width.filter(|_| !self.width),
            height: sibling.height.filter(|_| !self.height),
        }
    }
}

impl TextNode {
    /// Create an idle node bound to `host`
    pub fn new(host: Box<dyn TextHost>) -> Self {
        Self {
            host,
            config: None,
            state: NodeState::Idle,
            generation: 0,
            placement: None,
            owned_dims: None,
        }
    }

    /// Start rendering `config`
    pub fn attach(&mut self, config: TextConfig) -> LoadRequest {
        self.begin_load(config)
    }

    /// Apply a new configuration; `None` when nothing changed
    pub fn update(&mut self, config: TextConfig) -> Option<LoadRequest> {
        if self.state == NodeState::Removed {
            log::warn!("Ignoring update for removed text node");
            return None;
        }
        if self.state != NodeState::Idle && self.config.as_ref() == Some(&config) {
            return None;
        }
        Some(self.begin_load(config))
    }

    fn begin_load(&mut self, config: TextConfig) -> LoadRequest {
        self.generation += 1;
        self.state = NodeState::Loading;

        let request = LoadRequest {
            generation: self.generation,
            font_url: config.font_url.clone(),
            image_url: config.image_url.clone(),
        };
        self.config = Some(config);

        log::debug!(
            "Text node loading generation {} ({}, {})",
            request.generation,
            request.font_url,
            request.image_url
        );
        request
    }

    /// Finish the load started by generation `generation`
    ///
    /// On failure the current mesh is detached, the node returns to `Idle`
    /// and the error is handed back for the caller to surface.
    pub fn complete(&mut self, generation: u64, result: Result<FontAtlas, TextError>) -> Result<Completion, TextError> {
        if self.state == NodeState::Removed || generation != self.generation {
            log::debug!(
                "Discarding stale text load (generation {}, current {})",
                generation,
                self.generation
            );
            return Ok(Completion::Stale);
        }
        let Some(config) = self.config.as_ref() else {
            return Ok(Completion::Stale);
        };

        match result {
            Ok(atlas) => {
                let sibling = self.host.sibling_geometry().map(|raw| {
                    let owned = *self.owned_dims.get_or_insert_with(|| OwnedDims::of(raw));
                    (owned, owned.mask(raw))
                });
                let (mesh, placement) = compose(config, &atlas, sibling.map(|(_, user)| user));
                let size = placement.world_size;

                self.host.remove_renderable(RENDERABLE_KEY);
                log::debug!(
                    "Publishing text mesh: {} glyphs, {:.3}x{:.3} world units",
                    mesh.geometry.quad_count(),
                    size.x,
                    size.y
                );
                self.host.set_renderable(RENDERABLE_KEY, mesh);

                // Dimensions this node owns follow every layout
                if let Some((_, user)) = sibling.filter(|(owned, _)| owned.any()) {
                    self.host.set_sibling_geometry_dimensions(
                        user.width.unwrap_or(size.x),
                        user.height.unwrap_or(size.y),
                    );
                }

                self.placement = Some(placement);
                self.state = NodeState::Ready;
                Ok(Completion::Rendered)
            }
            Err(e) => {
                log::warn!("Text node load failed: {}", e);
                self.detach();
                self.state = NodeState::Idle;
                Err(e)
            }
        }
    }

    /// Detach the mesh for good; shared assets stay cached elsewhere
    pub fn remove(&mut self) {
        if self.state == NodeState::Removed {
            return;
        }
        self.detach();
        self.generation += 1;
        self.state = NodeState::Removed;
    }

    fn detach(&mut self) {
        if self.placement.take().is_some() {
            self.host.remove_renderable(RENDERABLE_KEY);
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Generation of the most recent load
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Configuration of the most recent load
    pub fn config(&self) -> Option<&TextConfig> {
        self.config.as_ref()
    }

    /// Placement of the published mesh
    pub fn placement(&self) -> Option<&TextPlacement> {
        self.placement.as_ref()
    }
}

/// Build the mesh for `config`
///
/// World width comes from the config, else the sibling geometry, else the
/// deployment fallback.
fn compose(config: &TextConfig, atlas: &FontAtlas, sibling: Option<SiblingBox>) -> (TextMesh, TextPlacement) {
    let font = &atlas.descriptor;
    let layout = TextLayout::compute(font, &config.text, &config.layout_params(font));

    let world_width = config
        .width
        .or_else(|| sibling.and_then(|s| s.width))
        .unwrap_or(config.fallback_width);
    let anchor = config.anchor.resolve(config.align);
    let placement = TextPlacement::compute(&layout, world_width, anchor);

    let mesh = TextMesh {
        geometry: TextGeometry::build(&layout),
        material: create_sdf_text_material(atlas.texture.clone(), config.color, config.opacity, config.mode),
        transform: placement.transform.clone(),
        world_size: placement.world_size,
    };

    (mesh, placement)
}
