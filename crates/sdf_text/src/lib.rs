//! # SDF Text
//!
//! Bitmap-font text rendered as signed-distance-field textured meshes inside
//! a real-time scene graph.
//!
//! ## Features
//!
//! - **BMFont descriptors**: AngelCode text and binary (v3) `.fnt` files
//! - **Layout**: word wrap, hard breaks, alignment, kerning, letter spacing
//! - **Geometry**: one quad per glyph, ready for GPU upload
//! - **Placement**: world-width fitting and edge anchoring
//! - **Shared assets**: every font and atlas is fetched and parsed once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sdf_text::prelude::*;
//!
//! struct Entity;
//!
//! impl TextHost for Entity {
//!     fn set_renderable(&mut self, _key: &str, mesh: TextMesh) {
//!         // Upload mesh.geometry and mesh.material
//!     }
//!     fn remove_renderable(&mut self, _key: &str) {}
//!     fn sibling_geometry(&self) -> Option<SiblingBox> {
//!         None
//!     }
//!     fn set_sibling_geometry_dimensions(&mut self, _width: f32, _height: f32) {}
//! }
//!
//! sdf_text::foundation::logging::init();
//!
//! let fetcher = FileFetcher::new(vec!["assets".into()]);
//! let mut system = TextSystem::new(Box::new(fetcher), TextDefaults::default());
//! let node = system.attach(Box::new(Entity), &TextAttributes::with_text("Hello"));
//!
//! // Once per frame
//! for event in system.pump() {
//!     if let TextEvent::Failed { error, .. } = event {
//!         eprintln!("text failed: {error}");
//!     }
//! }
//! system.remove(node).ok();
//! ```

#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod text;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        assets::{AssetFetcher, AssetKind, FileFetcher},
        config::{Config, ConfigFormat},
        foundation::math::{Transform, Vec2, Vec3},
        text::{
            Anchor, AnchorSpec, FontDescriptor, NodeState, RenderMode, SiblingBox, TextAlign, TextAttributes,
            TextConfig, TextDefaults, TextError, TextEvent, TextHost, TextLayout, TextMesh, TextNodeId,
            TextSystem,
        },
    };
}
