//! SDF text
//!
//! Font parsing, layout, geometry, materials and the per-entity controller.

pub mod fnt_parser;
pub mod font_atlas;
pub mod font_descriptor;
pub mod placement;
pub mod text_config;
pub mod text_geometry;
pub mod text_layout;
pub mod text_material;
pub mod text_node;
pub mod text_system;

#[cfg(test)]
pub(crate) mod test_fonts;
#[cfg(test)]
mod tests;

pub use fnt_parser::*;
pub use font_atlas::*;
pub use font_descriptor::*;
pub use placement::*;
pub use text_config::*;
pub use text_geometry::*;
pub use text_layout::*;
pub use text_material::*;
pub use text_node::*;
pub use text_system::*;
