//! Scene description for demos: geometry, materials, lights, textures and the object graph.
//!
//! # Invariants
//! - A drawable node always references a live, fully validated geometry.
//! - Every change to stored geometry, texture or material data bumps its version.
//! - Disposed geometry handles are never reused.

pub mod geometry;
mod light;
mod material;
mod scene;
mod store;

pub use geometry::{MeshData, Topology};
pub use light::{Light, LightKind, ShadowSettings};
pub use material::{Blending, Material, MaterialKind, Side, TextureSlot};
pub use scene::{
    Background, DrawItem, DrawKind, Drawable, Fog, NodeKind, Scene, SceneEvent, SceneNode,
};
pub use store::{
    ColorSpace, Filter, GeometryHandle, GeometryStore, Mapping, MaterialHandle, MaterialStore,
    Texture, TextureHandle, TextureParams, TextureSource, TextureStore, Wrap,
};

use scenelab_common::ObjectId;

/// Errors from scene mutations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),
    #[error("object {0:?} has no geometry")]
    NotDrawable(ObjectId),
    #[error("geometry not found: {0:?}")]
    GeometryNotFound(GeometryHandle),
    #[error("texture not found: {0:?}")]
    TextureNotFound(TextureHandle),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
