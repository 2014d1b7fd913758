//! wgpu render backend for scenelab.
//!
//! Draws meshes, lines and point sprites from a [`scenelab_scene::Scene`] into a window
//! surface. Geometry and textures are uploaded lazily and re-uploaded when their store
//! version changes; disposed geometry is released on the next frame.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Opaque draws go first; blended draws follow, sorted back to front.
//! - Surface size always equals the logical size times the pixel ratio.

mod gpu;
mod mesh;
mod pipeline;
mod shaders;
mod texture;
mod uniforms;

pub use gpu::{SurfaceFrame, WgpuRenderer};
pub use uniforms::MAX_LIGHTS;
