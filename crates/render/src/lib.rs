//! Rendering adapter: cameras, viewport state, resize reconciliation and the
//! renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - After a resize is reconciled, camera aspect and sink size match the viewport.
//!
//! A headless [`DebugTextRenderer`] implements both [`Renderer`] and [`OutputSink`]
//! so the frame loop runs in tests and on the command line without a GPU.

mod camera;
mod renderer;
mod resize;
mod viewport;

pub use camera::{
    ArrayCamera, CameraRig, OrthographicCamera, PerspectiveCamera, Projection, SubCamera,
};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use resize::{OutputSink, ResizePolicy, ResizeSignal, apply_viewport, reconcile_resize};
pub use viewport::{MAX_PIXEL_DENSITY, Viewport, pixel_density};

/// Errors surfaced by a render call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The surface must be reconfigured before the next frame.
    #[error("surface lost or outdated")]
    SurfaceLost,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("render backend error: {0}")]
    Backend(String),
}

pub fn crate_info() -> &'static str {
    "scenelab-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
