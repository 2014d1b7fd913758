use crate::camera::CameraRig;
use crate::viewport::{Viewport, pixel_density};

/// Something that draws into a sized surface.
pub trait OutputSink {
    /// Set the logical output size.
    fn set_size(&mut self, width: u32, height: u32);
    /// Set the device pixel ratio the output renders at.
    fn set_pixel_ratio(&mut self, ratio: f32);
    /// Current drawing buffer size in device pixels.
    fn drawing_buffer_size(&self) -> (u32, u32);
}

/// A host notification that the drawing area changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSignal {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
}

/// How a demo responds to host resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePolicy {
    /// When false the viewport keeps its initial fixed size.
    pub track_host: bool,
    /// Apply `min(device_pixel_ratio, 2)`; otherwise render at density 1.
    pub cap_pixel_ratio: bool,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            track_host: true,
            cap_pixel_ratio: true,
        }
    }
}

/// Bring viewport, camera and sink in line with a resize signal.
///
/// Returns false if the policy ignores host resizes. Afterwards the camera aspect
/// equals `width / height` and the sink's drawing buffer is the viewport's
/// physical size.
pub fn reconcile_resize(
    viewport: &mut Viewport,
    signal: ResizeSignal,
    camera: &mut CameraRig,
    sink: &mut dyn OutputSink,
    policy: ResizePolicy,
) -> bool {
    if !policy.track_host {
        tracing::trace!(
            width = signal.width,
            height = signal.height,
            "resize ignored for fixed-size viewport"
        );
        return false;
    }
    viewport.width = signal.width;
    viewport.height = signal.height;
    viewport.pixel_density = if policy.cap_pixel_ratio {
        pixel_density(signal.scale_factor, true)
    } else {
        1.0
    };
    apply_viewport(viewport, camera, sink);
    tracing::debug!(
        width = viewport.width,
        height = viewport.height,
        density = viewport.pixel_density,
        "viewport resized"
    );
    true
}

/// Push the current viewport into the camera and sink (initial setup and after resize).
pub fn apply_viewport(viewport: &Viewport, camera: &mut CameraRig, sink: &mut dyn OutputSink) {
    camera.projection.set_aspect(viewport.aspect());
    sink.set_size(viewport.width, viewport.height);
    sink.set_pixel_ratio(viewport.pixel_density);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebugTextRenderer, Projection};

    fn rig() -> CameraRig {
        CameraRig::perspective(75.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn aspect_and_buffer_follow_every_resize() {
        let mut viewport = Viewport::default();
        let mut camera = rig();
        let mut sink = DebugTextRenderer::new();
        for (w, h, dpr) in [(800, 600, 1.0), (1920, 1080, 3.0), (333, 777, 1.25), (1, 1, 2.0)] {
            let signal = ResizeSignal {
                width: w,
                height: h,
                scale_factor: dpr,
            };
            assert!(reconcile_resize(
                &mut viewport,
                signal,
                &mut camera,
                &mut sink,
                ResizePolicy::default()
            ));
            assert!((camera.projection.aspect() - w as f32 / h as f32).abs() < 1e-6);
            let density = dpr.min(2.0);
            assert_eq!(
                sink.drawing_buffer_size(),
                (
                    (w as f32 * density).round() as u32,
                    (h as f32 * density).round() as u32
                )
            );
        }
    }

    #[test]
    fn fixed_policy_keeps_viewport() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        let mut camera = rig();
        let mut sink = DebugTextRenderer::new();
        apply_viewport(&viewport, &mut camera, &mut sink);
        let policy = ResizePolicy {
            track_host: false,
            cap_pixel_ratio: false,
        };
        let signal = ResizeSignal {
            width: 1024,
            height: 1024,
            scale_factor: 2.0,
        };
        assert!(!reconcile_resize(&mut viewport, signal, &mut camera, &mut sink, policy));
        assert_eq!(viewport, Viewport::new(800, 600, 1.0));
        assert_eq!(sink.drawing_buffer_size(), (800, 600));
    }

    #[test]
    fn orthographic_bounds_widen_with_the_aspect() {
        let mut viewport = Viewport::default();
        let mut camera = CameraRig::orthographic(1.0, 1.0, 0.1, 100.0);
        let mut sink = DebugTextRenderer::new();
        for (w, h) in [(800, 600), (600, 1200), (1920, 1080)] {
            let signal = ResizeSignal {
                width: w,
                height: h,
                scale_factor: 1.0,
            };
            let policy = ResizePolicy::default();
            reconcile_resize(&mut viewport, signal, &mut camera, &mut sink, policy);
            let Projection::Orthographic(ortho) = camera.projection else {
                panic!("expected orthographic projection");
            };
            let aspect = w as f32 / h as f32;
            assert!((ortho.right() - aspect).abs() < 1e-6);
            assert!((ortho.left() + aspect).abs() < 1e-6);
            assert_eq!((ortho.top(), ortho.bottom()), (1.0, -1.0));
            assert_eq!(sink.drawing_buffer_size(), (w, h));
        }
    }

    #[test]
    fn uncapped_policy_renders_at_density_one() {
        let mut viewport = Viewport::default();
        let mut camera = rig();
        let mut sink = DebugTextRenderer::new();
        let policy = ResizePolicy {
            track_host: true,
            cap_pixel_ratio: false,
        };
        let signal = ResizeSignal {
            width: 640,
            height: 480,
            scale_factor: 2.0,
        };
        reconcile_resize(&mut viewport, signal, &mut camera, &mut sink, policy);
        assert_eq!(sink.drawing_buffer_size(), (640, 480));
    }
}
