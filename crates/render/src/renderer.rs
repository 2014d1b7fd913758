use crate::RenderError;
use crate::camera::{ArrayCamera, CameraRig};
use crate::resize::OutputSink;
use crate::viewport::physical_size;
use scenelab_scene::{NodeKind, Scene};
use std::fmt::Write;

/// Which camera(s) a frame is rendered through.
#[derive(Debug, Clone, Copy)]
pub enum RenderView<'a> {
    Single(&'a CameraRig),
    Array(&'a ArrayCamera),
}

impl<'a> From<&'a CameraRig> for RenderView<'a> {
    fn from(rig: &'a CameraRig) -> Self {
        Self::Single(rig)
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads scene state and a view, and produces output. It never mutates
/// the scene.
pub trait Renderer {
    type Output;

    fn render(&mut self, scene: &Scene, view: RenderView<'_>) -> Result<Self::Output, RenderError>;
}

/// Headless renderer producing a text description of each frame.
///
/// Also acts as an [`OutputSink`], so resize reconciliation and the frame loop can
/// run without a GPU.
#[derive(Debug)]
pub struct DebugTextRenderer {
    size: (u32, u32),
    pixel_ratio: f32,
    frames: u64,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self {
            size: (300, 150),
            pixel_ratio: 1.0,
            frames: 0,
        }
    }

    /// Number of frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}

impl OutputSink for DebugTextRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn drawing_buffer_size(&self) -> (u32, u32) {
        physical_size(self.size.0, self.size.1, self.pixel_ratio)
    }
}

fn describe_camera(out: &mut String, rig: &CameraRig) -> std::fmt::Result {
    let eye = rig.eye();
    write!(
        out,
        "{} aspect={:.3} eye=({:.2}, {:.2}, {:.2})",
        rig.projection.label(),
        rig.projection.aspect(),
        eye.x,
        eye.y,
        eye.z
    )?;
    if let Some(t) = rig.target {
        write!(out, " target=({:.2}, {:.2}, {:.2})", t.x, t.y, t.z)?;
    }
    Ok(())
}

impl DebugTextRenderer {
    fn describe(&self, scene: &Scene, view: RenderView<'_>) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        let (bw, bh) = self.drawing_buffer_size();
        writeln!(
            out,
            "=== Frame {} ({}x{} @{:.2}, buffer {}x{}) ===",
            self.frames, self.size.0, self.size.1, self.pixel_ratio, bw, bh
        )?;
        match view {
            RenderView::Single(rig) => {
                out.push_str("Camera: ");
                describe_camera(&mut out, rig)?;
                out.push('\n');
            }
            RenderView::Array(array) => {
                writeln!(out, "Array camera: {} views", array.cameras.len())?;
                for sub in &array.cameras {
                    let [x, y, w, h] = sub.pixel_rect((bw, bh));
                    write!(out, "  [{x},{y} {w}x{h}] ")?;
                    describe_camera(&mut out, &sub.rig)?;
                    out.push('\n');
                }
            }
        }
        writeln!(out, "Objects: {}", scene.len())?;
        for (id, node) in scene.nodes() {
            let p = node.transform.position;
            let r = node.transform.rotation;
            write!(
                out,
                "  [{}] {:<12} {:<8} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2})",
                id.short(),
                node.name,
                node.kind.label(),
                p.x,
                p.y,
                p.z,
                r.x,
                r.y,
                r.z
            )?;
            if let Some(d) = node.kind.drawable() {
                let verts = scene
                    .geometries
                    .get(d.geometry)
                    .map(|m| m.vertex_count())
                    .unwrap_or(0);
                write!(out, " verts={verts}")?;
            }
            if let NodeKind::Light(light) = &node.kind {
                write!(
                    out,
                    " {} intensity={:.2}",
                    light.kind.label(),
                    light.intensity
                )?;
            }
            if !scene.is_visible(*id) {
                out.push_str(" (hidden)");
            }
            out.push('\n');
        }
        Ok(out)
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &Scene, view: RenderView<'_>) -> Result<String, RenderError> {
        self.frames += 1;
        self.describe(scene, view)
            .map_err(|e| RenderError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use scenelab_common::Color;
    use scenelab_scene::{Light, Material, geometry::box_geometry};

    #[test]
    fn empty_scene_frame() {
        let scene = Scene::new();
        let camera = CameraRig::perspective(75.0, 1.0, 0.1, 100.0);
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, (&camera).into()).unwrap();
        assert!(output.contains("Frame 1"));
        assert!(output.contains("Objects: 0"));
        assert_eq!(renderer.frame_count(), 1);
    }

    #[test]
    fn objects_are_listed() {
        let mut scene = Scene::new();
        let cube = scene.add_mesh(
            "cube",
            box_geometry(1.0, 1.0, 1.0, 1, 1, 1),
            Material::default(),
        );
        scene.transform_mut(cube).unwrap().position = Vec3::new(1.0, 2.0, 3.0);
        scene.add_light("sun", Light::directional(Color::WHITE, 1.5));

        let camera = CameraRig::perspective(75.0, 1.0, 0.1, 100.0).at(Vec3::new(0.0, 0.0, 3.0));
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&scene, (&camera).into()).unwrap();
        assert!(output.contains("Objects: 2"));
        assert!(output.contains("pos=(1.00, 2.00, 3.00)"));
        assert!(output.contains("verts=24"));
        assert!(output.contains("directional intensity=1.50"));
    }

    #[test]
    fn array_view_lists_rectangles() {
        let array = ArrayCamera::grid(2, 2, 40.0, 1.0, |_, _| {
            CameraRig::perspective(40.0, 1.0, 0.1, 10.0)
        });
        let mut renderer = DebugTextRenderer::new();
        renderer.set_size(800, 600);
        let output = renderer
            .render(&Scene::new(), RenderView::Array(&array))
            .unwrap();
        assert!(output.contains("Array camera: 4 views"));
        assert!(output.contains("[400,300 400x300]"));
    }
}
