use glam::Vec3;
use scenelab_common::Color;
use scenelab_render::CameraRig;
use scenelab_runtime::{Demo, DemoContext, DemoSettings, FrameTime, RuntimeError};
use scenelab_scene::Material;
use scenelab_scene::geometry::box_geometry;

/// One yellow cube drawn once into a fixed 800x600 output.
#[derive(Debug, Default)]
pub struct FirstProject;

impl Demo for FirstProject {
    fn name(&self) -> &'static str {
        "first-project"
    }

    fn settings(&self) -> DemoSettings {
        DemoSettings::fixed("first-project", 800, 600).once()
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        ctx.scene.add_mesh(
            "cube",
            box_geometry(1.0, 1.0, 1.0, 1, 1, 1),
            Material::basic(Color::from_hex(0xfad184)),
        );
        ctx.camera = CameraRig::perspective(45.0, ctx.viewport.aspect(), 0.1, 2000.0)
            .at(Vec3::new(0.0, 0.0, 3.0));
        Ok(())
    }

    fn update(&mut self, _ctx: &mut DemoContext, _time: FrameTime) {}
}
