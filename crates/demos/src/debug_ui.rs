use crate::support::{Axis, Binding, Bindings, material_of, orbit_camera};
use glam::Vec3;
use scenelab_common::{Color, ObjectId};
use scenelab_input::HostEvent;
use scenelab_runtime::{
    Demo, DemoContext, FrameTime, Property, Repeat, RuntimeError, TweenHandle, TweenOptions,
};
use scenelab_scene::geometry::box_geometry;
use scenelab_scene::{Material, MeshData, SceneError};
use scenelab_tools::{DebugPanel, PanelEvent};
use std::f32::consts::TAU;

const SUBDIVISIONS: f32 = 2.0;

/// A cube tuned from the debug panel: wireframe, color, elevation, spin and
/// subdivision count. Committing a new subdivision count rebuilds the geometry.
#[derive(Debug, Default)]
pub struct DebugUi {
    cube: Option<ObjectId>,
    spin: Option<TweenHandle>,
    bindings: Bindings,
}

fn subdivided_cube(n: u32) -> MeshData {
    box_geometry(1.0, 1.0, 1.0, n, n, n)
}

impl Demo for DebugUi {
    fn name(&self) -> &'static str {
        "debug-ui"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let color = Color::from_hex(0xa778d8);
        let cube = ctx.scene.add_mesh(
            "cube",
            subdivided_cube(SUBDIVISIONS as u32),
            Material::basic(color),
        );
        let material =
            material_of(&ctx.scene, cube).ok_or(SceneError::NotDrawable(cube))?;

        let mut panel = DebugPanel::new("Debug UI").with_width(300.0).closed();
        panel.folder("Cube tweaks", false);
        panel.add_bool("wireframe", false)?.name("Wireframe");
        panel.add_color("color", color)?.name("Color");
        panel.add_number("elevation", 0.0, -2.0, 2.0, 0.01)?.name("Elevation");
        panel.add_button("spin")?.name("Spin the box");
        panel.add_button("stop")?.name("Stop the box");
        panel
            .add_number("subdivisions", SUBDIVISIONS, 1.0, 10.0, 1.0)?
            .name("Subdivisions");
        ctx.panel = Some(panel);

        self.bindings
            .bind("wireframe", Binding::Wireframe(material))
            .bind("color", Binding::MaterialColor(material))
            .bind("elevation", Binding::Position(cube, Axis::Y));

        orbit_camera(ctx, Vec3::new(1.0, 1.0, 3.0));
        self.cube = Some(cube);
        Ok(())
    }

    fn update(&mut self, _ctx: &mut DemoContext, _time: FrameTime) {}

    fn on_event(&mut self, ctx: &mut DemoContext, event: &HostEvent) {
        if event.is_key('h') {
            if let Some(panel) = ctx.panel.as_mut() {
                panel.toggle_visible();
            }
        }
    }

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        if self.bindings.apply(&mut ctx.scene, event) {
            return;
        }
        let Some(cube) = self.cube else {
            return;
        };
        match (event.key(), event.is_commit()) {
            ("spin", true) => {
                self.spin = Some(ctx.timeline.to(
                    cube,
                    Property::RotationY,
                    TAU,
                    TweenOptions::over(5.0).repeat(Repeat::Forever),
                ));
            }
            ("stop", true) => {
                if let Some(spin) = self.spin.take() {
                    ctx.timeline.kill(spin);
                }
            }
            ("subdivisions", true) => {
                let Some(n) = event.value().as_f32() else {
                    return;
                };
                match ctx.scene.replace_geometry(cube, subdivided_cube(n as u32)) {
                    Ok(handle) => {
                        tracing::debug!(subdivisions = n, geometry = handle.0, "cube rebuilt")
                    }
                    Err(e) => tracing::error!(error = %e, "cube rebuild failed"),
                }
            }
            _ => {}
        }
    }
}
