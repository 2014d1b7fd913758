use crate::support::{Axis, Binding, Bindings, add_shared, orbit_camera};
use glam::Vec3;
use scenelab_common::{Color, Euler, ObjectId, Transform};
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::{plane, sphere};
use scenelab_scene::{Light, Material};
use scenelab_tools::{DebugPanel, PanelEvent};
use std::f32::consts::FRAC_PI_2;

/// A sphere over a plane sharing one standard material; light and material values
/// are tuned from closed panel folders.
#[derive(Debug, Default)]
pub struct Shadows {
    sphere: Option<ObjectId>,
    bindings: Bindings,
}

impl Demo for Shadows {
    fn name(&self) -> &'static str {
        "shadows"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let mut panel = DebugPanel::new("Controls");

        let ambient = ctx.scene.add_light("ambient", Light::ambient(Color::WHITE, 1.0));
        panel.folder("Ambient light", false);
        panel.add_number("ambient.intensity", 1.0, 0.0, 3.0, 0.001)?.name("intensity");
        self.bindings
            .bind("ambient.intensity", Binding::LightIntensity(ambient));

        let position = Vec3::new(2.0, 2.0, -1.0);
        let sun = ctx.scene.add_light(
            "directional",
            Light::directional(Color::WHITE, 1.5).with_shadow(1024, 6.0),
        );
        if let Some(t) = ctx.scene.transform_mut(sun) {
            t.position = position;
        }
        panel.folder("Directional light", false);
        panel
            .add_number("directional.intensity", 1.5, 0.0, 3.0, 0.001)?
            .name("intensity");
        self.bindings
            .bind("directional.intensity", Binding::LightIntensity(sun));
        let axes = [(Axis::X, "x"), (Axis::Y, "y"), (Axis::Z, "z")];
        for ((axis, label), v) in axes.into_iter().zip(position.to_array()) {
            let key = format!("directional.{label}");
            panel.add_number(&key, v, -5.0, 5.0, 0.001)?.name(label);
            self.bindings.bind(&key, Binding::Position(sun, axis));
        }

        let material = ctx
            .scene
            .materials
            .insert(Material::standard().with_roughness(0.7));
        panel.folder("Material", false);
        panel.add_number("metalness", 0.0, 0.0, 1.0, 0.001)?;
        panel.add_number("roughness", 0.7, 0.0, 1.0, 0.001)?;
        self.bindings
            .bind("metalness", Binding::Metalness(material))
            .bind("roughness", Binding::Roughness(material));
        ctx.panel = Some(panel);

        let scene = &mut ctx.scene;
        let ball = scene.geometries.insert(sphere(0.5, 32, 32));
        let ball = add_shared(scene, "sphere", ball, material, Transform::default());
        let floor = scene.geometries.insert(plane(5.0, 5.0, 1, 1));
        let floor = add_shared(
            scene,
            "plane",
            floor,
            material,
            Transform::from_position(Vec3::new(0.0, -0.5, 0.0))
                .with_rotation(Euler::new(-FRAC_PI_2, 0.0, 0.0)),
        );
        if let Some(node) = scene.get_mut(ball) {
            node.cast_shadow = true;
        }
        if let Some(node) = scene.get_mut(floor) {
            node.receive_shadow = true;
        }
        self.sphere = Some(ball);

        orbit_camera(ctx, Vec3::new(1.0, 1.0, 2.0));
        Ok(())
    }

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
        if let Some(t) = self.sphere.and_then(|id| ctx.scene.transform_mut(id)) {
            t.rotation.y = time.elapsed * 0.5;
        }
    }

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        self.bindings.apply(&mut ctx.scene, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_render::DebugTextRenderer;
    use scenelab_runtime::{Driver, DriverOptions, ManualTime};
    use scenelab_tools::ParamValue;

    fn driver(time: &ManualTime) -> Driver<DebugTextRenderer> {
        let mut d = Driver::new(
            Box::new(Shadows::default()),
            DebugTextRenderer::new(),
            DriverOptions {
                time: Box::new(time.clone()),
                ..DriverOptions::default()
            },
        );
        d.start().unwrap();
        d
    }

    #[test]
    fn folders_start_closed_and_material_is_shared() {
        let time = ManualTime::new();
        let d = driver(&time);
        let panel = d.context().panel.as_ref().unwrap();
        assert_eq!(
            panel.folder_names(),
            vec!["Ambient light", "Directional light", "Material"]
        );
        let scene = &d.context().scene;
        assert_eq!(scene.materials.len(), 1);
        let items = scene.draw_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].drawable.material, items[1].drawable.material);
    }

    #[test]
    fn material_sliders_are_clamped_and_snapped() {
        let time = ManualTime::new();
        let mut d = driver(&time);
        let panel = d.context_mut().panel.as_mut().unwrap();
        panel.change("metalness", ParamValue::Number(1.7)).unwrap();
        panel.change("roughness", ParamValue::Number(0.12345)).unwrap();
        d.tick().unwrap();
        let scene = &d.context().scene;
        let material = scene.materials.get(scene.draw_items()[0].drawable.material).unwrap();
        assert_eq!(material.metalness, 1.0);
        assert!((material.roughness - 0.123).abs() < 1e-6);
    }

    #[test]
    fn sun_moves_with_its_sliders() {
        let time = ManualTime::new();
        let mut d = driver(&time);
        let panel = d.context_mut().panel.as_mut().unwrap();
        panel.set("directional.z", ParamValue::Number(4.5)).unwrap();
        d.tick().unwrap();
        let scene = &d.context().scene;
        let sun = scene.get(scene.find_by_name("directional").unwrap()).unwrap();
        assert_eq!(sun.transform.position, Vec3::new(2.0, 2.0, 4.5));
    }

    #[test]
    fn sphere_spins_at_half_speed() {
        let time = ManualTime::new();
        let mut d = driver(&time);
        d.tick().unwrap();
        time.set(4.0);
        d.tick().unwrap();
        let scene = &d.context().scene;
        let ball = scene.get(scene.find_by_name("sphere").unwrap()).unwrap();
        assert!((ball.transform.rotation.y - 2.0).abs() < 1e-6);
    }
}
