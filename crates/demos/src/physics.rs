use crate::support::orbit_camera;
use glam::Vec3;
use scenelab_common::{Color, Euler, Transform};
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::{plane, sphere};
use scenelab_scene::{Light, Material, TextureHandle, TextureSlot};
use std::f32::consts::FRAC_PI_2;

const ENVIRONMENT: &str = "/textures/environmentMaps/0";

/// Static staging for a physics scene: a reflective sphere resting on a shadowed floor.
#[derive(Debug, Default)]
pub struct Physics;

fn reflective(environment: TextureHandle) -> Material {
    let mut material = Material::standard()
        .with_metalness(0.3)
        .with_roughness(0.4)
        .with_texture(TextureSlot::Environment, environment);
    material.env_intensity = 0.5;
    material
}

impl Demo for Physics {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let environment = ctx.load_cube_texture(ENVIRONMENT, "png");

        let ball = ctx
            .scene
            .add_mesh("sphere", sphere(0.5, 32, 32), reflective(environment));
        let floor = ctx.scene.add_mesh(
            "floor",
            plane(10.0, 10.0, 1, 1),
            reflective(environment).with_color(Color::from_hex(0x777777)),
        );
        if let Some(node) = ctx.scene.get_mut(ball) {
            node.transform = Transform::from_position(Vec3::new(0.0, 0.5, 0.0));
            node.cast_shadow = true;
        }
        if let Some(node) = ctx.scene.get_mut(floor) {
            node.transform = Transform::default().with_rotation(Euler::new(-FRAC_PI_2, 0.0, 0.0));
            node.receive_shadow = true;
        }

        ctx.scene
            .add_light("ambient", Light::ambient(Color::WHITE, 2.1));
        let sun = ctx.scene.add_light(
            "directional",
            Light::directional(Color::WHITE, 0.6).with_shadow(1024, 15.0),
        );
        if let Some(t) = ctx.scene.transform_mut(sun) {
            t.position = Vec3::new(5.0, 5.0, 5.0);
        }

        orbit_camera(ctx, Vec3::new(-3.0, 3.0, 3.0));
        Ok(())
    }

    fn update(&mut self, _ctx: &mut DemoContext, _time: FrameTime) {}
}
