use crate::support::{orbit_camera, spread};
use glam::Vec3;
use rand::Rng;
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::points;
use scenelab_scene::{GeometryHandle, Material, SceneError, TextureSlot};

pub const PARTICLE_COUNT: usize = 5000;
const SPRITE: &str = "/textures/particles/2.png";

/// Five thousand randomly colored point sprites whose heights ride a sine wave along x.
#[derive(Debug, Default)]
pub struct Particles {
    geometry: Option<GeometryHandle>,
}

impl Demo for Particles {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let mut positions = Vec::with_capacity(PARTICLE_COUNT);
        let mut colors = Vec::with_capacity(PARTICLE_COUNT);
        for _ in 0..PARTICLE_COUNT {
            positions.push(spread(&mut ctx.rng, 10.0).to_array());
            colors.push(ctx.rng.r#gen::<[f32; 3]>());
        }

        let sprite = ctx.load_texture(SPRITE);
        let material = Material::points(0.1)
            .with_texture(TextureSlot::Alpha, sprite)
            .additive()
            .with_vertex_colors();
        let id = ctx
            .scene
            .add_points("particles", points(positions, Some(colors)), material);
        let drawable = ctx
            .scene
            .get(id)
            .and_then(|node| node.kind.drawable())
            .ok_or(SceneError::NotDrawable(id))?;
        self.geometry = Some(drawable.geometry);

        orbit_camera(ctx, Vec3::new(-4.0, 5.0, 8.0));
        Ok(())
    }

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
        let Some(mesh) = self.geometry.and_then(|h| ctx.scene.geometries.get_mut(h)) else {
            return;
        };
        for p in &mut mesh.positions {
            p[1] = (time.elapsed + p[0]).sin();
        }
    }
}
