use crate::support::orbit_camera;
use glam::Vec3;
use scenelab_common::Color;
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::box_geometry;
use scenelab_scene::{Filter, Material, MaterialHandle, TextureHandle, TextureSlot, Wrap};
use scenelab_tools::{DebugPanel, PanelEvent};
use std::f32::consts::FRAC_PI_4;

const DOOR: [&str; 7] = [
    "/textures/door/color.jpg",
    "/textures/door/alpha.jpg",
    "/textures/door/ambientOcclusion.jpg",
    "/textures/door/height.jpg",
    "/textures/door/metalness.jpg",
    "/textures/door/normal.jpg",
    "/textures/door/roughness.jpg",
];
const MINECRAFT: &str = "/textures/minecraft.png";

/// A cube showing texture sampling: the pixel-art block magnified with nearest
/// filtering, or the door color map repeated, offset and rotated.
#[derive(Debug, Default)]
pub struct Textures {
    material: Option<MaterialHandle>,
    choices: Vec<TextureHandle>,
}

impl Demo for Textures {
    fn name(&self) -> &'static str {
        "textures"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let door: Vec<TextureHandle> = DOOR.iter().map(|path| ctx.load_texture(path)).collect();
        let minecraft = ctx.load_texture(MINECRAFT);
        tracing::info!(total = ctx.assets.pending(), "starting to load textures");

        let color = door[0];
        if let Some(t) = ctx.scene.textures.get_mut(color) {
            let p = &mut t.params;
            p.repeat = [2.0, 3.0];
            p.wrap_s = Wrap::Repeat;
            p.wrap_t = Wrap::Repeat;
            p.offset = [0.5, 0.5];
            p.rotation = FRAC_PI_4;
            p.center = [0.5, 0.5];
            p.min_filter = Filter::Nearest;
            p.generate_mipmaps = false;
        }
        if let Some(t) = ctx.scene.textures.get_mut(minecraft) {
            t.params.mag_filter = Filter::Nearest;
        }

        let id = ctx.scene.add_mesh(
            "cube",
            box_geometry(1.0, 1.0, 1.0, 1, 1, 1),
            Material::basic(Color::WHITE).with_texture(TextureSlot::Map, minecraft),
        );
        self.material = ctx.scene.get(id).and_then(|n| n.kind.drawable()).map(|d| d.material);
        self.choices = vec![minecraft, color];

        let mut panel = DebugPanel::new("Controls");
        panel.add_choice("texture", &["minecraft", "door"], 0)?;
        ctx.panel = Some(panel);

        orbit_camera(ctx, Vec3::new(1.0, 1.0, 1.0));
        Ok(())
    }

    fn update(&mut self, _ctx: &mut DemoContext, _time: FrameTime) {}

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        if event.key() != "texture" {
            return;
        }
        let texture = event.value().as_choice().and_then(|i| self.choices.get(i));
        let material = self.material.and_then(|h| ctx.scene.materials.get_mut(h));
        if let (Some(texture), Some(material)) = (texture, material) {
            material.set_texture(TextureSlot::Map, *texture);
        }
    }
}
