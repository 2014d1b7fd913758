use crate::support::{Binding, Bindings, add_shared, orbit_camera, spread};
use glam::Vec3;
use rand::Rng;
use scenelab_assets::{AssetId, Completion, LoadedAsset, TextOptions};
use scenelab_common::{Color, Euler, ObjectId, Transform};
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::{axes, icosahedron};
use scenelab_scene::{ColorSpace, Material, MaterialKind, MeshData, TextureSlot};
use scenelab_tools::{DebugPanel, PanelEvent};
use std::f32::consts::PI;

const FONT: &str = "/font/helvetiker_regular.typeface.json";
const MATCAP: &str = "/textures/matcaps/3.png";
const SHAPES: usize = 100;

/// Centered extruded "Hello world" once the font arrives, among a hundred spinning
/// icosahedrons, with a toggleable axes helper.
#[derive(Debug, Default)]
pub struct Text3d {
    font: Option<AssetId>,
    text: Option<ObjectId>,
    shapes: Vec<ObjectId>,
    bindings: Bindings,
}

impl Text3d {
    /// The text mesh, once the font has loaded.
    pub fn text(&self) -> Option<ObjectId> {
        self.text
    }

    fn add_text(&mut self, ctx: &mut DemoContext, mesh: MeshData) {
        let matcap = ctx.load_texture(MATCAP);
        if let Some(texture) = ctx.scene.textures.get_mut(matcap) {
            texture.params.color_space = ColorSpace::Srgb;
        }
        let material =
            Material::new(MaterialKind::Matcap).with_texture(TextureSlot::Matcap, matcap);
        self.text = Some(ctx.scene.add_mesh("text", mesh, material));
        tracing::info!("font loaded");
    }
}

impl Demo for Text3d {
    fn name(&self) -> &'static str {
        "3d-text"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let helper = ctx.scene.add_lines(
            "axes",
            axes(1.0),
            Material::basic(Color::WHITE).with_vertex_colors(),
        );
        let mut panel = DebugPanel::new("Controls");
        panel.add_bool("axes", true)?.name("AxesHelper");
        ctx.panel = Some(panel);
        self.bindings.bind("axes", Binding::Visible(helper));

        self.font = Some(ctx.assets.load_font(FONT));

        let geometry = ctx.scene.geometries.insert(icosahedron(0.3));
        let material = ctx.scene.materials.insert(Material::new(MaterialKind::Normal));
        let started = std::time::Instant::now();
        for i in 0..SHAPES {
            let position = spread(&mut ctx.rng, 10.0);
            let rotation = Euler::new(
                ctx.rng.r#gen::<f32>() * PI,
                ctx.rng.r#gen::<f32>() * PI,
                0.0,
            );
            let scale = ctx.rng.r#gen::<f32>();
            let transform = Transform::from_position(position)
                .with_rotation(rotation)
                .with_uniform_scale(scale);
            self.shapes.push(add_shared(
                &mut ctx.scene,
                &format!("shape-{i}"),
                geometry,
                material,
                transform,
            ));
        }
        tracing::debug!(count = SHAPES, elapsed = ?started.elapsed(), "shapes placed");

        orbit_camera(ctx, Vec3::new(1.0, 1.0, 2.0));
        Ok(())
    }

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
        for id in &self.shapes {
            if let Some(t) = ctx.scene.transform_mut(*id) {
                t.rotation.y = time.elapsed;
            }
        }
    }

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        self.bindings.apply(&mut ctx.scene, event);
    }

    fn on_asset(&mut self, ctx: &mut DemoContext, completion: Completion) {
        if Some(completion.id) != self.font {
            return;
        }
        match completion.result {
            Ok(LoadedAsset::Font(face)) => {
                let options = TextOptions {
                    size: 0.5,
                    depth: 0.1,
                    curve_segments: 5,
                };
                let mesh = face.text_geometry("Hello world", options);
                self.add_text(ctx, mesh);
            }
            Ok(_) => tracing::warn!(path = %completion.path, "expected a font"),
            Err(_) => tracing::warn!(path = %completion.path, "text skipped, font unavailable"),
        }
    }
}
