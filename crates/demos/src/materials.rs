use crate::support::{Binding, Bindings, add_shared, orbit_camera};
use glam::Vec3;
use scenelab_common::{Color, ObjectId, Transform};
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::{plane, sphere, torus};
use scenelab_scene::{
    Background, ColorSpace, Filter, Light, Material, MaterialHandle, MaterialKind, Side,
    TextureHandle, TextureSlot,
};
use scenelab_tools::{DebugPanel, PanelEvent};

const ENVIRONMENT: &str = "/textures/environmentMap/2k.hdr";

/// Shading models offered by the "material" choice, in list order.
pub const SHADINGS: [&str; 8] = [
    "basic", "normal", "matcap", "lambert", "phong", "toon", "standard", "physical",
];

#[derive(Debug, Clone, Copy)]
struct DoorMaps {
    color: TextureHandle,
    alpha: TextureHandle,
    ambient_occlusion: TextureHandle,
    height: TextureHandle,
    metalness: TextureHandle,
    normal: TextureHandle,
    roughness: TextureHandle,
    matcap: TextureHandle,
    gradient: TextureHandle,
}

impl DoorMaps {
    fn load(ctx: &mut DemoContext) -> Self {
        let maps = Self {
            color: ctx.load_texture("/textures/door/color.jpg"),
            alpha: ctx.load_texture("/textures/door/alpha.jpg"),
            ambient_occlusion: ctx.load_texture("/textures/door/ambientOcclusion.jpg"),
            height: ctx.load_texture("/textures/door/height.jpg"),
            metalness: ctx.load_texture("/textures/door/metalness.jpg"),
            normal: ctx.load_texture("/textures/door/normal.jpg"),
            roughness: ctx.load_texture("/textures/door/roughness.jpg"),
            matcap: ctx.load_texture("/textures/matcaps/3.png"),
            gradient: ctx.load_texture("/textures/gradients/5.jpg"),
        };
        let textures = &mut ctx.scene.textures;
        for handle in [maps.color, maps.matcap] {
            if let Some(t) = textures.get_mut(handle) {
                t.params.color_space = ColorSpace::Srgb;
            }
        }
        if let Some(t) = textures.get_mut(maps.gradient) {
            t.params.min_filter = Filter::Nearest;
            t.params.mag_filter = Filter::Nearest;
            t.params.generate_mipmaps = false;
        }
        maps
    }

    fn surface(&self, material: Material) -> Material {
        material
            .with_texture(TextureSlot::Map, self.color)
            .with_texture(TextureSlot::AmbientOcclusion, self.ambient_occlusion)
            .with_texture(TextureSlot::Displacement, self.height)
            .with_texture(TextureSlot::Normal, self.normal)
            .with_texture(TextureSlot::Roughness, self.roughness)
            .with_texture(TextureSlot::Metalness, self.metalness)
            .with_texture(TextureSlot::Alpha, self.alpha)
    }

    /// Material for entry `index` of [`SHADINGS`]; out of range falls back to physical.
    fn material(&self, index: usize) -> Material {
        match SHADINGS.get(index).copied() {
            Some("basic") => Material::basic(Color::from_hex(0xff0000))
                .with_texture(TextureSlot::Map, self.color)
                .with_texture(TextureSlot::Alpha, self.alpha)
                .with_wireframe(true)
                .with_opacity(0.2)
                .with_side(Side::Double),
            Some("normal") => Material::new(MaterialKind::Normal),
            Some("matcap") => {
                Material::new(MaterialKind::Matcap).with_texture(TextureSlot::Matcap, self.matcap)
            }
            Some("lambert") => Material::new(MaterialKind::Lambert),
            Some("phong") => {
                let mut m =
                    Material::new(MaterialKind::Phong).with_color(Color::from_hex(0x1188ff));
                m.shininess = 100.0;
                m
            }
            Some("toon") => {
                Material::new(MaterialKind::Toon).with_texture(TextureSlot::Gradient, self.gradient)
            }
            Some("standard") => {
                let mut m = self.surface(Material::standard());
                m.transparent = true;
                m
            }
            _ => {
                let mut m = self.surface(Material::new(MaterialKind::Physical));
                m.clearcoat = 0.5;
                m.transparent = true;
                m
            }
        }
    }
}

/// One material shared by a sphere, a plane and a torus, lit by an HDR environment,
/// with the shading model switchable from the panel.
#[derive(Debug, Default)]
pub struct Materials {
    maps: Option<DoorMaps>,
    material: Option<MaterialHandle>,
    meshes: Vec<ObjectId>,
    bindings: Bindings,
}

impl Materials {
    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }
}

impl Demo for Materials {
    fn name(&self) -> &'static str {
        "materials"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let ambient = ctx.scene.add_light("ambient", Light::ambient(Color::WHITE, 1.0));
        let point = ctx.scene.add_light("point", Light::point(Color::WHITE, 30.0, 0.0));
        if let Some(t) = ctx.scene.transform_mut(point) {
            t.position = Vec3::new(2.0, 3.0, 4.0);
        }

        let environment = ctx.load_hdr(ENVIRONMENT);
        ctx.scene.background = Background::Texture(environment);
        ctx.scene.environment = Some(environment);

        let maps = DoorMaps::load(ctx);
        let physical = SHADINGS.len() - 1;
        let material = ctx.scene.materials.insert(maps.material(physical));

        let mut panel = DebugPanel::new("Debug panel");
        panel.add_choice("material", &SHADINGS, physical)?.name("material");
        panel.folder("Light", true);
        panel
            .add_number("ambient", 1.0, 0.0, 2.0, 0.01)?
            .name("ambient intensity");
        panel
            .add_number("point", 30.0, 0.0, 100.0, 1.0)?
            .name("point intensity");
        ctx.panel = Some(panel);
        self.bindings
            .bind("ambient", Binding::LightIntensity(ambient))
            .bind("point", Binding::LightIntensity(point));

        let scene = &mut ctx.scene;
        for (name, mesh, x) in [
            ("sphere", sphere(0.5, 64, 64), 0.0),
            ("plane", plane(1.0, 1.0, 100, 100), -1.5),
            ("torus", torus(0.3, 0.2, 64, 64), 1.5),
        ] {
            let geometry = scene.geometries.insert(mesh);
            let transform = Transform::from_position(Vec3::new(x, 0.0, 0.0));
            self.meshes
                .push(add_shared(scene, name, geometry, material, transform));
        }

        orbit_camera(ctx, Vec3::new(0.0, 0.0, 2.0));
        self.maps = Some(maps);
        self.material = Some(material);
        Ok(())
    }

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
        for id in &self.meshes {
            if let Some(t) = ctx.scene.transform_mut(*id) {
                t.rotation.y = time.elapsed * 0.1;
            }
        }
    }

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        if self.bindings.apply(&mut ctx.scene, event) || event.key() != "material" {
            return;
        }
        let (Some(maps), Some(handle), Some(index)) =
            (self.maps, self.material, event.value().as_choice())
        else {
            return;
        };
        if let Some(material) = ctx.scene.materials.get_mut(handle) {
            *material = maps.material(index);
            tracing::debug!(shading = ?SHADINGS.get(index), "material switched");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_render::DebugTextRenderer;
    use scenelab_runtime::{Driver, DriverOptions, ManualTime};
    use scenelab_scene::Mapping;
    use scenelab_tools::ParamValue;

    fn driver(time: &ManualTime) -> (Driver<DebugTextRenderer>, MaterialHandle) {
        let mut d = Driver::new(
            Box::new(Materials::default()),
            DebugTextRenderer::new(),
            DriverOptions {
                assets_root: "/nonexistent-scenelab-assets".into(),
                time: Box::new(time.clone()),
                ..DriverOptions::default()
            },
        );
        d.start().unwrap();
        let scene = &d.context().scene;
        let sphere = scene.get(scene.find_by_name("sphere").unwrap()).unwrap();
        let handle = sphere.kind.drawable().unwrap().material;
        (d, handle)
    }

    #[test]
    fn meshes_share_a_physical_material() {
        let time = ManualTime::new();
        let (d, handle) = driver(&time);
        let scene = &d.context().scene;
        assert_eq!(scene.materials.len(), 1);
        let material = scene.materials.get(handle).unwrap();
        assert_eq!(material.kind, MaterialKind::Physical);
        assert_eq!(material.clearcoat, 0.5);
        assert!(material.transparent);
        assert_eq!(material.textures.len(), 7);
    }

    #[test]
    fn environment_is_an_equirect_background() {
        let time = ManualTime::new();
        let (d, _) = driver(&time);
        let scene = &d.context().scene;
        let env = scene.environment.unwrap();
        assert_eq!(scene.background, Background::Texture(env));
        assert_eq!(
            scene.textures.get(env).unwrap().params.mapping,
            Mapping::EquirectangularReflection
        );
    }

    #[test]
    fn gradient_is_sampled_nearest() {
        let time = ManualTime::new();
        let (mut d, handle) = driver(&time);
        d.context_mut()
            .panel
            .as_mut()
            .unwrap()
            .set("material", ParamValue::Choice(5))
            .unwrap();
        d.tick().unwrap();
        let scene = &d.context().scene;
        let toon = scene.materials.get(handle).unwrap();
        assert_eq!(toon.kind, MaterialKind::Toon);
        let gradient = toon.texture(TextureSlot::Gradient).unwrap();
        let params = scene.textures.get(gradient).unwrap().params;
        assert_eq!(params.mag_filter, Filter::Nearest);
        assert!(!params.generate_mipmaps);
    }

    #[test]
    fn light_folder_drives_intensities() {
        let time = ManualTime::new();
        let (mut d, _) = driver(&time);
        let panel = d.context_mut().panel.as_mut().unwrap();
        assert_eq!(panel.folder_names(), vec!["Light"]);
        panel.change("point", ParamValue::Number(62.4)).unwrap();
        d.tick().unwrap();
        let scene = &mut d.context_mut().scene;
        let point = scene.find_by_name("point").unwrap();
        assert_eq!(scene.light_mut(point).unwrap().intensity, 62.0);
    }

    #[test]
    fn rotation_follows_elapsed_time() {
        let time = ManualTime::new();
        let (mut d, _) = driver(&time);
        d.tick().unwrap();
        time.set(5.0);
        d.tick().unwrap();
        let scene = &d.context().scene;
        let torus = scene.get(scene.find_by_name("torus").unwrap()).unwrap();
        assert!((torus.transform.rotation.y - 0.5).abs() < 1e-6);
    }
}
