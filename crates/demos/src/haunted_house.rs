use crate::support::{add_child_mesh, add_shared, orbit_camera, shared_node};
use glam::Vec3;
use rand::Rng;
use scenelab_common::{Color, Euler, ObjectId, Transform};
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::{box_geometry, cone, plane, sphere};
use scenelab_scene::{
    Background, ColorSpace, Fog, Light, Material, NodeKind, SceneNode, TextureHandle, TextureSlot,
    Wrap,
};
use scenelab_tools::{DebugPanel, PanelEvent};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

const FOG: u32 = 0x262837;
const ENV_LIGHT: u32 = 0xb9d5ff;
const HOUSE_HEIGHT: f32 = 2.5;
const GRAVES: usize = 30;

/// Bushes around the door as `(scale, position)`.
const BUSHES: [(f32, [f32; 3]); 4] = [
    (0.5, [0.8, 0.2, 2.2]),
    (0.3, [1.4, 0.1, 2.1]),
    (0.4, [-0.8, 0.1, 2.2]),
    (0.2, [-1.0, 0.05, 2.6]),
];

/// A colored point light circling the house.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ghost {
    pub light: ObjectId,
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub speed: f32,
    pub flicker_speed: f32,
    pub flicker_offset: f32,
}

impl Ghost {
    /// Position and intensity at `t` seconds.
    pub fn pose(&self, t: f32) -> (Vec3, f32) {
        let angle = t * self.speed;
        let flicker = (t * self.flicker_speed + self.flicker_offset).sin();
        let position = Vec3::new(
            angle.cos() * self.distance,
            flicker + (t * self.speed * 2.0).sin(),
            angle.sin() * self.distance,
        );
        (position, self.intensity + flicker * 0.5)
    }
}

/// A foggy night scene: textured house, random graves, door light and three
/// flickering ghost lights tuned per folder in the panel.
#[derive(Debug, Default)]
pub struct HauntedHouse {
    ghosts: Vec<Ghost>,
}

impl HauntedHouse {
    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }
}

fn texture(ctx: &mut DemoContext, path: &str, srgb: bool) -> TextureHandle {
    let handle = ctx.load_texture(path);
    if srgb {
        if let Some(t) = ctx.scene.textures.get_mut(handle) {
            t.params.color_space = ColorSpace::Srgb;
        }
    }
    handle
}

fn grass(ctx: &mut DemoContext, path: &str, srgb: bool) -> TextureHandle {
    let handle = texture(ctx, path, srgb);
    if let Some(t) = ctx.scene.textures.get_mut(handle) {
        t.params.repeat = [8.0, 8.0];
        t.params.wrap_s = Wrap::Repeat;
        t.params.wrap_t = Wrap::Repeat;
    }
    handle
}

fn standard_with(maps: &[(TextureSlot, TextureHandle)]) -> Material {
    maps.iter()
        .fold(Material::standard(), |m, (slot, h)| m.with_texture(*slot, *h))
}

fn mark_shadow(ctx: &mut DemoContext, id: ObjectId, cast: bool, receive: bool) {
    if let Some(node) = ctx.scene.get_mut(id) {
        node.cast_shadow = cast;
        node.receive_shadow = receive;
    }
}

impl Demo for HauntedHouse {
    fn name(&self) -> &'static str {
        "haunted-house"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let fog = Color::from_hex(FOG);
        ctx.scene.fog = Some(Fog {
            color: fog,
            near: 1.0,
            far: 15.0,
        });
        ctx.scene.background = Background::Color(fog);

        let wall = standard_with(&[
            (TextureSlot::Map, texture(ctx, "/textures/bricks/color.jpg", true)),
            (
                TextureSlot::AmbientOcclusion,
                texture(ctx, "/textures/bricks/ambientOcclusion.jpg", false),
            ),
            (TextureSlot::Normal, texture(ctx, "/textures/bricks/normal.jpg", false)),
            (TextureSlot::Roughness, texture(ctx, "/textures/bricks/roughness.jpg", false)),
        ]);
        let mut door = standard_with(&[
            (TextureSlot::Map, texture(ctx, "/textures/door/color.jpg", true)),
            (TextureSlot::Alpha, texture(ctx, "/textures/door/alpha.jpg", false)),
            (
                TextureSlot::AmbientOcclusion,
                texture(ctx, "/textures/door/ambientOcclusion.jpg", false),
            ),
            (TextureSlot::Displacement, texture(ctx, "/textures/door/height.jpg", false)),
            (TextureSlot::Normal, texture(ctx, "/textures/door/normal.jpg", false)),
            (TextureSlot::Metalness, texture(ctx, "/textures/door/metalness.jpg", false)),
            (TextureSlot::Roughness, texture(ctx, "/textures/door/roughness.jpg", false)),
        ]);
        door.transparent = true;
        let floor = standard_with(&[
            (TextureSlot::Map, grass(ctx, "/textures/grass/color.jpg", true)),
            (
                TextureSlot::AmbientOcclusion,
                grass(ctx, "/textures/grass/ambientOcclusion.jpg", false),
            ),
            (TextureSlot::Normal, grass(ctx, "/textures/grass/normal.jpg", false)),
            (TextureSlot::Roughness, grass(ctx, "/textures/grass/roughness.jpg", false)),
        ]);

        let scene = &mut ctx.scene;
        let house = scene.add_group("house");
        let wall = scene.materials.insert(wall);
        let walls = add_child_mesh(
            scene,
            house,
            "walls",
            box_geometry(4.0, HOUSE_HEIGHT, 4.0, 1, 1, 1),
            wall,
            Transform::from_position(Vec3::new(0.0, HOUSE_HEIGHT / 2.0, 0.0)),
        )?;
        let roof = scene
            .materials
            .insert(Material::standard().with_color(Color::from_hex(0xb35f45)));
        add_child_mesh(
            scene,
            house,
            "roof",
            cone(3.5, 1.0, 4),
            roof,
            Transform::from_position(Vec3::new(0.0, HOUSE_HEIGHT + 0.5, 0.0))
                .with_rotation(Euler::new(0.0, FRAC_PI_4, 0.0)),
        )?;
        let door = scene.materials.insert(door);
        add_child_mesh(
            scene,
            house,
            "door",
            plane(2.2, 2.2, 100, 100),
            door,
            Transform::from_position(Vec3::new(0.0, 1.0, 2.01)),
        )?;

        let bush_geometry = scene.geometries.insert(sphere(1.0, 16, 16));
        let bush_material =
            scene.materials.insert(Material::standard().with_color(Color::from_hex(0x89c854)));
        let mut bushes = Vec::new();
        for (i, (scale, [x, y, z])) in BUSHES.into_iter().enumerate() {
            let transform = Transform::from_position(Vec3::new(x, y, z)).with_uniform_scale(scale);
            let node = shared_node(&format!("bush-{i}"), bush_geometry, bush_material, transform);
            bushes.push(scene.add_child(house, node)?);
        }

        let graves = scene.add_group("graves");
        let grave_geometry = scene.geometries.insert(box_geometry(0.6, 0.8, 0.2, 1, 1, 1));
        let grave_material =
            scene.materials.insert(Material::standard().with_color(Color::from_hex(0xb2b6b1)));
        let mut grave_ids = Vec::new();
        for i in 0..GRAVES {
            let angle = ctx.rng.r#gen::<f32>() * TAU;
            let radius = 3.5 + ctx.rng.r#gen::<f32>() * 6.0;
            let tilt_y = (ctx.rng.r#gen::<f32>() - 0.5) * 0.4;
            let tilt_z = (ctx.rng.r#gen::<f32>() - 0.5) * 0.4;
            let transform = Transform::from_position(Vec3::new(
                angle.sin() * radius,
                0.3,
                angle.cos() * radius,
            ))
            .with_rotation(Euler::new(0.0, tilt_y, tilt_z));
            let name = format!("grave-{i}");
            let node = shared_node(&name, grave_geometry, grave_material, transform);
            grave_ids.push(ctx.scene.add_child(graves, node)?);
        }

        let floor_material = ctx.scene.materials.insert(floor);
        let floor_geometry = ctx.scene.geometries.insert(plane(20.0, 20.0, 1, 1));
        let floor = add_shared(
            &mut ctx.scene,
            "floor",
            floor_geometry,
            floor_material,
            Transform::default().with_rotation(Euler::new(-FRAC_PI_2, 0.0, 0.0)),
        );

        let env = Color::from_hex(ENV_LIGHT);
        ctx.scene.add_light("ambient", Light::ambient(env, 0.12));
        let mut moon = Light::directional(env, 0.12);
        moon.shadow.enabled = true;
        let moon = ctx.scene.add_light("moon", moon);
        if let Some(t) = ctx.scene.transform_mut(moon) {
            t.position = Vec3::new(4.0, 5.0, -2.0);
        }
        let door_light = SceneNode::new(
            "door-light",
            NodeKind::Light(
                Light::point(Color::from_hex(0xff7d46), 3.0, 7.0).with_shadow(256, 7.0),
            ),
        )
        .with_transform(Transform::from_position(Vec3::new(0.0, 2.2, 2.7)));
        ctx.scene.add_child(house, door_light)?;

        mark_shadow(ctx, walls, true, false);
        for id in bushes.into_iter().chain(grave_ids) {
            mark_shadow(ctx, id, true, false);
        }
        mark_shadow(ctx, floor, false, true);

        let mut panel = DebugPanel::new("Controls");
        let presets = [
            (0xff00ff, 4.0, 0.5, 3.0),
            (0x00ffff, 5.0, 0.32, 4.0),
            (0xffff00, 7.0, 0.18, 5.0),
        ];
        for (i, (hex, distance, speed, flicker_speed)) in presets.into_iter().enumerate() {
            let color = Color::from_hex(hex);
            let light = ctx.scene.add_light(
                &format!("ghost-{}", i + 1),
                Light::point(color, 2.0, 3.0).with_shadow(256, 7.0),
            );
            self.ghosts.push(Ghost {
                light,
                color,
                intensity: 2.0,
                distance,
                speed,
                flicker_speed,
                flicker_offset: ctx.rng.r#gen::<f32>() * PI,
            });
            let n = i + 1;
            panel.folder(&format!("Ghost {n}"), true);
            panel.add_color(&format!("ghost{n}.color"), color)?.name("color");
            panel
                .add_number(&format!("ghost{n}.intensity"), 2.0, 0.0, 5.0, 0.1)?
                .name("intensity");
            panel
                .add_number(&format!("ghost{n}.speed"), speed, 0.0, 1.0, 0.01)?
                .name("speed");
            panel
                .add_number(&format!("ghost{n}.flicker"), flicker_speed, 0.0, 10.0, 0.1)?
                .name("flickerSpeed");
        }
        ctx.panel = Some(panel);

        orbit_camera(ctx, Vec3::new(4.0, 2.0, 5.0));
        Ok(())
    }

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
        for ghost in &self.ghosts {
            let (position, intensity) = ghost.pose(time.elapsed);
            if let Some(t) = ctx.scene.transform_mut(ghost.light) {
                t.position = position;
            }
            if let Some(light) = ctx.scene.light_mut(ghost.light) {
                light.intensity = intensity;
            }
        }
    }

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        let value = event.value();
        for (i, ghost) in self.ghosts.iter_mut().enumerate() {
            let prefix = format!("ghost{}.", i + 1);
            let Some(field) = event.key().strip_prefix(prefix.as_str()) else {
                continue;
            };
            match (field, value.as_f32(), value.as_color()) {
                ("color", _, Some(color)) => {
                    ghost.color = color;
                    if let Some(light) = ctx.scene.light_mut(ghost.light) {
                        light.color = color;
                    }
                }
                ("intensity", Some(v), _) => ghost.intensity = v,
                ("speed", Some(v), _) => ghost.speed = v,
                ("flicker", Some(v), _) => ghost.flicker_speed = v,
                _ => {}
            }
        }
    }
}
