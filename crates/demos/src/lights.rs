use crate::support::{Axis, Binding, Bindings, add_shared, orbit_camera};
use glam::Vec3;
use scenelab_common::{Color, Euler, ObjectId, Transform};
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError};
use scenelab_scene::geometry::{box_geometry, plane, sphere, torus};
use scenelab_scene::{Light, LightKind, Material, NodeKind, SceneNode};
use scenelab_tools::{DebugPanel, PanelEvent, PanelError};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Every light kind at once over a sphere, a cube and a torus, each light with a
/// helper gizmo and a closed folder of params.
#[derive(Debug, Default)]
pub struct Lights {
    spinning: Vec<ObjectId>,
    bindings: Bindings,
}

struct LightParams<'a> {
    key: &'a str,
    folder: &'a str,
    max_intensity: f32,
    step: f32,
    position: bool,
}

impl<'a> LightParams<'a> {
    fn new(key: &'a str, folder: &'a str, max_intensity: f32, step: f32) -> Self {
        Self {
            key,
            folder,
            max_intensity,
            step,
            position: false,
        }
    }

    fn with_position(mut self) -> Self {
        self.position = true;
        self
    }
}

impl Lights {
    fn add_light(
        &mut self,
        ctx: &mut DemoContext,
        panel: &mut DebugPanel,
        params: LightParams<'_>,
        light: Light,
        position: Vec3,
    ) -> Result<ObjectId, PanelError> {
        let id = ctx.scene.add_light(params.key, light);
        if let Some(t) = ctx.scene.transform_mut(id) {
            t.position = position;
        }
        let key = params.key;
        panel.folder(params.folder, false);
        let intensity = format!("{key}.intensity");
        panel
            .add_number(&intensity, light.intensity, 0.0, params.max_intensity, params.step)?
            .name("intensity");
        panel.add_color(&format!("{key}.color"), light.color)?.name("color");
        self.bindings
            .bind(&intensity, Binding::LightIntensity(id))
            .bind(&format!("{key}.color"), Binding::LightColor(id));
        if params.position {
            let axes = [(Axis::X, "x"), (Axis::Y, "y"), (Axis::Z, "z")];
            for ((axis, label), v) in axes.into_iter().zip(position.to_array()) {
                let k = format!("{key}.{label}");
                panel.add_number(&k, v, -10.0, 10.0, 0.01)?.name(label);
                self.bindings.bind(&k, Binding::Position(id, axis));
            }
        }
        Ok(id)
    }
}

impl Demo for Lights {
    fn name(&self) -> &'static str {
        "lights"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let mut panel = DebugPanel::new("Controls");
        panel.add_bool("helpers", true)?.name("Show Helpers");

        self.add_light(
            ctx,
            &mut panel,
            LightParams::new("ambient", "Ambient light", 2.0, 0.01),
            Light::ambient(Color::WHITE, 1.5),
            Vec3::ZERO,
        )?;
        let directional = self.add_light(
            ctx,
            &mut panel,
            LightParams::new("directional", "Directional light", 2.0, 0.01).with_position(),
            Light::directional(Color::from_hex(0x00fffc), 0.5),
            Vec3::new(1.0, 0.25, 0.0),
        )?;
        let hemisphere = self.add_light(
            ctx,
            &mut panel,
            LightParams::new("hemisphere", "Hemisphere light", 3.0, 0.01),
            Light::new(
                LightKind::Hemisphere {
                    ground: Color::from_hex(0x0000ff),
                },
                Color::from_hex(0xff0000),
                1.0,
            ),
            Vec3::ZERO,
        )?;
        panel.add_color("hemisphere.ground", Color::from_hex(0x0000ff))?.name("groundColor");
        self.bindings.bind("hemisphere.ground", Binding::GroundColor(hemisphere));
        let point = self.add_light(
            ctx,
            &mut panel,
            LightParams::new("point", "Point light", 10.0, 0.01).with_position(),
            Light::point(Color::from_hex(0xff9000), 1.5, 0.0),
            Vec3::new(1.0, -0.5, 1.0),
        )?;
        let rect = self.add_light(
            ctx,
            &mut panel,
            LightParams::new("rect", "Rect area light", 10.0, 0.1),
            Light::new(
                LightKind::RectArea {
                    width: 1.0,
                    height: 1.0,
                },
                Color::from_hex(0x4e00ff),
                6.0,
            ),
            Vec3::new(-1.5, 0.0, 1.5),
        )?;
        // face the origin
        if let Some(t) = ctx.scene.transform_mut(rect) {
            t.rotation = Euler::new(0.0, -FRAC_PI_4, 0.0);
        }
        let spot = self.add_light(
            ctx,
            &mut panel,
            LightParams::new("spot", "Spot light", 10.0, 0.1),
            Light::new(
                LightKind::Spot {
                    distance: 10.0,
                    angle: PI * 0.1,
                    penumbra: 0.25,
                    decay: 1.0,
                    target: [-0.75, 0.0, 0.0],
                },
                Color::from_hex(0x78ff00),
                4.5,
            ),
            Vec3::new(0.0, 2.0, 3.0),
        )?;
        ctx.panel = Some(panel);

        let helpers = [
            (directional, 0.2),
            (hemisphere, 0.2),
            (point, 0.2),
            (rect, 1.0),
            (spot, 1.0),
        ];
        for (light, size) in helpers {
            let helper = ctx.scene.add(SceneNode::new(
                "light-helper",
                NodeKind::LightHelper { light, size },
            ));
            self.bindings.bind("helpers", Binding::Visible(helper));
        }

        let scene = &mut ctx.scene;
        let material = scene.materials.insert(Material::standard().with_roughness(0.4));
        for (name, mesh, x) in [
            ("sphere", sphere(0.5, 32, 32), -1.5),
            ("cube", box_geometry(0.75, 0.75, 0.75, 1, 1, 1), 0.0),
            ("torus", torus(0.3, 0.2, 32, 64), 1.5),
        ] {
            let geometry = scene.geometries.insert(mesh);
            let transform = Transform::from_position(Vec3::new(x, 0.0, 0.0));
            let id = add_shared(scene, name, geometry, material, transform);
            self.spinning.push(id);
        }
        let floor = scene.geometries.insert(plane(5.0, 5.0, 1, 1));
        add_shared(
            scene,
            "plane",
            floor,
            material,
            Transform::from_position(Vec3::new(0.0, -0.65, 0.0))
                .with_rotation(Euler::new(-FRAC_PI_2, 0.0, 0.0)),
        );

        orbit_camera(ctx, Vec3::new(1.0, 1.0, 2.0));
        Ok(())
    }

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
        let t = time.elapsed;
        for id in &self.spinning {
            if let Some(transform) = ctx.scene.transform_mut(*id) {
                transform.rotation.y = 0.1 * t;
                transform.rotation.x = 0.15 * t;
            }
        }
    }

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        self.bindings.apply(&mut ctx.scene, event);
    }
}
