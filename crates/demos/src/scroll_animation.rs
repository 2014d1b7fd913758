use crate::support::{Binding, Bindings, add_shared};
use glam::{Vec2, Vec3};
use scenelab_common::{Color, ObjectId, Transform};
use scenelab_input::{Cursor, HostEvent};
use scenelab_render::CameraRig;
use scenelab_runtime::{Demo, DemoContext, FrameTime, RuntimeError, smooth_towards};
use scenelab_scene::geometry::{cone, torus, torus_knot};
use scenelab_scene::{Filter, Light, Material, MaterialKind, TextureSlot};
use scenelab_tools::{DebugPanel, PanelEvent};

/// Vertical distance between two sections.
pub const SECTION_DISTANCE: f32 = 4.0;
const SECTIONS: usize = 3;
const PARALLAX_EASING: f32 = 5.0;

/// Three toon-shaded meshes stacked one section apart. The page scroll moves the
/// camera down the stack and the cursor adds an eased parallax offset.
#[derive(Debug, Default)]
pub struct ScrollAnimation {
    meshes: Vec<ObjectId>,
    bindings: Bindings,
}

impl ScrollAnimation {
    /// Camera height for a scroll offset in a view `height` pixels tall.
    pub fn camera_y(scroll_y: f32, height: u32) -> f32 {
        if height == 0 {
            return 0.0;
        }
        -scroll_y / height as f32 * SECTION_DISTANCE
    }
}

impl Demo for ScrollAnimation {
    fn name(&self) -> &'static str {
        "scroll-based-animation"
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let color = Color::from_hex(0xffeded);
        let gradient = ctx.load_texture("/textures/gradients/3.jpg");
        if let Some(t) = ctx.scene.textures.get_mut(gradient) {
            t.params.min_filter = Filter::Nearest;
            t.params.mag_filter = Filter::Nearest;
        }
        let material = ctx.scene.materials.insert(
            Material::new(MaterialKind::Toon)
                .with_color(color)
                .with_texture(TextureSlot::Gradient, gradient),
        );

        let mut panel = DebugPanel::new("Controls");
        panel.add_color("materialColor", color)?;
        ctx.panel = Some(panel);
        self.bindings
            .bind("materialColor", Binding::MaterialColor(material));

        let sun = ctx.scene.add_light("directional", Light::directional(Color::WHITE, 1.0));
        if let Some(t) = ctx.scene.transform_mut(sun) {
            t.position = Vec3::new(1.0, 1.0, 0.0);
        }

        let scene = &mut ctx.scene;
        let sections = [
            ("torus", torus(1.0, 0.4, 16, 60), 2.0),
            ("cone", cone(1.0, 2.0, 32), -2.0),
            ("torus-knot", torus_knot(0.8, 0.35, 100, 16, 2, 3), 2.0),
        ];
        for (i, (name, mesh, x)) in sections.into_iter().enumerate() {
            let geometry = scene.geometries.insert(mesh);
            let position = Vec3::new(x, -SECTION_DISTANCE * i as f32, 0.0);
            self.meshes.push(add_shared(
                scene,
                name,
                geometry,
                material,
                Transform::from_position(position),
            ));
        }

        ctx.camera = CameraRig::perspective(35.0, ctx.viewport.aspect(), 0.1, 100.0)
            .at(Vec3::new(0.0, 0.0, 6.0));
        ctx.cursor = Cursor::new(false);
        Ok(())
    }

    fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
        for id in &self.meshes {
            if let Some(t) = ctx.scene.transform_mut(*id) {
                t.rotation.x = time.elapsed * 0.1;
                t.rotation.y = time.elapsed * 0.15;
            }
        }

        ctx.camera.position.y = Self::camera_y(ctx.scroll_y, ctx.viewport.height);
        let parallax = Vec2::new(ctx.cursor.x * 0.5, -ctx.cursor.y * 0.5);
        let offset = ctx.camera.parent_offset;
        let eased = smooth_towards(offset.truncate(), parallax, PARALLAX_EASING, time.delta);
        ctx.camera.parent_offset = eased.extend(offset.z);
    }

    fn on_event(&mut self, ctx: &mut DemoContext, event: &HostEvent) {
        // without a page to scroll, the wheel moves through the sections
        if let HostEvent::Wheel { delta } = *event {
            let max = (SECTIONS - 1) as f32 * ctx.viewport.height as f32;
            ctx.scroll_y = (ctx.scroll_y + delta).clamp(0.0, max);
        }
    }

    fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
        if event.is_commit() {
            self.bindings.apply(&mut ctx.scene, event);
        }
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
            Box::new(ScrollAnimation::default()),
            DebugTextRenderer::new(),
            DriverOptions {
                assets_root: "/nonexistent-scenelab-assets".into(),
                time: Box::new(time.clone()),
                ..DriverOptions::default()
            },
        );
        d.start().unwrap();
        d
    }

    #[test]
    fn one_screen_of_scroll_is_one_section() {
        assert_eq!(ScrollAnimation::camera_y(600.0, 600), -SECTION_DISTANCE);
        assert_eq!(ScrollAnimation::camera_y(300.0, 600), -2.0);
        assert_eq!(ScrollAnimation::camera_y(300.0, 0), 0.0);
    }

    #[test]
    fn scroll_moves_the_camera_down() {
        let time = ManualTime::new();
        let mut d = driver(&time);
        let height = d.context().viewport.height as f32;
        d.dispatch(HostEvent::Scrolled { y: height * 2.0 });
        d.tick().unwrap();
        assert_eq!(d.context().camera.position.y, -2.0 * SECTION_DISTANCE);
    }

    #[test]
    fn wheel_scroll_stops_at_the_last_section() {
        let time = ManualTime::new();
        let mut d = driver(&time);
        let height = d.context().viewport.height as f32;
        d.dispatch(HostEvent::Wheel { delta: height * 10.0 });
        assert_eq!(d.context().scroll_y, height * 2.0);
        d.dispatch(HostEvent::Wheel { delta: -height * 10.0 });
        assert_eq!(d.context().scroll_y, 0.0);
    }

    #[test]
    fn parallax_eases_towards_the_cursor() {
        let time = ManualTime::new();
        let mut d = driver(&time);
        let width = d.context().viewport.width as f32;
        d.dispatch(HostEvent::CursorMoved { x: width, y: 0.0 });
        d.tick().unwrap();
        assert_eq!(d.context().camera.parent_offset, Vec3::ZERO);

        time.advance(0.1);
        d.tick().unwrap();
        let offset = d.context().camera.parent_offset;
        // target is (0.25, 0.25); half the gap is closed after 0.1 s at easing 5
        assert!((offset.x - 0.125).abs() < 1e-4);
        assert!((offset.y - 0.125).abs() < 1e-4);
    }

    #[test]
    fn color_applies_on_commit_only() {
        let time = ManualTime::new();
        let mut d = driver(&time);
        let scene = &d.context().scene;
        let torus = scene.find_by_name("torus").unwrap();
        let handle = scene.get(torus).unwrap().kind.drawable().unwrap().material;
        let red = Color::from_hex(0xff0000);

        let panel = d.context_mut().panel.as_mut().unwrap();
        panel.change("materialColor", ParamValue::Color(red)).unwrap();
        d.tick().unwrap();
        assert_eq!(
            d.context().scene.materials.get(handle).unwrap().color,
            Color::from_hex(0xffeded)
        );

        let panel = d.context_mut().panel.as_mut().unwrap();
        panel.commit("materialColor", ParamValue::Color(red)).unwrap();
        d.tick().unwrap();
        assert_eq!(d.context().scene.materials.get(handle).unwrap().color, red);
    }
}
