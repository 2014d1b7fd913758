use glam::Vec3;
use scenelab_common::{Color, ObjectId};
use scenelab_render::CameraRig;
use scenelab_runtime::{
    Demo, DemoContext, DemoSettings, FrameTime, Property, Repeat, RuntimeError, TweenOptions,
};
use scenelab_scene::Material;
use scenelab_scene::geometry::box_geometry;
use std::f32::consts::TAU;

/// Red cube moved by three tweens: out along x, back, and an endless spin.
#[derive(Debug, Default)]
pub struct Animations {
    cube: Option<ObjectId>,
}

impl Demo for Animations {
    fn name(&self) -> &'static str {
        "animations"
    }

    fn settings(&self) -> DemoSettings {
        DemoSettings::fixed("animations", 800, 600)
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        let cube = ctx.scene.add_mesh(
            "cube",
            box_geometry(1.0, 1.0, 1.0, 1, 1, 1),
            Material::basic(Color::from_hex(0xff0000)),
        );
        ctx.camera = CameraRig::perspective(75.0, ctx.viewport.aspect(), 0.1, 2000.0)
            .at(Vec3::new(0.0, 0.0, 3.0));

        let timeline = &mut ctx.timeline;
        timeline.to(cube, Property::PositionX, 2.0, TweenOptions::over(1.0).delayed(1.0));
        timeline.to(cube, Property::PositionX, 0.0, TweenOptions::over(1.0).delayed(2.0));
        timeline.to(
            cube,
            Property::RotationY,
            TAU,
            TweenOptions::over(5.0).delayed(1.0).repeat(Repeat::Forever),
        );
        self.cube = Some(cube);
        Ok(())
    }

    // Motion is entirely tween-driven.
    fn update(&mut self, _ctx: &mut DemoContext, _time: FrameTime) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_render::DebugTextRenderer;
    use scenelab_runtime::{Driver, DriverOptions, ManualTime};

    fn cube_x(driver: &Driver<DebugTextRenderer>) -> f32 {
        let scene = &driver.context().scene;
        let id = scene.find_by_name("cube").unwrap();
        scene.get(id).unwrap().transform.position.x
    }

    #[test]
    fn cube_goes_out_and_back() {
        let time = ManualTime::new();
        let mut driver = Driver::new(
            Box::new(Animations::default()),
            DebugTextRenderer::new(),
            DriverOptions {
                time: Box::new(time.clone()),
                ..DriverOptions::default()
            },
        );
        driver.start().unwrap();
        driver.tick().unwrap();
        assert_eq!(cube_x(&driver), 0.0);

        time.set(1.5);
        driver.tick().unwrap();
        // power1.out at half time
        assert!((cube_x(&driver) - 1.5).abs() < 1e-4);

        time.set(2.0);
        driver.tick().unwrap();
        assert!((cube_x(&driver) - 2.0).abs() < 1e-4);

        time.set(2.5);
        driver.tick().unwrap();
        assert!((cube_x(&driver) - 0.5).abs() < 1e-4);
        time.set(4.0);
        driver.tick().unwrap();
        assert!(cube_x(&driver).abs() < 1e-4);
        // the spin never finishes
        assert_eq!(driver.context().timeline.len(), 1);
    }
}
