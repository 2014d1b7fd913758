use glam::Vec3;
use scenelab_common::{Color, ObjectId};
use scenelab_input::{Cursor, HostEvent, OrbitControls};
use scenelab_render::{ArrayCamera, CameraRig};
use scenelab_runtime::{Demo, DemoContext, DemoSettings, FrameTime, RuntimeError};
use scenelab_scene::Material;
use scenelab_scene::geometry::box_geometry;

/// Projection the cameras demo renders through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Orbit-controlled perspective camera.
    #[default]
    Perspective,
    /// Fixed orthographic camera facing the cube.
    Orthographic,
    /// 2x2 grid of perspective cameras.
    Array,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::Perspective => CameraMode::Orthographic,
            CameraMode::Orthographic => CameraMode::Array,
            CameraMode::Array => CameraMode::Perspective,
        }
    }
}

const GRID: u32 = 2;

/// One red cube seen through a perspective, an orthographic or an array camera.
/// `c` cycles between them.
#[derive(Debug, Default)]
pub struct Cameras {
    mode: CameraMode,
    cube: Option<ObjectId>,
    perspective: Option<CameraRig>,
    orthographic: Option<CameraRig>,
    array: Option<ArrayCamera>,
    controls: Option<OrbitControls>,
}

impl Cameras {
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Move the active camera out of the context and the next one in.
    pub fn switch(&mut self, ctx: &mut DemoContext, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        match self.mode {
            CameraMode::Perspective => {
                self.perspective = Some(ctx.camera);
                self.controls = ctx.controls.take();
            }
            CameraMode::Orthographic => self.orthographic = Some(ctx.camera),
            CameraMode::Array => self.array = ctx.array_camera.take(),
        }
        let aspect = ctx.viewport.aspect();
        match mode {
            CameraMode::Perspective => {
                if let Some(rig) = self.perspective {
                    ctx.camera = rig;
                }
                ctx.controls = self.controls.take();
            }
            CameraMode::Orthographic => {
                if let Some(rig) = self.orthographic {
                    ctx.camera = rig;
                }
            }
            CameraMode::Array => {
                let mut array = self.array.take().unwrap_or_default();
                array.set_aspect(aspect);
                ctx.array_camera = Some(array);
            }
        }
        ctx.camera.projection.set_aspect(aspect);
        tracing::info!(?mode, "camera switched");
        self.mode = mode;
    }
}

fn array_camera(aspect: f32) -> ArrayCamera {
    ArrayCamera::grid(GRID, GRID, 40.0, aspect, |col, row| {
        // grid rows count from the top, camera heights from the bottom
        let x = col as f32 / GRID as f32 - 0.5;
        let y = 0.5 - (GRID - 1 - row) as f32 / GRID as f32;
        CameraRig::perspective(40.0, aspect, 0.1, 10.0)
            .at(Vec3::new(x, y, 1.5) * 2.0)
            .looking_at(Vec3::ZERO)
    })
}

impl Demo for Cameras {
    fn name(&self) -> &'static str {
        "cameras"
    }

    fn settings(&self) -> DemoSettings {
        DemoSettings::fixed("cameras", 800, 600)
    }

    fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
        self.cube = Some(ctx.scene.add_mesh(
            "cube",
            box_geometry(1.0, 1.0, 1.0, 5, 5, 5),
            Material::basic(Color::from_hex(0xff0000)),
        ));
        let aspect = ctx.viewport.aspect();
        ctx.camera = CameraRig::perspective(75.0, aspect, 0.1, 100.0)
            .at(Vec3::new(0.0, 0.0, 2.0))
            .looking_at(Vec3::ZERO);
        ctx.controls = Some(OrbitControls::damped());
        ctx.cursor = Cursor::new(true);
        self.orthographic = Some(
            CameraRig::orthographic(1.0, aspect, 0.1, 100.0)
                .at(Vec3::new(0.0, 0.0, 2.0))
                .looking_at(Vec3::ZERO),
        );
        self.array = Some(array_camera(aspect));
        Ok(())
    }

    /// The cube is static; only the orbit controls move the perspective camera.
    fn update(&mut self, _ctx: &mut DemoContext, _time: FrameTime) {}

    fn on_event(&mut self, ctx: &mut DemoContext, event: &HostEvent) {
        if event.is_key('c') {
            self.switch(ctx, self.mode.next());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelab_input::Key;
    use scenelab_render::{DebugTextRenderer, Projection};
    use scenelab_runtime::{Driver, DriverOptions, ManualTime};

    fn driver() -> Driver<DebugTextRenderer> {
        let mut d = Driver::new(
            Box::new(Cameras::default()),
            DebugTextRenderer::new(),
            DriverOptions {
                time: Box::new(ManualTime::new()),
                ..DriverOptions::default()
            },
        );
        d.start().unwrap();
        d
    }

    #[test]
    fn c_cycles_through_the_three_cameras() {
        let mut d = driver();
        assert!(d.tick().unwrap().unwrap().contains("Camera: perspective"));

        d.dispatch(HostEvent::KeyDown(Key::Char('c')));
        assert!(d.context().controls.is_none());
        let Projection::Orthographic(o) = d.context().camera.projection else {
            panic!("expected orthographic");
        };
        assert!((o.right() - 800.0 / 600.0).abs() < 1e-5);

        d.dispatch(HostEvent::KeyDown(Key::Char('c')));
        let frame = d.tick().unwrap().unwrap();
        assert!(frame.contains("Array camera: 4 views"));
        assert!(frame.contains("[0,0 400x300]"));
        assert!(frame.contains("[400,300 400x300]"));

        d.dispatch(HostEvent::KeyDown(Key::Char('c')));
        assert!(d.context().array_camera.is_none());
        assert!(d.context().controls.is_some());
        assert!(d.tick().unwrap().unwrap().contains("Camera: perspective"));
    }

    #[test]
    fn array_cameras_surround_the_cube() {
        let array = array_camera(4.0 / 3.0);
        assert_eq!(array.cameras.len(), 4);
        let eyes: Vec<Vec3> = array.cameras.iter().map(|c| c.rig.eye()).collect();
        assert!(eyes.iter().all(|e| e.z == 3.0));
        assert_eq!(eyes[0], Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(eyes[3], Vec3::new(0.0, 1.0, 3.0));
        assert!(array
            .cameras
            .iter()
            .all(|c| c.rig.target == Some(Vec3::ZERO)));
    }

    #[test]
    fn orthographic_camera_stays_put_while_the_cursor_moves() {
        let mut d = driver();
        d.dispatch(HostEvent::KeyDown(Key::Char('c')));
        d.dispatch(HostEvent::CursorMoved { x: 0.0, y: 300.0 });
        d.tick().unwrap();
        d.dispatch(HostEvent::CursorMoved { x: 700.0, y: 20.0 });
        d.tick().unwrap();
        assert!(d.context().cursor.x > 0.3);
        assert_eq!(d.context().camera.position, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(d.context().camera.target, Some(Vec3::ZERO));
    }
}
