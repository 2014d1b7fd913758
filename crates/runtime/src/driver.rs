use crate::{
    Demo, DemoContext, DemoSettings, FrameClock, FrameTimer, LoopMode, RuntimeError, SystemTime,
    TimeSource, ViewportMode,
};
use scenelab_input::HostEvent;
use scenelab_render::{
    OutputSink, RenderView, Renderer, ResizeSignal, Viewport, apply_viewport, pixel_density,
    reconcile_resize,
};
use scenelab_tools::SceneInspector;
use std::path::PathBuf;
use std::time::Instant;

/// Frame-loop lifecycle. Starting is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    NotStarted,
    Running,
}

pub struct DriverOptions {
    /// Directory asset paths are resolved against.
    pub assets_root: PathBuf,
    /// Seed of the context rng.
    pub seed: u64,
    /// Host drawing area at startup.
    pub host: ResizeSignal,
    pub time: Box<dyn TimeSource>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("static"),
            seed: 42,
            host: ResizeSignal {
                width: 800,
                height: 600,
                scale_factor: 1.0,
            },
            time: Box::new(SystemTime::default()),
        }
    }
}

/// Owns one demo, its context and its renderer, and serializes host events and
/// frame ticks against them.
pub struct Driver<R> {
    demo: Box<dyn Demo>,
    ctx: DemoContext,
    renderer: R,
    settings: DemoSettings,
    clock: FrameClock,
    host: ResizeSignal,
    state: LoopState,
    frames: u64,
    timer: FrameTimer,
}

fn initial_viewport(settings: &DemoSettings, host: ResizeSignal) -> Viewport {
    let density = if settings.resize.cap_pixel_ratio {
        pixel_density(host.scale_factor, true)
    } else {
        1.0
    };
    match settings.viewport {
        ViewportMode::Fixed { width, height } => Viewport::new(width, height, density),
        ViewportMode::Window => Viewport::new(host.width, host.height, density),
    }
}

impl<R> Driver<R>
where
    R: Renderer + OutputSink,
{
    pub fn new(demo: Box<dyn Demo>, renderer: R, options: DriverOptions) -> Self {
        let settings = demo.settings();
        let viewport = initial_viewport(&settings, options.host);
        Self {
            ctx: DemoContext::new(options.assets_root, options.seed, viewport),
            demo,
            renderer,
            settings,
            clock: FrameClock::new(options.time),
            host: options.host,
            state: LoopState::NotStarted,
            frames: 0,
            timer: FrameTimer::default(),
        }
    }

    pub fn demo_name(&self) -> &'static str {
        self.demo.name()
    }

    pub fn settings(&self) -> &DemoSettings {
        &self.settings
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn context(&self) -> &DemoContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut DemoContext {
        &mut self.ctx
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Frames rendered successfully.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Whether the host should keep requesting refreshes.
    pub fn wants_redraw(&self) -> bool {
        match self.settings.loop_mode {
            LoopMode::Continuous => true,
            LoopMode::Once => self.frames == 0,
        }
    }

    fn sync_array_aspect(&mut self) {
        let aspect = self.ctx.viewport.aspect();
        if let Some(array) = self.ctx.array_camera.as_mut() {
            array.set_aspect(aspect);
        }
    }

    /// Build the scene and size the output. `NotStarted -> Running`.
    pub fn start(&mut self) -> Result<(), RuntimeError> {
        if self.state == LoopState::Running {
            return Err(RuntimeError::AlreadyStarted);
        }
        let _span = tracing::info_span!("demo_setup", demo = self.demo.name()).entered();
        self.demo.setup(&mut self.ctx)?;
        apply_viewport(&self.ctx.viewport, &mut self.ctx.camera, &mut self.renderer);
        self.sync_array_aspect();
        self.state = LoopState::Running;
        tracing::info!(
            demo = self.demo.name(),
            width = self.ctx.viewport.width,
            height = self.ctx.viewport.height,
            objects = self.ctx.scene.len(),
            "demo started"
        );
        Ok(())
    }

    /// Route a host event into the context, then to the demo.
    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::Resized { .. } => {
                if let Some(signal) = event.resize_signal() {
                    self.host = signal;
                    if reconcile_resize(
                        &mut self.ctx.viewport,
                        signal,
                        &mut self.ctx.camera,
                        &mut self.renderer,
                        self.settings.resize,
                    ) {
                        self.sync_array_aspect();
                    }
                }
            }
            HostEvent::CursorMoved { x, y } => {
                let (w, h) = (self.ctx.viewport.width, self.ctx.viewport.height);
                self.ctx.cursor.update(x, y, w, h);
            }
            HostEvent::Scrolled { y } => self.ctx.scroll_y = y,
            HostEvent::Drag { .. } | HostEvent::Wheel { .. } => {
                let h = self.ctx.viewport.height as f32;
                if let Some(controls) = self.ctx.controls.as_mut() {
                    controls.handle(&event, h);
                }
            }
            HostEvent::KeyDown(_) => {}
        }
        if self.state == LoopState::Running {
            self.demo.on_event(&mut self.ctx, &event);
        }
    }

    /// One frame: clock, asset completions, panel edits, update, controls, render.
    ///
    /// Render failures are logged and yield `Ok(None)`; the loop keeps going.
    pub fn tick(&mut self) -> Result<Option<R::Output>, RuntimeError> {
        if self.state != LoopState::Running {
            return Err(RuntimeError::NotStarted);
        }
        if !self.wants_redraw() {
            return Ok(None);
        }
        let started = Instant::now();
        let _span = tracing::trace_span!("frame", n = self.frames).entered();
        let time = self.clock.sample();

        for completion in self.ctx.assets.poll() {
            if let Some(unclaimed) = self.ctx.claim(completion) {
                self.demo.on_asset(&mut self.ctx, unclaimed);
            }
        }

        let panel_events = self
            .ctx
            .panel
            .as_mut()
            .map(|p| p.drain_events())
            .unwrap_or_default();
        for event in &panel_events {
            self.demo.on_panel_event(&mut self.ctx, event);
        }

        self.demo.update(&mut self.ctx, time);
        self.ctx.timeline.update(time.elapsed, &mut self.ctx.scene);

        if let Some(controls) = self.ctx.controls.as_mut() {
            controls.update(&mut self.ctx.camera);
        }

        if let Some(panel) = self.ctx.panel.as_mut() {
            if panel.is_visible() {
                panel.set_status(SceneInspector::summary(&self.ctx.scene).to_string());
            }
        }

        let view = match &self.ctx.array_camera {
            Some(array) => RenderView::Array(array),
            None => RenderView::Single(&self.ctx.camera),
        };
        let output = match self.renderer.render(&self.ctx.scene, view) {
            Ok(out) => {
                self.frames += 1;
                Some(out)
            }
            Err(e) => {
                tracing::error!(demo = self.demo.name(), error = %e, "render failed");
                None
            }
        };
        self.timer.record(started.elapsed());
        Ok(output)
    }

    /// Re-apply the last host size; used after the sink lost its surface.
    pub fn refresh_output(&mut self) {
        let signal = self.host;
        if self.settings.resize.track_host {
            reconcile_resize(
                &mut self.ctx.viewport,
                signal,
                &mut self.ctx.camera,
                &mut self.renderer,
                self.settings.resize,
            );
        } else {
            apply_viewport(&self.ctx.viewport, &mut self.ctx.camera, &mut self.renderer);
        }
        self.sync_array_aspect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FrameTime, ManualTime};
    use glam::Vec3;
    use scenelab_common::Color;
    use scenelab_render::{ArrayCamera, CameraRig, DebugTextRenderer, RenderError};
    use scenelab_scene::Material;
    use scenelab_scene::geometry::box_geometry;
    use scenelab_tools::{DebugPanel, PanelEvent, ParamValue};

    struct Spinner {
        fixed: bool,
        texture_path: Option<&'static str>,
    }

    impl Spinner {
        fn new() -> Self {
            Self {
                fixed: false,
                texture_path: None,
            }
        }
    }

    impl Demo for Spinner {
        fn name(&self) -> &'static str {
            "spinner"
        }

        fn settings(&self) -> DemoSettings {
            if self.fixed {
                DemoSettings::fixed("spinner", 800, 600)
            } else {
                DemoSettings::window("spinner")
            }
        }

        fn setup(&mut self, ctx: &mut DemoContext) -> Result<(), RuntimeError> {
            let mut material = Material::basic(Color::from_hex(0xff0000));
            if let Some(path) = self.texture_path {
                let map = ctx.load_texture(path);
                material = material.with_texture(scenelab_scene::TextureSlot::Map, map);
            }
            ctx.scene
                .add_mesh("cube", box_geometry(1.0, 1.0, 1.0, 1, 1, 1), material);
            ctx.camera = CameraRig::perspective(75.0, ctx.viewport.aspect(), 0.1, 100.0)
                .at(Vec3::new(0.0, 0.0, 3.0));
            let mut panel = DebugPanel::new("test");
            panel.add_number("speed", 1.0, 0.0, 10.0, 0.5)?;
            ctx.panel = Some(panel);
            Ok(())
        }

        fn update(&mut self, ctx: &mut DemoContext, time: FrameTime) {
            if let Some(id) = ctx.scene.find_by_name("cube") {
                if let Some(t) = ctx.scene.transform_mut(id) {
                    t.rotation.y = time.elapsed;
                }
            }
        }

        fn on_panel_event(&mut self, ctx: &mut DemoContext, event: &PanelEvent) {
            let (Some(speed), Some(id)) = (event.value().as_f32(), ctx.scene.find_by_name("cube"))
            else {
                return;
            };
            if event.is_commit() {
                if let Some(t) = ctx.scene.transform_mut(id) {
                    t.position.x = speed;
                }
            }
        }
    }

    fn driver(demo: Spinner, time: &ManualTime, dpr: f32) -> Driver<DebugTextRenderer> {
        Driver::new(
            Box::new(demo),
            DebugTextRenderer::new(),
            DriverOptions {
                assets_root: PathBuf::from("/nonexistent-assets"),
                seed: 7,
                host: ResizeSignal {
                    width: 1024,
                    height: 768,
                    scale_factor: dpr,
                },
                time: Box::new(time.clone()),
            },
        )
    }

    #[test]
    fn tick_before_start_is_error() {
        let time = ManualTime::new();
        let mut d = driver(Spinner::new(), &time, 1.0);
        assert!(matches!(d.tick(), Err(RuntimeError::NotStarted)));
        d.start().unwrap();
        assert!(matches!(d.start(), Err(RuntimeError::AlreadyStarted)));
        assert_eq!(d.state(), LoopState::Running);
    }

    #[test]
    fn start_sizes_camera_and_sink_from_host() {
        let time = ManualTime::new();
        let mut d = driver(Spinner::new(), &time, 3.0);
        d.start().unwrap();
        assert!((d.context().camera.projection.aspect() - 1024.0 / 768.0).abs() < 1e-6);
        assert_eq!(d.renderer().drawing_buffer_size(), (2048, 1536));
    }

    #[test]
    fn resize_reconciles_before_next_render() {
        let time = ManualTime::new();
        let mut d = driver(Spinner::new(), &time, 1.0);
        d.start().unwrap();
        d.dispatch(HostEvent::Resized {
            width: 500,
            height: 250,
            scale_factor: 2.5,
        });
        assert_eq!(d.context().camera.projection.aspect(), 2.0);
        assert_eq!(d.renderer().drawing_buffer_size(), (1000, 500));
        let frame = d.tick().unwrap().unwrap();
        assert!(frame.contains("500x250 @2.00"));
    }

    #[test]
    fn fixed_demo_ignores_resizes() {
        let time = ManualTime::new();
        let mut demo = Spinner::new();
        demo.fixed = true;
        let mut d = driver(demo, &time, 2.0);
        d.start().unwrap();
        d.dispatch(HostEvent::Resized {
            width: 300,
            height: 300,
            scale_factor: 2.0,
        });
        assert_eq!(d.renderer().drawing_buffer_size(), (800, 600));
        assert!((d.context().camera.projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn update_follows_the_clock() {
        let time = ManualTime::new();
        let mut d = driver(Spinner::new(), &time, 1.0);
        d.start().unwrap();
        d.tick().unwrap();
        time.advance(1.5);
        d.tick().unwrap();
        let id = d.context().scene.find_by_name("cube").unwrap();
        let y = d.context().scene.get(id).unwrap().transform.rotation.y;
        assert!((y - 1.5).abs() < 1e-5);
        assert_eq!(d.frame_count(), 2);
        assert_eq!(d.timer().count(), 2);
    }

    #[test]
    fn panel_commits_reach_the_demo_on_next_tick() {
        let time = ManualTime::new();
        let mut d = driver(Spinner::new(), &time, 1.0);
        d.start().unwrap();
        let panel = d.context_mut().panel.as_mut().unwrap();
        panel.set("speed", ParamValue::Number(3.2)).unwrap();
        d.tick().unwrap();
        let id = d.context().scene.find_by_name("cube").unwrap();
        let x = d.context().scene.get(id).unwrap().transform.position.x;
        assert!((x - 3.0).abs() < 1e-5, "snapped to the 0.5 step, got {x}");
    }

    #[test]
    fn keys_are_left_to_the_demo() {
        let time = ManualTime::new();
        let mut d = driver(Spinner::new(), &time, 1.0);
        d.start().unwrap();
        d.dispatch(HostEvent::KeyDown(scenelab_input::Key::Char('h')));
        d.dispatch(HostEvent::KeyDown(scenelab_input::Key::Char('x')));
        assert!(d.context().panel.as_ref().unwrap().is_visible());
    }

    #[test]
    fn failed_asset_load_does_not_stop_the_loop() {
        let time = ManualTime::new();
        let mut demo = Spinner::new();
        demo.texture_path = Some("/textures/missing.png");
        let mut d = driver(demo, &time, 1.0);
        d.start().unwrap();
        assert_eq!(d.context().pending_textures(), 1);

        let deadline = Instant::now() + std::time::Duration::from_secs(10);
        while d.context().pending_textures() > 0 && Instant::now() < deadline {
            // resize while the load is in flight
            d.dispatch(HostEvent::Resized {
                width: 640,
                height: 480,
                scale_factor: 1.0,
            });
            assert!(d.tick().unwrap().is_some());
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(d.context().pending_textures(), 0);
        assert!(d.context().assets.manager().failed() == 1);
        assert!(d.tick().unwrap().is_some());
        assert_eq!(d.context().camera.projection.aspect(), 640.0 / 480.0);
        let texture = d.context().scene.textures.iter().next().unwrap().1;
        assert!(!texture.is_loaded());
    }

    #[test]
    fn completed_texture_fills_the_blank_slot() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]))
            .save(dir.path().join("door.png"))
            .unwrap();
        let time = ManualTime::new();
        let mut demo = Spinner::new();
        demo.texture_path = Some("/door.png");
        let mut d = Driver::new(
            Box::new(demo),
            DebugTextRenderer::new(),
            DriverOptions {
                assets_root: dir.path().to_path_buf(),
                time: Box::new(time.clone()),
                ..DriverOptions::default()
            },
        );
        d.start().unwrap();
        let (handle, _) = d.context().scene.textures.iter().next().unwrap();
        let before = d.context().scene.textures.version(handle).unwrap();
        let deadline = Instant::now() + std::time::Duration::from_secs(10);
        while d.context().pending_textures() > 0 && Instant::now() < deadline {
            d.tick().unwrap();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let texture = d.context().scene.textures.get(handle).unwrap();
        assert!(texture.is_loaded());
        assert!(d.context().scene.textures.version(handle).unwrap() > before);
    }

    #[test]
    fn array_camera_follows_resize() {
        let time = ManualTime::new();
        let mut d = driver(Spinner::new(), &time, 1.0);
        d.start().unwrap();
        d.context_mut().array_camera = Some(ArrayCamera::grid(2, 2, 40.0, 1.0, |_, _| {
            CameraRig::perspective(40.0, 1.0, 0.1, 100.0)
        }));
        d.dispatch(HostEvent::Resized {
            width: 400,
            height: 100,
            scale_factor: 1.0,
        });
        let array = d.context().array_camera.as_ref().unwrap();
        assert!(array.cameras.iter().all(|c| c.rig.projection.aspect() == 4.0));
        let frame = d.tick().unwrap().unwrap();
        assert!(frame.contains("Array camera: 4 views"));
    }

    struct Failing;

    impl Renderer for Failing {
        type Output = ();

        fn render(
            &mut self,
            _scene: &scenelab_scene::Scene,
            _view: RenderView<'_>,
        ) -> Result<(), RenderError> {
            Err(RenderError::SurfaceLost)
        }
    }

    impl OutputSink for Failing {
        fn set_size(&mut self, _width: u32, _height: u32) {}
        fn set_pixel_ratio(&mut self, _ratio: f32) {}
        fn drawing_buffer_size(&self) -> (u32, u32) {
            (1, 1)
        }
    }

    #[test]
    fn render_errors_are_logged_not_fatal() {
        let time = ManualTime::new();
        let mut d = Driver::new(
            Box::new(Spinner::new()),
            Failing,
            DriverOptions {
                time: Box::new(time.clone()),
                ..DriverOptions::default()
            },
        );
        d.start().unwrap();
        for _ in 0..3 {
            assert!(d.tick().unwrap().is_none());
        }
        assert_eq!(d.frame_count(), 0);
    }

    struct Still;

    impl Demo for Still {
        fn name(&self) -> &'static str {
            "still"
        }
        fn settings(&self) -> DemoSettings {
            DemoSettings::fixed("still", 800, 600).once()
        }
        fn setup(&mut self, _ctx: &mut DemoContext) -> Result<(), RuntimeError> {
            Ok(())
        }
        fn update(&mut self, _ctx: &mut DemoContext, _time: FrameTime) {}
    }

    #[test]
    fn single_render_demo_draws_once() {
        let mut d = Driver::new(
            Box::new(Still),
            DebugTextRenderer::new(),
            DriverOptions::default(),
        );
        d.start().unwrap();
        assert!(d.wants_redraw());
        assert!(d.tick().unwrap().is_some());
        assert!(!d.wants_redraw());
        assert!(d.tick().unwrap().is_none());
        assert_eq!(d.renderer().frame_count(), 1);
    }
}
