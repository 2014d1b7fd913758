mod host;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use host::Pointer;
use scenelab_input::{HostEvent, Key};
use scenelab_render_wgpu::WgpuRenderer;
use scenelab_runtime::{Demo, Driver, DriverOptions, ViewportMode};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "scenelab-desktop", about = "Run a scenelab demo in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo to run
    #[arg(short, long, default_value = "first-project")]
    demo: String,

    /// Directory asset paths are resolved against
    #[arg(long, default_value = "static")]
    assets: PathBuf,

    /// Seed for random placement
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Initial window width for window-sized demos
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height for window-sized demos
    #[arg(long, default_value = "720")]
    height: u32,
}

/// What to build once the event loop hands us a window.
struct Launch {
    demo: Box<dyn Demo>,
    assets: PathBuf,
    seed: u64,
    size: (u32, u32),
}

struct DesktopApp {
    launch: Option<Launch>,
    window: Option<Arc<Window>>,
    driver: Option<Driver<WgpuRenderer>>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    pointer: Pointer,
}

impl DesktopApp {
    fn new(launch: Launch) -> Self {
        Self {
            launch: Some(launch),
            window: None,
            driver: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            pointer: Pointer::default(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop, launch: Launch) -> Result<()> {
        let settings = launch.demo.settings();
        let attrs =
            Window::default_attributes().with_title(format!("scenelab: {}", settings.title));
        let attrs = match settings.viewport {
            ViewportMode::Fixed { width, height } => attrs
                .with_inner_size(LogicalSize::new(width, height))
                .with_resizable(false),
            ViewportMode::Window => {
                attrs.with_inner_size(LogicalSize::new(launch.size.0, launch.size.1))
            }
        };
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("scenelab_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let scale = window.scale_factor();
        let renderer = WgpuRenderer::new(surface, &adapter, device, queue, size.width, size.height);
        let host = host::signal(size, scale);
        let mut driver = Driver::new(
            launch.demo,
            renderer,
            DriverOptions {
                assets_root: launch.assets,
                seed: launch.seed,
                host,
                ..DriverOptions::default()
            },
        );
        driver.start()?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            driver.renderer().device(),
            driver.renderer().surface_format(),
            None,
            1,
            false,
        );

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            demo = driver.demo_name(),
            "GPU initialized"
        );
        self.window = Some(window);
        self.driver = Some(driver);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn dispatch(&mut self, event: HostEvent) {
        if let Some(driver) = &mut self.driver {
            driver.dispatch(event);
        }
    }

    /// Tick the demo, then draw the debug panel over the frame and present it.
    fn redraw(&mut self) {
        let (Some(window), Some(driver), Some(egui_winit), Some(egui_renderer)) = (
            &self.window,
            &mut self.driver,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        ) else {
            return;
        };
        if !driver.wants_redraw() {
            return;
        }
        let frame = match driver.tick() {
            Ok(Some(frame)) => frame,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(error = %e, "frame failed");
                return;
            }
        };

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if let Some(panel) = driver.context_mut().panel.as_mut() {
                panel.show(ctx);
            }
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let renderer = driver.renderer();
        let (device, queue) = (renderer.device(), renderer.queue());
        let (width, height) = renderer.surface_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }
        frame.present();
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(launch) = self.launch.take() else {
            return;
        };
        if let Err(e) = self.init(event_loop, launch) {
            tracing::error!(error = %e, "startup failed");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(&window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.dispatch(host::resized(window.inner_size(), window.scale_factor()));
                window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let p = position.to_logical::<f32>(window.scale_factor());
                for e in self.pointer.moved(p.x, p.y) {
                    self.dispatch(e);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => self.pointer.set_pressed(state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = host::wheel_delta(delta, window.scale_factor());
                self.dispatch(HostEvent::Wheel { delta });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match host::key(&logical_key) {
                Key::Escape => event_loop.exit(),
                key => self.dispatch(HostEvent::KeyDown(key)),
            },
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let continuous = self.driver.as_ref().is_some_and(|d| d.wants_redraw());
        if continuous {
            event_loop.set_control_flow(ControlFlow::Poll);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let demo = scenelab_demos::create(&cli.demo)?;
    tracing::info!(demo = %cli.demo, assets = %cli.assets.display(), "scenelab-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(Launch {
        demo,
        assets: cli.assets,
        seed: cli.seed,
        size: (cli.width, cli.height),
    });
    event_loop.run_app(&mut app)?;

    Ok(())
}
